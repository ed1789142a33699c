use std::cmp::Ordering;

use crate::{
    types::{PlayerStats, RawRow},
    utils::{char_len, parse_percent},
};

const MIN_PLAYER_CELLS: usize = 5;

/// `rank | player | win % | draw % | loss %`
pub fn classify_player_row(row: &RawRow) -> Option<PlayerStats> {
    if row.cells.len() < MIN_PLAYER_CELLS {
        return None;
    }

    let player = row.cells[1].trim();
    if char_len(player) <= 2 {
        return None;
    }

    let win_percent = parse_percent(&row.cells[2])?;
    let draw_percent = parse_percent(&row.cells[3])?;
    let loss_percent = parse_percent(&row.cells[4])?;

    Some(PlayerStats {
        player: player.to_string(),
        win_percent,
        draw_percent,
        loss_percent,
        confidence_score: win_percent + draw_percent * 0.5,
    })
}

/// Player rows ranked by confidence score, highest first.
pub fn rank_players(rows: &[RawRow]) -> Vec<PlayerStats> {
    let mut players: Vec<PlayerStats> = rows.iter().filter_map(classify_player_row).collect();
    players.sort_by(|a, b| {
        b.confidence_score
            .partial_cmp(&a.confidence_score)
            .unwrap_or(Ordering::Equal)
    });
    players
}
