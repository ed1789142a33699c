//! Row classification: decides whether a table row is a fixture and pulls its fields out.
//!
//! Layouts differ between dashboards, so the extractor only talks to the
//! [`RowClassifier`] trait. [`GtLeaguesClassifier`] handles the GT Leagues
//! dashboard table, where a fixture row looks like
//! `time | week no. | flag | week | home | away | channel | status`.

use tracing::trace;

use crate::config::ClassifierConfig;
use crate::types::{Fixture, RawRow, DEFAULT_CHANNEL};
use crate::utils::{
    char_len, contains_kickoff_time, contains_vs_token, find_kickoff_time, has_letter,
    infer_status, is_purely_numeric, is_week_label, status_keyword,
};

const MAX_CHANNEL_LEN: usize = 20;

pub trait RowClassifier: Send + Sync {
    /// Returns a fully populated fixture, or `None` when the row is not a fixture.
    fn classify(&self, row: &RawRow) -> Option<Fixture>;
}

#[derive(Debug, Clone)]
pub struct GtLeaguesClassifier {
    min_cells: usize,
    home_index: usize,
    away_index: usize,
}

impl Default for GtLeaguesClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl GtLeaguesClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            min_cells: config.min_cells,
            home_index: 4,
            away_index: 5,
        }
    }

    fn kickoff_time(&self, row: &RawRow) -> Option<String> {
        row.cells.iter().find_map(|cell| find_kickoff_time(cell))
    }

    /// Team cells by position, then by scanning adjacent pairs.
    fn team_indices(&self, cells: &[String]) -> Option<(usize, usize)> {
        let positional = cells
            .get(self.home_index)
            .zip(cells.get(self.away_index))
            .filter(|(home, away)| {
                is_positional_team(home) && is_positional_team(away) && distinct(home, away)
            });
        if positional.is_some() {
            return Some((self.home_index, self.away_index));
        }

        cells
            .windows(2)
            .position(|pair| {
                is_scanned_team(&pair[0]) && is_scanned_team(&pair[1]) && distinct(&pair[0], &pair[1])
            })
            .map(|i| (i, i + 1))
    }

    fn channel<'a>(&self, cells: &'a [String], after: usize) -> Option<&'a str> {
        cells
            .iter()
            .skip(after + 1)
            .map(String::as_str)
            .find(|cell| {
                let len = char_len(cell);
                len > 0
                    && len < MAX_CHANNEL_LEN
                    && status_keyword(cell).is_none()
                    && !contains_kickoff_time(cell)
            })
    }
}

impl RowClassifier for GtLeaguesClassifier {
    fn classify(&self, row: &RawRow) -> Option<Fixture> {
        if row.cells.len() < self.min_cells {
            return None;
        }

        let Some(kickoff) = self.kickoff_time(row) else {
            trace!("Row without kickoff time skipped");
            return None;
        };

        let Some((home_idx, away_idx)) = self.team_indices(&row.cells) else {
            trace!("Row at {} without team names skipped", kickoff);
            return None;
        };
        let home = row.cells[home_idx].as_str();
        let away = row.cells[away_idx].as_str();

        let status = infer_status(&row.markup);
        let channel = self.channel(&row.cells, away_idx).unwrap_or(DEFAULT_CHANNEL);
        let week = row
            .cells
            .iter()
            .enumerate()
            .find(|(i, cell)| *i != home_idx && *i != away_idx && is_week_label(cell))
            .map(|(_, cell)| cell.clone());

        Some(Fixture::new(&kickoff, home, away, status, Some(channel)).with_week(week))
    }
}

fn is_positional_team(text: &str) -> bool {
    has_letter(text) && char_len(text) > 2 && !is_purely_numeric(text)
}

fn is_scanned_team(text: &str) -> bool {
    char_len(text) > 3
        && has_letter(text)
        && !is_purely_numeric(text)
        && !contains_vs_token(text)
        && !contains_kickoff_time(text)
        && !is_week_label(text)
        && status_keyword(text).is_none()
}

fn distinct(home: &str, away: &str) -> bool {
    !home.eq_ignore_ascii_case(away)
}
