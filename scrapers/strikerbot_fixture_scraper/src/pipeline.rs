//! One extraction pass over the latest snapshot.
//!
//! A pass reads the snapshot, extracts the fixture window and the player
//! table, and summarises the result in a [`StatusReport`]. Failures end up in
//! the report rather than propagating, so a caller polling on a timer can
//! simply try again on its next cycle.

use chrono::{DateTime, Local, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, info, warn};

use crate::{
    config::{ScraperConfig, WindowConfig},
    error::{Result, ScraperError},
    extractor::{table_rows, FixtureExtractor},
    players::rank_players,
    types::{FixtureStatus, PlayerStats, ScheduledFixture},
};

pub const FIXTURES_FILE: &str = "fixtures.json";
pub const PLAYERS_FILE: &str = "players.json";
pub const STATUS_FILE: &str = "status.json";
pub const SOURCE: &str = "gtleagues.com";
/// Cadence of the periodic caller, advertised as `next_update`.
pub const UPDATE_INTERVAL_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub last_updated: DateTime<Utc>,
    pub fixtures_count: usize,
    pub players_count: usize,
    pub live_matches: usize,
    pub upcoming_matches: usize,
    pub status: PassStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub data_window_hours: i64,
    pub source: String,
    pub next_update: DateTime<Utc>,
}

fn next_update(now: DateTime<Utc>) -> DateTime<Utc> {
    now + TimeDelta::minutes(UPDATE_INTERVAL_MINUTES)
}

impl StatusReport {
    pub fn success(
        fixtures: &[ScheduledFixture],
        players: &[PlayerStats],
        window: &WindowConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let live_matches = fixtures
            .iter()
            .filter(|f| f.fixture.status.is_in_play())
            .count();
        let upcoming_matches = fixtures
            .iter()
            .filter(|f| f.fixture.status == FixtureStatus::Upcoming)
            .count();

        Self {
            last_updated: now,
            fixtures_count: fixtures.len(),
            players_count: players.len(),
            live_matches,
            upcoming_matches,
            status: PassStatus::Success,
            error_message: None,
            data_window_hours: window.horizon_hours,
            source: SOURCE.to_string(),
            next_update: next_update(now),
        }
    }

    pub fn failure(message: impl Into<String>, window: &WindowConfig, now: DateTime<Utc>) -> Self {
        Self {
            last_updated: now,
            fixtures_count: 0,
            players_count: 0,
            live_matches: 0,
            upcoming_matches: 0,
            status: PassStatus::Error,
            error_message: Some(message.into()),
            data_window_hours: window.horizon_hours,
            source: SOURCE.to_string(),
            next_update: next_update(now),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PassStatus::Success
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PassOutput {
    pub fixtures: Vec<ScheduledFixture>,
    pub players: Vec<PlayerStats>,
    pub report: StatusReport,
}

pub fn read_snapshot(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ScraperError::NoSnapshot(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Extracts fixtures and players from already loaded HTML.
pub fn extract_html(html: &str, config: &ScraperConfig, now: DateTime<Local>) -> Result<PassOutput> {
    let extractor = FixtureExtractor::from_config(config);
    let fixtures = extractor.extract(html, now.naive_local())?;
    let players = rank_players(&table_rows(html)?);

    if fixtures.is_empty() {
        warn!("No fixtures in the {}h window", config.window.horizon_hours);
    }

    let report = StatusReport::success(&fixtures, &players, &config.window, now.with_timezone(&Utc));
    Ok(PassOutput {
        fixtures,
        players,
        report,
    })
}

pub fn run_pass(config: &ScraperConfig, now: DateTime<Local>) -> Result<PassOutput> {
    let html = read_snapshot(&config.snapshot.path)?;
    info!(
        "Parsing snapshot {:?} ({} bytes)",
        config.snapshot.path,
        html.len()
    );
    extract_html(&html, config, now)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    fs::write(path, serde_json::to_string_pretty(value)?)?;
    Ok(())
}

pub fn write_status(dir: &Path, report: &StatusReport) -> Result<()> {
    fs::create_dir_all(dir)?;
    write_json(&dir.join(STATUS_FILE), report)
}

/// `fixtures_backup_YYYYMMDD_HHMM.json`, one per pass, next to the live outputs.
pub fn backup_path(dir: &Path, at: DateTime<Local>) -> PathBuf {
    dir.join(format!("fixtures_backup_{}.json", at.format("%Y%m%d_%H%M")))
}

pub fn write_outputs(dir: &Path, output: &PassOutput, max_players: usize) -> Result<()> {
    fs::create_dir_all(dir)?;
    let players = &output.players[..output.players.len().min(max_players)];
    let backup = backup_path(dir, output.report.last_updated.with_timezone(&Local));

    write_json(&dir.join(FIXTURES_FILE), &output.fixtures)?;
    write_json(&backup, &output.fixtures)?;
    info!("Backup created: {:?}", backup);
    write_json(&dir.join(PLAYERS_FILE), players)?;
    write_status(dir, &output.report)?;

    info!(
        "Fixtures saved to {:?} ({} matches, {} live, {} upcoming)",
        dir.join(FIXTURES_FILE),
        output.report.fixtures_count,
        output.report.live_matches,
        output.report.upcoming_matches
    );
    Ok(())
}

/// Runs a pass and writes its outputs. Any failure becomes an error report on disk.
pub fn run_and_write(config: &ScraperConfig, now: DateTime<Local>) -> StatusReport {
    let dir = &config.output.dir;
    let result = run_pass(config, now)
        .and_then(|output| write_outputs(dir, &output, config.output.max_players).map(|_| output));

    match result {
        Ok(output) => output.report,
        Err(e) => {
            error!("Extraction pass failed: {}", e);
            let report = StatusReport::failure(e.to_string(), &config.window, now.with_timezone(&Utc));
            if let Err(write_err) = write_status(dir, &report) {
                error!("Could not write error status to {:?}: {}", dir, write_err);
            }
            report
        }
    }
}
