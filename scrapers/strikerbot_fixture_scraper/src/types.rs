use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHANNEL: &str = "TBD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixtureStatus {
    Upcoming,
    Live,
    HT,
    Finished,
}

impl FixtureStatus {
    /// Live and half-time fixtures bypass the time window.
    pub fn is_in_play(self) -> bool {
        matches!(self, FixtureStatus::Live | FixtureStatus::HT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub kickoff_time: String,
    pub home_team: String,
    pub away_team: String,
    pub status: FixtureStatus,
    pub tv_channel: String,
    pub match_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<String>,
}

impl Fixture {
    pub fn new(
        kickoff_time: &str,
        home_team: &str,
        away_team: &str,
        status: FixtureStatus,
        tv_channel: Option<&str>,
    ) -> Self {
        Self {
            kickoff_time: kickoff_time.to_string(),
            home_team: home_team.to_string(),
            away_team: away_team.to_string(),
            status,
            tv_channel: tv_channel.unwrap_or(DEFAULT_CHANNEL).to_string(),
            match_id: match_id(home_team, away_team, kickoff_time),
            week: None,
        }
    }

    pub fn with_week(mut self, week: Option<String>) -> Self {
        self.week = week;
        self
    }
}

pub fn match_id(home_team: &str, away_team: &str, kickoff_time: &str) -> String {
    format!("{}_{}_{}", home_team, away_team, kickoff_time).replace(' ', "_")
}

/// A fixture that passed the time-window filter, with its derived time fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledFixture {
    #[serde(flatten)]
    pub fixture: Fixture,
    pub calculated_datetime: NaiveDateTime,
    pub minutes_from_now: i64,
    pub time_until_kickoff: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub player: String,
    pub win_percent: f64,
    pub draw_percent: f64,
    pub loss_percent: f64,
    pub confidence_score: f64,
}

/// A table row as seen by a classifier: trimmed cell texts plus the row's markup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<String>,
    pub markup: String,
}

impl RawRow {
    pub fn from_cells<S: AsRef<str>>(cells: &[S]) -> Self {
        let cells: Vec<String> = cells.iter().map(|c| c.as_ref().to_string()).collect();
        let markup = cells
            .iter()
            .map(|c| format!("<td>{}</td>", c))
            .collect::<String>();
        Self {
            cells,
            markup: format!("<tr>{}</tr>", markup),
        }
    }
}
