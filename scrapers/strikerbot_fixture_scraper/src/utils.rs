use regex::Regex;
use std::sync::LazyLock;

use crate::types::FixtureStatus;

static KICKOFF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([01]?\d|2[0-3]):([0-5]\d)\b").expect("kickoff regex"));
static WEEK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:week|wk)\.?\s*\d+").expect("week regex"));
static VS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bvs\b").expect("vs regex"));

// Checked in priority order against lower-cased text
static STATUS_KEYWORDS: LazyLock<Vec<(Regex, FixtureStatus)>> = LazyLock::new(|| {
    [
        (r"\bnot[\s_-]*started\b", FixtureStatus::Upcoming),
        (r"\b(?:live|playing)\b", FixtureStatus::Live),
        (r"\b(?:halftime|half-time|ht)\b", FixtureStatus::HT),
        (r"\b(?:finished|ended)\b", FixtureStatus::Finished),
    ]
    .into_iter()
    .map(|(pattern, status)| (Regex::new(pattern).expect("status regex"), status))
    .collect()
});

/// First `HH:MM` (24h) in the text, normalised to two-digit hour and minute.
pub fn find_kickoff_time(text: &str) -> Option<String> {
    let cap = KICKOFF_RE.captures(text)?;
    let hour: u32 = cap[1].parse().ok()?;
    let minute: u32 = cap[2].parse().ok()?;
    Some(format!("{:02}:{:02}", hour, minute))
}

pub fn contains_kickoff_time(text: &str) -> bool {
    KICKOFF_RE.is_match(text)
}

pub fn is_week_label(text: &str) -> bool {
    WEEK_RE.is_match(text)
}

pub fn contains_vs_token(text: &str) -> bool {
    VS_RE.is_match(text)
}

/// Matches a status keyword anywhere in the text; `None` when nothing matches.
pub fn status_keyword(text: &str) -> Option<FixtureStatus> {
    let lowered = text.to_lowercase();
    STATUS_KEYWORDS
        .iter()
        .find(|(re, _)| re.is_match(&lowered))
        .map(|(_, status)| *status)
}

pub fn infer_status(markup: &str) -> FixtureStatus {
    status_keyword(markup).unwrap_or(FixtureStatus::Upcoming)
}

/// Digits and number punctuation only, e.g. "12", "3.5", "1,200".
pub fn is_purely_numeric(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | ',' | '-' | '+' | '%'))
}

pub fn has_letter(text: &str) -> bool {
    text.chars().any(char::is_alphabetic)
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "54.5%" -> 54.5
pub fn parse_percent(text: &str) -> Option<f64> {
    let cleaned = text.trim().trim_end_matches('%').trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
