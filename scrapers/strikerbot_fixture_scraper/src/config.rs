use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapshotConfig {
    /// The snapshot every extraction pass reads.
    pub path: PathBuf,
    /// Timestamped copies of each fetched snapshot.
    pub archive_dir: PathBuf,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("assets/data/gt_dashboard_latest.html"),
            archive_dir: PathBuf::from("snapshots"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub max_players: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("assets/data"),
            max_players: 20,
        }
    }
}

/// Upper bounds accepted for window overrides: one week ahead, one day back.
pub const MAX_HORIZON_HOURS: i64 = 168;
pub const MAX_WINDOW_MINUTES: i64 = 1440;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowConfig {
    pub horizon_hours: i64,
    /// How far in the past a same-day kickoff may be before it is read as tomorrow's.
    pub next_day_tolerance_minutes: i64,
    pub recent_past_minutes: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            horizon_hours: 2,
            next_day_tolerance_minutes: 60,
            recent_past_minutes: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassifierConfig {
    pub min_cells: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self { min_cells: 6 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScrapingConfig {
    pub url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            url: "https://www.gtleagues.com/dashboard".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebConfig {
    pub host: String,
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScraperConfig {
    pub snapshot: SnapshotConfig,
    pub output: OutputConfig,
    pub window: WindowConfig,
    pub classifier: ClassifierConfig,
    pub scraping: ScrapingConfig,
    pub web: WebConfig,
}

fn env_parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

impl ScraperConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("SNAPSHOT_PATH") {
            config.snapshot.path = PathBuf::from(path);
        }
        if let Ok(dir) = env::var("SNAPSHOT_ARCHIVE_DIR") {
            config.snapshot.archive_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("OUTPUT_DIR") {
            config.output.dir = PathBuf::from(dir);
        }
        if let Some(max) = env_parsed::<usize>("MAX_PLAYERS") {
            config.output.max_players = max;
        }
        if let Some(hours) = env_parsed::<i64>("WINDOW_HORIZON_HOURS") {
            if (1..=MAX_HORIZON_HOURS).contains(&hours) {
                config.window.horizon_hours = hours;
            }
        }
        if let Some(minutes) = env_parsed::<i64>("WINDOW_NEXT_DAY_TOLERANCE_MINUTES") {
            if (0..=MAX_WINDOW_MINUTES).contains(&minutes) {
                config.window.next_day_tolerance_minutes = minutes;
            }
        }
        if let Some(minutes) = env_parsed::<i64>("WINDOW_RECENT_PAST_MINUTES") {
            if (0..=MAX_WINDOW_MINUTES).contains(&minutes) {
                config.window.recent_past_minutes = minutes;
            }
        }
        if let Some(cells) = env_parsed::<usize>("MIN_ROW_CELLS") {
            config.classifier.min_cells = cells;
        }
        if let Ok(url) = env::var("DASHBOARD_URL") {
            config.scraping.url = url;
        }
        if let Ok(user_agent) = env::var("SCRAPER_USER_AGENT") {
            config.scraping.user_agent = user_agent;
        }
        if let Some(timeout) = env_parsed::<u64>("SCRAPER_TIMEOUT_SECS") {
            config.scraping.request_timeout_secs = timeout;
        }
        if let Ok(host) = env::var("WEB_HOST") {
            config.web.host = host;
        }
        if let Some(port) = env_parsed::<u16>("WEB_PORT") {
            config.web.port = port;
        }

        config
    }
}
