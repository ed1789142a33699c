pub mod classifier;
pub mod config;
pub mod error;
pub mod extractor;
pub mod metrics;
pub mod pipeline;
pub mod players;
pub mod snapshot;
pub mod types;
pub mod utils;
pub mod web;
pub mod window;

pub use classifier::{GtLeaguesClassifier, RowClassifier};
pub use error::ScraperError;
pub use extractor::FixtureExtractor;
pub use types::{Fixture, FixtureStatus, ScheduledFixture};
