use chrono::NaiveDateTime;
use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::{
    classifier::{GtLeaguesClassifier, RowClassifier},
    config::{ScraperConfig, WindowConfig},
    error::{Result, ScraperError},
    types::{Fixture, RawRow, ScheduledFixture},
    utils::collapse_whitespace,
    window::filter_and_sort,
};

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| ScraperError::Selector(format!("{}: {:?}", css, e)))
}

/// Every `<tr>` in the document with its `<td>` texts and raw markup.
pub fn table_rows(html: &str) -> Result<Vec<RawRow>> {
    let document = Html::parse_document(html);
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;

    let rows = document
        .select(&row_selector)
        .map(|row| RawRow {
            cells: row
                .select(&cell_selector)
                .map(|cell| collapse_whitespace(&cell.text().collect::<String>()))
                .collect(),
            markup: row.html(),
        })
        .collect();

    Ok(rows)
}

pub struct FixtureExtractor<C = GtLeaguesClassifier> {
    classifier: C,
    window: WindowConfig,
}

impl FixtureExtractor<GtLeaguesClassifier> {
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(GtLeaguesClassifier::new(&config.classifier), config.window)
    }
}

impl<C: RowClassifier> FixtureExtractor<C> {
    pub fn new(classifier: C, window: WindowConfig) -> Self {
        Self { classifier, window }
    }

    pub fn window(&self) -> &WindowConfig {
        &self.window
    }

    /// All fixture rows in scan order, before any time filtering.
    pub fn candidates(&self, html: &str) -> Result<Vec<Fixture>> {
        let rows = table_rows(html)?;
        debug!("Found {} table rows to analyze", rows.len());

        let fixtures: Vec<Fixture> = rows
            .iter()
            .filter_map(|row| self.classifier.classify(row))
            .collect();

        info!("Parsed {} fixtures from {} rows", fixtures.len(), rows.len());
        Ok(fixtures)
    }

    pub fn extract(&self, html: &str, now: NaiveDateTime) -> Result<Vec<ScheduledFixture>> {
        let fixtures = self.candidates(html)?;
        Ok(filter_and_sort(fixtures, now, &self.window))
    }
}
