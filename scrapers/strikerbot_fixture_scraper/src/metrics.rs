use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PassMetrics {
    pub total_passes: u64,
    pub successful_passes: u64,
    pub failed_passes: u64,
    pub avg_pass_time_ms: f64,
    pub last_fixtures_count: usize,
    pub last_error: Option<String>,
    pub last_error_time: Option<DateTime<Utc>>,
}

/// Counters for extraction passes, shared between request handlers.
#[derive(Clone, Default)]
pub struct MetricsCollector {
    metrics: Arc<Mutex<PassMetrics>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, PassMetrics> {
        self.metrics.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_pass_start(&self) -> PassTracker {
        PassTracker {
            start_time: Instant::now(),
            collector: self.clone(),
        }
    }

    pub fn get_metrics(&self) -> PassMetrics {
        self.lock().clone()
    }
}

pub struct PassTracker {
    start_time: Instant,
    collector: MetricsCollector,
}

impl PassTracker {
    pub fn succeed(self, fixtures_count: usize) {
        let mut metrics = self.finish();
        metrics.successful_passes += 1;
        metrics.last_fixtures_count = fixtures_count;
    }

    pub fn fail(self, error: String) {
        let mut metrics = self.finish();
        metrics.failed_passes += 1;
        metrics.last_fixtures_count = 0;
        metrics.last_error = Some(error);
        metrics.last_error_time = Some(Utc::now());
    }

    fn finish(&self) -> MutexGuard<'_, PassMetrics> {
        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let mut metrics = self.collector.lock();

        metrics.total_passes += 1;
        // Exponential moving average, seeded by the first pass
        metrics.avg_pass_time_ms = if metrics.total_passes == 1 {
            elapsed_ms
        } else {
            let alpha = 0.1;
            metrics.avg_pass_time_ms * (1.0 - alpha) + elapsed_ms * alpha
        };
        metrics
    }
}
