use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use chrono::{Local, Utc};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::oneshot;
use tracing::{error, info};

use crate::{
    config::ScraperConfig,
    metrics::MetricsCollector,
    pipeline::{run_pass, PassOutput, StatusReport},
    types::ScheduledFixture,
};

/// Shared by every handler. Created once at startup; the report is replaced
/// after each extraction pass.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ScraperConfig>,
    pub last_report: Arc<Mutex<StatusReport>>,
    pub metrics: MetricsCollector,
    pub shutdown_tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl AppState {
    pub fn new(config: ScraperConfig, initial_report: StatusReport) -> Self {
        Self {
            config: Arc::new(config),
            last_report: Arc::new(Mutex::new(initial_report)),
            metrics: MetricsCollector::new(),
            shutdown_tx: Arc::new(Mutex::new(None)),
        }
    }

    /// Runs a fresh extraction pass on the blocking pool and records its outcome.
    pub async fn refresh(&self) -> Result<PassOutput, StatusReport> {
        let state = self.clone();
        match tokio::task::spawn_blocking(move || state.refresh_blocking()).await {
            Ok(result) => result,
            Err(e) => {
                error!("Extraction task failed: {}", e);
                let report =
                    StatusReport::failure(e.to_string(), &self.config.window, Utc::now());
                *lock(&self.last_report) = report.clone();
                Err(report)
            }
        }
    }

    /// Reads and parses the snapshot on the calling thread.
    pub fn refresh_blocking(&self) -> Result<PassOutput, StatusReport> {
        let tracker = self.metrics.record_pass_start();
        let now = Local::now();

        match run_pass(&self.config, now) {
            Ok(output) => {
                tracker.succeed(output.fixtures.len());
                *lock(&self.last_report) = output.report.clone();
                Ok(output)
            }
            Err(e) => {
                error!("Extraction pass failed: {}", e);
                tracker.fail(e.to_string());
                let report =
                    StatusReport::failure(e.to_string(), &self.config.window, now.with_timezone(&Utc));
                *lock(&self.last_report) = report.clone();
                Err(report)
            }
        }
    }

    pub fn last_report(&self) -> StatusReport {
        lock(&self.last_report).clone()
    }
}

fn unavailable(report: StatusReport) -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, Json(report)).into_response()
}

#[axum::debug_handler]
pub async fn fixtures_handler(State(state): State<AppState>) -> Response {
    match state.refresh().await {
        Ok(output) => Json(output.fixtures).into_response(),
        Err(report) => unavailable(report),
    }
}

#[axum::debug_handler]
pub async fn players_handler(State(state): State<AppState>) -> Response {
    match state.refresh().await {
        Ok(mut output) => {
            output.players.truncate(state.config.output.max_players);
            Json(output.players).into_response()
        }
        Err(report) => unavailable(report),
    }
}

#[axum::debug_handler]
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.last_report())
}

#[axum::debug_handler]
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.metrics.get_metrics())
}

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[axum::debug_handler]
pub async fn shutdown_handler(State(state): State<AppState>) {
    if let Some(tx) = lock(&state.shutdown_tx).take() {
        let _ = tx.send(());
    }
}

fn fixture_rows(fixtures: &[ScheduledFixture]) -> String {
    if fixtures.is_empty() {
        return r#"<tr><td colspan="6" class="p-4 text-center text-gray-500">No matches in the current window</td></tr>"#
            .to_string();
    }

    fixtures
        .iter()
        .map(|f| {
            format!(
                r#"<tr class="border-b">
                    <td class="p-2 font-mono">{}</td>
                    <td class="p-2">{}</td>
                    <td class="p-2">{}</td>
                    <td class="p-2">{:?}</td>
                    <td class="p-2">{}</td>
                    <td class="p-2 font-semibold">{}</td>
                </tr>"#,
                html_escape::encode_text(&f.fixture.kickoff_time),
                html_escape::encode_text(&f.fixture.home_team),
                html_escape::encode_text(&f.fixture.away_team),
                f.fixture.status,
                html_escape::encode_text(&f.fixture.tv_channel),
                html_escape::encode_text(&f.time_until_kickoff),
            )
        })
        .collect()
}

pub fn render_dashboard(report: &StatusReport, fixtures: &[ScheduledFixture]) -> String {
    let error_panel = report.error_message.as_ref().map_or_else(String::new, |e| {
        format!(
            r#"<div class="bg-red-50 p-4 rounded-lg shadow mb-8">
                <h3 class="text-lg font-semibold mb-2 text-red-700">Last Error</h3>
                <p class="text-red-600">{}</p>
            </div>"#,
            html_escape::encode_text(e)
        )
    });

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1.0" />
    <title>StrikerBot Command Center</title>
    <script src="https://unpkg.com/@tailwindcss/browser@4"></script>
    <script>
        function updateStatus() {{
            fetch('/status')
                .then(response => response.json())
                .then(status => {{
                    document.getElementById('fixtures_count').textContent = status.fixtures_count;
                    document.getElementById('live').textContent = status.live_matches;
                    document.getElementById('upcoming').textContent = status.upcoming_matches;
                    document.getElementById('status').textContent = status.status;
                    document.getElementById('updated').textContent = status.last_updated;
                }});
        }}
        // Each page load is a fresh pass; reload the whole page once a minute
        setInterval(() => window.location.reload(), 60000);
        setInterval(updateStatus, 10000);
    </script>
</head>
<body class="bg-gray-100 min-h-screen p-8">
    <div class="max-w-6xl mx-auto">
        <h1 class="text-3xl font-bold mb-8 text-gray-800">StrikerBot Command Center</h1>

        <div class="bg-white rounded-lg shadow-lg p-6 mb-8">
            <div class="grid grid-cols-1 md:grid-cols-2 lg:grid-cols-4 gap-6">
                <div class="bg-blue-50 p-4 rounded-lg">
                    <h2 class="text-sm font-semibold text-blue-600 mb-1">Fixtures ({}h window)</h2>
                    <p class="text-2xl font-bold text-blue-700" id="fixtures_count">{}</p>
                </div>
                <div class="bg-red-50 p-4 rounded-lg">
                    <h2 class="text-sm font-semibold text-red-600 mb-1">Live</h2>
                    <p class="text-2xl font-bold text-red-700" id="live">{}</p>
                </div>
                <div class="bg-green-50 p-4 rounded-lg">
                    <h2 class="text-sm font-semibold text-green-600 mb-1">Upcoming</h2>
                    <p class="text-2xl font-bold text-green-700" id="upcoming">{}</p>
                </div>
                <div class="bg-yellow-50 p-4 rounded-lg">
                    <h2 class="text-sm font-semibold text-yellow-600 mb-1">Status</h2>
                    <p class="text-2xl font-bold text-yellow-700" id="status">{:?}</p>
                </div>
            </div>
            <p class="mt-4 text-sm text-gray-500">Last updated: <span id="updated">{}</span> from {}</p>
        </div>

        {}

        <div class="bg-white rounded-lg shadow-lg p-6">
            <table class="w-full text-left">
                <thead>
                    <tr class="border-b text-sm text-gray-600">
                        <th class="p-2">Kickoff</th>
                        <th class="p-2">Home</th>
                        <th class="p-2">Away</th>
                        <th class="p-2">Status</th>
                        <th class="p-2">Channel</th>
                        <th class="p-2">Starts</th>
                    </tr>
                </thead>
                <tbody>
                    {}
                </tbody>
            </table>
        </div>
    </div>
</body>
</html>"#,
        report.data_window_hours,
        report.fixtures_count,
        report.live_matches,
        report.upcoming_matches,
        report.status,
        report.last_updated.to_rfc3339(),
        report.source,
        error_panel,
        fixture_rows(fixtures),
    )
}

#[axum::debug_handler]
pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    match state.refresh().await {
        Ok(output) => Html(render_dashboard(&output.report, &output.fixtures)),
        Err(report) => Html(render_dashboard(&report, &[])),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/fixtures", get(fixtures_handler))
        .route("/players", get(players_handler))
        .route("/status", get(status_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/shutdown", get(shutdown_handler))
        .with_state(state)
}

/// Binds the listener and serves in the background. The receiver fires when
/// `/shutdown` is hit.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<oneshot::Receiver<()>> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    *lock(&state.shutdown_tx) = Some(shutdown_tx);

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Web interface available at http://{}", addr);

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Web server stopped: {}", e);
        }
    });

    Ok(shutdown_rx)
}
