use std::ops::RangeInclusive;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::analyze::InsightCard;
use crate::config::Defaults;
use crate::engine::{generate_batch, load_trend};
use crate::history::{HistoryRecord, HistoryStore};
use crate::ingest::types::FeedSource;
use crate::rank::{select_view, ViewMode};
use crate::sentiment::SentimentScorer;
use crate::trend::{default_window, HourlyTrend};

/// Accepted "articles per source" values.
pub const PER_SOURCE_RANGE: RangeInclusive<usize> = 3..=12;
/// Accepted "top insights" values.
pub const TOP_K_RANGE: RangeInclusive<usize> = 5..=25;
/// Upper bound for `/history?hours=`, keeps the cutoff arithmetic in range.
const MAX_HISTORY_HOURS: i64 = 24 * 366 * 100;

#[derive(Clone)]
pub struct AppState {
    sources: Arc<Vec<Box<dyn FeedSource>>>,
    scorer: Arc<dyn SentimentScorer>,
    // One lock for the one log: appends are serialized, reads see whole batches.
    history: Arc<Mutex<Box<dyn HistoryStore>>>,
    // Last generated batch; `/cards` re-filters it without fetching or logging.
    current: Arc<Mutex<Option<CurrentBatch>>>,
    defaults: Defaults,
}

struct CurrentBatch {
    generated_at: DateTime<Utc>,
    cards: Vec<InsightCard>,
}

impl AppState {
    pub fn new(
        sources: Vec<Box<dyn FeedSource>>,
        scorer: Arc<dyn SentimentScorer>,
        history: Box<dyn HistoryStore>,
        defaults: Defaults,
    ) -> Self {
        Self {
            sources: Arc::new(sources),
            scorer,
            history: Arc::new(Mutex::new(history)),
            current: Arc::new(Mutex::new(None)),
            defaults,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/generate", post(generate))
        .route("/cards", get(cards))
        .route("/trend", get(trend))
        .route("/history", get(history))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

type ApiError = (StatusCode, String);

fn internal(e: anyhow::Error) -> ApiError {
    tracing::error!(error = ?e, "request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{e:#}"))
}

fn clamp_to(v: usize, range: &RangeInclusive<usize>) -> usize {
    v.clamp(*range.start(), *range.end())
}

#[derive(Debug, serde::Deserialize)]
struct GenerateReq {
    #[serde(default)]
    per_source: Option<usize>,
    #[serde(default)]
    top_k: Option<usize>,
    #[serde(default)]
    view: ViewMode,
}

#[derive(serde::Serialize)]
struct GenerateResp {
    generated_at: DateTime<Utc>,
    per_source: usize,
    top_k: usize,
    view: ViewMode,
    /// Full ranked batch; the client keeps it as its current state.
    batch: Vec<InsightCard>,
    /// The batch after view filter + top-k.
    cards: Vec<InsightCard>,
}

async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateReq>,
) -> Result<Json<GenerateResp>, ApiError> {
    let per_source = clamp_to(
        req.per_source.unwrap_or(state.defaults.per_source),
        &PER_SOURCE_RANGE,
    );
    let top_k = clamp_to(req.top_k.unwrap_or(state.defaults.top_k), &TOP_K_RANGE);

    let batch = generate_batch(&state.sources, state.scorer.as_ref(), per_source).await;

    let written = {
        let mut store = state.history.lock().await;
        store.append(&batch).map_err(internal)?
    };
    let generated_at = written.first().map_or_else(Utc::now, |r| r.logged_at);

    let cards = select_view(&batch, req.view, top_k);
    tracing::info!(
        target: "insight",
        per_source,
        top_k,
        batch = batch.len(),
        shown = cards.len(),
        "generate request served"
    );

    *state.current.lock().await = Some(CurrentBatch {
        generated_at,
        cards: batch.clone(),
    });

    Ok(Json(GenerateResp {
        generated_at,
        per_source,
        top_k,
        view: req.view,
        batch,
        cards,
    }))
}

#[derive(Debug, serde::Deserialize)]
struct CardsQuery {
    #[serde(default)]
    view: ViewMode,
    top_k: Option<usize>,
}

#[derive(serde::Serialize)]
struct CardsResp {
    /// `None` until the first `/generate`.
    generated_at: Option<DateTime<Utc>>,
    top_k: usize,
    view: ViewMode,
    batch_len: usize,
    cards: Vec<InsightCard>,
}

/// View over the held batch. Never fetches and never touches history.
async fn cards(State(state): State<AppState>, Query(q): Query<CardsQuery>) -> Json<CardsResp> {
    let top_k = clamp_to(q.top_k.unwrap_or(state.defaults.top_k), &TOP_K_RANGE);
    let current = state.current.lock().await;
    let (generated_at, batch) = match current.as_ref() {
        Some(b) => (Some(b.generated_at), b.cards.as_slice()),
        None => (None, &[][..]),
    };
    Json(CardsResp {
        generated_at,
        top_k,
        view: q.view,
        batch_len: batch.len(),
        cards: select_view(batch, q.view, top_k),
    })
}

async fn trend(State(state): State<AppState>) -> Result<Json<HourlyTrend>, ApiError> {
    let store = state.history.lock().await;
    load_trend(&**store, default_window())
        .map(Json)
        .map_err(internal)
}

#[derive(Debug, serde::Deserialize)]
struct HistoryQuery {
    hours: Option<i64>,
}

async fn history(
    State(state): State<AppState>,
    Query(q): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryRecord>>, ApiError> {
    let hours = q.hours.unwrap_or(24);
    if hours <= 0 {
        return Err((StatusCode::BAD_REQUEST, "hours must be positive".to_string()));
    }
    let hours = hours.min(MAX_HISTORY_HOURS);
    let store = state.history.lock().await;
    store
        .query_since(Duration::hours(hours))
        .map(Json)
        .map_err(internal)
}
