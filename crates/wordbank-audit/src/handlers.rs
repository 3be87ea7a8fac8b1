use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use wordbank_consensus::{Pipeline, SourceRow, triage};
use wordbank_pos::{
    gloss_marker_pos, is_phrase_headword, normalize_book_name, normalize_headword,
    parse_explicit_pos_tags,
};
use wordbank_types::{Evidence, Pos, ReviewCandidate, WordbankEntry};

pub const MAX_AGGREGATE_ROWS: usize = 20_000;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

#[derive(Deserialize)]
pub struct ClassifyQuery {
    pub headword: String,
    pub gloss: Option<String>,
}

#[derive(Serialize)]
pub struct ClassifyResponse {
    headword: String,
    headword_norm: String,
    pos: Pos,
    confidence: u8,
    evidence: Evidence,
    is_phrase: bool,
    explicit_tags: Vec<Pos>,
    gloss_marker: Option<Pos>,
}

#[derive(Deserialize)]
pub struct NormalizeQuery {
    pub text: String,
    pub kind: Option<String>,
}

#[derive(Serialize)]
pub struct NormalizeResponse {
    text: String,
    kind: &'static str,
    normalized: String,
}

#[derive(Serialize)]
pub struct AggregateResponse {
    rows: usize,
    dropped: usize,
    entries: Vec<WordbankEntry>,
    review: Vec<ReviewCandidate>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/classify", get(classify))
        .route("/v1/normalize", get(normalize))
        .route("/v1/aggregate", post(aggregate))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn classify(
    State(state): State<AppState>,
    Query(params): Query<ClassifyQuery>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    let headword = params.headword.trim();
    if headword.is_empty() {
        return Err(ApiError::bad_request("headword is required"));
    }
    let gloss = params.gloss.unwrap_or_default();
    let result = state.pipeline.classifier().infer_pos(headword, &gloss);
    Ok(Json(ClassifyResponse {
        headword: headword.to_string(),
        headword_norm: normalize_headword(headword),
        pos: result.pos,
        confidence: result.confidence,
        evidence: result.evidence,
        is_phrase: is_phrase_headword(headword),
        explicit_tags: parse_explicit_pos_tags(&gloss),
        gloss_marker: gloss_marker_pos(&gloss),
    }))
}

async fn normalize(
    Query(params): Query<NormalizeQuery>,
) -> Result<Json<NormalizeResponse>, ApiError> {
    let (kind, normalized) = match params.kind.as_deref().unwrap_or("headword") {
        "headword" => ("headword", normalize_headword(&params.text)),
        "book" => ("book", normalize_book_name(&params.text)),
        other => {
            return Err(ApiError::bad_request(format!(
                "kind must be headword or book, got {other:?}"
            )));
        }
    };
    Ok(Json(NormalizeResponse {
        text: params.text,
        kind,
        normalized,
    }))
}

async fn aggregate(
    State(state): State<AppState>,
    Json(rows): Json<Vec<SourceRow>>,
) -> Result<Json<AggregateResponse>, ApiError> {
    if rows.len() > MAX_AGGREGATE_ROWS {
        return Err(ApiError::bad_request(format!(
            "at most {MAX_AGGREGATE_ROWS} rows per request"
        )));
    }
    let total = rows.len();
    let records: Vec<_> = rows.into_iter().filter_map(SourceRow::into_record).collect();
    let dropped = total - records.len();
    debug!(rows = total, dropped, "aggregate request");

    let entries = state.pipeline.aggregate(&records);
    let review = triage(&entries, &state.pipeline.config().triage);
    Ok(Json(AggregateResponse {
        rows: total,
        dropped,
        entries,
        review,
    }))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
        }
    }
}
