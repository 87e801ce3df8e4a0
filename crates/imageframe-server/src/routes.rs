//! HTTP surface: `GET /run` and `GET /status`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;

use crate::gate::CooldownGate;
use crate::pipeline::Normalizer;

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub gate: Arc<CooldownGate>,
    pub normalizer: Arc<Normalizer>,
    /// Report failed runs with their 5xx status instead of 200.
    pub strict_status: bool,
}

/// Query parameter naming the asset to render.
const ASSET_ID_PARAM: &str = "assetId";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/run", get(run))
        .route("/status", get(status))
        .with_state(state)
}

#[tracing::instrument(skip_all)]
async fn run(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    if let Err(too_soon) = state.gate.try_acquire() {
        tracing::debug!(retry_after = ?too_soon.retry_after, "run rejected, cooling down");
        return too_soon.into_response();
    }

    let asset_id = first_param(&params, ASSET_ID_PARAM);
    tracing::info!(asset_id = %asset_id, "run accepted");

    let report = state.normalizer.run(asset_id).await;
    let status = if state.strict_status {
        report.status_code()
    } else {
        StatusCode::OK
    };

    let body = format!("<pre>{}</pre>", escape_html(&report.transcript()));
    (status, Html(body)).into_response()
}

async fn status() -> &'static str {
    "OK"
}

/// First value given for `name`, or `""` when it is absent.
fn first_param<'a>(params: &'a [(String, String)], name: &str) -> &'a str {
    params
        .iter()
        .find(|(key, _)| key == name)
        .map_or("", |(_, value)| value.as_str())
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
