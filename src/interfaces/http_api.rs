use axum::{
    Router,
    extract::{Query, State, rejection::QueryRejection},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use tower_http::trace::TraceLayer;

use crate::application::usecases::RecordOpenUseCase;
use crate::domain::{OpenRequest, PIXEL_CACHE_CONTROL, PIXEL_CONTENT_TYPE, PIXEL_GIF};

#[derive(Clone)]
pub struct ApiState {
    pub record_open: RecordOpenUseCase,
}

/// Every path answers `GET` with the tracking pixel; only the query string
/// matters.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .fallback(get(track_open))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn track_open(
    State(state): State<ApiState>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
    headers: HeaderMap,
) -> Response {
    let params = match query {
        Ok(Query(params)) => params,
        Err(e) => {
            tracing::warn!("unreadable query string: {e}");
            Vec::new()
        }
    };

    let request = OpenRequest::new(
        first_param(&params, "recipient"),
        first_param(&params, "title"),
        client_ip(&headers),
    );
    tracing::info!(
        ip = %request.ip,
        recipient = %request.recipient,
        title = %request.title,
        "pixel request"
    );

    let outcome = state.record_open.execute(&request, Utc::now()).await;
    tracing::debug!(?outcome, "tracking done");

    pixel_response()
}

pub fn pixel_response() -> Response {
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static(PIXEL_CONTENT_TYPE)),
            (CACHE_CONTROL, HeaderValue::from_static(PIXEL_CACHE_CONTROL)),
            (CONTENT_LENGTH, HeaderValue::from(PIXEL_GIF.len())),
        ],
        PIXEL_GIF.as_slice(),
    )
        .into_response()
}

/// First occurrence wins; blank values count as missing.
fn first_param(params: &[(String, String)], name: &str) -> Option<String> {
    params
        .iter()
        .find(|(k, v)| k == name && !v.is_empty())
        .map(|(_, v)| v.clone())
}

/// Left-most `x-forwarded-for` entry, i.e. the original client behind the proxy.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("x-forwarded-for")?.to_str().ok()?;
    raw.split(',').next().map(|ip| ip.trim().to_string())
}
