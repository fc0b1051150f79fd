use crate::error::{AppError, Result};
use crate::model::{DecodeResponse, EncodeRequest, EncodeResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use shortlink_core::{Mapping, ShortCode};
use tracing::debug;
use url::Url;

pub async fn encode_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EncodeRequest>, JsonRejection>,
) -> Result<Json<EncodeResponse>> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(error = %rejection, "Rejected encode payload");
        AppError::InvalidJson
    })?;
    let url = request.validated_url()?;

    let mapping = state.shortener().encode(&url).await?;

    Ok(Json(EncodeResponse {
        short_url: mapping.short_code.to_url(state.base_url()),
        short_code: mapping.short_code.to_string(),
        original_url: mapping.original_url,
    }))
}

pub async fn decode_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> Result<Json<DecodeResponse>> {
    let mapping = resolve(&state, short_code).await?;

    Ok(Json(DecodeResponse {
        short_url: mapping.short_code.to_url(state.base_url()),
        short_code: mapping.short_code.to_string(),
        original_url: mapping.original_url,
    }))
}

pub async fn redirect_handler(
    State(state): State<AppState>,
    Path(short_code): Path<String>,
) -> Result<Response> {
    let mapping = resolve(&state, short_code).await?;
    let location = location(&mapping.original_url).ok_or_else(|| {
        AppError::Internal(format!(
            "stored url cannot be used as a Location header: {}",
            mapping.original_url
        ))
    })?;

    Ok((StatusCode::MOVED_PERMANENTLY, [(LOCATION, location)]).into_response())
}

pub async fn not_found_handler() -> AppError {
    AppError::RouteNotFound
}

async fn resolve(state: &AppState, short_code: String) -> Result<Mapping> {
    let code = ShortCode::new_unchecked(short_code);
    state
        .shortener()
        .decode(&code)
        .await?
        .ok_or(AppError::ShortCodeNotFound)
}

/// Header value for a redirect target. URLs with characters a header cannot
/// carry fall back to their percent-encoded serialization.
fn location(url: &str) -> Option<HeaderValue> {
    HeaderValue::from_str(url).ok().or_else(|| {
        Url::parse(url)
            .ok()
            .and_then(|parsed| HeaderValue::from_str(parsed.as_str()).ok())
    })
}
