use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{error, warn};

use super::types::*;
use crate::server::AppState;

/// `POST /api/fetch-movies`. Mounted for every method so that anything
/// other than POST gets a proper 405 body.
pub async fn fetch_movies(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return ProxyError::MethodNotAllowed.into_response();
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let request = FetchMoviesRequest::from_request(content_type, &body);

    match relay(&state, &request).await {
        Ok(movies) => (StatusCode::OK, Json(FetchMoviesResponse::Movies { movies })).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Forward one request to the catalog with the server-held key.
pub async fn relay(
    state: &AppState,
    request: &FetchMoviesRequest,
) -> Result<Vec<Value>, ProxyError> {
    let tmdb = &state.config.tmdb;
    let api_key = match tmdb.api_key.as_deref() {
        Some(key) => key,
        None => {
            error!(var = %tmdb.api_key_env, "API key not set in environment");
            return Err(ProxyError::ServerMisconfigured(tmdb.api_key_env.clone()));
        }
    };

    let query = request.to_query(tmdb.translate_genres);

    state.catalog.discover(api_key, &query).await.map_err(|e| {
        let e = ProxyError::from(e);
        match &e {
            ProxyError::Upstream { status, message } => {
                warn!(status = *status, message = %message, "Catalog request failed")
            }
            other => error!(error = %other, "Unhandled catalog error"),
        }
        e
    })
}
