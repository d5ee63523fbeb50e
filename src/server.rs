use axum::{
    extract::Request,
    http::StatusCode,
    response::IntoResponse,
    routing::{any, get},
    Router,
};
use std::sync::Arc;
use tower::Layer;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::catalog::{CatalogClient, CatalogError};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<CatalogClient>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, CatalogError> {
        let catalog = CatalogClient::new(&config.tmdb.base_url)?;
        Ok(Self {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
        })
    }
}

/// The router with path normalization in front of it. Normalizing has to
/// happen before routing, so it wraps the whole router.
pub fn build_app(state: AppState) -> Router {
    let normalized = axum::middleware::from_fn(crate::middleware::normalize_path)
        .layer(build_router(state));
    Router::new().fallback_service(normalized)
}

pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(crate::browser::index))
        .route("/movies", get(crate::browser::movies_page))
        .route("/api/fetch-movies", any(crate::proxy::fetch_movies))
        .route("/robots.txt", get(robots_txt_handler))
        .fallback(fallback_handler);

    if let Some(ref appdir) = state.config.appdir {
        router = router.fallback_service(ServeDir::new(appdir));
    }

    router
        .layer(axum::middleware::from_fn(crate::middleware::log_request))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn robots_txt_handler() -> &'static str {
    "User-agent: *\nDisallow: /\n"
}

async fn fallback_handler(req: Request) -> impl IntoResponse {
    if req.method() == axum::http::Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    StatusCode::NOT_FOUND.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use tower::ServiceExt;

    fn router() -> Router {
        build_router(AppState::new(Config::default()).unwrap())
    }

    #[tokio::test]
    async fn test_robots_txt() {
        let request = Request::builder().uri("/robots.txt").body(Body::empty()).unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let request = Request::builder().uri("/nope").body(Body::empty()).unwrap();
        let response = router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_normalized_path_reaches_route() {
        let app = build_app(AppState::new(Config::default()).unwrap());
        let request = Request::builder().uri("/robots.txt//").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_bad_base_url() {
        let mut config = Config::default();
        config.tmdb.base_url = "::not a url::".to_string();
        assert!(AppState::new(config).is_err());
    }
}
