pub mod browser;
pub mod catalog;
pub mod config;
pub mod middleware;
pub mod proxy;
pub mod server;
pub mod util;

use std::net::SocketAddr;
use tracing::{info, warn};

use browser::{FilterState, MovieBrowser, ProxyClient};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Server error: {0}")]
    Server(String),
}

pub async fn run(config_path: Option<&str>, debug_logs: bool) -> Result<(), ServerError> {
    let mut config = config::Config::load(config_path)?;
    config.debug_logs = debug_logs;
    config.resolve_api_key();

    match config_path {
        Some(path) => info!("Using config file: {}", path),
        None => info!("No config file given, using defaults"),
    }
    info!("Catalog base url: {}", config.tmdb.base_url);
    if config.tmdb.api_key.is_none() {
        warn!(
            "{} is not set, movie requests will fail until it is",
            config.tmdb.api_key_env
        );
    }
    if debug_logs {
        info!("Debug logging enabled");
    }

    let address = config.listen.address.as_deref().unwrap_or("[::]");
    let port = &config.listen.port;
    let addr: SocketAddr = format!("{}:{}", address, port)
        .parse()
        .map_err(|e| ServerError::Server(format!("Invalid address: {}", e)))?;

    let tls = match (&config.listen.tlscert, &config.listen.tlskey) {
        (Some(cert), Some(key)) => Some((cert.clone(), key.clone())),
        _ => None,
    };

    let state = server::AppState::new(config)
        .map_err(|e| ServerError::Server(format!("Failed to create catalog client: {}", e)))?;
    let app = server::build_app(state);

    if let Some((cert_path, key_path)) = tls {
        info!("Loading TLS certificate from {}", cert_path);
        info!("Loading TLS key from {}", key_path);

        let tls_config = axum_server::tls_rustls::RustlsConfig::from_pem_file(&cert_path, &key_path)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to load TLS config: {}", e)))?;

        info!("Serving HTTPS on {}", addr);

        axum_server::bind_rustls(addr, tls_config)
            .serve(app.into_make_service())
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    } else {
        info!("Serving HTTP on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Server(format!("Failed to bind: {}", e)))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Server(format!("Server error: {}", e)))?;
    }

    Ok(())
}

/// Fetch one page of movies through a running proxy and print it.
pub async fn browse(server_url: &str, filter: FilterState) -> Result<(), ServerError> {
    let client = ProxyClient::new(server_url).map_err(|e| ServerError::Server(e.to_string()))?;
    let mut browser = MovieBrowser::with_filter(client, filter);
    browser.refresh().await;

    if let Some(error) = browser.error() {
        return Err(ServerError::Server(format!("Couldn't load movies: {}", error)));
    }

    let filter = browser.filter();
    println!("{} (page {})", crate::browser::render::heading(filter), filter.page);
    for movie in browser.movies() {
        println!("  {} ({})", movie.display_title(), movie.release_year());
    }
    Ok(())
}
