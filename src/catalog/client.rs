use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{error, info};

const DISCOVER_PATH: &str = "discover/movie";
const FALLBACK_ERROR: &str = "Failed to fetch movies";

/// Query parameters for the discover endpoint. Optional filters are
/// only sent when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverQuery {
    pub page: String,
    pub year: Option<String>,
    pub genre: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("Invalid catalog url {0}: {1}")]
    InvalidUrl(String, String),
}

/// Client for the upstream movie catalog (TMDB v3).
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| CatalogError::InvalidUrl(base_url.to_string(), e.to_string()))?;

        // No timeout: the call waits as long as the transport lets it.
        let http = Client::builder()
            .build()
            .map_err(|e| CatalogError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, base_url })
    }

    pub fn discover_url(&self, api_key: &str, query: &DiscoverQuery) -> Result<Url, CatalogError> {
        let mut url = self
            .base_url
            .join(DISCOVER_PATH)
            .map_err(|e| CatalogError::InvalidUrl(self.base_url.to_string(), e.to_string()))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", api_key);
            pairs.append_pair("page", &query.page);
            if let Some(ref year) = query.year {
                pairs.append_pair("primary_release_year", year);
            }
            if let Some(ref genre) = query.genre {
                pairs.append_pair("with_genres", genre);
            }
        }

        Ok(url)
    }

    /// Run a discover query and return the raw `results` items.
    pub async fn discover(
        &self,
        api_key: &str,
        query: &DiscoverQuery,
    ) -> Result<Vec<Value>, CatalogError> {
        let url = self.discover_url(api_key, query)?;
        info!(url = %redacted_url(&url), "Fetching movies from catalog");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        let status = response.status();
        info!(
            status = status.as_u16(),
            reason = status.canonical_reason().unwrap_or(""),
            "Catalog response status"
        );

        let body: Value = response
            .json()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "Catalog error body");
            let message = body
                .get("status_message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or(FALLBACK_ERROR)
                .to_string();
            return Err(CatalogError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let results = match body.get("results") {
            Some(Value::Array(items)) => items.clone(),
            _ => Vec::new(),
        };
        Ok(results)
    }
}

/// The url with the api key blanked out, for logging.
pub fn redacted_url(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "api_key" { "REDACTED".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
