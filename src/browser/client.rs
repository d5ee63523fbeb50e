use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::{json, Value};

use super::state::{BrowseError, MovieSource};
use super::types::{movies_from_body, MovieRequest, MovieSummary};
use crate::proxy::{relay, FetchMoviesRequest};
use crate::server::AppState;

pub const FETCH_MOVIES_PATH: &str = "/api/fetch-movies";

/// Talks to a running proxy over HTTP, the way the browser page does.
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: Client,
    endpoint: Url,
}

impl ProxyClient {
    pub fn new(server_url: &str) -> Result<Self, BrowseError> {
        let endpoint = Url::parse(server_url)
            .and_then(|base| base.join(FETCH_MOVIES_PATH))
            .map_err(|e| BrowseError::Transport(format!("Invalid server url {}: {}", server_url, e)))?;
        let http = Client::builder()
            .build()
            .map_err(|e| BrowseError::Transport(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl MovieSource for ProxyClient {
    async fn fetch_movies(&self, request: &MovieRequest) -> Result<Vec<MovieSummary>, BrowseError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| BrowseError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = if text.is_empty() {
                format!("Error {}", status.as_u16())
            } else {
                text
            };
            return Err(BrowseError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| BrowseError::Decode(e.to_string()))?;
        Ok(movies_from_body(&body))
    }
}

impl From<&MovieRequest> for FetchMoviesRequest {
    fn from(request: &MovieRequest) -> Self {
        FetchMoviesRequest {
            page: Some(json!(request.page)),
            year: request.year.map(|y| json!(y)),
            genre: request.genre.as_ref().map(|g| json!(g)),
        }
    }
}

/// Calls the proxy relay directly, for pages rendered by this server.
#[derive(Clone)]
pub struct InProcessSource {
    state: AppState,
}

impl InProcessSource {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl MovieSource for InProcessSource {
    async fn fetch_movies(&self, request: &MovieRequest) -> Result<Vec<MovieSummary>, BrowseError> {
        let items = relay(&self.state, &FetchMoviesRequest::from(request))
            .await
            .map_err(|e| BrowseError::Status {
                status: e.status().as_u16(),
                message: e.to_string(),
            })?;
        Ok(items.iter().map(MovieSummary::from_value).collect())
    }
}
