use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::catalog::{resolve_genre, CatalogError, DiscoverQuery};

/// Body of a fetch-movies request. Fields are kept as raw JSON values and
/// coerced when the upstream query is built.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchMoviesRequest {
    #[serde(default)]
    pub page: Option<Value>,
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub genre: Option<Value>,
}

impl FetchMoviesRequest {
    /// Anything that is not a JSON object reads as an empty request.
    pub fn from_body(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Self {
                page: map.get("page").cloned(),
                year: map.get("year").cloned(),
                genre: map.get("genre").cloned(),
            },
            Ok(other) => {
                tracing::warn!(body = %other, "Ignoring non-object fetch-movies body");
                Self::default()
            }
            Err(e) => {
                if !body.is_empty() {
                    tracing::warn!(error = %e, "Ignoring unparsable fetch-movies body");
                }
                Self::default()
            }
        }
    }

    /// Only bodies sent as `application/json` are read, any other content
    /// type is an empty request.
    pub fn from_request(content_type: Option<&str>, body: &[u8]) -> Self {
        if content_type.map(is_json_content_type).unwrap_or(false) {
            Self::from_body(body)
        } else {
            if !body.is_empty() {
                tracing::warn!(content_type = ?content_type, "Ignoring non-JSON fetch-movies body");
            }
            Self::default()
        }
    }

    pub fn to_query(&self, translate_genres: bool) -> DiscoverQuery {
        let page = match self.page {
            None | Some(Value::Null) => "1".to_string(),
            Some(ref page) => value_text(page),
        };

        let year = self.year.as_ref().filter(|v| is_truthy(v)).map(value_text);

        let genre = self
            .genre
            .as_ref()
            .filter(|v| is_truthy(v))
            .map(value_text)
            .filter(|g| g != "All")
            .map(|g| if translate_genres { resolve_genre(&g) } else { g });

        DiscoverQuery { page, year, genre }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => match n.as_f64() {
            // Whole floats print without a fraction: 2.0 is "2".
            Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Either the movies or an error, never both.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FetchMoviesResponse {
    Movies { movies: Vec<Value> },
    Error { error: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Method Not Allowed. Use POST to fetch movies.")]
    MethodNotAllowed,
    #[error("Server misconfiguration: missing {0}")]
    ServerMisconfigured(String),
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::ServerMisconfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
            }
            ProxyError::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CatalogError> for ProxyError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Upstream { status, message } => ProxyError::Upstream { status, message },
            other => ProxyError::Transport(other.to_string()),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = FetchMoviesResponse::Error {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
