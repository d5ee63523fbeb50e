use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const UNTITLED: &str = "Untitled";
pub const UNKNOWN_YEAR: &str = "Unknown";

/// What the view sends to the proxy. Absent filters are left out of the
/// JSON body entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieRequest {
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
}

/// One movie as the view renders it. Built leniently from the raw catalog
/// item: a field of the wrong type is treated as missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MovieSummary {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub poster_path: Option<String>,
}

impl MovieSummary {
    pub fn from_value(value: &Value) -> Self {
        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            id: value.get("id").and_then(Value::as_i64),
            title: text("title"),
            overview: text("overview"),
            release_date: text("release_date"),
            poster_path: text("poster_path"),
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }

    pub fn release_year(&self) -> &str {
        match self.release_date.as_deref() {
            Some(date) => date.get(..4).unwrap_or(date),
            None => UNKNOWN_YEAR,
        }
    }

    pub fn poster_url(&self, image_base_url: &str) -> Option<String> {
        self.poster_path
            .as_ref()
            .map(|path| format!("{}{}", image_base_url.trim_end_matches('/'), path))
    }
}

/// Pull the `movies` list out of a proxy response body. A body without
/// one is an empty list.
pub fn movies_from_body(body: &Value) -> Vec<MovieSummary> {
    body.get("movies")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(MovieSummary::from_value).collect())
        .unwrap_or_default()
}
