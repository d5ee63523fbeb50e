use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    /// Directory with static files served for unmatched routes.
    #[serde(default)]
    pub appdir: Option<String>,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(skip)]
    pub debug_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default)]
    pub tlscert: Option<String>,
    #[serde(default)]
    pub tlskey: Option<String>,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
            tlscert: None,
            tlskey: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    #[serde(alias = "baseurl", default = "default_base_url")]
    pub base_url: String,
    #[serde(alias = "imagebaseurl", default = "default_image_base_url")]
    pub image_base_url: String,
    /// Name of the environment variable holding the API key.
    #[serde(alias = "apikeyenv", default = "default_api_key_env")]
    pub api_key_env: String,
    /// Translate genre names like "Comedy" into TMDB genre ids before
    /// they are sent upstream.
    #[serde(alias = "translategenres", default = "default_true")]
    pub translate_genres: bool,
    /// Never read from the config file, see `Config::resolve_api_key`.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            image_base_url: default_image_base_url(),
            api_key_env: default_api_key_env(),
            translate_genres: true,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    #[serde(default = "default_years")]
    pub years: Vec<i32>,
    #[serde(default = "default_genres")]
    pub genres: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            years: default_years(),
            genres: default_genres(),
        }
    }
}

fn default_port() -> String {
    "3000".to_string()
}

fn default_base_url() -> String {
    "https://api.themoviedb.org/3/".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_api_key_env() -> String {
    "TMDB_API_KEY".to_string()
}

fn default_true() -> bool {
    true
}

fn default_years() -> Vec<i32> {
    vec![2024, 2023, 2022, 2021, 2020, 2019]
}

fn default_genres() -> Vec<String> {
    ["All", "Animation", "Comedy", "Fantasy"]
        .iter()
        .map(|g| g.to_string())
        .collect()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(&content).map_err(|e| ConfigError::ParseError(path.to_string(), e))
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Load the config file if one was given, built-in defaults otherwise.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Pick up the API key from the process environment. An empty
    /// variable counts as unset.
    pub fn resolve_api_key(&mut self) {
        self.tmdb.api_key = std::env::var(&self.tmdb.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty());
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}
