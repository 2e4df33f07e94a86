//! Client configuration
//!
//! Defaults match a backend started locally with its development settings;
//! every field can be overridden from the environment.

use serde::{Deserialize, Serialize};
use std::env;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_CANVAS_ID: &str = "attendanceChart";
pub const DEFAULT_LOG_FILTER: &str = "trackademia_client=info,trackademia=info";

#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Scheme and host of the backend, without a trailing slash. Empty means same-origin.
    pub base_url: String,

    /// Credentials for the form login (native only)
    pub username: Option<String>,
    pub password: Option<String>,

    /// Id of the canvas element the attendance chart is drawn into
    pub chart_canvas_id: String,

    /// Log filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: None,
            password: None,
            chart_canvas_id: DEFAULT_CANVAS_ID.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("chart_canvas_id", &self.chart_canvas_id)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration for code served by the backend itself: requests stay same-origin.
    pub fn browser() -> Self {
        Self {
            base_url: String::new(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `TRACKADEMIA_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("TRACKADEMIA_BASE_URL") {
            config.base_url = url;
        }
        config.username = env::var("TRACKADEMIA_USERNAME").ok().filter(|s| !s.is_empty());
        config.password = env::var("TRACKADEMIA_PASSWORD").ok().filter(|s| !s.is_empty());
        if let Ok(id) = env::var("TRACKADEMIA_CANVAS_ID") {
            config.chart_canvas_id = id;
        }
        if let Ok(filter) = env::var("TRACKADEMIA_LOG") {
            config.log_filter = filter;
        }

        config
    }

    /// Absolute (or same-origin) URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }
}
