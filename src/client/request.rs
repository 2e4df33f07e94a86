//! No-WASM HTTP client implementation using reqwest
//!
//! The backend keeps the login in a session cookie, so the client carries a
//! cookie store and has to `login` before any `/api/*` call.

use crate::config::ClientConfig;
use crate::error::{ErrorKind, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client, Url,
};
use serde::Serialize;

use super::{ADD_STUDENT_PATH, LOGIN_PATH, LOGOUT_PATH, MARK_ATTENDANCE_PATH, UPDATE_STATUS_PATH};
use crate::interface::{AttendanceApi, HttpClient};
use crate::model::dtos::{AddStudentParams, LoginParams, MarkAttendanceParams, UpdateStatusParams};
use crate::model::structs::ApiResponse;

/// HTTP client for no-WASM environments using reqwest
#[derive(Debug, Clone)]
pub struct NoWasmClient {
    client: Client,
    config: ClientConfig,
}

impl HttpClient for NoWasmClient {
    async fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }
}

impl NoWasmClient {
    /// Build a client and log in when the config carries credentials.
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let client = Self::new(config).await?;
        if let Some((username, password)) = config.credentials() {
            client.login(username, password).await?;
        }
        Ok(client)
    }

    /// Submit the login form.
    ///
    /// The backend answers a good login with a redirect to a dashboard and a
    /// bad one by rendering the login page again, so success is judged by
    /// where the redirects end.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let params = LoginParams {
            username: username.to_string(),
            password: password.to_string(),
        };

        let login_url = Url::parse(&self.config.url(LOGIN_PATH))
            .map_err(|e| ErrorKind::ConfigError(format!("invalid base_url: {e}")))?;

        let resp = self
            .client
            .post(login_url.clone())
            .form(&params)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ErrorKind::LoginError(format!("HTTP {}", resp.status())).into());
        }
        if resp.url().path().trim_end_matches('/') == login_url.path().trim_end_matches('/') {
            return Err(ErrorKind::LoginError("Invalid credentials".to_string()).into());
        }

        log::info!("Logged in as {username}");
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.client
            .get(self.config.url(LOGOUT_PATH))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        let url = self.config.url(path);
        log::debug!("POST {url}");

        let resp = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        log::debug!("{url} answered {}", resp.status());

        Ok(resp.json::<ApiResponse>().await?)
    }
}

impl AttendanceApi for NoWasmClient {
    async fn update_session_status(&self, params: &UpdateStatusParams) -> Result<ApiResponse> {
        self.post_json(UPDATE_STATUS_PATH, params).await
    }

    async fn add_student_to_course(&self, params: &AddStudentParams) -> Result<ApiResponse> {
        self.post_json(ADD_STUDENT_PATH, params).await
    }

    async fn mark_attendance(&self, params: &MarkAttendanceParams) -> Result<ApiResponse> {
        self.post_json(MARK_ATTENDANCE_PATH, params).await
    }
}
