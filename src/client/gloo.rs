//! WASM HTTP client implementation using gloo_net
//!
//! Requests go through the browser's fetch API. The page's own session cookie
//! is sent along, so no explicit login is needed.

use crate::config::ClientConfig;
use crate::error::Result;
use gloo_net::http::Request;
use serde::Serialize;
use web_sys::RequestCredentials;

use super::{ADD_STUDENT_PATH, MARK_ATTENDANCE_PATH, UPDATE_STATUS_PATH};
use crate::interface::{AttendanceApi, HttpClient};
use crate::model::dtos::{AddStudentParams, MarkAttendanceParams, UpdateStatusParams};
use crate::model::structs::ApiResponse;

/// HTTP client for WASM environments using gloo_net
#[derive(Debug, Clone)]
pub struct WasmClient {
    config: ClientConfig,
}

impl HttpClient for WasmClient {
    async fn new(config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
        })
    }
}

impl WasmClient {
    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<ApiResponse> {
        let url = self.config.url(path);
        log::debug!("POST {url}");

        let resp = Request::post(&url)
            .credentials(RequestCredentials::SameOrigin)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .json(body)?
            .send()
            .await?;

        log::debug!("{url} answered {}", resp.status());

        Ok(resp.json::<ApiResponse>().await?)
    }
}

impl AttendanceApi for WasmClient {
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
