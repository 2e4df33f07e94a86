#![allow(async_fn_in_trait)] // the traits are implemented in-crate and by tests, never boxed

use crate::chart::ChartConfig;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::model::dtos::{AddStudentParams, MarkAttendanceParams, UpdateStatusParams};
use crate::model::structs::{ApiResponse, Position, PositionError};

/// Common trait for HTTP client functionality
pub trait HttpClient {
    /// Create a new HTTP client instance
    async fn new(config: &ClientConfig) -> Result<Self>
    where
        Self: Sized;
}

/// The backend's JSON endpoints.
///
/// A non-2xx status is not an error here: the body is still parsed and its
/// `success` flag decides the outcome. Only transport and decoding failures
/// come back as `Err`.
pub trait AttendanceApi {
    /// Change the status of a session
    async fn update_session_status(&self, params: &UpdateStatusParams) -> Result<ApiResponse>;

    /// Enroll a student in a course
    async fn add_student_to_course(&self, params: &AddStudentParams) -> Result<ApiResponse>;

    /// Record the caller's attendance for a session
    async fn mark_attendance(&self, params: &MarkAttendanceParams) -> Result<ApiResponse>;
}

/// User-facing side effects of an action.
pub trait Ui {
    /// Show a blocking notification
    fn alert(&self, message: &str);

    /// Refetch and re-render after a successful mutation
    fn refresh(&self);
}

/// Single-shot access to the device position.
pub trait Geolocator {
    fn is_supported(&self) -> bool;

    async fn current_position(&self) -> core::result::Result<Position, PositionError>;
}

/// Somewhere a chart can be drawn.
pub trait ChartSurface {
    type Canvas;

    /// Look up a drawing target by id. `None` when the page has no such element.
    fn find_canvas(&self, id: &str) -> Option<Self::Canvas>;

    fn draw(&self, canvas: Self::Canvas, config: &ChartConfig) -> Result<()>;
}
