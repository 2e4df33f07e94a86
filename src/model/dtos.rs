use serde::Serialize;

use super::structs::{EntityId, Position, SessionStatus};

/// Body of `POST /api/session/update-status`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpdateStatusParams {
    pub session_id: EntityId,
    pub status: SessionStatus,
}

/// Body of `POST /api/course/add-student`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddStudentParams {
    pub course_id: EntityId,
    pub student_id: EntityId,
}

/// Body of `POST /api/attendance/mark`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkAttendanceParams {
    pub session_id: EntityId,
    pub latitude: f64,
    pub longitude: f64,
}

impl MarkAttendanceParams {
    pub fn new(session_id: EntityId, position: &Position) -> Self {
        Self {
            session_id,
            latitude: position.latitude,
            longitude: position.longitude,
        }
    }
}

/// Form fields of `POST /login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginParams {
    pub username: String,
    pub password: String,
}
