//! UI actions against the attendance backend.
//!
//! Each action sends one request, tells the user what happened through
//! [`Ui::alert`], and returns an [`Outcome`]. Refreshing the view after a
//! successful mutation is left to the caller via [`Outcome::apply`].

use futures::future::join_all;

use crate::error::Result;
use crate::interface::{AttendanceApi, Geolocator, Ui};
use crate::model::dtos::{AddStudentParams, MarkAttendanceParams, UpdateStatusParams};
use crate::model::structs::{ApiResponse, EntityId, PositionError, SessionStatus};

pub const GENERIC_ERROR: &str = "An error occurred";
pub const SESSION_STATUS_FAILED: &str = "Failed to update session status";
pub const ADD_STUDENT_FAILED: &str = "Failed to add student";
pub const ATTENDANCE_FAILED: &str = "Failed to mark attendance";
pub const ATTENDANCE_MARKED: &str = "Attendance marked successfully!";
pub const GEOLOCATION_UNSUPPORTED: &str = "Geolocation is not supported by your browser";
pub const ENABLE_LOCATION: &str = "Please enable location services to mark attendance";

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The backend accepted the change; the view should be refetched.
    Refresh,
    /// The backend answered `success: false`.
    Rejected { message: Option<String> },
    /// The request never produced a usable answer.
    Failed,
    GeolocationUnsupported,
    LocationDenied(PositionError),
}

impl Outcome {
    pub fn is_refresh(&self) -> bool {
        matches!(self, Outcome::Refresh)
    }

    /// Carry out the follow-up the outcome asks for.
    pub fn apply<U: Ui>(&self, ui: &U) {
        if self.is_refresh() {
            ui.refresh();
        }
    }
}

pub async fn update_session_status<A: AttendanceApi, U: Ui>(
    api: &A,
    ui: &U,
    session_id: EntityId,
    status: SessionStatus,
) -> Outcome {
    let params = UpdateStatusParams { session_id, status };
    let result = api.update_session_status(&params).await;
    settle(ui, result, SESSION_STATUS_FAILED)
}

pub async fn add_student_to_course<A: AttendanceApi, U: Ui>(
    api: &A,
    ui: &U,
    course_id: EntityId,
    student_id: EntityId,
) -> Outcome {
    let params = AddStudentParams {
        course_id,
        student_id,
    };
    let result = api.add_student_to_course(&params).await;
    settle(ui, result, ADD_STUDENT_FAILED)
}

/// Enroll several students at once. Requests run concurrently; no alerts are shown.
pub async fn enroll_students<A: AttendanceApi>(
    api: &A,
    course_id: &EntityId,
    student_ids: &[EntityId],
) -> Vec<(EntityId, Result<ApiResponse>)> {
    let tasks = student_ids.iter().map(|student_id| {
        let params = AddStudentParams {
            course_id: course_id.clone(),
            student_id: student_id.clone(),
        };
        async move {
            let result = api.add_student_to_course(&params).await;
            (params.student_id, result)
        }
    });

    join_all(tasks).await
}

pub async fn mark_attendance<A: AttendanceApi, U: Ui, G: Geolocator>(
    api: &A,
    ui: &U,
    geolocator: &G,
    session_id: EntityId,
) -> Outcome {
    if !geolocator.is_supported() {
        ui.alert(GEOLOCATION_UNSUPPORTED);
        return Outcome::GeolocationUnsupported;
    }

    let position = match geolocator.current_position().await {
        Ok(position) => position,
        Err(e) => {
            ui.alert(ENABLE_LOCATION);
            log::error!("Geolocation error: {e}");
            return Outcome::LocationDenied(e);
        }
    };

    let params = MarkAttendanceParams::new(session_id, &position);
    match api.mark_attendance(&params).await {
        Ok(resp) if resp.success => {
            ui.alert(ATTENDANCE_MARKED);
            Outcome::Refresh
        }
        Ok(resp) => {
            ui.alert(&attendance_failure(resp.message.as_deref()));
            Outcome::Rejected {
                message: resp.message,
            }
        }
        Err(e) => transport_failure(ui, &e),
    }
}

/// The fixed failure text, followed by the server's explanation when it sent one.
pub fn attendance_failure(server_message: Option<&str>) -> String {
    match server_message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(detail) => format!("{ATTENDANCE_FAILED}: {detail}"),
        None => ATTENDANCE_FAILED.to_string(),
    }
}

fn settle<U: Ui>(ui: &U, result: Result<ApiResponse>, failure: &str) -> Outcome {
    match result {
        Ok(resp) if resp.success => Outcome::Refresh,
        Ok(resp) => {
            if let Some(message) = &resp.message {
                log::warn!("{failure}: {message}");
            }
            ui.alert(failure);
            Outcome::Rejected {
                message: resp.message,
            }
        }
        Err(e) => transport_failure(ui, &e),
    }
}

fn transport_failure<U: Ui>(ui: &U, e: &crate::error::Error) -> Outcome {
    log::error!("Error: {e}");
    ui.alert(GENERIC_ERROR);
    Outcome::Failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::structs::Position;
    use serde_json::{json, Value};
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct RecordingUi {
        alerts: RefCell<Vec<String>>,
        refreshes: Cell<u32>,
    }

    impl Ui for RecordingUi {
        fn alert(&self, message: &str) {
            self.alerts.borrow_mut().push(message.to_string());
        }

        fn refresh(&self) {
            self.refreshes.set(self.refreshes.get() + 1);
        }
    }

    #[derive(Clone, Copy)]
    enum Reply {
        Success,
        Failure(Option<&'static str>),
        Transport,
    }

    struct FakeApi {
        reply: Reply,
        calls: RefCell<Vec<(&'static str, Value)>>,
    }

    impl FakeApi {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: RefCell::new(Vec::new()),
            }
        }

        fn answer(&self, endpoint: &'static str, body: Value) -> Result<ApiResponse> {
            self.calls.borrow_mut().push((endpoint, body));
            match self.reply {
                Reply::Success => Ok(ApiResponse {
                    success: true,
                    message: None,
                }),
                Reply::Failure(message) => Ok(ApiResponse {
                    success: false,
                    message: message.map(str::to_string),
                }),
                Reply::Transport => {
                    Err(ErrorKind::ParseError("connection refused".to_string()).into())
                }
            }
        }
    }

    impl AttendanceApi for FakeApi {
        async fn update_session_status(&self, params: &UpdateStatusParams) -> Result<ApiResponse> {
            self.answer("status", serde_json::to_value(params).unwrap())
        }

        async fn add_student_to_course(&self, params: &AddStudentParams) -> Result<ApiResponse> {
            self.answer("add-student", serde_json::to_value(params).unwrap())
        }

        async fn mark_attendance(&self, params: &MarkAttendanceParams) -> Result<ApiResponse> {
            self.answer("mark", serde_json::to_value(params).unwrap())
        }
    }

    struct FakeGeolocator {
        supported: bool,
        fix: core::result::Result<Position, PositionError>,
        asked: Cell<u32>,
    }

    impl FakeGeolocator {
        fn at(latitude: f64, longitude: f64) -> Self {
            Self {
                supported: true,
                fix: Ok(Position::new(latitude, longitude)),
                asked: Cell::new(0),
            }
        }
    }

    impl Geolocator for FakeGeolocator {
        fn is_supported(&self) -> bool {
            self.supported
        }

        async fn current_position(&self) -> core::result::Result<Position, PositionError> {
            self.asked.set(self.asked.get() + 1);
            self.fix.clone()
        }
    }

    #[tokio::test]
    async fn status_success_refreshes_without_alert() {
        let api = FakeApi::new(Reply::Success);
        let ui = RecordingUi::default();

        let outcome =
            update_session_status(&api, &ui, EntityId::Number(4), SessionStatus::Active).await;
        outcome.apply(&ui);

        assert_eq!(outcome, Outcome::Refresh);
        assert_eq!(ui.refreshes.get(), 1);
        assert!(ui.alerts.borrow().is_empty());
        assert_eq!(
            api.calls.borrow()[0],
            ("status", json!({"session_id": 4, "status": "active"}))
        );
    }

    #[tokio::test]
    async fn status_rejection_alerts_fixed_message_only() {
        let api = FakeApi::new(Reply::Failure(Some("no such session")));
        let ui = RecordingUi::default();

        let outcome = update_session_status(&api, &ui, "S9".into(), SessionStatus::Past).await;
        outcome.apply(&ui);

        assert_eq!(*ui.alerts.borrow(), vec![SESSION_STATUS_FAILED.to_string()]);
        assert_eq!(ui.refreshes.get(), 0);
        assert_eq!(
            outcome,
            Outcome::Rejected {
                message: Some("no such session".to_string())
            }
        );
    }

    #[tokio::test]
    async fn add_student_outcomes() {
        let ui = RecordingUi::default();
        let api = FakeApi::new(Reply::Failure(Some("Student already in course")));
        let outcome = add_student_to_course(&api, &ui, EntityId::Number(1), EntityId::Number(2)).await;
        assert!(matches!(outcome, Outcome::Rejected { .. }));
        assert_eq!(*ui.alerts.borrow(), vec![ADD_STUDENT_FAILED.to_string()]);
        assert_eq!(
            api.calls.borrow()[0].1,
            json!({"course_id": 1, "student_id": 2})
        );

        let ui = RecordingUi::default();
        let api = FakeApi::new(Reply::Success);
        let outcome = add_student_to_course(&api, &ui, EntityId::Number(1), EntityId::Number(2)).await;
        assert!(outcome.is_refresh());
        assert!(ui.alerts.borrow().is_empty());
    }

    #[tokio::test]
    async fn transport_error_shows_generic_alert() {
        let api = FakeApi::new(Reply::Transport);
        let ui = RecordingUi::default();

        let outcome = add_student_to_course(&api, &ui, EntityId::Number(1), EntityId::Number(2)).await;
        outcome.apply(&ui);

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(*ui.alerts.borrow(), vec![GENERIC_ERROR.to_string()]);
        assert_eq!(ui.refreshes.get(), 0);
    }

    #[tokio::test]
    async fn status_transport_error_shows_generic_alert() {
        let api = FakeApi::new(Reply::Transport);
        let ui = RecordingUi::default();

        let outcome =
            update_session_status(&api, &ui, EntityId::Number(4), SessionStatus::Active).await;
        outcome.apply(&ui);

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(*ui.alerts.borrow(), vec![GENERIC_ERROR.to_string()]);
        assert_eq!(ui.refreshes.get(), 0);
    }

    #[tokio::test]
    async fn mark_attendance_transport_error_shows_generic_alert() {
        let api = FakeApi::new(Reply::Transport);
        let ui = RecordingUi::default();
        let geo = FakeGeolocator::at(1.0, 2.0);

        let outcome = mark_attendance(&api, &ui, &geo, "S1".into()).await;
        outcome.apply(&ui);

        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(*ui.alerts.borrow(), vec![GENERIC_ERROR.to_string()]);
        assert_eq!(ui.refreshes.get(), 0);
        assert_eq!(api.calls.borrow().len(), 1);
    }

    #[tokio::test]
    async fn mark_attendance_sends_coordinates() {
        let api = FakeApi::new(Reply::Success);
        let ui = RecordingUi::default();
        let geo = FakeGeolocator::at(37.7749, -122.4194);

        let outcome = mark_attendance(&api, &ui, &geo, "S1".into()).await;
        outcome.apply(&ui);

        assert_eq!(outcome, Outcome::Refresh);
        assert_eq!(
            api.calls.borrow()[0],
            (
                "mark",
                json!({"session_id": "S1", "latitude": 37.7749, "longitude": -122.4194})
            )
        );
        assert_eq!(*ui.alerts.borrow(), vec![ATTENDANCE_MARKED.to_string()]);
        assert_eq!(ui.refreshes.get(), 1);
    }

    #[tokio::test]
    async fn mark_attendance_rejection_is_one_combined_alert() {
        let api = FakeApi::new(Reply::Failure(Some("Already marked")));
        let ui = RecordingUi::default();
        let geo = FakeGeolocator::at(1.0, 2.0);

        mark_attendance(&api, &ui, &geo, EntityId::Number(7)).await.apply(&ui);

        let alerts = ui.alerts.borrow();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].starts_with(ATTENDANCE_FAILED));
        assert!(alerts[0].ends_with("Already marked"));
        assert_eq!(ui.refreshes.get(), 0);
    }

    #[tokio::test]
    async fn unsupported_geolocation_makes_no_request() {
        let api = FakeApi::new(Reply::Success);
        let ui = RecordingUi::default();
        let geo = FakeGeolocator {
            supported: false,
            ..FakeGeolocator::at(0.0, 0.0)
        };

        let outcome = mark_attendance(&api, &ui, &geo, EntityId::Number(1)).await;

        assert_eq!(outcome, Outcome::GeolocationUnsupported);
        assert_eq!(*ui.alerts.borrow(), vec![GEOLOCATION_UNSUPPORTED.to_string()]);
        assert!(api.calls.borrow().is_empty());
        assert_eq!(geo.asked.get(), 0);
    }

    #[tokio::test]
    async fn denied_location_makes_no_request() {
        let api = FakeApi::new(Reply::Success);
        let ui = RecordingUi::default();
        let geo = FakeGeolocator {
            fix: Err(PositionError::PermissionDenied),
            ..FakeGeolocator::at(0.0, 0.0)
        };

        let outcome = mark_attendance(&api, &ui, &geo, EntityId::Number(1)).await;

        assert_eq!(outcome, Outcome::LocationDenied(PositionError::PermissionDenied));
        assert_eq!(*ui.alerts.borrow(), vec![ENABLE_LOCATION.to_string()]);
        assert!(api.calls.borrow().is_empty());
    }

    #[tokio::test]
    async fn batch_enrollment_keeps_order() {
        let api = FakeApi::new(Reply::Success);
        let students: Vec<EntityId> = vec![EntityId::Number(10), EntityId::Number(11), EntityId::Number(12)];

        let results = enroll_students(&api, &EntityId::Number(3), &students).await;

        let ids: Vec<_> = results.iter().map(|(id, _)| id.clone()).collect();
        assert_eq!(ids, students);
        assert!(results.iter().all(|(_, r)| r.as_ref().is_ok_and(|r| r.success)));
        assert_eq!(api.calls.borrow().len(), 3);
    }

    #[test]
    fn attendance_failure_text() {
        assert_eq!(attendance_failure(None), ATTENDANCE_FAILED);
        assert_eq!(attendance_failure(Some("  ")), ATTENDANCE_FAILED);
        assert_eq!(
            attendance_failure(Some("Too far from session")),
            "Failed to mark attendance: Too far from session"
        );
    }
}
