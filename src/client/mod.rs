//! Client module - HTTP access to the attendance backend
//!
//! The same `AttendanceApi` is implemented twice: with reqwest for native
//! builds and with gloo_net (the browser fetch API) for WASM builds.

#[cfg(feature = "no-wasm")]
pub mod request;
#[cfg(feature = "no-wasm")]
pub use request::NoWasmClient;

#[cfg(feature = "wasm")]
pub mod gloo;
#[cfg(feature = "wasm")]
pub use gloo::WasmClient;

pub const UPDATE_STATUS_PATH: &str = "/api/session/update-status";
pub const ADD_STUDENT_PATH: &str = "/api/course/add-student";
pub const MARK_ATTENDANCE_PATH: &str = "/api/attendance/mark";
pub const LOGIN_PATH: &str = "/login";
pub const LOGOUT_PATH: &str = "/logout";
