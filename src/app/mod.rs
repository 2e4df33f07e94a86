//! Application module - user-facing actions
//!
//! The actions are platform independent; each platform supplies its own
//! `Ui`, `Geolocator` and `ChartSurface`.

pub mod actions;
pub use actions::*;

// Platform-specific modules
#[cfg(feature = "no-wasm")]
pub mod terminal;

#[cfg(feature = "wasm")]
pub mod gloo;
