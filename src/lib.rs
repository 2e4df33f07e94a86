pub mod app;
pub mod chart;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod geo;
pub mod interface;
#[cfg(feature = "no-wasm")]
pub mod logging;
pub mod model;

pub use config::ClientConfig;
pub use error::{Error, ErrorKind, Result};

#[cfg(feature = "no-wasm")]
pub use client::NoWasmClient;
#[cfg(feature = "wasm")]
pub use client::WasmClient;
