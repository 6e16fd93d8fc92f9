//! jsdbg Bridge Core
//!
//! A reusable async library for driving the remote JavaScript debugger (`/jsdbg/v1`)
//! over HTTP with Basic authentication. Provides structured config, error handling,
//! one high-level operation per remote endpoint, and the [`DebugRuntime`] seam that a
//! debug session drives.

pub mod config;
pub mod error;
pub mod client;
pub mod ops;
pub mod runtime;
pub mod types;

// Re-export commonly used types
pub use config::{ConnectionOverrides, JsdbgConfig};
pub use error::{JsdbgError, RemoteError};
pub use client::JsdbgClient;
pub use runtime::{ControlCommand, DebugRuntime};

/// Result type alias using JsdbgError
pub type Result<T> = std::result::Result<T, JsdbgError>;
