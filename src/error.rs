// SPDX-License-Identifier: GPL-3.0-only
//! Error types for the application
//!
//! Driver-level failures are modelled as [`ProtocolError`] and never escape
//! the display directory: it logs them and reports a plain success flag.
//! Everything that can stop the process from starting is an [`AppError`].

use thiserror::Error;

/// Failure of a single native display call
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The output exposes no DDC/CI capable physical monitor
    #[error("DDC/CI is not supported on output {0}")]
    Unsupported(String),

    /// A DDC/CI query or write was rejected by the monitor
    #[error("DDC/CI {operation} failed: {reason}")]
    DdcCi {
        operation: &'static str,
        reason: String,
    },

    /// The WMI brightness classes are missing or the call failed
    #[error("WMI panel call failed: {0}")]
    Panel(String),

    /// Monitor metadata for an output could not be read
    #[error("Failed to query output {0}")]
    Output(String),
}

/// Why a hotkey binding could not be registered
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    /// The binding has no key; it is treated as absent and never registered
    #[error("No key bound")]
    NoKey,

    /// Another application already owns the combination
    #[error("{0} is already in use by another application")]
    Conflict(String),

    /// The OS rejected the call for another reason
    #[error("Hotkey registration failed: {0}")]
    Platform(String),

    /// Text that doesn't describe a key combination
    #[error("Invalid key combination '{0}'")]
    Parse(String),
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// The native drivers only exist on Windows
    #[error("LiteBright needs Windows display and input APIs; this platform is unsupported")]
    UnsupportedPlatform,

    /// A native pump thread (hotkey window, hotplug window, mouse hook) failed to start
    #[error("Failed to start {component}: {source}")]
    NativeStartup {
        component: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;
