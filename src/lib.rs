// SPDX-License-Identifier: GPL-3.0-only
//! Brightness and contrast control for built-in panels and DDC/CI monitors
//!
//! The [`monitor::DisplayDirectory`] owns one entity per connected output and
//! routes writes to the WMI panel channel or DDC/CI. Global hotkeys, the tray
//! wheel filter and the display-change window run on their own native threads
//! and post [`app::AppEvent`]s to the [`app::App`] that owns everything else.

#[macro_use]
extern crate tracing;

pub mod app;
pub mod config;
pub mod error;
pub mod hotkeys;
pub mod hotplug;
pub mod monitor;
#[cfg(windows)]
mod native_window;
pub mod protocols;
pub mod scroll;
