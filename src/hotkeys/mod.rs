// SPDX-License-Identifier: GPL-3.0-only
//! Global hotkeys
//!
//! - [`binding`]: actions, key combinations and their settings-file form
//! - [`registrar`]: the registration table and the backend seam
//! - `win32`: the `RegisterHotKey` backend (Windows only)

pub mod binding;
mod keys;
pub mod registrar;
#[cfg(windows)]
mod win32;

pub use binding::{HotkeyAction, HotkeyBinding, KeyCombo, Modifiers};
pub use keys::KeyCode;
pub use registrar::{ApplyReport, HotkeyBackend, HotkeyRegistrar};
#[cfg(windows)]
pub use win32::Win32HotkeyBackend;
