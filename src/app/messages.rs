// SPDX-License-Identifier: GPL-3.0-only
use std::fmt;

use crate::error::HotkeyError;
use crate::hotkeys::HotkeyAction;
use crate::scroll::Direction;

/// Input for the owning thread, posted by native threads and signal handlers
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppEvent {
    /// `WM_HOTKEY` with its registration id
    Hotkey(i32),
    /// Display topology changed; refresh after debouncing
    DisplaysChanged,
    /// Wheel notch over the tray icon
    Scroll(Direction),
    Shutdown,
}

/// What caused a brightness change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepSource {
    Hotkey,
    Scroll,
}

/// Feedback for the UI collaborator
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notification {
    BrightnessChanged {
        index: usize,
        /// Display name without the device path
        name: String,
        percent: u32,
        source: StepSource,
    },
    MonitorsChanged {
        count: usize,
    },
    HotkeyFailed {
        action: HotkeyAction,
        reason: HotkeyError,
    },
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notification::BrightnessChanged { name, percent, .. } => {
                write!(f, "LiteBright ({}): {}%", name, percent)
            }
            Notification::MonitorsChanged { count } => write!(f, "{} display(s) connected", count),
            Notification::HotkeyFailed { action, reason } => {
                write!(f, "Hotkey for {} unavailable: {}", action, reason)
            }
        }
    }
}
