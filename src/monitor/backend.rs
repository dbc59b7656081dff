// SPDX-License-Identifier: GPL-3.0-only
//! Device entity model
//!
//! One [`Monitor`] exists per enumerated output. Which driver owns it is
//! decided once at creation and encoded in [`Control`]; the directory
//! dispatches on that tag for every read and write.

use crate::protocols::{HandleSet, RawRange};

/// A value together with the range it lives in, in device units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Level {
    pub current: u32,
    pub min: u32,
    pub max: u32,
}

impl Level {
    pub const fn new(min: u32, current: u32, max: u32) -> Self {
        Self { current, min, max }
    }

    /// The fixed 0-100 scale used by the built-in panel and placeholders
    pub const fn percent_scale(current: u32) -> Self {
        Self::new(0, current, 100)
    }

    /// Normalized percentage of `current`.
    ///
    /// A degenerate range (`max == min`) is treated as if the value already
    /// were a percentage and returned unchanged. The DDC/CI conversion in
    /// [`crate::protocols::ddc_ci::raw_to_percent`] reports 100% instead.
    pub fn percent(&self) -> u32 {
        if self.max == self.min {
            return self.current;
        }
        let span = f64::from(self.max) - f64::from(self.min);
        let percent = (f64::from(self.current) - f64::from(self.min)) * 100.0 / span;
        percent.round().max(0.0) as u32
    }
}

impl From<RawRange> for Level {
    fn from(range: RawRange) -> Self {
        Self::new(range.min, range.current, range.max)
    }
}

/// Which driver owns an entity
#[derive(Debug)]
pub enum Control {
    /// Built-in panel, driven through the panel channel. Holds no handle.
    Panel,
    /// External monitor with open DDC/CI handles
    Ddc { handles: HandleSet },
    /// Detected output that can't be controlled
    Placeholder,
}

/// One display output as seen by the directory
#[derive(Debug)]
pub struct Monitor {
    pub(super) index: usize,
    pub(super) name: String,
    pub(super) device_name: String,
    pub(super) brightness: Level,
    pub(super) contrast: Level,
    pub(super) control: Control,
}

impl Monitor {
    /// Position in the current enumeration pass
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name without the trailing ` (<device>)` part
    pub fn short_name(&self) -> &str {
        match self.name.rfind(" (") {
            Some(end) if end > 0 => &self.name[..end],
            _ => &self.name,
        }
    }

    /// GDI device path, e.g. `\\.\DISPLAY1`
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn is_internal(&self) -> bool {
        matches!(self.control, Control::Panel)
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.control, Control::Placeholder)
    }

    /// Contrast is only reachable over DDC/CI
    pub fn supports_contrast(&self) -> bool {
        matches!(self.control, Control::Ddc { .. })
    }

    pub fn brightness(&self) -> Level {
        self.brightness
    }

    pub fn contrast(&self) -> Level {
        self.contrast
    }

    pub fn brightness_percent(&self) -> u32 {
        self.brightness.percent()
    }

    pub fn contrast_percent(&self) -> u32 {
        self.contrast.percent()
    }

    /// Number of native handles this entity owns
    pub fn handle_count(&self) -> usize {
        match &self.control {
            Control::Ddc { handles } => handles.len(),
            Control::Panel | Control::Placeholder => 0,
        }
    }

    /// Give up ownership of the native handles, leaving a placeholder behind
    pub(super) fn take_handles(&mut self) -> Option<HandleSet> {
        match std::mem::replace(&mut self.control, Control::Placeholder) {
            Control::Ddc { handles } => Some(handles),
            other => {
                self.control = other;
                None
            }
        }
    }
}
