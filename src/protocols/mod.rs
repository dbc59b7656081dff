// SPDX-License-Identifier: GPL-3.0-only
//! Display brightness control protocols
//!
//! This module contains the driver seams used by the display directory.
//! Each protocol implementation provides brightness control through a
//! different native mechanism:
//!
//! - [`OutputSource`] walks the active display outputs
//! - [`DdcChannel`] drives external monitors over DDC/CI, one native handle
//!   set per output
//! - [`PanelChannel`] drives the built-in laptop panel through the host
//!   management interface
//!
//! The Windows implementations live behind `cfg(windows)`; everything else in
//! the crate only sees these traits.

pub mod ddc_ci;
pub mod outputs;
pub mod panel;

use crate::error::ProtocolError;

/// Opaque token identifying one display output during an enumeration pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OutputToken(pub isize);

/// Metadata reported by the platform for one output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    pub token: OutputToken,
    /// GDI device name such as `\\.\DISPLAY1`
    pub device_name: String,
    pub is_primary: bool,
}

/// Minimum, current and maximum value of a VCP feature in device units
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRange {
    pub min: u32,
    pub current: u32,
    pub max: u32,
}

impl RawRange {
    pub const fn new(min: u32, current: u32, max: u32) -> Self {
        Self { min, current, max }
    }
}

/// A single native physical-monitor handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PhysicalHandle(pub isize);

/// The physical-monitor handles opened for one output
///
/// Not `Clone`: the set is moved into [`DdcChannel::close_handles`], so it can
/// only be released once.
#[derive(Debug, Default)]
pub struct HandleSet {
    handles: Vec<PhysicalHandle>,
    description: String,
}

impl HandleSet {
    pub fn new(handles: Vec<PhysicalHandle>, description: impl Into<String>) -> Self {
        Self {
            handles,
            description: description.into(),
        }
    }

    /// An empty set, returned when the output does not speak DDC/CI
    pub fn empty() -> Self {
        Self::default()
    }

    /// The handle used for control; the others are only kept for release
    pub fn primary(&self) -> Option<PhysicalHandle> {
        self.handles.first().copied()
    }

    /// Description of the first physical monitor
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn into_handles(self) -> Vec<PhysicalHandle> {
        self.handles
    }
}

/// Walks the active display outputs in platform order
pub trait OutputSource {
    /// Tokens for every active output
    fn outputs(&self) -> Vec<OutputToken>;

    /// Query device name and primary flag for one output
    fn describe(&self, output: OutputToken) -> Result<OutputInfo, ProtocolError>;
}

/// DDC/CI handle protocol for external monitors
pub trait DdcChannel {
    /// Open the physical monitors behind an output.
    ///
    /// An empty set means the protocol is unsupported on that output, it is
    /// not an error.
    fn open_handles(&self, output: OutputToken) -> HandleSet;

    fn read_brightness(&self, handle: PhysicalHandle) -> Result<RawRange, ProtocolError>;

    fn read_contrast(&self, handle: PhysicalHandle) -> Result<RawRange, ProtocolError>;

    /// Write a raw brightness value, already inside the monitor's range
    fn write_brightness(&self, handle: PhysicalHandle, raw: u32) -> Result<(), ProtocolError>;

    /// Write a raw contrast value, already inside the monitor's range
    fn write_contrast(&self, handle: PhysicalHandle, raw: u32) -> Result<(), ProtocolError>;

    /// Release every handle in the set. Must accept an empty set.
    fn close_handles(&self, handles: HandleSet);
}

/// Host management interface for the built-in panel
pub trait PanelChannel {
    /// Whether the platform exposes a managed internal panel at all
    fn is_available(&self) -> bool;

    /// Current brightness (0-100), `None` when the panel can't be read
    fn brightness(&self) -> Option<u32>;

    /// Set brightness (0-100).
    ///
    /// `timeout_secs` is the persistence timeout handed to the platform;
    /// see [`panel::DEFAULT_TIMEOUT_SECS`].
    fn set_brightness(&self, percent: u32, timeout_secs: u32) -> Result<(), ProtocolError>;
}

/// Decode a NUL-terminated UTF-16 buffer from a native struct
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn from_wide(buf: &[u16]) -> String {
    let end = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    String::from_utf16_lossy(&buf[..end])
}

#[cfg(test)]
pub(crate) mod fake;
