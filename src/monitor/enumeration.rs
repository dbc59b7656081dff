// SPDX-License-Identifier: GPL-3.0-only
//! Builds one entity per output
//!
//! Read failures never drop an output: a missing range falls back to a fixed
//! default and an output without DDC/CI becomes a placeholder.

use crate::error::ProtocolError;
use crate::protocols::{DdcChannel, OutputInfo, PanelChannel};

use super::backend::{Control, Level, Monitor};

/// Brightness reported when the panel can't be read
const PANEL_FALLBACK_BRIGHTNESS: u32 = 100;
/// The panel channel has no contrast; this is shown but never written
const PANEL_CONTRAST: u32 = 50;

const DDC_FALLBACK_BRIGHTNESS: Level = Level::new(0, 75, 100);
const DDC_FALLBACK_CONTRAST: Level = Level::new(0, 50, 100);

const PLACEHOLDER_BRIGHTNESS: u32 = 100;
const PLACEHOLDER_CONTRAST: u32 = 50;

/// Build the entity for one described output
///
/// # Arguments
///
/// * `index` - Position in this enumeration pass
/// * `info` - Output metadata
/// * `panel_available` - Result of this refresh's single panel probe
pub(super) fn build_monitor(
    index: usize,
    info: OutputInfo,
    panel_available: bool,
    panel: &dyn PanelChannel,
    ddc: &dyn DdcChannel,
) -> Monitor {
    if info.is_primary && panel_available {
        return internal_monitor(index, info, panel);
    }

    let handles = ddc.open_handles(info.token);
    let Some(handle) = handles.primary() else {
        return placeholder_monitor(index, info);
    };

    let brightness = ddc
        .read_brightness(handle)
        .map(Level::from)
        .unwrap_or_else(|err| {
            debug!("{} on {}, using default range", err, info.device_name);
            DDC_FALLBACK_BRIGHTNESS
        });
    let contrast = ddc
        .read_contrast(handle)
        .map(Level::from)
        .unwrap_or_else(|err| {
            debug!("{} on {}, using default range", err, info.device_name);
            DDC_FALLBACK_CONTRAST
        });

    let name = format!("{} ({})", handles.description(), info.device_name);
    info!(
        "DDC/CI display {}: brightness {}..={} at {}, {} handle(s)",
        name,
        brightness.min,
        brightness.max,
        brightness.current,
        handles.len()
    );

    Monitor {
        index,
        name,
        device_name: info.device_name,
        brightness,
        contrast,
        control: Control::Ddc { handles },
    }
}

fn internal_monitor(index: usize, info: OutputInfo, panel: &dyn PanelChannel) -> Monitor {
    let brightness = panel.brightness().unwrap_or_else(|| {
        debug!("Built-in panel brightness unreadable, assuming {}%", PANEL_FALLBACK_BRIGHTNESS);
        PANEL_FALLBACK_BRIGHTNESS
    });
    info!("Built-in panel on {} at {}%", info.device_name, brightness);

    Monitor {
        index,
        name: format!("Built-in Display ({})", info.device_name),
        device_name: info.device_name,
        brightness: Level::percent_scale(brightness),
        contrast: Level::percent_scale(PANEL_CONTRAST),
        control: Control::Panel,
    }
}

fn placeholder_monitor(index: usize, info: OutputInfo) -> Monitor {
    warn!(
        "{}, listing it without control",
        ProtocolError::Unsupported(info.device_name.clone())
    );

    Monitor {
        index,
        name: format!("Monitor {} ({}) [DDC/CI N/A]", index + 1, info.device_name),
        device_name: info.device_name,
        brightness: Level::percent_scale(PLACEHOLDER_BRIGHTNESS),
        contrast: Level::percent_scale(PLACEHOLDER_CONTRAST),
        control: Control::Placeholder,
    }
}
