// SPDX-License-Identifier: GPL-3.0-only
//! Display directory
//!
//! The directory owns every [`Monitor`] and every native handle behind them.
//! Callers address monitors by enumeration index and get plain success flags
//! back; driver errors are logged here and never propagate further.
//!
//! # Handle lifecycle
//!
//! [`DisplayDirectory::refresh`] releases all handles of the previous pass
//! before it opens new ones, so repeated hotplug refreshes never accumulate
//! handles. [`DisplayDirectory::dispose`] (and `Drop`) release the rest.
//!
//! # Threading
//!
//! Not `Sync` and not meant to be shared: the application controller owns it
//! on a single thread and serializes refreshes with writes by construction.

use crate::protocols::ddc_ci::percent_to_raw;
use crate::protocols::panel::DEFAULT_TIMEOUT_SECS;
use crate::protocols::{DdcChannel, OutputSource, PanelChannel};

use super::backend::{Control, Monitor};
use super::enumeration::build_monitor;

/// Directory of all connected displays
pub struct DisplayDirectory {
    outputs: Box<dyn OutputSource>,
    panel: Box<dyn PanelChannel>,
    ddc: Box<dyn DdcChannel>,
    monitors: Vec<Monitor>,
}

impl DisplayDirectory {
    /// Create an empty directory; call [`Self::refresh`] to populate it
    pub fn new(
        outputs: Box<dyn OutputSource>,
        panel: Box<dyn PanelChannel>,
        ddc: Box<dyn DdcChannel>,
    ) -> Self {
        Self {
            outputs,
            panel,
            ddc,
            monitors: Vec::new(),
        }
    }

    /// Directory wired to the Windows drivers
    #[cfg(windows)]
    pub fn native() -> Self {
        use crate::protocols::{ddc_ci::Dxva2Channel, outputs::GdiOutputs, panel::WmiPanel};

        Self::new(
            Box::new(GdiOutputs::new()),
            Box::new(WmiPanel::new()),
            Box::new(Dxva2Channel::new()),
        )
    }

    /// Monitors of the last refresh, in enumeration order
    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn monitor(&self, index: usize) -> Option<&Monitor> {
        self.monitors.get(index)
    }

    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }

    /// Re-enumerate every output
    ///
    /// Handles of the previous pass are released first. An output whose
    /// metadata can't be read is skipped and does not consume an index. The
    /// panel availability probe runs once per call.
    pub fn refresh(&mut self) {
        self.release_handles();

        let panel_available = self.panel.is_available();
        let mut monitors = Vec::new();

        for token in self.outputs.outputs() {
            let info = match self.outputs.describe(token) {
                Ok(info) => info,
                Err(err) => {
                    warn!("Skipping output: {}", err);
                    continue;
                }
            };
            let index = monitors.len();
            monitors.push(build_monitor(
                index,
                info,
                panel_available,
                self.panel.as_ref(),
                self.ddc.as_ref(),
            ));
        }

        let internal = monitors.iter().filter(|m| m.is_internal()).count();
        let placeholders = monitors.iter().filter(|m| m.is_placeholder()).count();
        info!(
            "Enumerated {} display(s): {} internal, {} DDC/CI, {} without control",
            monitors.len(),
            internal,
            monitors.len() - internal - placeholders,
            placeholders
        );

        self.monitors = monitors;
    }

    /// Set brightness of one monitor
    ///
    /// # Arguments
    ///
    /// * `index` - Monitor index from the last refresh
    /// * `percent` - Target percentage, clamped to 0-100
    ///
    /// # Returns
    ///
    /// `true` when the driver accepted the value. On failure the cached
    /// level is left untouched.
    pub fn set_brightness(&mut self, index: usize, percent: i32) -> bool {
        let Some(monitor) = self.monitors.get_mut(index) else {
            debug!("set_brightness: no monitor at index {}", index);
            return false;
        };
        let percent = percent.clamp(0, 100);

        match &monitor.control {
            Control::Panel => match self.panel.set_brightness(percent as u32, DEFAULT_TIMEOUT_SECS) {
                Ok(()) => {
                    monitor.brightness.current = percent as u32;
                    true
                }
                Err(err) => {
                    warn!("{}: {}", monitor.name, err);
                    false
                }
            },
            Control::Ddc { handles } => {
                let Some(handle) = handles.primary() else {
                    return false;
                };
                let raw = percent_to_raw(percent, monitor.brightness.min, monitor.brightness.max);
                match self.ddc.write_brightness(handle, raw) {
                    Ok(()) => {
                        monitor.brightness.current = raw;
                        true
                    }
                    Err(err) => {
                        warn!("{}: {}", monitor.name, err);
                        false
                    }
                }
            }
            Control::Placeholder => false,
        }
    }

    /// Set contrast of one monitor. Only DDC/CI monitors have contrast.
    pub fn set_contrast(&mut self, index: usize, percent: i32) -> bool {
        let Some(monitor) = self.monitors.get_mut(index) else {
            return false;
        };
        let percent = percent.clamp(0, 100);

        let Control::Ddc { handles } = &monitor.control else {
            return false;
        };
        let Some(handle) = handles.primary() else {
            return false;
        };
        let raw = percent_to_raw(percent, monitor.contrast.min, monitor.contrast.max);
        match self.ddc.write_contrast(handle, raw) {
            Ok(()) => {
                monitor.contrast.current = raw;
                true
            }
            Err(err) => {
                warn!("{}: {}", monitor.name, err);
                false
            }
        }
    }

    /// Move brightness by `delta` percent from the cached state
    ///
    /// No device query happens; rapid repeated steps build on the last value
    /// the directory knows about.
    pub fn step_brightness(&mut self, index: usize, delta: i32) -> bool {
        let Some(monitor) = self.monitors.get(index) else {
            return false;
        };
        let current = match monitor.control {
            Control::Panel => monitor.brightness.current,
            Control::Ddc { .. } | Control::Placeholder => monitor.brightness_percent(),
        };
        self.set_brightness(index, current as i32 + delta)
    }

    /// Release every native handle and forget all monitors
    pub fn dispose(&mut self) {
        self.release_handles();
    }

    fn release_handles(&mut self) {
        let mut released = 0;
        for mut monitor in self.monitors.drain(..) {
            if let Some(handles) = monitor.take_handles() {
                released += handles.len();
                self.ddc.close_handles(handles);
            }
        }
        if released > 0 {
            debug!("Released {} physical monitor handle(s)", released);
        }
    }
}

impl Drop for DisplayDirectory {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::fake::{FakeDdc, FakeMonitor, FakeOutputs, FakePanel};
    use crate::protocols::RawRange;

    struct Rig {
        outputs: FakeOutputs,
        panel: FakePanel,
        ddc: FakeDdc,
        directory: DisplayDirectory,
    }

    /// Laptop panel at 80% on the primary output plus one 0-255 external at 128
    fn laptop_with_external() -> Rig {
        let outputs = FakeOutputs::new();
        outputs.push(1, r"\\.\DISPLAY1", true).push(2, r"\\.\DISPLAY2", false);
        let panel = FakePanel::available(Some(80));
        let ddc = FakeDdc::new();
        ddc.attach(2, FakeMonitor::new("LG ULTRAGEAR", RawRange::new(0, 128, 255)));
        rig(outputs, panel, ddc)
    }

    fn rig(outputs: FakeOutputs, panel: FakePanel, ddc: FakeDdc) -> Rig {
        let mut directory = DisplayDirectory::new(
            Box::new(outputs.clone()),
            Box::new(panel.clone()),
            Box::new(ddc.clone()),
        );
        directory.refresh();
        Rig {
            outputs,
            panel,
            ddc,
            directory,
        }
    }

    #[test]
    fn test_refresh_classifies_and_normalizes() {
        let r = laptop_with_external();
        let monitors = r.directory.monitors();

        assert_eq!(monitors.len(), 2);
        assert!(monitors[0].is_internal());
        assert_eq!(monitors[0].brightness_percent(), 80);
        assert!(!monitors[1].is_internal());
        assert_eq!(monitors[1].brightness_percent(), 50);
        assert_eq!(monitors[1].index(), 1);
    }

    #[test]
    fn test_step_external_writes_raw_and_updates_cache() {
        let mut r = laptop_with_external();

        assert!(r.directory.step_brightness(1, 10));

        let writes = r.ddc.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, "SetMonitorBrightness");
        assert_eq!(writes[0].2, 153);
        let m = r.directory.monitor(1).unwrap();
        assert_eq!(m.brightness().current, 153);
        assert_eq!(m.brightness_percent(), 60);
    }

    #[test]
    fn test_step_up_then_down_returns_to_start() {
        let mut r = laptop_with_external();
        for index in 0..2 {
            let before = r.directory.monitor(index).unwrap().brightness_percent();
            assert!(r.directory.step_brightness(index, 10));
            assert!(r.directory.step_brightness(index, -10));
            let after = r.directory.monitor(index).unwrap().brightness_percent();
            assert!(before.abs_diff(after) <= 1, "{before} -> {after}");
        }
    }

    #[test]
    fn test_internal_set_goes_to_panel_with_timeout() {
        let mut r = laptop_with_external();

        assert!(r.directory.set_brightness(0, 130));

        assert_eq!(r.panel.state.borrow().writes, vec![(100, DEFAULT_TIMEOUT_SECS)]);
        assert_eq!(r.directory.monitor(0).unwrap().brightness_percent(), 100);
        assert!(r.ddc.writes().is_empty());
    }

    #[test]
    fn test_internal_contrast_is_unsupported() {
        let mut r = laptop_with_external();
        assert!(!r.directory.set_contrast(0, 40));
        assert_eq!(r.directory.monitor(0).unwrap().contrast().current, 50);
    }

    #[test]
    fn test_external_contrast() {
        let mut r = laptop_with_external();
        assert!(r.directory.set_contrast(1, 70));
        assert_eq!(r.directory.monitor(1).unwrap().contrast_percent(), 70);
        assert_eq!(r.ddc.writes()[0].0, "SetMonitorContrast");
    }

    #[test]
    fn test_placeholder_rejects_writes_without_mutation() {
        let outputs = FakeOutputs::new();
        outputs.push(1, r"\\.\DISPLAY1", true);
        let mut r = rig(outputs, FakePanel::absent(), FakeDdc::new());

        let before = r.directory.monitor(0).unwrap().brightness();
        assert!(r.directory.monitor(0).unwrap().is_placeholder());
        assert!(!r.directory.set_brightness(0, 20));
        assert!(!r.directory.step_brightness(0, -10));
        assert!(!r.directory.set_contrast(0, 20));
        assert_eq!(r.directory.monitor(0).unwrap().brightness(), before);
    }

    #[test]
    fn test_failed_write_leaves_state() {
        let mut r = laptop_with_external();
        r.ddc.fail_writes(true);
        r.panel.state.borrow_mut().fail_writes = true;

        assert!(!r.directory.set_brightness(1, 90));
        assert!(!r.directory.set_brightness(0, 10));

        assert_eq!(r.directory.monitor(1).unwrap().brightness().current, 128);
        assert_eq!(r.directory.monitor(0).unwrap().brightness_percent(), 80);
    }

    #[test]
    fn test_out_of_range_index() {
        let mut r = laptop_with_external();
        assert!(!r.directory.set_brightness(7, 50));
        assert!(!r.directory.set_contrast(7, 50));
        assert!(!r.directory.step_brightness(7, 10));
    }

    #[test]
    fn test_handles_bounded_across_refreshes() {
        let outputs = FakeOutputs::new();
        outputs.push(1, "D1", false).push(2, "D2", false);
        let ddc = FakeDdc::new();
        let mut dual = FakeMonitor::new("Dual input", RawRange::new(0, 40, 100));
        dual.handle_count = 2;
        ddc.attach(1, dual);
        ddc.attach(2, FakeMonitor::new("Single", RawRange::new(0, 40, 100)));
        let mut r = rig(outputs, FakePanel::absent(), ddc);

        for _ in 0..5 {
            r.directory.refresh();
            let owned: usize = r.directory.monitors().iter().map(|m| m.handle_count()).sum();
            assert_eq!(r.ddc.live_handles(), owned);
            assert_eq!(owned, 3);
        }

        r.outputs.clear();
        r.outputs.push(2, "D2", false);
        r.directory.refresh();
        assert_eq!(r.ddc.live_handles(), 1);
    }

    #[test]
    fn test_dispose_and_drop_release_everything() {
        let mut r = laptop_with_external();
        assert_eq!(r.ddc.live_handles(), 1);
        r.directory.dispose();
        assert_eq!(r.ddc.live_handles(), 0);
        assert!(r.directory.is_empty());

        let r = laptop_with_external();
        let ddc = r.ddc.clone();
        drop(r);
        assert_eq!(ddc.live_handles(), 0);
    }

    #[test]
    fn test_broken_output_is_skipped_without_consuming_index() {
        let outputs = FakeOutputs::new();
        outputs.push_broken(1).push(2, "D2", false);
        let ddc = FakeDdc::new();
        ddc.attach(2, FakeMonitor::new("Samsung", RawRange::new(0, 100, 100)));
        let r = rig(outputs, FakePanel::absent(), ddc);

        assert_eq!(r.directory.len(), 1);
        assert_eq!(r.directory.monitor(0).unwrap().device_name(), "D2");
        assert_eq!(r.directory.monitor(0).unwrap().index(), 0);
    }

    #[test]
    fn test_panel_probed_once_per_refresh() {
        let outputs = FakeOutputs::new();
        outputs.push(1, "D1", true).push(2, "D2", true).push(3, "D3", false);
        let mut r = rig(outputs, FakePanel::available(Some(50)), FakeDdc::new());
        assert_eq!(r.panel.state.borrow().probes, 1);
        r.directory.refresh();
        assert_eq!(r.panel.state.borrow().probes, 2);
    }

    #[test]
    fn test_per_monitor_ranges() {
        let outputs = FakeOutputs::new();
        outputs.push(1, "D1", false).push(2, "D2", false);
        let ddc = FakeDdc::new();
        ddc.attach(1, FakeMonitor::new("A", RawRange::new(0, 50, 100)));
        ddc.attach(2, FakeMonitor::new("B", RawRange::new(0, 200, 400)));
        let mut r = rig(outputs, FakePanel::absent(), ddc);

        assert!(r.directory.set_brightness(1, 25));
        assert_eq!(r.ddc.writes()[0].2, 100);
        assert_eq!(r.directory.monitor(0).unwrap().brightness().current, 50);
    }
}
