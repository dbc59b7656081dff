// SPDX-License-Identifier: GPL-3.0-only
//! DDC/CI (Display Data Channel Command Interface) protocol implementation
//!
//! DDC/CI is a standard protocol for controlling monitors over the video
//! cable. On Windows it is reached through the Monitor Configuration API in
//! `dxva2.dll`: every `HMONITOR` yields one or more physical-monitor handles
//! which must be destroyed explicitly.
//!
//! The percent conversions here belong to the protocol layer. Note that
//! [`raw_to_percent`] reports a degenerate range (`max == min`) as 100%,
//! unlike [`crate::monitor::Level::percent`].

#[cfg(windows)]
pub use win32::Dxva2Channel;

/// Convert a 0-100 percentage to the monitor's raw range.
///
/// The percentage is clamped to 0-100 first.
pub fn percent_to_raw(percent: i32, min: u32, max: u32) -> u32 {
    let percent = f64::from(percent.clamp(0, 100));
    let span = f64::from(max.saturating_sub(min));
    min + (span * percent / 100.0).round() as u32
}

/// Convert a raw DDC value back to a 0-100 percentage.
///
/// A degenerate range reports 100%. Raw values outside the range are clamped.
pub fn raw_to_percent(raw: u32, min: u32, max: u32) -> u32 {
    if max <= min {
        return 100;
    }
    let percent = (f64::from(raw) - f64::from(min)) * 100.0 / f64::from(max - min);
    percent.round().clamp(0.0, 100.0) as u32
}

#[cfg(windows)]
mod win32 {
    use windows::Win32::Devices::Display::{
        DestroyPhysicalMonitor, GetMonitorBrightness, GetMonitorContrast,
        GetNumberOfPhysicalMonitorsFromHMONITOR, GetPhysicalMonitorsFromHMONITOR,
        SetMonitorBrightness, SetMonitorContrast, PHYSICAL_MONITOR,
    };
    use windows::Win32::Foundation::HANDLE;
    use windows::Win32::Graphics::Gdi::HMONITOR;

    use crate::error::ProtocolError;
    use crate::protocols::{
        from_wide, DdcChannel, HandleSet, OutputToken, PhysicalHandle, RawRange,
    };

    /// DDC/CI channel backed by `dxva2.dll`
    #[derive(Debug, Default)]
    pub struct Dxva2Channel;

    impl Dxva2Channel {
        pub fn new() -> Self {
            Self
        }
    }

    fn native(handle: PhysicalHandle) -> HANDLE {
        HANDLE(handle.0 as *mut std::ffi::c_void)
    }

    fn last_error(operation: &'static str) -> ProtocolError {
        ProtocolError::DdcCi {
            operation,
            reason: windows::core::Error::from_win32().message(),
        }
    }

    fn read_range(
        operation: &'static str,
        query: unsafe fn(HANDLE, *mut u32, *mut u32, *mut u32) -> i32,
        handle: PhysicalHandle,
    ) -> Result<RawRange, ProtocolError> {
        let (mut min, mut current, mut max) = (0u32, 0u32, 0u32);
        let ok = unsafe { query(native(handle), &mut min, &mut current, &mut max) };
        if ok == 0 {
            return Err(last_error(operation));
        }
        Ok(RawRange::new(min, current, max))
    }

    unsafe fn get_brightness(h: HANDLE, min: *mut u32, cur: *mut u32, max: *mut u32) -> i32 {
        unsafe { GetMonitorBrightness(h, min, cur, max) }
    }

    unsafe fn get_contrast(h: HANDLE, min: *mut u32, cur: *mut u32, max: *mut u32) -> i32 {
        unsafe { GetMonitorContrast(h, min, cur, max) }
    }

    impl DdcChannel for Dxva2Channel {
        fn open_handles(&self, output: OutputToken) -> HandleSet {
            let hmonitor = HMONITOR(output.0 as *mut std::ffi::c_void);

            let mut count: u32 = 0;
            if let Err(err) = unsafe { GetNumberOfPhysicalMonitorsFromHMONITOR(hmonitor, &mut count) } {
                debug!(output = output.0, error = %err, "No physical monitors behind output");
                return HandleSet::empty();
            }
            if count == 0 {
                return HandleSet::empty();
            }

            let mut monitors = vec![PHYSICAL_MONITOR::default(); count as usize];
            if let Err(err) = unsafe { GetPhysicalMonitorsFromHMONITOR(hmonitor, &mut monitors) } {
                debug!(output = output.0, error = %err, "GetPhysicalMonitorsFromHMONITOR failed");
                return HandleSet::empty();
            }

            let description = monitors
                .first()
                .map(|m| from_wide(&m.szPhysicalMonitorDescription))
                .unwrap_or_default();
            let handles = monitors
                .iter()
                .map(|m| PhysicalHandle(m.hPhysicalMonitor.0 as isize))
                .collect();

            HandleSet::new(handles, description)
        }

        fn read_brightness(&self, handle: PhysicalHandle) -> Result<RawRange, ProtocolError> {
            read_range("GetMonitorBrightness", get_brightness, handle)
        }

        fn read_contrast(&self, handle: PhysicalHandle) -> Result<RawRange, ProtocolError> {
            read_range("GetMonitorContrast", get_contrast, handle)
        }

        fn write_brightness(&self, handle: PhysicalHandle, raw: u32) -> Result<(), ProtocolError> {
            if unsafe { SetMonitorBrightness(native(handle), raw) } == 0 {
                return Err(last_error("SetMonitorBrightness"));
            }
            Ok(())
        }

        fn write_contrast(&self, handle: PhysicalHandle, raw: u32) -> Result<(), ProtocolError> {
            if unsafe { SetMonitorContrast(native(handle), raw) } == 0 {
                return Err(last_error("SetMonitorContrast"));
            }
            Ok(())
        }

        fn close_handles(&self, handles: HandleSet) {
            for handle in handles.into_handles() {
                if let Err(err) = unsafe { DestroyPhysicalMonitor(native(handle)) } {
                    warn!(handle = handle.0, error = %err, "DestroyPhysicalMonitor failed");
                }
            }
        }
    }
}
