// SPDX-License-Identifier: GPL-3.0-only
//! Display output enumeration through GDI

#[cfg(windows)]
pub use win32::GdiOutputs;

#[cfg(windows)]
mod win32 {
    use windows::Win32::Foundation::{BOOL, LPARAM, RECT};
    use windows::Win32::Graphics::Gdi::{
        EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOEXW,
        MONITORINFOF_PRIMARY,
    };

    use crate::error::ProtocolError;
    use crate::protocols::{from_wide, OutputInfo, OutputSource, OutputToken};

    /// Output source walking `EnumDisplayMonitors`
    #[derive(Debug, Default)]
    pub struct GdiOutputs;

    impl GdiOutputs {
        pub fn new() -> Self {
            Self
        }
    }

    unsafe extern "system" fn collect_output(
        hmonitor: HMONITOR,
        _hdc: HDC,
        _rect: *mut RECT,
        lparam: LPARAM,
    ) -> BOOL {
        let tokens = unsafe { &mut *(lparam.0 as *mut Vec<OutputToken>) };
        tokens.push(OutputToken(hmonitor.0 as isize));
        true.into()
    }

    impl OutputSource for GdiOutputs {
        fn outputs(&self) -> Vec<OutputToken> {
            let mut tokens: Vec<OutputToken> = Vec::new();
            let ok = unsafe {
                EnumDisplayMonitors(
                    HDC(std::ptr::null_mut()),
                    None,
                    Some(collect_output),
                    LPARAM(&mut tokens as *mut Vec<OutputToken> as isize),
                )
            };
            if !ok.as_bool() {
                warn!("EnumDisplayMonitors stopped early, {} output(s) collected", tokens.len());
            }
            tokens
        }

        fn describe(&self, output: OutputToken) -> Result<OutputInfo, ProtocolError> {
            let mut info = MONITORINFOEXW::default();
            info.monitorInfo.cbSize = std::mem::size_of::<MONITORINFOEXW>() as u32;

            let ok = unsafe {
                GetMonitorInfoW(
                    HMONITOR(output.0 as *mut std::ffi::c_void),
                    &mut info as *mut MONITORINFOEXW as *mut MONITORINFO,
                )
            };
            if !ok.as_bool() {
                return Err(ProtocolError::Output(format!("{:#x}", output.0)));
            }

            Ok(OutputInfo {
                token: output,
                device_name: from_wide(&info.szDevice),
                is_primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
            })
        }
    }
}
