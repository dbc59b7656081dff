// SPDX-License-Identifier: GPL-3.0-only
//! Invisible windows with their own message pump
//!
//! Hotkey notifications and display-change broadcasts both arrive as window
//! messages. [`MessageWindow`] creates such a window on a dedicated thread,
//! routes every message through a boxed handler and keeps pumping until the
//! window is closed.

use std::sync::mpsc::sync_channel;
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::{anyhow, Context};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW,
    GetWindowLongPtrW, PostMessageW, PostQuitMessage, RegisterClassW, SendMessageW,
    SetWindowLongPtrW, TranslateMessage, GWLP_USERDATA, HMENU, HWND_MESSAGE, MSG, WINDOW_EX_STYLE,
    WINDOW_STYLE, WM_CLOSE, WM_DESTROY, WM_NCDESTROY, WNDCLASSW,
};

/// Message handler; `None` falls through to the default processing
pub type Handler = Box<dyn FnMut(HWND, u32, WPARAM, LPARAM) -> Option<LRESULT> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// `HWND_MESSAGE` child. Receives posted and sent messages only.
    MessageOnly,
    /// Hidden top-level window. Also receives broadcasts such as
    /// `WM_DISPLAYCHANGE`.
    Hidden,
}

pub struct MessageWindow {
    name: &'static str,
    /// `HWND` is not `Send`; the raw value is
    hwnd: isize,
    thread: Option<JoinHandle<()>>,
}

impl MessageWindow {
    /// Create the window on a new pump thread and wait until it exists
    pub fn spawn(name: &'static str, kind: WindowKind, handler: Handler) -> anyhow::Result<Self> {
        let (ready_tx, ready_rx) = sync_channel::<anyhow::Result<isize>>(1);

        let thread = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let hwnd = match unsafe { create_window(name, kind, handler) } {
                    Ok(hwnd) => hwnd,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(hwnd.0 as isize));

                let mut msg = MSG::default();
                loop {
                    let r = unsafe { GetMessageW(&mut msg, None, 0, 0) };
                    if r.0 <= 0 {
                        break;
                    }
                    unsafe {
                        let _ = TranslateMessage(&msg);
                        DispatchMessageW(&msg);
                    }
                }
                debug!("{} message pump stopped", name);
            })
            .with_context(|| format!("spawning {} thread", name))?;

        let hwnd = ready_rx
            .recv_timeout(Duration::from_secs(2))
            .map_err(|_| anyhow!("{} thread did not signal readiness", name))??;

        Ok(Self {
            name,
            hwnd,
            thread: Some(thread),
        })
    }

    pub fn hwnd(&self) -> HWND {
        HWND(self.hwnd as *mut std::ffi::c_void)
    }

    /// Run `msg` on the window thread and wait for its result
    pub fn send(&self, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
        unsafe { SendMessageW(self.hwnd(), msg, wparam, lparam) }
    }

    /// Destroy the window and join its pump thread
    pub fn close(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        if let Err(err) = unsafe { PostMessageW(self.hwnd(), WM_CLOSE, WPARAM(0), LPARAM(0)) } {
            warn!("Closing {} window failed: {}", self.name, err);
            return;
        }
        if thread.join().is_err() {
            error!("{} thread panicked", self.name);
        }
    }
}

impl Drop for MessageWindow {
    fn drop(&mut self) {
        self.close();
    }
}

unsafe fn create_window(name: &str, kind: WindowKind, handler: Handler) -> anyhow::Result<HWND> {
    let class_name: Vec<u16> = name.encode_utf16().chain(std::iter::once(0)).collect();
    let hinstance = unsafe { GetModuleHandleW(None) }.context("GetModuleHandleW")?;

    let wc = WNDCLASSW {
        lpfnWndProc: Some(window_proc),
        hInstance: hinstance.into(),
        lpszClassName: PCWSTR(class_name.as_ptr()),
        ..Default::default()
    };
    // Zero also means "already registered", which CreateWindowExW tolerates
    let _ = unsafe { RegisterClassW(&wc) };

    let parent = match kind {
        WindowKind::MessageOnly => HWND_MESSAGE,
        WindowKind::Hidden => HWND(std::ptr::null_mut()),
    };
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            PCWSTR(class_name.as_ptr()),
            PCWSTR(class_name.as_ptr()),
            WINDOW_STYLE(0),
            0,
            0,
            0,
            0,
            parent,
            HMENU::default(),
            hinstance,
            None,
        )
    }
    .with_context(|| format!("CreateWindowExW({})", name))?;

    let handler: *mut Handler = Box::into_raw(Box::new(handler));
    unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, handler as isize) };
    Ok(hwnd)
}

unsafe extern "system" fn window_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    let handler = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *mut Handler;

    if !handler.is_null() && msg != WM_NCDESTROY {
        let handle = unsafe { &mut *handler };
        if let Some(result) = handle(hwnd, msg, wparam, lparam) {
            return result;
        }
    }

    match msg {
        WM_CLOSE => {
            let _ = unsafe { DestroyWindow(hwnd) };
            LRESULT(0)
        }
        WM_DESTROY => {
            unsafe { PostQuitMessage(0) };
            LRESULT(0)
        }
        WM_NCDESTROY => {
            if !handler.is_null() {
                unsafe {
                    SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                    drop(Box::from_raw(handler));
                }
            }
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}
