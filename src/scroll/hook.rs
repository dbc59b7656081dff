// SPDX-License-Identifier: GPL-3.0-only
//! `WH_MOUSE_LL` hook thread
//!
//! Low-level hooks run on the thread that installed them, which must keep
//! pumping messages. The callback has a strict time budget: it only
//! classifies the event and posts a [`AppEvent::Scroll`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::sync_channel;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::anyhow;
use once_cell::sync::Lazy;
use tokio::sync::mpsc::UnboundedSender;
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PeekMessageW, PostThreadMessageW,
    SetWindowsHookExW, TranslateMessage, UnhookWindowsHookEx, HC_ACTION, HHOOK, MSG,
    MSLLHOOKSTRUCT, PM_NOREMOVE, WH_MOUSE_LL, WM_MOUSEWHEEL, WM_QUIT,
};

use crate::app::AppEvent;

use super::{classify, Point, ScrollDecision, ScrollZone};

struct HookContext {
    zone: Arc<ScrollZone>,
    events: UnboundedSender<AppEvent>,
}

/// The hook callback has no user data pointer, so its context lives here
static HOOK_CONTEXT: Lazy<Mutex<Option<HookContext>>> = Lazy::new(|| Mutex::new(None));
static INSTALLED: AtomicBool = AtomicBool::new(false);

struct HookThread {
    thread_id: u32,
    join: JoinHandle<()>,
}

/// Installed mouse-wheel filter; uninstalled on [`ScrollFilter::stop`] or drop
pub struct ScrollFilter {
    thread: Option<HookThread>,
}

impl ScrollFilter {
    /// Install the hook on a new thread
    ///
    /// Only one filter can be installed per process.
    pub fn start(zone: Arc<ScrollZone>, events: UnboundedSender<AppEvent>) -> anyhow::Result<Self> {
        if INSTALLED.swap(true, Ordering::AcqRel) {
            return Err(anyhow!("mouse wheel hook already installed"));
        }
        if let Ok(mut slot) = HOOK_CONTEXT.lock() {
            *slot = Some(HookContext { zone, events });
        }

        let (ready_tx, ready_rx) = sync_channel::<anyhow::Result<u32>>(1);
        let join = std::thread::Builder::new()
            .name("LiteBrightMouseHook".into())
            .spawn(move || {
                let mut msg = MSG::default();
                // Create the thread's message queue before reporting the id
                unsafe {
                    let _ = PeekMessageW(&mut msg, None, 0, 0, PM_NOREMOVE);
                }

                let thread_id = unsafe { GetCurrentThreadId() };
                let hmodule = match unsafe { GetModuleHandleW(None) } {
                    Ok(h) => h,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow!(err)));
                        return;
                    }
                };
                let hook = match unsafe { SetWindowsHookExW(WH_MOUSE_LL, Some(mouse_hook_proc), hmodule, 0) } {
                    Ok(h) if !h.0.is_null() => h,
                    Ok(_) => {
                        let _ = ready_tx.send(Err(anyhow!(windows::core::Error::from_win32())));
                        return;
                    }
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow!(err)));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(thread_id));

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

                unsafe {
                    let _ = UnhookWindowsHookEx(hook);
                }
                debug!("Mouse wheel hook removed");
            });

        let join = match join {
            Ok(join) => join,
            Err(err) => {
                clear_context();
                return Err(err.into());
            }
        };

        match ready_rx.recv_timeout(Duration::from_secs(2)) {
            Ok(Ok(thread_id)) => {
                info!("Mouse wheel hook installed");
                Ok(Self {
                    thread: Some(HookThread { thread_id, join }),
                })
            }
            Ok(Err(err)) => {
                clear_context();
                Err(err)
            }
            Err(_) => {
                clear_context();
                Err(anyhow!("mouse hook thread did not signal readiness"))
            }
        }
    }

    /// Remove the hook and join its thread
    pub fn stop(&mut self) {
        let Some(thread) = self.thread.take() else {
            return;
        };
        unsafe {
            let _ = PostThreadMessageW(thread.thread_id, WM_QUIT, WPARAM(0), LPARAM(0));
        }
        if thread.join.join().is_err() {
            error!("Mouse hook thread panicked");
        }
        clear_context();
    }
}

impl Drop for ScrollFilter {
    fn drop(&mut self) {
        self.stop();
    }
}

fn clear_context() {
    if let Ok(mut slot) = HOOK_CONTEXT.lock() {
        *slot = None;
    }
    INSTALLED.store(false, Ordering::Release);
}

unsafe extern "system" fn mouse_hook_proc(n_code: i32, w_param: WPARAM, l_param: LPARAM) -> LRESULT {
    if n_code == HC_ACTION as i32 && w_param.0 as u32 == WM_MOUSEWHEEL {
        let info = unsafe { &*(l_param.0 as *const MSLLHOOKSTRUCT) };
        // High word of mouseData is the signed wheel delta
        let delta = ((info.mouseData >> 16) & 0xFFFF) as i16;
        let cursor = Point::new(info.pt.x, info.pt.y);

        // Never block inside the hook; a busy slot means install/uninstall
        if let Ok(slot) = HOOK_CONTEXT.try_lock() {
            if let Some(context) = slot.as_ref() {
                if let ScrollDecision::Swallow(direction) = classify(&context.zone, cursor, delta) {
                    let _ = context.events.send(AppEvent::Scroll(direction));
                    return LRESULT(1);
                }
            }
        }
    }

    unsafe { CallNextHookEx(HHOOK(std::ptr::null_mut()), n_code, w_param, l_param) }
}
