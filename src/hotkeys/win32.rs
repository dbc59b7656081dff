// SPDX-License-Identifier: GPL-3.0-only
//! `RegisterHotKey` backend on a message-only window
//!
//! `RegisterHotKey` binds the hotkey to the calling thread, so registration
//! requests are sent into the window thread as private `WM_APP` messages and
//! executed there. `WM_HOTKEY` ids are forwarded to the owning thread.

use tokio::sync::mpsc::UnboundedSender;
use windows::core::HRESULT;
use windows::Win32::Foundation::{ERROR_HOTKEY_ALREADY_REGISTERED, LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::Input::KeyboardAndMouse::{RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS};
use windows::Win32::UI::WindowsAndMessaging::{WM_APP, WM_HOTKEY};

use crate::app::AppEvent;
use crate::error::HotkeyError;
use crate::native_window::{Handler, MessageWindow, WindowKind};

use super::binding::{KeyCombo, Modifiers};
use super::keys::KeyCode;
use super::registrar::{HotkeyBackend, MOD_NOREPEAT};

const WM_APP_REGISTER: u32 = WM_APP + 1;
const WM_APP_UNREGISTER: u32 = WM_APP + 2;

/// Hotkey backend owning the hidden message-only window
pub struct Win32HotkeyBackend {
    window: MessageWindow,
}

impl Win32HotkeyBackend {
    /// Start the window thread; `WM_HOTKEY` ids are sent to `events`
    pub fn start(events: UnboundedSender<AppEvent>) -> anyhow::Result<Self> {
        let handler: Handler = Box::new(move |hwnd, msg, wparam, lparam| match msg {
            WM_HOTKEY => {
                let _ = events.send(AppEvent::Hotkey(wparam.0 as i32));
                Some(LRESULT(0))
            }
            WM_APP_REGISTER => {
                let id = wparam.0 as i32;
                let modifiers = ((lparam.0 >> 16) & 0xFFFF) as u32;
                let vk = (lparam.0 & 0xFFFF) as u32;
                let result = unsafe { RegisterHotKey(hwnd, id, HOT_KEY_MODIFIERS(modifiers), vk) };
                Some(match result {
                    Ok(()) => LRESULT(0),
                    Err(err) => LRESULT(err.code().0 as isize),
                })
            }
            WM_APP_UNREGISTER => {
                let id = wparam.0 as i32;
                if let Err(err) = unsafe { UnregisterHotKey(hwnd, id) } {
                    debug!("UnregisterHotKey({}) failed: {}", id, err);
                }
                Some(LRESULT(0))
            }
            _ => None,
        });

        let window = MessageWindow::spawn("LiteBrightHotkeys", WindowKind::MessageOnly, handler)?;
        Ok(Self { window })
    }
}

impl HotkeyBackend for Win32HotkeyBackend {
    fn register(&mut self, id: i32, modifiers: Modifiers, key: KeyCode) -> Result<(), HotkeyError> {
        let packed = ((modifiers.bits() as isize) << 16) | (key.0 as isize & 0xFFFF);
        let result = self.window.send(WM_APP_REGISTER, WPARAM(id as usize), LPARAM(packed));
        if result.0 == 0 {
            return Ok(());
        }

        let code = HRESULT(result.0 as i32);
        if code == ERROR_HOTKEY_ALREADY_REGISTERED.to_hresult() {
            let combo = KeyCombo::new(Modifiers(modifiers.bits() & !MOD_NOREPEAT), key);
            return Err(HotkeyError::Conflict(combo.to_string()));
        }
        Err(HotkeyError::Platform(windows::core::Error::from(code).message()))
    }

    fn unregister(&mut self, id: i32) {
        self.window.send(WM_APP_UNREGISTER, WPARAM(id as usize), LPARAM(0));
    }

    fn shutdown(&mut self) {
        self.window.close();
    }
}
