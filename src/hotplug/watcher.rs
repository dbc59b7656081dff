// SPDX-License-Identifier: GPL-3.0-only
//! `WM_DISPLAYCHANGE` listener
//!
//! Message-only windows don't receive broadcasts, so this uses a hidden
//! top-level window instead.

use tokio::sync::mpsc::UnboundedSender;
use windows::Win32::Foundation::LRESULT;
use windows::Win32::UI::WindowsAndMessaging::WM_DISPLAYCHANGE;

use crate::app::AppEvent;
use crate::native_window::{Handler, MessageWindow, WindowKind};

/// Posts [`AppEvent::DisplaysChanged`] for every display topology change
pub struct DisplayWatcher {
    window: MessageWindow,
}

impl DisplayWatcher {
    pub fn start(events: UnboundedSender<AppEvent>) -> anyhow::Result<Self> {
        let handler: Handler = Box::new(move |_hwnd, msg, wparam, lparam| {
            if msg != WM_DISPLAYCHANGE {
                return None;
            }
            let width = lparam.0 & 0xFFFF;
            let height = (lparam.0 >> 16) & 0xFFFF;
            debug!("WM_DISPLAYCHANGE: {}x{} at {} bpp", width, height, wparam.0);
            if events.send(AppEvent::DisplaysChanged).is_err() {
                debug!("Event channel closed, dropping display change");
            }
            Some(LRESULT(0))
        });

        let window = MessageWindow::spawn("LiteBrightDisplayWatch", WindowKind::Hidden, handler)?;
        info!("Watching for display changes");
        Ok(Self { window })
    }

    pub fn stop(&mut self) {
        self.window.close();
    }
}
