// SPDX-License-Identifier: GPL-3.0-only
use std::ops::ControlFlow;

use tokio::time::Instant;

use crate::hotkeys::HotkeyBackend;
use crate::scroll::Direction;

use super::messages::{AppEvent, Notification, StepSource};
use super::App;

impl<B: HotkeyBackend> App<B> {
    pub fn handle_event(&mut self, event: AppEvent) -> ControlFlow<()> {
        debug!("{:?}", event);

        match event {
            AppEvent::Hotkey(id) => self.on_hotkey(id),
            AppEvent::Scroll(direction) => self.on_scroll(direction),
            AppEvent::DisplaysChanged => {
                if self.hotplug.notify(Instant::now()) {
                    info!("Display change detected, debouncing...");
                }
            }
            AppEvent::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    /// Re-enumerate displays and tell the UI
    pub(super) fn refresh_displays(&mut self) {
        self.hotplug.complete(Instant::now());
        self.directory.refresh();
        self.notify(Notification::MonitorsChanged {
            count: self.directory.len(),
        });
    }

    fn on_hotkey(&mut self, id: i32) {
        let Some(action) = self.registrar.resolve(id) else {
            debug!("Ignoring hotkey id {} without a binding", id);
            return;
        };

        let index = action.monitor_index();
        if index >= self.directory.len() {
            debug!("Hotkey for {} but only {} display(s)", action, self.directory.len());
            return;
        }

        let step = self.config.brightness_step;
        let delta = if action.is_increase() { step } else { -step };
        if self.directory.step_brightness(index, delta) {
            self.notify_brightness(index, StepSource::Hotkey);
        }
    }

    /// Wheel over the tray icon always targets the first display
    fn on_scroll(&mut self, direction: Direction) {
        if self.directory.is_empty() {
            return;
        }
        let ok = self.directory.step_brightness(0, direction.apply(self.config.brightness_step));
        if !ok {
            debug!("Scroll step on display 0 was not applied");
        }
        // Reported either way so the tooltip shows the current level
        self.notify_brightness(0, StepSource::Scroll);
    }

    fn notify_brightness(&self, index: usize, source: StepSource) {
        let Some(monitor) = self.directory.monitor(index) else {
            return;
        };
        self.notify(Notification::BrightnessChanged {
            index,
            name: monitor.short_name().to_string(),
            percent: monitor.brightness_percent(),
            source,
        });
    }
}
