// SPDX-License-Identifier: GPL-3.0-only
//! Application controller
//!
//! [`App`] is the single owner of the display directory and the hotkey
//! table. Native threads (hotkey window, hotplug window, mouse hook) never
//! touch either; they post an [`AppEvent`] and the owning thread does the
//! work in [`App::run`].

mod messages;
mod update;

pub use messages::{AppEvent, Notification, StepSource};

use std::ops::ControlFlow;
use std::panic::AssertUnwindSafe;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::config::Config;
use crate::hotkeys::{HotkeyBackend, HotkeyRegistrar};
use crate::hotplug::HotplugDebouncer;
use crate::monitor::DisplayDirectory;

/// A native pump or hook that has to be stopped explicitly
pub trait NativeService {
    fn name(&self) -> &'static str;

    fn stop(&mut self);
}

#[cfg(windows)]
impl NativeService for crate::scroll::ScrollFilter {
    fn name(&self) -> &'static str {
        "mouse wheel hook"
    }

    fn stop(&mut self) {
        crate::scroll::ScrollFilter::stop(self)
    }
}

#[cfg(windows)]
impl NativeService for crate::hotplug::DisplayWatcher {
    fn name(&self) -> &'static str {
        "display change window"
    }

    fn stop(&mut self) {
        crate::hotplug::DisplayWatcher::stop(self)
    }
}

pub struct App<B: HotkeyBackend> {
    directory: DisplayDirectory,
    registrar: HotkeyRegistrar<B>,
    config: Config,
    hotplug: HotplugDebouncer,
    scroll_filter: Option<Box<dyn NativeService>>,
    pumps: Vec<Box<dyn NativeService>>,
    notifications: UnboundedSender<Notification>,
    shut_down: bool,
}

impl<B: HotkeyBackend> App<B> {
    pub fn new(
        directory: DisplayDirectory,
        registrar: HotkeyRegistrar<B>,
        config: Config,
        notifications: UnboundedSender<Notification>,
    ) -> Self {
        Self {
            directory,
            registrar,
            config: config.normalized(),
            hotplug: HotplugDebouncer::default(),
            scroll_filter: None,
            pumps: Vec::new(),
            notifications,
            shut_down: false,
        }
    }

    /// Hand over the installed wheel filter; it is stopped before the
    /// directory releases its handles
    pub fn with_scroll_filter(mut self, filter: Box<dyn NativeService>) -> Self {
        self.scroll_filter = Some(filter);
        self
    }

    /// Hand over a message pump that is stopped last
    pub fn with_pump(mut self, pump: Box<dyn NativeService>) -> Self {
        self.pumps.push(pump);
        self
    }

    pub fn directory(&self) -> &DisplayDirectory {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut DisplayDirectory {
        &mut self.directory
    }

    pub fn registrar(&self) -> &HotkeyRegistrar<B> {
        &self.registrar
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Enumerate displays and register the configured hotkeys
    pub fn start(&mut self) {
        self.refresh_displays();
        let config = self.config.clone();
        self.apply_settings(config);
    }

    /// Replace the settings, re-registering every hotkey
    pub fn apply_settings(&mut self, config: Config) {
        self.config = config.normalized();
        let report = self.registrar.apply_bindings(&self.config.hotkeys);
        info!(
            "{} hotkey(s) registered, {} failed",
            report.registered.len(),
            report.failed.len()
        );
        for (action, reason) in report.failed {
            self.notify(Notification::HotkeyFailed { action, reason });
        }
    }

    /// Drain events until shutdown, then release everything
    pub async fn run(mut self, mut events: UnboundedReceiver<AppEvent>) {
        loop {
            let event = match self.hotplug.deadline() {
                Some(deadline) => tokio::select! {
                    event = events.recv() => event,
                    _ = tokio::time::sleep_until(deadline) => {
                        let _ = self.guarded(|app| {
                            app.refresh_displays();
                            ControlFlow::Continue(())
                        });
                        continue;
                    }
                },
                None => events.recv().await,
            };

            let Some(event) = event else {
                info!("Event channel closed");
                break;
            };
            if self.guarded(|app| app.handle_event(event)).is_break() {
                break;
            }
        }
        self.shutdown();
    }

    /// Ordered teardown: hotkeys, wheel filter, display handles, pumps
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        info!("Shutting down");

        self.registrar.unregister_all();
        if let Some(mut filter) = self.scroll_filter.take() {
            debug!("Stopping {}", filter.name());
            filter.stop();
        }
        self.directory.dispose();
        self.registrar.dispose();
        for pump in &mut self.pumps {
            debug!("Stopping {}", pump.name());
            pump.stop();
        }
    }

    /// Run one handler, logging a panic instead of unwinding out of the loop
    fn guarded(&mut self, handler: impl FnOnce(&mut Self) -> ControlFlow<()>) -> ControlFlow<()> {
        match std::panic::catch_unwind(AssertUnwindSafe(|| handler(self))) {
            Ok(flow) => flow,
            Err(_) => {
                error!("Event handler panicked, continuing");
                ControlFlow::Continue(())
            }
        }
    }

    fn notify(&self, notification: Notification) {
        info!("{}", notification);
        if self.notifications.send(notification).is_err() {
            debug!("No notification listener");
        }
    }
}

impl<B: HotkeyBackend> Drop for App<B> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
