// SPDX-License-Identifier: GPL-3.0-only
use std::process::ExitCode;

#[macro_use]
extern crate tracing;

fn setup_logs() {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = fmt::layer().with_target(false);
    let filter_layer = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new(format!(
        "warn,{}=info",
        env!("CARGO_CRATE_NAME")
    )));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();

    std::panic::set_hook(Box::new(|panic| {
        error!("{}", panic);
    }));
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    setup_logs();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(windows)]
async fn run() -> litebright::error::Result<()> {
    use std::sync::Arc;

    use litebright::app::{App, AppEvent};
    use litebright::config::Config;
    use litebright::error::AppError;
    use litebright::hotkeys::{HotkeyRegistrar, Win32HotkeyBackend};
    use litebright::hotplug::DisplayWatcher;
    use litebright::monitor::DisplayDirectory;
    use litebright::scroll::{ScrollFilter, ScrollZone};
    use tokio::sync::mpsc::unbounded_channel;

    let config = Config::load().unwrap_or_else(|err| {
        error!("failed to load settings: {}", err);
        Config::default()
    });

    let (events_tx, events_rx) = unbounded_channel();
    let (notify_tx, mut notify_rx) = unbounded_channel();

    let hotkeys = Win32HotkeyBackend::start(events_tx.clone()).map_err(|source| AppError::NativeStartup {
        component: "hotkey window",
        source,
    })?;
    let watcher = DisplayWatcher::start(events_tx.clone()).map_err(|source| AppError::NativeStartup {
        component: "display change window",
        source,
    })?;
    // The tray collaborator records the icon position through this zone
    let zone = Arc::new(ScrollZone::new());
    let filter = ScrollFilter::start(zone, events_tx.clone()).map_err(|source| AppError::NativeStartup {
        component: "mouse wheel hook",
        source,
    })?;

    let mut app = App::new(
        DisplayDirectory::native(),
        HotkeyRegistrar::new(hotkeys),
        config,
        notify_tx,
    )
    .with_scroll_filter(Box::new(filter))
    .with_pump(Box::new(watcher));
    app.start();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = events_tx.send(AppEvent::Shutdown);
        }
    });
    tokio::spawn(async move {
        while let Some(notification) = notify_rx.recv().await {
            debug!("notification: {:?}", notification);
        }
    });

    app.run(events_rx).await;
    Ok(())
}

#[cfg(not(windows))]
async fn run() -> litebright::error::Result<()> {
    Err(litebright::error::AppError::UnsupportedPlatform)
}
