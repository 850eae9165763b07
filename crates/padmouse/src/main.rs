//! padmouse daemon entry point.
//!
//! Wires the configuration, the discovered input devices, the two virtual
//! output devices and the two monitors together, then runs them on a
//! single-threaded Tokio runtime until a device stream ends, an I/O error
//! occurs, or a shutdown signal arrives.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()               -- TOML, defaults if missing
//!  └─ discover_devices()          -- /dev/input/event*, sorted
//!       └─ real mouse present?    -- exit quietly
//!  └─ EvdevSource::open()         -- keyboard + touchpad
//!  └─ UinputSink::{passthrough, mouse}()
//!  └─ GrabGuard::acquire(keyboard)
//!  └─ select!
//!       ├─ KeyboardMonitor::run   -- remap or pass through
//!       ├─ TouchpadMonitor::run   -- update activation
//!       └─ shutdown_signal()
//!  └─ release grab, cancel scroll tasks
//! ```
//!
//! # Exit status
//!
//! `0` after a signal or when a real mouse makes padmouse unnecessary;
//! non-zero when a device cannot be found, opened, grabbed or written.

use tracing::info;
use tracing_subscriber::EnvFilter;

use padmouse::infrastructure::storage::config::{config_file_path, load_config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Config comes first so its log level can seed the filter.
    let config = load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.daemon.log_level)),
        )
        .init();

    info!("padmouse {} starting", env!("CARGO_PKG_VERSION"));
    match config_file_path() {
        Ok(path) => info!("configuration: {}", path.display()),
        Err(e) => info!("{e}; using default configuration"),
    }

    daemon::run(config).await
}

#[cfg(target_os = "linux")]
mod daemon {
    use std::sync::Arc;

    use anyhow::Context;
    use tracing::{debug, error, info};

    use padmouse::application::devices::share_sink;
    use padmouse::application::remap_keys::KeyboardMonitor;
    use padmouse::application::session::Session;
    use padmouse::application::track_touch::TouchpadMonitor;
    use padmouse::infrastructure::devices::linux::{EvdevSource, UinputSink};
    use padmouse::infrastructure::discovery::{discover_devices, find_device, find_pointing_device};
    use padmouse::infrastructure::shutdown::{shutdown_signal, GrabGuard};
    use padmouse::infrastructure::storage::config::AppConfig;

    pub async fn run(config: AppConfig) -> anyhow::Result<()> {
        let table = config.build_action_table()?;
        let classifier = config.touch_classifier()?;
        let timing = config.scroll_timing()?;

        for binding in table.iter() {
            info!("binding: code {} -> {:?}", binding.source_code(), binding.action());
        }
        info!(
            "scroll: first repeat after {:?}, then every {:?}",
            timing.initial_delay, timing.repeat_interval
        );

        // ── Device discovery ──────────────────────────────────────────────────
        let devices = discover_devices();
        for device in &devices {
            debug!("found {} ({})", device.path.display(), device.name);
        }

        if config.devices.exit_if_mouse_present {
            let exclude = config.mouse_exclusions();
            if let Some(mouse) = find_pointing_device(
                &devices,
                &config.devices.mouse_name,
                &exclude,
                &config.devices.touchpad_name,
            ) {
                info!("real mouse attached ({}); nothing to do", mouse.name);
                return Ok(());
            }
        }

        let keyboard_info = find_device(&devices, &config.devices.keyboard_name)?;
        let touchpad_info = find_device(&devices, &config.devices.touchpad_name)?;
        let keyboard = EvdevSource::open(&keyboard_info.path)?;
        let mut touchpad = EvdevSource::open(&touchpad_info.path)?;
        info!("keyboard: {} ({})", keyboard.name(), keyboard.path().display());
        info!("touchpad: {} ({})", touchpad.name(), touchpad.path().display());

        // ── Virtual devices ───────────────────────────────────────────────────
        let passthrough = UinputSink::passthrough(&keyboard.supported_keys())?;
        let mouse = UinputSink::mouse()?;

        let session = Arc::new(Session::new(table, share_sink(mouse), timing));
        let mut keyboard_monitor = KeyboardMonitor::new(Arc::clone(&session), Box::new(passthrough));
        let mut touchpad_monitor = TouchpadMonitor::new(Arc::clone(&session), classifier);

        // ── Run ───────────────────────────────────────────────────────────────
        let mut guard = GrabGuard::acquire(keyboard).context("cannot take over the keyboard")?;
        info!("padmouse ready");

        let outcome = tokio::select! {
            result = keyboard_monitor.run(guard.device_mut()) => {
                result.context("keyboard monitor stopped")
            }
            result = touchpad_monitor.run(&mut touchpad) => {
                result.context("touchpad monitor stopped")
            }
            signal = shutdown_signal() => {
                info!("{signal} received, shutting down");
                Ok(())
            }
        };

        guard.release();
        session.scroll_tasks().cancel_all();

        match &outcome {
            Ok(()) => info!("padmouse stopped"),
            Err(e) => error!("padmouse stopped: {e:#}"),
        }
        outcome
    }
}

#[cfg(not(target_os = "linux"))]
mod daemon {
    use padmouse::infrastructure::storage::config::AppConfig;

    pub async fn run(_config: AppConfig) -> anyhow::Result<()> {
        anyhow::bail!("padmouse needs Linux evdev and uinput")
    }
}
