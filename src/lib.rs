pub mod dispatch;
pub mod gesture;
pub mod host;
pub mod logger;
pub mod magnifier;
pub mod model;
pub mod screen;

use std::thread;
use std::time::Duration;

use crate::dispatch::ModelCommand;
use crate::host::{EyeTrackingHost, GazeStreamMode};
use crate::logger::SessionLogger;
use crate::magnifier::ScreenMagnifierControl;
use crate::model::PresenceModel;
use crate::screen::ScreenDimensions;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Connect to the host and check the engine version against the minimum that
/// reports gaze tracking state. Timeout or a failed query both mean "version
/// unknown" and downgrade the capability flag; neither blocks operation.
fn probe_gaze_tracking_support<H: EyeTrackingHost>(host: &H) -> bool {
    if !host.wait_until_connected(CONNECT_TIMEOUT) {
        tracing::warn!("eye tracking host connection timed out; version unknown");
        return false;
    }

    match host.engine_version() {
        Ok(version) if version.supports_gaze_tracking() => true,
        Ok(version) => {
            tracing::warn!(
                "engine version {}.{} does not report gaze tracking state",
                version.major,
                version.minor
            );
            false
        }
        Err(e) => {
            tracing::warn!("engine version query failed: {}", e);
            false
        }
    }
}

/// Wire the host to the model and drain the UI queue until the host shuts
/// down. Everything observable happens on this thread.
pub fn run<H: EyeTrackingHost>(host: &H) {
    let screen = ScreenDimensions::detect();
    tracing::info!("screen {}x{}", screen.width, screen.height);

    let mut magnifier = magnifier::platform_default(screen);
    if let Err(e) = magnifier.initialize() {
        tracing::warn!("magnifier initialize failed ({}); blink-to-pan degraded", e);
    }

    let (logger, log_tx) = SessionLogger::start(logger::default_log_path());

    let (ui_tx, ui_rx) = dispatch::ui_queue();

    // State-changed events arrive on host background threads; the listeners
    // only post to the UI queue.
    let presence_tx = ui_tx.clone();
    let presence_sub = host.subscribe_user_presence(Box::new(move |value| {
        presence_tx.post(ModelCommand::UserPresence(value));
    }));
    let tracking_tx = ui_tx.clone();
    let tracking_sub = host.subscribe_gaze_tracking(Box::new(move |value| {
        tracking_tx.post(ModelCommand::GazeTracking(value));
    }));

    // The gaze stream goes through the same queue, so the detector's
    // latest-sample slot is only ever touched by the drain loop.
    let gaze_rx = host.create_gaze_stream(GazeStreamMode::LightlyFiltered);
    let gaze_tx = ui_tx.clone();
    thread::spawn(move || {
        while let Ok(sample) = gaze_rx.recv() {
            gaze_tx.post(ModelCommand::GazeSample(sample));
        }
    });

    host.start();

    let mut model = PresenceModel::new(
        screen,
        magnifier,
        vec![presence_sub, tracking_sub],
        log_tx,
    );
    model.set_tracking_gaze_supported(probe_gaze_tracking_support(host));

    // Demo stand-in for the UI binding: report every property change.
    if let Some(changes) = model.take_changes() {
        thread::spawn(move || {
            for property in changes {
                tracing::info!("property changed: {:?}", property);
            }
        });
    }

    // UI drain loop; ends once the host has dropped every producer.
    drop(ui_tx);
    while let Ok(command) = ui_rx.recv() {
        model.apply(command);
    }

    model.shutdown();
    drop(model);
    logger.close();
}
