// Full pipeline test: simulated host -> UI queue -> model -> detector ->
// nudge policy -> magnifier backend double.

use std::sync::{Arc, Mutex};
use std::thread;

use presence_pan::dispatch::{self, ModelCommand};
use presence_pan::gesture::PanDirection;
use presence_pan::host::sim::{SimStep, SimulatedHost};
use presence_pan::host::{EngineVersion, EyeTrackingHost, GazeStreamMode};
use presence_pan::logger::LogEntry;
use presence_pan::magnifier::{MagnifierError, MagnifierTransform, ScreenMagnifierControl};
use presence_pan::model::{PresenceModel, NOT_PRESENT_IMAGE};
use presence_pan::screen::ScreenDimensions;

struct SharedMagnifier {
    pans: Arc<Mutex<Vec<PanDirection>>>,
}

impl ScreenMagnifierControl for SharedMagnifier {
    fn initialize(&mut self) -> Result<(), MagnifierError> {
        Ok(())
    }

    fn uninitialize(&mut self) -> Result<(), MagnifierError> {
        Ok(())
    }

    fn fullscreen_transform(&self) -> Result<MagnifierTransform, MagnifierError> {
        Ok(MagnifierTransform {
            zoom_level: 2.0,
            viewport_x: 480,
            viewport_y: 0,
        })
    }

    fn pan(
        &mut self,
        direction: PanDirection,
        _transform: &MagnifierTransform,
    ) -> Result<(), MagnifierError> {
        self.pans.lock().unwrap().push(direction);
        Ok(())
    }
}

#[test]
fn deliberate_blink_pans_toward_last_gaze_point() {
    let script = vec![
        SimStep::Present(true),
        SimStep::Tracked(true),
        SimStep::Sample(300.0, 400.0),
        SimStep::Sample(310.0, 410.0),
        SimStep::Wait(100),
        // Deliberate blink: 600 ms inside the gesture window.
        SimStep::Tracked(false),
        SimStep::Wait(600),
        SimStep::Tracked(true),
        SimStep::Wait(100),
        // Reflex blink: too short to classify.
        SimStep::Tracked(false),
        SimStep::Wait(100),
        SimStep::Tracked(true),
        SimStep::Present(false),
    ];
    let host = SimulatedHost::new(EngineVersion { major: 1, minor: 4 }, script);

    let (ui_tx, ui_rx) = dispatch::ui_queue();

    let presence_tx = ui_tx.clone();
    let presence_sub = host.subscribe_user_presence(Box::new(move |value| {
        presence_tx.post(ModelCommand::UserPresence(value));
    }));
    let tracking_tx = ui_tx.clone();
    let tracking_sub = host.subscribe_gaze_tracking(Box::new(move |value| {
        tracking_tx.post(ModelCommand::GazeTracking(value));
    }));

    let gaze_rx = host.create_gaze_stream(GazeStreamMode::LightlyFiltered);
    let gaze_tx = ui_tx.clone();
    thread::spawn(move || {
        while let Ok(sample) = gaze_rx.recv() {
            gaze_tx.post(ModelCommand::GazeSample(sample));
        }
    });

    let pans = Arc::new(Mutex::new(Vec::new()));
    let (log_tx, log_rx) = crossbeam_channel::bounded(256);
    let mut model = PresenceModel::new(
        ScreenDimensions {
            width: 1920,
            height: 1080,
        },
        Box::new(SharedMagnifier { pans: pans.clone() }),
        vec![presence_sub, tracking_sub],
        log_tx,
    );

    host.start();

    drop(ui_tx);
    while let Ok(command) = ui_rx.recv() {
        model.apply(command);
    }

    // Gaze was at x=310 on a 1920-wide screen: left half, exactly one pan.
    assert_eq!(pans.lock().unwrap().as_slice(), &[PanDirection::Left]);

    // Final presence state reached the bound image property.
    assert!(!model.is_user_present());
    assert_eq!(model.image_source(), NOT_PRESENT_IMAGE);

    model.shutdown();

    // The session log saw one gesture reopen and one non-gesture reopen.
    let entries: Vec<LogEntry> = log_rx.try_iter().collect();
    let reopens: Vec<bool> = entries
        .iter()
        .filter_map(|entry| match entry {
            LogEntry::Reopen { gesture, .. } => Some(*gesture),
            _ => None,
        })
        .collect();
    assert_eq!(reopens, vec![true, false]);
    assert!(entries
        .iter()
        .any(|entry| matches!(entry, LogEntry::Pan { .. })));
    assert!(entries.iter().any(|entry| matches!(entry, LogEntry::End)));
}
