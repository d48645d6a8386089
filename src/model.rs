// Observable presence/gaze model.
//
// Mirrors the engine state for UI binding: presence picks the displayed
// image, the gaze-tracked flag drives the blink detector, and a classified
// blink gesture nudges the magnifier viewport. All mutation happens through
// `apply`, on the UI side of the dispatch queue.

use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::dispatch::ModelCommand;
use crate::gesture::{BlinkDetector, NudgePolicy, Transition};
use crate::host::{GazeSample, Subscription};
use crate::logger::{now_ms, LogEntry};
use crate::magnifier::ScreenMagnifierControl;
use crate::screen::ScreenDimensions;

pub const PRESENT_IMAGE: &str = "images/present.png";
pub const NOT_PRESENT_IMAGE: &str = "images/not-present.png";

/// Names the UI binding listens on. Derived properties get their own
/// notification even though their value is computed on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    IsUserPresent,
    ImageSource,
    IsTrackingGaze,
    IsTrackingGazeSupported,
    IsTrackingGazeNotSupported,
}

pub struct PresenceModel {
    is_user_present: bool,
    is_tracking_gaze: bool,
    is_tracking_gaze_supported: bool,
    detector: BlinkDetector,
    policy: NudgePolicy,
    magnifier: Box<dyn ScreenMagnifierControl>,
    subscriptions: Vec<Subscription>,
    log_tx: Sender<LogEntry>,
    changes_tx: Sender<Property>,
    changes_rx: Option<Receiver<Property>>,
    disposed: bool,
}

impl PresenceModel {
    pub fn new(
        screen: ScreenDimensions,
        magnifier: Box<dyn ScreenMagnifierControl>,
        subscriptions: Vec<Subscription>,
        log_tx: Sender<LogEntry>,
    ) -> Self {
        let (changes_tx, changes_rx) = unbounded();
        Self {
            is_user_present: false,
            is_tracking_gaze: false,
            is_tracking_gaze_supported: true,
            detector: BlinkDetector::new(),
            policy: NudgePolicy::new(screen),
            magnifier,
            subscriptions,
            log_tx,
            changes_tx,
            changes_rx: Some(changes_rx),
            disposed: false,
        }
    }

    /// Property-change stream for the UI binding. Single consumer; can be
    /// taken once.
    pub fn take_changes(&mut self) -> Option<Receiver<Property>> {
        self.changes_rx.take()
    }

    pub fn is_user_present(&self) -> bool {
        self.is_user_present
    }

    pub fn is_tracking_gaze(&self) -> bool {
        self.is_tracking_gaze
    }

    pub fn is_tracking_gaze_supported(&self) -> bool {
        self.is_tracking_gaze_supported
    }

    pub fn is_tracking_gaze_not_supported(&self) -> bool {
        !self.is_tracking_gaze_supported
    }

    /// Path of the image matching the current presence state.
    pub fn image_source(&self) -> &'static str {
        if self.is_user_present {
            PRESENT_IMAGE
        } else {
            NOT_PRESENT_IMAGE
        }
    }

    /// Advisory capability flag from the engine version probe. Never blocks
    /// state updates.
    pub fn set_tracking_gaze_supported(&mut self, supported: bool) {
        self.is_tracking_gaze_supported = supported;
        self.notify(Property::IsTrackingGazeSupported);
        self.notify(Property::IsTrackingGazeNotSupported);
    }

    pub fn apply(&mut self, command: ModelCommand) {
        self.apply_at(command, Instant::now());
    }

    /// `apply` with an explicit notification instant, so closed-interval
    /// classification is deterministic under test.
    pub fn apply_at(&mut self, command: ModelCommand, now: Instant) {
        match command {
            ModelCommand::UserPresence(value) => {
                if !value.is_valid {
                    tracing::debug!("ignoring invalid presence notification");
                    return;
                }
                self.set_user_present(value.is_active);
            }
            ModelCommand::GazeTracking(value) => {
                if !value.is_valid {
                    tracing::debug!("ignoring invalid gaze tracking notification");
                    return;
                }
                self.set_tracking_gaze(value.is_active, now);
            }
            ModelCommand::GazeSample(sample) => self.detector.observe_sample(sample),
        }
    }

    fn set_user_present(&mut self, present: bool) {
        self.is_user_present = present;
        self.log(LogEntry::Presence {
            t: now_ms(),
            present,
        });
        self.notify(Property::IsUserPresent);
        self.notify(Property::ImageSource);
    }

    fn set_tracking_gaze(&mut self, tracked: bool, now: Instant) {
        self.is_tracking_gaze = tracked;
        self.log(LogEntry::Tracking {
            t: now_ms(),
            tracked,
        });

        match self.detector.tracking_changed(tracked, now) {
            Transition::None => {}
            Transition::Closed => {
                tracing::info!("user closed eyes");
                self.log(LogEntry::EyesClosed { t: now_ms() });
            }
            Transition::Reopened { delay_ms, gesture } => {
                tracing::info!("user reopened eyes after {} ms", delay_ms);
                self.log(LogEntry::Reopen {
                    t: now_ms(),
                    delay_ms,
                    gesture: gesture.is_some(),
                });
                if let Some(sample) = gesture {
                    self.nudge(sample);
                }
            }
        }

        self.notify(Property::IsTrackingGaze);
    }

    /// Best-effort viewport nudge toward the captured gaze point. Any
    /// magnifier failure degrades to a no-op.
    fn nudge(&mut self, sample: GazeSample) {
        let transform = match self.magnifier.fullscreen_transform() {
            Ok(t) => t,
            Err(e) => {
                tracing::debug!("magnifier transform unavailable: {}", e);
                return;
            }
        };

        let Some(direction) = self.policy.decide(&sample, &transform) else {
            tracing::debug!(
                "magnifier inactive (zoom {:.2}); not panning",
                transform.zoom_level
            );
            return;
        };

        match self.magnifier.pan(direction, &transform) {
            Ok(()) => {
                tracing::info!("panned magnifier {:?} toward gaze x={:.0}", direction, sample.x);
                self.log(LogEntry::Pan {
                    t: now_ms(),
                    direction,
                });
            }
            Err(e) => tracing::debug!("magnifier pan failed: {}", e),
        }
    }

    /// Release subscriptions and the magnifier. Safe to call more than once;
    /// the second call is a no-op.
    pub fn shutdown(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        for subscription in &mut self.subscriptions {
            subscription.release();
        }
        if let Err(e) = self.magnifier.uninitialize() {
            tracing::debug!("magnifier uninitialize failed: {}", e);
        }
        let _ = self.log_tx.try_send(LogEntry::End);
    }

    fn notify(&self, property: Property) {
        let _ = self.changes_tx.send(property);
    }

    fn log(&self, entry: LogEntry) {
        let _ = self.log_tx.try_send(entry);
    }
}

impl Drop for PresenceModel {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::PanDirection;
    use crate::host::EngineStateValue;
    use crate::magnifier::{MagnifierError, MagnifierTransform};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    const SCREEN: ScreenDimensions = ScreenDimensions {
        width: 1920,
        height: 1080,
    };

    #[derive(Default)]
    struct MagnifierSpy {
        transform: Option<MagnifierTransform>,
        pans: Arc<Mutex<Vec<PanDirection>>>,
        uninit_calls: Arc<AtomicU32>,
    }

    impl ScreenMagnifierControl for MagnifierSpy {
        fn initialize(&mut self) -> Result<(), MagnifierError> {
            Ok(())
        }

        fn uninitialize(&mut self) -> Result<(), MagnifierError> {
            self.uninit_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn fullscreen_transform(&self) -> Result<MagnifierTransform, MagnifierError> {
            self.transform.ok_or(MagnifierError::Unavailable)
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

    fn model_with(magnifier: MagnifierSpy) -> PresenceModel {
        // Receiver dropped immediately; the model ignores log send results.
        let (log_tx, _log_rx) = crossbeam_channel::bounded(64);
        PresenceModel::new(SCREEN, Box::new(magnifier), Vec::new(), log_tx)
    }

    fn zoomed_spy(level: f32) -> MagnifierSpy {
        MagnifierSpy {
            transform: Some(MagnifierTransform {
                zoom_level: level,
                viewport_x: 0,
                viewport_y: 0,
            }),
            ..MagnifierSpy::default()
        }
    }

    fn valid(active: bool) -> EngineStateValue {
        EngineStateValue {
            is_valid: true,
            is_active: active,
        }
    }

    fn sample_at(x: f64) -> ModelCommand {
        ModelCommand::GazeSample(GazeSample {
            x,
            y: 500.0,
            timestamp_us: 0,
        })
    }

    fn blink(model: &mut PresenceModel, ms: u64) {
        let t0 = Instant::now();
        model.apply_at(ModelCommand::GazeTracking(valid(false)), t0);
        model.apply_at(
            ModelCommand::GazeTracking(valid(true)),
            t0 + Duration::from_millis(ms),
        );
    }

    #[test]
    fn image_follows_latest_valid_presence() {
        let mut model = model_with(MagnifierSpy::default());
        assert_eq!(model.image_source(), NOT_PRESENT_IMAGE);

        model.apply(ModelCommand::UserPresence(valid(true)));
        assert!(model.is_user_present());
        assert_eq!(model.image_source(), PRESENT_IMAGE);

        // Invalid notifications leave the last valid state in place.
        model.apply(ModelCommand::UserPresence(EngineStateValue {
            is_valid: false,
            is_active: false,
        }));
        assert_eq!(model.image_source(), PRESENT_IMAGE);

        model.apply(ModelCommand::UserPresence(valid(false)));
        assert_eq!(model.image_source(), NOT_PRESENT_IMAGE);
    }

    #[test]
    fn presence_set_notifies_base_and_derived_properties() {
        let mut model = model_with(MagnifierSpy::default());
        let changes = model.take_changes().unwrap();

        model.apply(ModelCommand::UserPresence(valid(true)));

        let seen: Vec<Property> = changes.try_iter().collect();
        assert_eq!(seen, vec![Property::IsUserPresent, Property::ImageSource]);
    }

    #[test]
    fn supported_flag_notifies_its_mirror() {
        let mut model = model_with(MagnifierSpy::default());
        let changes = model.take_changes().unwrap();

        model.set_tracking_gaze_supported(false);
        assert!(model.is_tracking_gaze_not_supported());

        let seen: Vec<Property> = changes.try_iter().collect();
        assert_eq!(
            seen,
            vec![
                Property::IsTrackingGazeSupported,
                Property::IsTrackingGazeNotSupported
            ]
        );
    }

    #[test]
    fn gesture_blink_pans_toward_gaze_half() {
        let spy = zoomed_spy(2.0);
        let pans = spy.pans.clone();
        let mut model = model_with(spy);

        model.apply(sample_at(100.0));
        blink(&mut model, 700);

        assert_eq!(pans.lock().unwrap().as_slice(), &[PanDirection::Left]);
    }

    #[test]
    fn short_blink_does_not_pan() {
        let spy = zoomed_spy(2.0);
        let pans = spy.pans.clone();
        let mut model = model_with(spy);

        model.apply(sample_at(100.0));
        blink(&mut model, 300);

        assert!(pans.lock().unwrap().is_empty());
    }

    #[test]
    fn inactive_zoom_suppresses_pan() {
        let spy = zoomed_spy(1.0);
        let pans = spy.pans.clone();
        let mut model = model_with(spy);

        model.apply(sample_at(1800.0));
        blink(&mut model, 700);

        assert!(pans.lock().unwrap().is_empty());
    }

    #[test]
    fn magnifier_query_failure_degrades_silently() {
        let spy = MagnifierSpy::default(); // no transform -> query errors
        let pans = spy.pans.clone();
        let mut model = model_with(spy);

        model.apply(sample_at(100.0));
        blink(&mut model, 700);

        assert!(pans.lock().unwrap().is_empty());
    }

    #[test]
    fn shutdown_is_idempotent() {
        let spy = MagnifierSpy::default();
        let uninit_calls = spy.uninit_calls.clone();
        let released = Arc::new(AtomicU32::new(0));
        let released_in = released.clone();

        let (log_tx, _log_rx) = crossbeam_channel::bounded(64);
        let mut model = PresenceModel::new(
            SCREEN,
            Box::new(spy),
            vec![Subscription::new(Box::new(move || {
                released_in.fetch_add(1, Ordering::SeqCst);
            }))],
            log_tx,
        );

        model.shutdown();
        model.shutdown();
        drop(model); // Drop also routes through shutdown

        assert_eq!(uninit_calls.load(Ordering::SeqCst), 1);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
