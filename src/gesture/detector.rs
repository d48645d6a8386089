// Eyes-closed interval detection.
//
// Two-state machine over the gaze-tracked boolean. Losing tracking freezes
// the latest gaze sample together with the closure instant; regaining it
// measures the closed interval once and classifies it. A closure lasting
// longer than a physiological blink but shorter than a genuine look-away is
// treated as a deliberate blink-to-pan gesture.

use std::time::Instant;

use crate::host::GazeSample;

/// Closed intervals in (400, 1500) ms, both bounds exclusive, count as a pan
/// gesture. Shorter is ordinary blinking; longer is not deliberate.
pub const PAN_GESTURE_MIN_MS: u64 = 400;
pub const PAN_GESTURE_MAX_MS: u64 = 1500;

/// What a tracking-state notification did to the detector.
#[derive(Debug, Clone, Copy)]
pub enum Transition {
    /// No edge: notification repeated the current state.
    None,
    /// Tracking lost; a closure is now outstanding.
    Closed,
    /// Tracking regained. `gesture` carries the sample captured at closure
    /// when the interval classified as a pan gesture, and is `None` both for
    /// out-of-window intervals and when no sample had ever been observed.
    Reopened {
        delay_ms: u64,
        gesture: Option<GazeSample>,
    },
}

struct ClosureEvent {
    sample: Option<GazeSample>,
    closed_at: Instant,
}

pub struct BlinkDetector {
    last_sample: Option<GazeSample>,
    closure: Option<ClosureEvent>,
}

impl BlinkDetector {
    pub fn new() -> Self {
        Self {
            last_sample: None,
            closure: None,
        }
    }

    /// Record the most recent gaze point. Only the latest sample is kept.
    pub fn observe_sample(&mut self, sample: GazeSample) {
        self.last_sample = Some(sample);
    }

    /// Feed a tracked/not-tracked notification. Edge-triggered: repeated
    /// loss notifications never overwrite the outstanding closure.
    pub fn tracking_changed(&mut self, tracked: bool, now: Instant) -> Transition {
        if !tracked {
            if self.closure.is_some() {
                return Transition::None;
            }
            self.closure = Some(ClosureEvent {
                sample: self.last_sample,
                closed_at: now,
            });
            return Transition::Closed;
        }

        let Some(closure) = self.closure.take() else {
            return Transition::None;
        };

        let delay_ms = now.saturating_duration_since(closure.closed_at).as_millis() as u64;
        let gesture = if is_pan_gesture(delay_ms) {
            closure.sample
        } else {
            None
        };
        Transition::Reopened { delay_ms, gesture }
    }
}

impl Default for BlinkDetector {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn is_pan_gesture(delay_ms: u64) -> bool {
    delay_ms > PAN_GESTURE_MIN_MS && delay_ms < PAN_GESTURE_MAX_MS
}
