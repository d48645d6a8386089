use std::time::Duration;

use crossbeam_channel::Receiver;
use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Host-facing types
// ---------------------------------------------------------------------------

pub mod sim;

/// A single gaze point from the host's data stream. Coordinates are physical
/// screen pixels; the timestamp is host time in microseconds.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GazeSample {
    pub x: f64,
    pub y: f64,
    pub timestamp_us: u64,
}

/// Engine state notification payload. `is_valid = false` means the host could
/// not determine the state; consumers must not treat the boolean as meaningful
/// in that case.
#[derive(Debug, Clone, Copy)]
pub struct EngineStateValue {
    pub is_valid: bool,
    pub is_active: bool,
}

/// Filtering mode for the gaze point stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GazeStreamMode {
    Unfiltered,
    LightlyFiltered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
}

/// Gaze tracking state notifications require engine 1.4 or later.
pub const MIN_SUPPORTED_MAJOR: u32 = 1;
pub const MIN_SUPPORTED_MINOR: u32 = 4;

impl EngineVersion {
    /// Whether this engine reports gaze tracking state changes.
    /// Any major above the minimum qualifies; on the minimum major the minor
    /// must also reach the minimum.
    pub fn supports_gaze_tracking(&self) -> bool {
        self.major > MIN_SUPPORTED_MAJOR
            || (self.major == MIN_SUPPORTED_MAJOR && self.minor >= MIN_SUPPORTED_MINOR)
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("eye tracking host is not connected")]
    NotConnected,
    #[error("engine version query failed: {0}")]
    Version(String),
}

// ---------------------------------------------------------------------------
// Subscriptions
// ---------------------------------------------------------------------------

/// Handle for a registered state listener. Releasing unregisters the listener;
/// releasing twice is a no-op, and dropping an unreleased handle releases it.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(release: Box<dyn FnOnce() + Send>) -> Self {
        Self {
            release: Some(release),
        }
    }

    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

/// State-changed listeners run on whichever thread the host delivers events
/// on. They must only hand the value off, never touch UI-bound state.
pub type StateListener = Box<dyn Fn(EngineStateValue) + Send + 'static>;

// ---------------------------------------------------------------------------
// EyeTrackingHost — the engine-side collaborator interface
// ---------------------------------------------------------------------------

/// The slice of the eye tracking engine this demo consumes: two engine-state
/// subscriptions, a version query, and a gaze point stream.
pub trait EyeTrackingHost {
    /// Begin delivering events. Listeners registered before this call must
    /// not be missed.
    fn start(&self);

    /// Block until the engine connection is up, or the timeout expires.
    fn wait_until_connected(&self, timeout: Duration) -> bool;

    fn engine_version(&self) -> Result<EngineVersion, HostError>;

    fn subscribe_user_presence(&self, listener: StateListener) -> Subscription;

    fn subscribe_gaze_tracking(&self, listener: StateListener) -> Subscription;

    /// Continuous gaze point data. The receiver closes when the host shuts
    /// the stream down.
    fn create_gaze_stream(&self, mode: GazeStreamMode) -> Receiver<GazeSample>;
}
