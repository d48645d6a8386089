// Simulated eye tracking host.
//
// Replays a scripted event sequence on a background thread so the demo binary
// and integration tests can run the full pipeline without tracker hardware.
// One-shot: `start` consumes the script; once replay finishes all listeners
// and stream senders are dropped, which closes every downstream channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::{
    EngineStateValue, EngineVersion, EyeTrackingHost, GazeSample, GazeStreamMode, HostError,
    StateListener, Subscription,
};

/// One scripted host action. `Wait` is real wall-clock time, so blink
/// intervals replay with their intended durations.
#[derive(Debug, Clone, Copy)]
pub enum SimStep {
    Present(bool),
    Tracked(bool),
    Sample(f64, f64),
    Wait(u64),
}

#[derive(Default)]
struct Listeners {
    presence: Vec<(u64, StateListener)>,
    tracking: Vec<(u64, StateListener)>,
}

pub struct SimulatedHost {
    version: EngineVersion,
    connected: bool,
    script: Mutex<Vec<SimStep>>,
    listeners: Arc<Mutex<Listeners>>,
    gaze_senders: Arc<Mutex<Vec<Sender<GazeSample>>>>,
    next_listener_id: AtomicU64,
}

impl SimulatedHost {
    pub fn new(version: EngineVersion, script: Vec<SimStep>) -> Self {
        Self {
            version,
            connected: true,
            script: Mutex::new(script),
            listeners: Arc::new(Mutex::new(Listeners::default())),
            gaze_senders: Arc::new(Mutex::new(Vec::new())),
            next_listener_id: AtomicU64::new(0),
        }
    }

    /// Simulate an engine that never comes up. `wait_until_connected` then
    /// reports failure and the version query errors.
    pub fn disconnected(version: EngineVersion) -> Self {
        let mut host = Self::new(version, Vec::new());
        host.connected = false;
        host
    }

    fn subscribe(&self, kind: ListenerKind, listener: StateListener) -> Subscription {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut listeners = lock(&self.listeners);
            match kind {
                ListenerKind::Presence => listeners.presence.push((id, listener)),
                ListenerKind::Tracking => listeners.tracking.push((id, listener)),
            }
        }

        let registry = Arc::clone(&self.listeners);
        Subscription::new(Box::new(move || {
            let mut listeners = lock(&registry);
            match kind {
                ListenerKind::Presence => listeners.presence.retain(|(lid, _)| *lid != id),
                ListenerKind::Tracking => listeners.tracking.retain(|(lid, _)| *lid != id),
            }
        }))
    }
}

#[derive(Clone, Copy)]
enum ListenerKind {
    Presence,
    Tracking,
}

impl EyeTrackingHost for SimulatedHost {
    fn start(&self) {
        let script = std::mem::take(&mut *lock(&self.script));
        let listeners = Arc::clone(&self.listeners);
        let gaze_senders = Arc::clone(&self.gaze_senders);

        thread::spawn(move || {
            // Host timestamps tick at ~60 Hz per emitted sample.
            let mut timestamp_us: u64 = 0;

            for step in script {
                match step {
                    SimStep::Present(present) => {
                        let value = EngineStateValue {
                            is_valid: true,
                            is_active: present,
                        };
                        for (_, listener) in &lock(&listeners).presence {
                            listener(value);
                        }
                    }
                    SimStep::Tracked(tracked) => {
                        let value = EngineStateValue {
                            is_valid: true,
                            is_active: tracked,
                        };
                        for (_, listener) in &lock(&listeners).tracking {
                            listener(value);
                        }
                    }
                    SimStep::Sample(x, y) => {
                        timestamp_us += 16_000;
                        let sample = GazeSample {
                            x,
                            y,
                            timestamp_us,
                        };
                        for tx in lock(&gaze_senders).iter() {
                            let _ = tx.send(sample);
                        }
                    }
                    SimStep::Wait(ms) => thread::sleep(Duration::from_millis(ms)),
                }
            }

            // End of script: drop every listener and stream sender so
            // consumers observe a clean host shutdown.
            *lock(&listeners) = Listeners::default();
            lock(&gaze_senders).clear();
            tracing::debug!("simulated host script finished");
        });
    }

    fn wait_until_connected(&self, _timeout: Duration) -> bool {
        self.connected
    }

    fn engine_version(&self) -> Result<EngineVersion, HostError> {
        if !self.connected {
            return Err(HostError::NotConnected);
        }
        Ok(self.version)
    }

    fn subscribe_user_presence(&self, listener: StateListener) -> Subscription {
        self.subscribe(ListenerKind::Presence, listener)
    }

    fn subscribe_gaze_tracking(&self, listener: StateListener) -> Subscription {
        self.subscribe(ListenerKind::Tracking, listener)
    }

    fn create_gaze_stream(&self, _mode: GazeStreamMode) -> Receiver<GazeSample> {
        let (tx, rx) = unbounded();
        lock(&self.gaze_senders).push(tx);
        rx
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
