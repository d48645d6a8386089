// UI marshaling queue.
//
// Host notifications arrive on background threads, but every observable
// property mutation must happen on the single UI execution context. Producers
// post typed commands here; the UI side drains them in FIFO order and is the
// only code that ever touches the model.

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::host::{EngineStateValue, GazeSample};

#[derive(Debug, Clone, Copy)]
pub enum ModelCommand {
    UserPresence(EngineStateValue),
    GazeTracking(EngineStateValue),
    GazeSample(GazeSample),
}

/// Producer half. Cloned into each host listener; posting never blocks.
#[derive(Clone)]
pub struct UiSender {
    tx: Sender<ModelCommand>,
}

impl UiSender {
    pub fn post(&self, command: ModelCommand) {
        // A closed queue means the UI loop is gone; nothing left to update.
        let _ = self.tx.send(command);
    }
}

/// Create the queue. The receiver closes once every `UiSender` clone has
/// been dropped, which is how the drain loop learns the host went away.
pub fn ui_queue() -> (UiSender, Receiver<ModelCommand>) {
    let (tx, rx) = unbounded();
    (UiSender { tx }, rx)
}
