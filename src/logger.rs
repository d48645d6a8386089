use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam_channel::{bounded, Sender};
use serde::Serialize;

use crate::gesture::PanDirection;

/// One session-log record. Timestamps are wall-clock milliseconds.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEntry {
    /// Presence state as delivered to the model.
    Presence { t: u64, present: bool },
    /// Gaze tracking state as delivered to the model.
    Tracking { t: u64, tracked: bool },
    /// Eyes-closed edge (closure captured).
    EyesClosed { t: u64 },
    /// Tracking regained; `gesture` records the classification outcome.
    Reopen { t: u64, delay_ms: u64, gesture: bool },
    /// A pan command was issued to the magnifier.
    Pan { t: u64, direction: PanDirection },
    /// Session end marker.
    End,
}

/// Writes session records as NDJSON. File IO runs on a background thread so
/// the UI loop sends without blocking.
pub struct SessionLogger {
    pub log_path: PathBuf,
    handle: thread::JoinHandle<()>,
}

impl SessionLogger {
    /// Start the logger and return the entry `Sender`. The sender can be
    /// cloned across threads; entries are dropped rather than blocking when
    /// the channel is full.
    pub fn start(log_path: PathBuf) -> (Self, Sender<LogEntry>) {
        let (tx, rx) = bounded::<LogEntry>(512);
        let path_clone = log_path.clone();

        let handle = thread::spawn(move || {
            if let Some(parent) = path_clone.parent() {
                let _ = fs::create_dir_all(parent);
            }

            let file = match File::create(&path_clone) {
                Ok(f) => f,
                Err(e) => {
                    tracing::error!("SessionLogger: failed to create {:?}: {}", path_clone, e);
                    return;
                }
            };

            let mut writer = BufWriter::new(file);

            let _ = writeln!(writer, r#"{{"type":"meta","session_start":{}}}"#, now_ms());

            tracing::info!("SessionLogger: writing to {:?}", path_clone);

            while let Ok(entry) = rx.recv() {
                let is_end = matches!(entry, LogEntry::End);
                match serde_json::to_string(&entry) {
                    Ok(line) => {
                        let _ = writeln!(writer, "{}", line);
                    }
                    Err(e) => tracing::warn!("SessionLogger: serialize failed: {}", e),
                }
                if is_end {
                    let _ = writeln!(writer, r#"{{"type":"meta","session_end":{}}}"#, now_ms());
                    break;
                }

                let _ = writer.flush();
            }

            let _ = writer.flush();
            tracing::info!("SessionLogger: session closed");
        });

        let logger = Self { log_path, handle };

        (logger, tx)
    }

    /// Wait for the writer thread to finish flushing. Call after sending
    /// `LogEntry::End` (or after dropping every sender).
    pub fn close(self) {
        let _ = self.handle.join();
    }
}

/// Wall-clock milliseconds since the UNIX epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Documents/presence-pan-sessions/presence_<unix-secs>.ndjson, overridable
/// with the PRESENCE_PAN_LOG environment variable.
pub fn default_log_path() -> PathBuf {
    if let Ok(path) = std::env::var("PRESENCE_PAN_LOG") {
        return PathBuf::from(path);
    }

    let base = std::env::var("USERPROFILE")
        .or_else(|_| std::env::var("HOME"))
        .unwrap_or_else(|_| ".".to_string());

    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    PathBuf::from(base)
        .join("Documents")
        .join("presence-pan-sessions")
        .join(format!("presence_{}.ndjson", secs))
}
