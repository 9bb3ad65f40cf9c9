use crate::store::CacheStore;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use tracing::warn;

/// Lifecycle of a sync session: `Stopped -> Running -> Stopping -> Stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    Stopped,
    Running,
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => f.write_str("INFO"),
            LogLevel::Error => f.write_str("ERROR"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

/// Append-only log of one sync session, shared between the worker and
/// status readers. Optionally mirrored line by line to a file.
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    entries: Arc<Mutex<Vec<LogEntry>>>,
    file: Option<PathBuf>,
}

impl SessionLog {
    pub fn new(file: Option<PathBuf>) -> Self {
        Self {
            entries: Arc::default(),
            file,
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(LogLevel::Info, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(LogLevel::Error, message.into());
    }

    fn push(&self, level: LogLevel, message: String) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            message,
        };
        if let Some(path) = &self.file {
            let written = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| {
                    writeln!(
                        file,
                        "{} [{}] {}",
                        entry.timestamp.to_rfc3339(),
                        entry.level,
                        entry.message
                    )
                });
            if let Err(e) = written {
                warn!(path = %path.display(), error = %e, "Could not mirror session log entry");
            }
        }
        self.entries.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Entries appended after the first `seen`, for incremental readers.
    pub fn entries_since(&self, seen: usize) -> Vec<LogEntry> {
        self.entries.lock().iter().skip(seen).cloned().collect()
    }

    pub fn errors(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .iter()
            .filter(|e| e.level == LogLevel::Error)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// State shared between the session manager and the session's worker.
pub(crate) struct SessionShared {
    pub(crate) connection_id: String,
    state: Mutex<SessionState>,
    stop: AtomicBool,
    detached: AtomicBool,
    pub(crate) log: SessionLog,
    clear_cache_on_stop: bool,
}

impl SessionShared {
    pub(crate) fn new(connection_id: &str, log: SessionLog, clear_cache_on_stop: bool) -> Self {
        Self {
            connection_id: connection_id.to_string(),
            state: Mutex::new(SessionState::Running),
            stop: AtomicBool::new(false),
            detached: AtomicBool::new(false),
            log,
            clear_cache_on_stop,
        }
    }

    pub(crate) fn state(&self) -> SessionState {
        *self.state.lock()
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::SeqCst)
    }

    /// Raises the stop flag and moves `Running` to `Stopping`.
    pub(crate) fn request_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
        let mut state = self.state.lock();
        if *state == SessionState::Running {
            *state = SessionState::Stopping;
        }
    }

    /// Final transition to `Stopped`, purging the cache when requested.
    /// Returns `false` if the session had already stopped.
    pub(crate) fn finish(&self, cache: &dyn CacheStore) -> bool {
        self.stop.store(true, Ordering::SeqCst);
        let mut state = self.state.lock();
        if *state == SessionState::Stopped {
            return false;
        }
        if self.clear_cache_on_stop {
            cache.purge(&self.connection_id);
        }
        *state = SessionState::Stopped;
        true
    }

    /// Marks the worker as outliving its session's stop.
    pub(crate) fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

/// Registry entry for one connection.
pub(crate) struct SyncSession {
    pub(crate) shared: Arc<SessionShared>,
    pub(crate) handle: Option<JoinHandle<()>>,
}
