//! The synchronization engine.
//!
//! A [`SessionManager`] owns one session per connection id. Each running
//! session has exactly one worker thread that polls the source of every
//! complete endpoint mapping, detects change against the cached response and
//! pushes the computed payload to the target (or into variables). Any error
//! in a cycle stops the whole session; there is no retry.

mod apply;
mod params;
mod session;
mod worker;

pub use session::{LogEntry, LogLevel, SessionLog, SessionState};

use crate::client::{ApiClient, TransformRegistry};
use crate::config::SyncConfig;
use crate::error::{StateError, SyncError};
use crate::store::{CacheStore, ConfigStore};
use ahash::AHashMap;
use parking_lot::Mutex;
use session::{SessionShared, SyncSession};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use worker::Worker;

const JOIN_POLL: Duration = Duration::from_millis(10);

pub struct SessionManager {
    store: Arc<dyn ConfigStore>,
    client: Arc<dyn ApiClient>,
    transforms: Arc<dyn TransformRegistry>,
    cache: Arc<dyn CacheStore>,
    config: SyncConfig,
    sessions: Mutex<AHashMap<String, SyncSession>>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        client: Arc<dyn ApiClient>,
        transforms: Arc<dyn TransformRegistry>,
        cache: Arc<dyn CacheStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            client,
            transforms,
            cache,
            config,
            sessions: Mutex::new(AHashMap::new()),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Starts a session with the configured poll interval and cache policy.
    pub fn start_with_defaults(&self, connection_id: &str) -> Result<(), SyncError> {
        self.start(
            connection_id,
            self.config.poll_interval(),
            self.config.clear_cache_on_stop,
        )
    }

    /// Starts synchronizing a connection.
    ///
    /// Rejected when a session for the connection is still running or
    /// stopping, when the stored connection is not complete, or when it has
    /// no complete mapping to work on.
    pub fn start(
        &self,
        connection_id: &str,
        poll_interval: Duration,
        clear_cache_on_stop: bool,
    ) -> Result<(), SyncError> {
        let mut sessions = self.sessions.lock();
        if let Some(existing) = sessions.get_mut(connection_id) {
            if existing.shared.state() != SessionState::Stopped {
                return Err(StateError::AlreadyRunning(connection_id.to_string()).into());
            }
            // A worker detached by `stop` may still be inside a call.
            let busy = existing.handle.as_ref().is_some_and(|h| !h.is_finished());
            if busy && existing.shared.is_detached() {
                return Err(StateError::AlreadyRunning(connection_id.to_string()).into());
            }
            // Otherwise the old worker stopped itself and is only returning.
            if let Some(old) = existing.handle.take() {
                let _ = old.join();
            }
        }

        let connection = self.store.connection(connection_id)?;
        if !connection.state.is_complete() {
            return Err(StateError::Incomplete {
                connection_id: connection_id.to_string(),
                state: connection.state.to_string(),
            }
            .into());
        }
        if !connection
            .endpoint_mappings
            .iter()
            .any(|m| m.complete && !m.recommendation)
        {
            return Err(StateError::NoSyncableMapping(connection_id.to_string()).into());
        }

        let log = SessionLog::new(self.config.log_file.clone());
        let shared = Arc::new(SessionShared::new(connection_id, log, clear_cache_on_stop));
        shared.log.info(format!(
            "Started synchronization of '{}' every {} seconds",
            connection.name,
            poll_interval.as_secs()
        ));
        let worker = Worker {
            shared: Arc::clone(&shared),
            store: Arc::clone(&self.store),
            client: Arc::clone(&self.client),
            transforms: Arc::clone(&self.transforms),
            cache: Arc::clone(&self.cache),
            poll_interval,
        };
        let handle = thread::Builder::new()
            .name(format!("sync-{}", connection_id))
            .spawn(move || worker.run())
            .map_err(|e| SyncError::Spawn(e.to_string()))?;
        info!(connection_id, poll_interval_secs = poll_interval.as_secs(), "Session started");

        sessions.insert(
            connection_id.to_string(),
            SyncSession {
                shared,
                handle: Some(handle),
            },
        );
        Ok(())
    }

    /// Stops a running session.
    ///
    /// Raises the stop flag and waits up to the grace period for the worker
    /// to exit. A worker stuck in a call is detached: it sends nothing more
    /// and exits once the call returns, and the connection cannot be started
    /// again until it has.
    pub fn stop(&self, connection_id: &str) -> Result<(), SyncError> {
        let (shared, handle) = {
            let mut sessions = self.sessions.lock();
            let session = sessions
                .get_mut(connection_id)
                .filter(|s| s.shared.state() == SessionState::Running)
                .ok_or_else(|| StateError::NotRunning(connection_id.to_string()))?;
            session.shared.request_stop();
            (Arc::clone(&session.shared), session.handle.take())
        };

        if let Some(handle) = handle {
            let deadline = Instant::now() + self.config.stop_grace();
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(JOIN_POLL);
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                warn!(connection_id, "Worker still busy after the grace period, detaching");
                shared.detach();
                // The entry may already belong to a newer session.
                if let Some(session) = self.sessions.lock().get_mut(connection_id) {
                    if Arc::ptr_eq(&session.shared, &shared) {
                        session.handle = Some(handle);
                    }
                }
            }
        }

        shared.finish(self.cache.as_ref());
        shared.log.info("Stopped synchronization");
        info!(connection_id, "Session stopped");
        Ok(())
    }

    /// `Stopped` for connections that never had a session.
    pub fn state(&self, connection_id: &str) -> SessionState {
        self.sessions
            .lock()
            .get(connection_id)
            .map(|s| s.shared.state())
            .unwrap_or(SessionState::Stopped)
    }

    /// The log of the connection's latest session.
    pub fn log(&self, connection_id: &str) -> Option<SessionLog> {
        self.sessions
            .lock()
            .get(connection_id)
            .map(|s| s.shared.log.clone())
    }

    /// Ids of the connections whose session is running.
    pub fn running(&self) -> Vec<String> {
        self.sessions
            .lock()
            .iter()
            .filter(|(_, s)| s.shared.state() == SessionState::Running)
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Stops every running session.
    pub fn stop_all(&self) {
        for connection_id in self.running() {
            if let Err(e) = self.stop(&connection_id) {
                warn!(connection_id = %connection_id, error = %e, "Could not stop session");
            }
        }
    }
}
