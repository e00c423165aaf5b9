/// In-memory login sessions with expiry
///
/// Expired sessions are dropped lazily on `get` and eagerly by a periodic
/// sweep task started with `start_cleanup`.
use crate::clock::SharedClock;
use crate::errors::{CoinOpsError, CoinOpsResult};
use crate::logger::{self, LogTag};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

pub const SESSION_COOKIE_NAME: &str = "coinops_session";

const SESSION_ID_BYTES: usize = 32;

pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    clock: SharedClock,
    timeout: Duration,
    shutdown: Notify,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl SessionStore {
    pub fn new(clock: SharedClock, timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock,
            timeout,
            shutdown: Notify::new(),
            sweeper: Mutex::new(None),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn create(&self, username: &str) -> CoinOpsResult<Session> {
        let id = generate_session_id()?;
        let created_at = self.clock.utc_now();
        let timeout = chrono::Duration::from_std(self.timeout)
            .map_err(|e| CoinOpsError::Session(format!("invalid session timeout: {}", e)))?;

        let session = Session {
            id: id.clone(),
            username: username.to_string(),
            created_at,
            expires_at: created_at + timeout,
        };

        self.sessions.write().insert(id, session.clone());
        logger::debug(LogTag::Sessions, &format!("Created session for '{}'", username));
        Ok(session)
    }

    /// Live session by id; an expired one is removed and reported as absent
    pub fn get(&self, id: &str) -> Option<Session> {
        let session = self.sessions.read().get(id).cloned()?;

        if session.is_expired(self.clock.utc_now()) {
            self.delete(id);
            return None;
        }
        Some(session)
    }

    pub fn delete(&self, id: &str) {
        self.sessions.write().remove(id);
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Remove every expired session, returning how many were dropped
    pub fn cleanup(&self) -> usize {
        let now = self.clock.utc_now();
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        before - sessions.len()
    }

    /// Spawn the periodic sweep; a second call is a no-op
    pub fn start_cleanup(self: &Arc<Self>, interval: Duration) {
        let mut sweeper = self.sweeper.lock();
        if sweeper.is_some() {
            return;
        }

        let store = Arc::clone(self);
        *sweeper = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // the first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = store.cleanup();
                        if removed > 0 {
                            logger::debug(
                                LogTag::Sessions,
                                &format!("Swept {} expired sessions", removed),
                            );
                        }
                    }
                    _ = store.shutdown.notified() => break,
                }
            }
        }));
    }

    /// Stop the sweep task
    pub fn close(&self) {
        self.shutdown.notify_one();
        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
        }
    }
}

fn generate_session_id() -> CoinOpsResult<String> {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| CoinOpsError::Session(format!("failed to generate session id: {}", e)))?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}
