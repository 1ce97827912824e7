// Admin session gate. A presentation-layer flag, not access control: the
// digest and the record are both readable and forgeable by whoever holds
// the storage.
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::digest::hash_password;
use crate::clock::Clock;
use crate::error::StoreResult;
use crate::storage::{KeyValueStore, SESSION_KEY};

/// Default admin session length.
pub const SESSION_HOURS: u64 = 24;

/// Longest session a config may ask for (one year).
pub const MAX_SESSION_HOURS: u64 = 24 * 366;

/// Session length for `hours`, or `None` when it is zero or above
/// `MAX_SESSION_HOURS`.
pub fn session_length(hours: u64) -> Option<Duration> {
    if hours == 0 || hours > MAX_SESSION_HOURS {
        return None;
    }
    Duration::try_hours(i64::try_from(hours).ok()?)
}

/// Persisted form of an admin session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(default)]
    pub authenticated: bool,
    /// Unix epoch milliseconds.
    pub expiry: i64,
}

impl SessionRecord {
    pub fn new(expires_at: DateTime<Utc>) -> Self {
        Self {
            authenticated: true,
            expiry: expires_at.timestamp_millis(),
        }
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now.timestamp_millis() < self.expiry
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.expiry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// Persisted state not read yet.
    Unknown,
    Guest,
    Admin,
}

impl GateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Unknown => "unknown",
            GateState::Guest => "guest",
            GateState::Admin => "admin",
        }
    }
}

pub struct SessionGate {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    reference_digest: String,
    session_length: Duration,
    state: GateState,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionGate {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        reference_digest: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            clock,
            reference_digest: reference_digest.into(),
            session_length: Duration::hours(SESSION_HOURS as i64),
            state: GateState::Unknown,
            expires_at: None,
        }
    }

    /// Out-of-range lengths are ignored and the current length kept.
    pub fn with_session_hours(mut self, hours: u64) -> Self {
        match session_length(hours) {
            Some(length) => self.session_length = length,
            None => tracing::warn!(
                "Ignoring session length of {} hours, keeping {} hours",
                hours,
                self.session_length.num_hours()
            ),
        }
        self
    }

    /// Read the persisted record and settle on Guest or Admin. Expired and
    /// unparsable records are removed. Nothing here can produce Admin except
    /// a record that parses and has not expired.
    pub fn initialize(&mut self) -> GateState {
        let now = self.clock.now();

        let raw = match self.storage.get(SESSION_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Could not read session record: {}", e);
                return self.become_guest();
            }
        };

        let Some(raw) = raw else {
            return self.become_guest();
        };

        match serde_json::from_str::<SessionRecord>(&raw) {
            Ok(record) if record.is_valid(now) => {
                self.state = GateState::Admin;
                self.expires_at = record.expires_at();
                tracing::debug!("Restored admin session until {:?}", self.expires_at);
            }
            Ok(_) => {
                tracing::info!("Admin session expired");
                self.clear_record();
                self.become_guest();
            }
            Err(e) => {
                tracing::warn!("Discarding corrupt session record: {}", e);
                self.clear_record();
                self.become_guest();
            }
        }

        self.state
    }

    /// Current state. An Admin whose session ran out reads as Guest; the
    /// stale record itself is only cleared by the next `initialize`.
    pub fn state(&self) -> GateState {
        match (self.state, self.expires_at) {
            (GateState::Admin, Some(expires_at)) if self.clock.now() >= expires_at => {
                GateState::Guest
            }
            (state, _) => state,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.state() == GateState::Admin
    }

    /// True until `initialize` has run.
    pub fn is_loading(&self) -> bool {
        self.state == GateState::Unknown
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at.filter(|_| self.is_admin())
    }

    /// Compare the password's digest with the reference digest. On a match
    /// a fresh session record is written and the gate becomes Admin. A
    /// mismatch writes nothing and changes nothing.
    pub fn login(&mut self, password: &str) -> StoreResult<bool> {
        if hash_password(password) != self.reference_digest {
            tracing::info!("Admin login rejected");
            return Ok(false);
        }

        let expires_at = self.clock.now() + self.session_length;
        let record = SessionRecord::new(expires_at);
        self.storage
            .set(SESSION_KEY, &serde_json::to_string(&record)?)?;

        self.state = GateState::Admin;
        self.expires_at = Some(expires_at);
        tracing::info!("Admin session started, expires {}", expires_at);
        Ok(true)
    }

    /// Drop the session record and become Guest. Safe to call as a guest.
    pub fn logout(&mut self) -> StoreResult<()> {
        self.storage.remove(SESSION_KEY)?;
        self.become_guest();
        tracing::info!("Admin session ended");
        Ok(())
    }

    fn become_guest(&mut self) -> GateState {
        self.state = GateState::Guest;
        self.expires_at = None;
        self.state
    }

    fn clear_record(&self) {
        if let Err(e) = self.storage.remove(SESSION_KEY) {
            tracing::error!("Could not clear session record: {}", e);
        }
    }
}
