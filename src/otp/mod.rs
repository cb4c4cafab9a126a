//! Ephemeral key-value store for OTP codes and cooldown markers.
//!
//! Codes live under `otp:{email}` and cooldown markers under
//! `otp_cooldown:{email}`, each with its own TTL. The store is injected as a
//! trait object so handlers can run against the in-memory implementation in
//! tests and a shared cache in production.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// TTL for an issued OTP code.
pub const OTP_TTL: Duration = Duration::from_secs(300);

/// Minimum wait between two OTP sends for the same email.
pub const OTP_COOLDOWN: Duration = Duration::from_secs(60);

#[must_use]
pub fn otp_key(email: &str) -> String {
    format!("otp:{email}")
}

#[must_use]
pub fn cooldown_key(email: &str) -> String {
    format!("otp_cooldown:{email}")
}

/// Ephemeral store contract consumed by the OTP flow.
///
/// Entries vanish after their TTL elapses, independent of explicit deletion;
/// `set` on an existing key replaces the value and resets the TTL.
pub trait OtpStore: Send + Sync {
    fn set(&self, key: &str, value: &str, ttl: Duration);

    fn get(&self, key: &str) -> Option<String>;

    fn delete(&self, key: &str);

    /// Atomically delete `key` if its live value equals `expected`.
    ///
    /// Returns `true` when the value matched and was removed. Concurrent
    /// calls with the same key and value see at most one `true`, which is
    /// what enforces single-use verification. A non-matching `expected`
    /// leaves the entry in place.
    fn take_matching(&self, key: &str, expected: &str) -> bool;
}

struct Entry {
    value: String,
    deadline: Instant,
}

/// Mutex-guarded map with per-entry deadlines, evicted lazily on access.
#[derive(Default)]
pub struct MemoryOtpStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryOtpStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl OtpStore for MemoryOtpStore {
    fn set(&self, key: &str, value: &str, ttl: Duration) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        // Piggyback a sweep so abandoned keys do not accumulate.
        let now = Instant::now();
        entries.retain(|_, entry| entry.deadline > now);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                deadline: now + ttl,
            },
        );
    }

    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if entry.deadline > Instant::now() => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn delete(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.remove(key);
    }

    fn take_matching(&self, key: &str, expected: &str) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let matched = match entries.get(key) {
            Some(entry) if entry.deadline <= Instant::now() => {
                entries.remove(key);
                return false;
            }
            Some(entry) => entry.value == expected,
            None => false,
        };
        if matched {
            entries.remove(key);
        }
        matched
    }
}
