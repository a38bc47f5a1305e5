//! Values with an expiry time.

use std::time::Duration;
use tokio::time::Instant;

//------------ TimedValue ----------------------------------------------------

/// A value that is only valid up to a point in time.
///
/// DNS records come with a time to live in seconds relative to the
/// moment the authoritative server produced them. This type pins that
/// relative value to an absolute instant: the moment the UDP exchange
/// for the carrying response started. Anchoring at the start of the
/// exchange rather than at parse time means that queueing and parsing
/// latency eat into the record's freshness instead of extending it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimedValue<T> {
    /// The wrapped value.
    value: T,

    /// The point in time at which the value becomes invalid.
    expires_at: Instant,
}

impl<T> TimedValue<T> {
    /// Creates a new timed value.
    pub fn new(value: T, expires_at: Instant) -> Self {
        TimedValue { value, expires_at }
    }

    /// Returns a reference to the wrapped value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Converts the timed value into its wrapped value.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Returns the instant at which the value expires.
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Returns the remaining time to live.
    ///
    /// Returns zero for an expired value.
    pub fn ttl(&self) -> Duration {
        self.expires_at
            .saturating_duration_since(Instant::now())
    }

    /// Returns whether the value has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Instant::now()
    }

    /// Caps the expiry time to the given ceiling.
    ///
    /// An answer reached through a CNAME chain is only as fresh as the
    /// shortest-lived link of the chain, so its records get their expiry
    /// clamped to the chain's minimum.
    pub fn clamp_expiry(self, ceiling: Instant) -> Self {
        TimedValue {
            value: self.value,
            expires_at: self.expires_at.min(ceiling),
        }
    }

    /// Maps the wrapped value, keeping the expiry time.
    pub fn map<U, F: FnOnce(T) -> U>(self, op: F) -> TimedValue<U> {
        TimedValue {
            value: op(self.value),
            expires_at: self.expires_at,
        }
    }
}

//============ Testing =======================================================
