//! Reservation Ledger
//!
//! Process-lifetime record of where each (user, resource) request stands in
//! the validate -> provide -> release progression.
//!
//! The ledger is bounded: once it holds more than its limit, the oldest
//! settled entries (released or unvalidated) are evicted. An evicted release
//! is forgotten, so releasing it again reaches the backend once more.

use super::payload::ReservationRequest;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReservationState {
    #[default]
    Unvalidated,
    Validated,
    Provisioned,
    /// Terminate is in flight
    Releasing,
    Released,
}

impl ReservationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unvalidated => "unvalidated",
            Self::Validated => "validated",
            Self::Provisioned => "provisioned",
            Self::Releasing => "releasing",
            Self::Released => "released",
        }
    }

    /// Nothing further is pending for a request in this state
    fn is_settled(&self) -> bool {
        matches!(self, Self::Unvalidated | Self::Released)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReservationKey {
    pub user_name: String,
    pub resource_id: String,
    pub resource_name: String,
}

impl From<&ReservationRequest> for ReservationKey {
    fn from(request: &ReservationRequest) -> Self {
        Self {
            user_name: request.user_name.clone(),
            resource_id: request.resource_id.clone(),
            resource_name: request.resource_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LedgerEntry {
    pub state: ReservationState,
    pub updated_at: DateTime<Utc>,
}

const DEFAULT_MAX_ENTRIES: usize = 4096;

#[derive(Debug)]
pub struct ReservationLedger {
    entries: HashMap<ReservationKey, LedgerEntry>,
    max_entries: usize,
}

impl Default for ReservationLedger {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }
}

impl ReservationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_entries,
        }
    }

    /// Current state; requests never seen are unvalidated
    pub fn state(&self, key: &ReservationKey) -> ReservationState {
        self.entries
            .get(key)
            .map(|entry| entry.state)
            .unwrap_or_default()
    }

    pub fn entry(&self, key: &ReservationKey) -> Option<&LedgerEntry> {
        self.entries.get(key)
    }

    /// Move `key` to `state`, returning the previous state
    pub fn record(&mut self, key: ReservationKey, state: ReservationState) -> ReservationState {
        let previous = self.state(&key);
        tracing::debug!(
            "{} / {} ({}): {} -> {}",
            key.user_name,
            key.resource_name,
            key.resource_id,
            previous.as_str(),
            state.as_str()
        );
        self.entries.insert(
            key.clone(),
            LedgerEntry {
                state,
                updated_at: Utc::now(),
            },
        );
        self.evict_settled(&key);
        previous
    }

    /// Claim `key` for a release. Returns the state to roll back to, or
    /// `None` when the request is already released or being released.
    pub fn begin_release(&mut self, key: &ReservationKey) -> Option<ReservationState> {
        match self.state(key) {
            ReservationState::Releasing | ReservationState::Released => None,
            _ => Some(self.record(key.clone(), ReservationState::Releasing)),
        }
    }

    /// Drop the oldest settled entries other than `keep` while over the limit
    fn evict_settled(&mut self, keep: &ReservationKey) {
        let excess = self.entries.len().saturating_sub(self.max_entries);
        if excess == 0 {
            return;
        }

        let mut settled: Vec<(DateTime<Utc>, ReservationKey)> = self
            .entries
            .iter()
            .filter(|(key, entry)| *key != keep && entry.state.is_settled())
            .map(|(key, entry)| (entry.updated_at, key.clone()))
            .collect();
        settled.sort_by(|a, b| a.0.cmp(&b.0));

        for (_, key) in settled.into_iter().take(excess) {
            self.entries.remove(&key);
        }
        tracing::debug!("Ledger trimmed to {} entries", self.entries.len());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(user: &str) -> ReservationKey {
        ReservationKey {
            user_name: user.to_string(),
            resource_id: "surrey-ue".to_string(),
            resource_name: "my-ue".to_string(),
        }
    }

    #[test]
    fn test_unknown_key_is_unvalidated() {
        let ledger = ReservationLedger::new();
        assert_eq!(ledger.state(&key("alice")), ReservationState::Unvalidated);
        assert!(ledger.entry(&key("alice")).is_none());
    }

    #[test]
    fn test_record_progression() {
        let mut ledger = ReservationLedger::new();
        assert_eq!(
            ledger.record(key("alice"), ReservationState::Validated),
            ReservationState::Unvalidated
        );
        assert_eq!(
            ledger.record(key("alice"), ReservationState::Provisioned),
            ReservationState::Validated
        );
        assert_eq!(
            ledger.record(key("alice"), ReservationState::Released),
            ReservationState::Provisioned
        );
        assert_eq!(ledger.state(&key("alice")), ReservationState::Released);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_users_are_tracked_separately() {
        let mut ledger = ReservationLedger::new();
        ledger.record(key("alice"), ReservationState::Released);
        assert_eq!(ledger.state(&key("bob")), ReservationState::Unvalidated);
    }

    #[test]
    fn test_record_stamps_time() {
        let mut ledger = ReservationLedger::new();
        let before = Utc::now();
        ledger.record(key("alice"), ReservationState::Validated);
        assert!(ledger.entry(&key("alice")).unwrap().updated_at >= before);
    }

    #[test]
    fn test_begin_release_claims_once() {
        let mut ledger = ReservationLedger::new();
        ledger.record(key("alice"), ReservationState::Provisioned);

        assert_eq!(
            ledger.begin_release(&key("alice")),
            Some(ReservationState::Provisioned)
        );
        assert_eq!(ledger.state(&key("alice")), ReservationState::Releasing);
        assert_eq!(ledger.begin_release(&key("alice")), None);

        ledger.record(key("alice"), ReservationState::Released);
        assert_eq!(ledger.begin_release(&key("alice")), None);
    }

    #[test]
    fn test_ledger_evicts_oldest_settled_entries() {
        let mut ledger = ReservationLedger::with_max_entries(2);
        ledger.record(key("alice"), ReservationState::Released);
        ledger.record(key("bob"), ReservationState::Provisioned);
        ledger.record(key("carol"), ReservationState::Released);

        assert_eq!(ledger.len(), 2);
        assert!(ledger.entry(&key("alice")).is_none());
        assert_eq!(ledger.state(&key("bob")), ReservationState::Provisioned);
        assert_eq!(ledger.state(&key("carol")), ReservationState::Released);
    }

    #[test]
    fn test_ledger_keeps_pending_entries_over_limit() {
        let mut ledger = ReservationLedger::with_max_entries(1);
        ledger.record(key("alice"), ReservationState::Provisioned);
        ledger.record(key("bob"), ReservationState::Validated);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.state(&key("alice")), ReservationState::Provisioned);
    }
}
