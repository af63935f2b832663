//! In-memory challenge store with TTL and single-use semantics.
//!
//! Keyed by nonce, which is globally unique among live entries. The single
//! correctness-critical synchronization point of the whole protocol is
//! [`ChallengeStore::claim_and_consume`]: the map lock is held across
//! lookup and the consumed-state transition, so of N concurrent claims on
//! one nonce exactly one succeeds and the rest observe `AlreadyUsed`.
//!
//! Expiry is lazy: an expired entry answers `Expired` whenever it is
//! claimed, whether or not the background sweep has physically removed it
//! yet. Consumed entries are retained until their TTL so a replayed nonce
//! keeps answering `AlreadyUsed` instead of `NotFound`.

use crate::auth::challenge::Challenge;
use crate::auth::network::Network;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a failed claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimError {
    /// No live challenge under this (address, network, nonce).
    NotFound,
    /// The challenge was already consumed by an earlier claim.
    AlreadyUsed,
    /// The challenge's expiration time has passed.
    Expired,
}

/// Why an insert was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertError {
    /// A live challenge already carries this nonce; caller regenerates.
    DuplicateNonce,
    /// The store is at capacity.
    Busy,
}

struct Entry {
    challenge: Challenge,
    consumed: bool,
}

/// Ephemeral store of pending challenges. The only server-side state the
/// service holds.
pub struct ChallengeStore {
    entries: Mutex<HashMap<String, Entry>>,
    max_pending: usize,
}

impl ChallengeStore {
    pub fn new(max_pending: usize) -> Self {
        ChallengeStore {
            entries: Mutex::new(HashMap::new()),
            max_pending,
        }
    }

    /// Store a fresh challenge under its nonce.
    pub fn insert(&self, challenge: Challenge, now: DateTime<Utc>) -> Result<(), InsertError> {
        let mut entries = self.entries.lock();

        if entries.contains_key(&challenge.nonce) {
            return Err(InsertError::DuplicateNonce);
        }
        if entries.len() >= self.max_pending {
            // Expired entries don't count against capacity; make room
            // before refusing.
            entries.retain(|_, e| e.challenge.expiration_time > now);
            if entries.len() >= self.max_pending {
                return Err(InsertError::Busy);
            }
        }

        entries.insert(
            challenge.nonce.clone(),
            Entry {
                challenge,
                consumed: false,
            },
        );
        Ok(())
    }

    /// Atomically claim a challenge and mark it consumed.
    ///
    /// The transition happens before this returns, so the nonce is burned
    /// even if the caller goes on to reject the signature; a second
    /// captured signature for the same nonce cannot be replayed.
    pub fn claim_and_consume(
        &self,
        address: &str,
        network: Network,
        nonce: &str,
        now: DateTime<Utc>,
    ) -> Result<Challenge, ClaimError> {
        let mut entries = self.entries.lock();

        let entry = entries.get_mut(nonce).ok_or(ClaimError::NotFound)?;
        if entry.challenge.address != address || entry.challenge.network != network {
            return Err(ClaimError::NotFound);
        }
        if entry.challenge.expiration_time <= now {
            return Err(ClaimError::Expired);
        }
        if entry.consumed {
            return Err(ClaimError::AlreadyUsed);
        }

        entry.consumed = true;
        Ok(entry.challenge.clone())
    }

    /// Physically remove entries past their expiration time.
    ///
    /// Returns the number of entries purged.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, e| e.challenge.expiration_time > now);
        before - entries.len()
    }

    /// Number of entries currently held (consumed and pending alike).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// Run the periodic sweep of expired challenges.
///
/// Lazy expiry in `claim_and_consume` is authoritative; this loop only
/// bounds memory held by challenges nobody ever presents.
pub async fn run_sweep_loop(store: Arc<ChallengeStore>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;

        let purged = store.sweep(Utc::now());
        if purged > 0 {
            tracing::debug!(purged, "Swept expired challenges");
        }
    }
}
