//! Observation cache keyed by hazard, provider version, and coordinates.
//!
//! The key incorporates the provider's version token so that a scoring or
//! upstream contract change invalidates stale entries without a manual purge.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::risk::domain::{Hazard, HazardObservation};

/// Observations stay valid for 24 hours.
pub const OBSERVATION_TTL: Duration = Duration::from_secs(86_400);

/// Key-value capability the provider registry relies on. Concurrent misses
/// for the same key may both compute and write; last write wins, which is
/// acceptable since the value is cache-stable for the TTL.
pub trait ObservationCache: Send + Sync {
    fn get(&self, key: &str) -> Option<HazardObservation>;
    fn put(&self, key: &str, observation: HazardObservation, ttl: Duration);
}

/// Builds the ASCII cache key `risk_{hazard}_{version}_{lat}_{lng}` with
/// coordinates rounded to 6 decimals.
pub fn observation_key(hazard: Hazard, version: &str, lat: f64, lng: f64) -> String {
    format!(
        "risk_{}_{}_{:.6}_{:.6}",
        hazard.as_str(),
        sanitize_token(version),
        lat,
        lng
    )
}

fn sanitize_token(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut last_was_filler = false;
    for ch in value.trim().to_ascii_lowercase().chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '.' | '-') {
            out.push(ch);
            last_was_filler = false;
        } else if !last_was_filler {
            out.push('_');
            last_was_filler = true;
        }
    }

    if out.is_empty() {
        "na".to_string()
    } else {
        out
    }
}

struct CacheEntry {
    expires_at: Instant,
    observation: HazardObservation,
}

/// Process-local TTL cache. A deployment fronted by a shared store can swap
/// in another `ObservationCache` implementation without touching providers.
#[derive(Default)]
pub struct InMemoryObservationCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryObservationCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ObservationCache for InMemoryObservationCache {
    fn get(&self, key: &str) -> Option<HazardObservation> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.observation.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: &str, observation: HazardObservation, ttl: Duration) {
        let entry = CacheEntry {
            expires_at: Instant::now() + ttl,
            observation,
        };
        self.entries
            .lock()
            .expect("cache lock poisoned")
            .insert(key.to_string(), entry);
    }
}
