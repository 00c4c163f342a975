//! Hazard data providers and the registry that fans out to them.
//!
//! A provider is a pure function of coordinates that is allowed to be
//! expensive, cached, and fallible-into-zero-confidence. The registry owns
//! the shared cache and the per-call timeout; whatever happens upstream, it
//! hands the scoring engine exactly one observation per registered hazard.

pub mod arcgis;
pub mod cavites;
pub mod drought;
pub mod fire;
pub mod flood;
pub mod heat;
pub mod hubeau;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::risk::cache::{observation_key, ObservationCache};
use crate::risk::domain::{Hazard, HazardObservation, QueryParams, SourceMeta};

pub use arcgis::ArcGisClient;
pub use cavites::CavityInventoryProvider;
pub use drought::ClayShrinkSwellProvider;
pub use fire::WildfireHistoryProvider;
pub use flood::FloodZoningProvider;
pub use heat::{HeatVigilanceProvider, VigilanceClient};
pub use hubeau::HubEauClient;

/// Failure of one upstream source. Recovered inside the registry: it only
/// ever surfaces as a confidence-0 observation, never as an error to callers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("service {service} injoignable: {detail}")]
    Transport { service: String, detail: String },
    #[error("service {service} indisponible (HTTP {status})")]
    Http { service: String, status: u16 },
    #[error("service {service} indisponible: {detail}")]
    Rejected { service: String, detail: String },
    #[error("réponse {service} illisible")]
    Payload { service: String },
    #[error("source {0} non configurée")]
    MissingConfig(String),
}

/// Capability every hazard provider implements. Adding a hazard means
/// registering a new implementation; no pipeline change required.
#[async_trait]
pub trait RiskProvider: Send + Sync {
    fn hazard(&self) -> Hazard;
    fn source_name(&self) -> &str;
    fn source_version(&self) -> &str;

    /// Compute a fresh observation for the coordinates. Implementations
    /// return `Err` for anything unavailable; the registry converts it.
    async fn observe(&self, lat: f64, lng: f64) -> Result<HazardObservation, ProviderError>;
}

/// Provenance record for a provider's answer at the given coordinates.
pub fn source_meta(provider: &dyn RiskProvider, lat: f64, lng: f64) -> SourceMeta {
    SourceMeta {
        name: provider.source_name().to_string(),
        version: provider.source_version().to_string(),
        fetched_at: Utc::now(),
        params: QueryParams { lat, lng },
    }
}

/// The ordered set of active hazard providers plus the shared cache.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn RiskProvider>>,
    cache: Arc<dyn ObservationCache>,
    call_timeout: Duration,
    cache_ttl: Duration,
}

impl ProviderRegistry {
    pub fn new(
        providers: Vec<Arc<dyn RiskProvider>>,
        cache: Arc<dyn ObservationCache>,
        call_timeout: Duration,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            providers,
            cache,
            call_timeout,
            cache_ttl,
        }
    }

    pub fn hazards(&self) -> Vec<Hazard> {
        self.providers.iter().map(|p| p.hazard()).collect()
    }

    /// Fan out to every registered provider concurrently. A slow or failing
    /// provider never blocks or fails the others; the result always holds
    /// exactly one observation per provider, in registration order.
    pub async fn fetch_all(&self, lat: f64, lng: f64) -> Vec<HazardObservation> {
        let calls = self
            .providers
            .iter()
            .map(|provider| self.fetch(provider.as_ref(), lat, lng));
        join_all(calls).await
    }

    async fn fetch(&self, provider: &dyn RiskProvider, lat: f64, lng: f64) -> HazardObservation {
        let key = observation_key(provider.hazard(), provider.source_version(), lat, lng);

        if let Some(hit) = self.cache.get(&key) {
            debug!(hazard = %provider.hazard(), %key, "observation cache hit");
            return hit;
        }

        let observation = match tokio::time::timeout(
            self.call_timeout,
            provider.observe(lat, lng),
        )
        .await
        {
            Ok(Ok(observation)) => observation,
            Ok(Err(err)) => {
                warn!(hazard = %provider.hazard(), error = %err, "provider degraded to unavailable");
                HazardObservation::unavailable(
                    provider.hazard(),
                    err.to_string(),
                    source_meta(provider, lat, lng),
                )
            }
            Err(_) => {
                warn!(hazard = %provider.hazard(), "provider timed out");
                HazardObservation::unavailable(
                    provider.hazard(),
                    format!(
                        "service {} indisponible (délai de {}s dépassé)",
                        provider.source_name(),
                        self.call_timeout.as_secs()
                    ),
                    source_meta(provider, lat, lng),
                )
            }
        };

        self.cache.put(&key, observation.clone(), self.cache_ttl);
        observation
    }
}
