//! Pipeline composition for one audit.

use chrono::Utc;
use tracing::info;

use crate::risk::domain::{AssessmentResult, SiteProfile};
use crate::risk::providers::ProviderRegistry;
use crate::risk::recommend::{ActionCatalog, CatalogError, RecommendationEngine};
use crate::risk::scoring::ScoringEngine;

/// Composes the provider fan-out, the scoring engine, and the recommendation
/// engine for one site.
///
/// Idempotent by construction: every invocation recomputes from scratch, so
/// duplicate deliveries of the same compute request simply overwrite the
/// caller-held result. Failed providers are not retried here; each one
/// already degrades to a confidence-0 observation inside the registry.
pub struct AuditOrchestrator<C> {
    registry: ProviderRegistry,
    scoring: ScoringEngine,
    recommendations: RecommendationEngine<C>,
}

impl<C: ActionCatalog> AuditOrchestrator<C> {
    pub fn new(
        registry: ProviderRegistry,
        scoring: ScoringEngine,
        recommendations: RecommendationEngine<C>,
    ) -> Self {
        Self {
            registry,
            scoring,
            recommendations,
        }
    }

    /// Run the full assessment for the site. Only a catalog read failure can
    /// surface as an error; total upstream unavailability yields a valid
    /// `indisponible` result instead.
    pub async fn assess(&self, site: &SiteProfile) -> Result<AssessmentResult, CatalogError> {
        let observations = self.registry.fetch_all(site.lat, site.lng).await;
        let scoring = self.scoring.score(&observations, site.has_basement);

        let recommendations = self.recommendations.build_top_actions(
            &scoring.usable_scores(),
            site.sector.as_deref(),
            site.building_type.as_deref(),
            site.has_basement,
            site.criticality,
        )?;

        info!(
            lat = site.lat,
            lng = site.lng,
            global_score = scoring.global_score,
            global_level = scoring.global_level.as_str(),
            recommendations = recommendations.len(),
            "site assessment computed"
        );

        Ok(AssessmentResult {
            scoring,
            recommendations,
            computed_at: Utc::now(),
        })
    }
}
