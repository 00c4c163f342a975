//! HTTP endpoints for requesting and reading audits.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::audit::{AuditService, AuditServiceError, AuditStore};
use super::domain::{Criticality, SiteProfile};
use super::recommend::ActionCatalog;

/// Router builder exposing the audit compute and lookup endpoints.
pub fn audit_router<C, S>(service: Arc<AuditService<C, S>>) -> Router
where
    C: ActionCatalog + 'static,
    S: AuditStore + 'static,
{
    Router::new()
        .route("/api/v1/audits", post(compute_handler::<C, S>))
        .route("/api/v1/audits/:audit_id", get(status_handler::<C, S>))
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct ComputeAuditRequest {
    pub(crate) lat: f64,
    pub(crate) lng: f64,
    #[serde(default)]
    pub(crate) has_basement: bool,
    #[serde(default)]
    pub(crate) sector: Option<String>,
    #[serde(default)]
    pub(crate) building_type: Option<String>,
    #[serde(default)]
    pub(crate) criticality: Option<String>,
    /// Recompute an existing audit in place instead of creating a new one.
    #[serde(default)]
    pub(crate) audit_id: Option<String>,
}

pub(crate) async fn compute_handler<C, S>(
    State(service): State<Arc<AuditService<C, S>>>,
    axum::Json(request): axum::Json<ComputeAuditRequest>,
) -> Response
where
    C: ActionCatalog + 'static,
    S: AuditStore + 'static,
{
    let site = SiteProfile {
        lat: request.lat,
        lng: request.lng,
        has_basement: request.has_basement,
        sector: request.sector,
        building_type: request.building_type,
        criticality: Criticality::from_input(request.criticality.as_deref()),
    };

    match service.compute(site, request.audit_id).await {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(AuditServiceError::Catalog(err)) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({ "error": other.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler<C, S>(
    State(service): State<Arc<AuditService<C, S>>>,
    Path(audit_id): Path<String>,
) -> Response
where
    C: ActionCatalog + 'static,
    S: AuditStore + 'static,
{
    match service.get(&audit_id) {
        Ok(Some(record)) => (StatusCode::OK, axum::Json(record)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": format!("audit '{audit_id}' not found") });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::audit::{AuditStatus, InMemoryAuditStore};
    use crate::risk::cache::InMemoryObservationCache;
    use crate::risk::domain::{Hazard, HazardObservation, QueryParams, SourceMeta};
    use crate::risk::orchestrator::AuditOrchestrator;
    use crate::risk::providers::{ProviderError, ProviderRegistry, RiskProvider};
    use crate::risk::recommend::{Action, CatalogError, InMemoryActionCatalog, RecommendationEngine};
    use crate::risk::scoring::{RiskThresholds, RiskWeights, ScoringEngine};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request};
    use chrono::Utc;
    use serde_json::{Map, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    struct StubProvider(Hazard, u8);

    #[async_trait]
    impl RiskProvider for StubProvider {
        fn hazard(&self) -> Hazard {
            self.0
        }

        fn source_name(&self) -> &str {
            "stub"
        }

        fn source_version(&self) -> &str {
            "v1"
        }

        async fn observe(&self, lat: f64, lng: f64) -> Result<HazardObservation, ProviderError> {
            Ok(HazardObservation {
                hazard: self.0,
                raw_indicators: Map::new(),
                normalized_score: self.1,
                explanation: "simulé".to_string(),
                confidence: 60,
                source: SourceMeta {
                    name: "stub".to_string(),
                    version: "v1".to_string(),
                    fetched_at: Utc::now(),
                    params: QueryParams { lat, lng },
                },
            })
        }
    }

    fn orchestrator(catalog: InMemoryActionCatalog) -> AuditOrchestrator<InMemoryActionCatalog> {
        let registry = ProviderRegistry::new(
            vec![
                std::sync::Arc::new(StubProvider(Hazard::Heat, 80)),
                std::sync::Arc::new(StubProvider(Hazard::Flood, 30)),
            ],
            std::sync::Arc::new(InMemoryObservationCache::new()),
            Duration::from_secs(5),
            Duration::from_secs(60),
        );
        AuditOrchestrator::new(
            registry,
            ScoringEngine::new(RiskWeights::default(), RiskThresholds::default()),
            RecommendationEngine::new(catalog),
        )
    }

    fn service(
        catalog: InMemoryActionCatalog,
    ) -> Arc<AuditService<InMemoryActionCatalog, InMemoryAuditStore>> {
        Arc::new(AuditService::new(
            orchestrator(catalog),
            Arc::new(InMemoryAuditStore::new()),
        ))
    }

    async fn read_json_body(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("body is json")
    }

    fn compute_request(body: Value) -> Request<Body> {
        Request::post("/api/v1/audits")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    #[tokio::test]
    async fn compute_route_returns_a_computed_record() {
        let router = audit_router(service(InMemoryActionCatalog::seeded()));

        let response = router
            .oneshot(compute_request(serde_json::json!({
                "lat": 48.8566,
                "lng": 2.3522,
                "has_basement": true,
                "criticality": "high"
            })))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["status"], "computed");
        assert!(payload["id"].as_str().expect("id").starts_with("audit-"));
        assert_eq!(payload["result"]["scoring"]["scores"]["flood"], 40);
    }

    #[tokio::test]
    async fn status_route_round_trips_a_stored_audit() {
        let service = service(InMemoryActionCatalog::seeded());
        let router = audit_router(service.clone());

        let response = router
            .clone()
            .oneshot(compute_request(serde_json::json!({
                "lat": 48.8566,
                "lng": 2.3522,
                "audit_id": "audit-fixed"
            })))
            .await
            .expect("route executes");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .oneshot(
                Request::get("/api/v1/audits/audit-fixed")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json_body(response).await;
        assert_eq!(payload["id"], "audit-fixed");
        assert_eq!(payload["status"], "computed");
    }

    #[tokio::test]
    async fn unknown_audit_returns_not_found() {
        let router = audit_router(service(InMemoryActionCatalog::seeded()));

        let response = router
            .oneshot(
                Request::get("/api/v1/audits/audit-zzz")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn catalog_outage_marks_the_audit_failed() {
        struct BrokenCatalog;

        impl crate::risk::recommend::ActionCatalog for BrokenCatalog {
            fn active_actions(&self) -> Result<Vec<Action>, CatalogError> {
                Err(CatalogError::Unavailable("base injoignable".to_string()))
            }
        }

        let store = Arc::new(InMemoryAuditStore::new());
        let registry = ProviderRegistry::new(
            vec![std::sync::Arc::new(StubProvider(Hazard::Heat, 80))],
            std::sync::Arc::new(InMemoryObservationCache::new()),
            Duration::from_secs(5),
            Duration::from_secs(60),
        );
        let service = Arc::new(AuditService::new(
            AuditOrchestrator::new(
                registry,
                ScoringEngine::new(RiskWeights::default(), RiskThresholds::default()),
                RecommendationEngine::new(BrokenCatalog),
            ),
            store.clone(),
        ));

        let response = audit_router(service)
            .oneshot(compute_request(serde_json::json!({
                "lat": 48.8566,
                "lng": 2.3522,
                "audit_id": "audit-broken"
            })))
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let record = store
            .fetch("audit-broken")
            .expect("store reads")
            .expect("record stored");
        assert_eq!(record.status, AuditStatus::Failed);
        assert!(record.result.is_none());
    }

    #[tokio::test]
    async fn recomputing_an_audit_overwrites_in_place() {
        let service = service(InMemoryActionCatalog::seeded());
        let router = audit_router(service.clone());

        for has_basement in [false, true] {
            let response = router
                .clone()
                .oneshot(compute_request(serde_json::json!({
                    "lat": 48.8566,
                    "lng": 2.3522,
                    "has_basement": has_basement,
                    "audit_id": "audit-repeat"
                })))
                .await
                .expect("route executes");
            assert_eq!(response.status(), StatusCode::OK);
        }

        let record = service
            .get("audit-repeat")
            .expect("store reads")
            .expect("record stored");
        assert!(record.site.has_basement, "latest compute wins");
        let result = record.result.expect("computed result");
        assert_eq!(result.scoring.scores[&Hazard::Flood], 40);
    }
}
