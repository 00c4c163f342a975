//! Risk aggregation and recommendation pipeline.
//!
//! Data flows one direction: coordinates fan out to every registered hazard
//! provider, the scoring engine folds the resulting observations into
//! per-hazard and global scores, and the recommendation engine turns those
//! scores plus the site profile into a bounded action list. Providers never
//! fail the pipeline: any upstream problem degrades to a confidence-0
//! observation for that hazard alone.

pub mod audit;
pub mod cache;
pub mod domain;
pub mod geo;
pub mod orchestrator;
pub mod providers;
pub mod recommend;
pub mod router;
pub mod scoring;

pub use audit::{
    AuditRecord, AuditService, AuditServiceError, AuditStatus, AuditStore, InMemoryAuditStore,
    StoreError,
};
pub use cache::{InMemoryObservationCache, ObservationCache, OBSERVATION_TTL};
pub use domain::{
    AssessmentResult, Criticality, Hazard, HazardLevel, HazardObservation, ScoringResult,
    SiteProfile, SourceMeta,
};
pub use orchestrator::AuditOrchestrator;
pub use providers::{
    ArcGisClient, CavityInventoryProvider, ClayShrinkSwellProvider, FloodZoningProvider,
    HeatVigilanceProvider, HubEauClient, ProviderError, ProviderRegistry, RiskProvider,
    VigilanceClient, WildfireHistoryProvider,
};
pub use recommend::{
    Action, ActionCatalog, CatalogError, Effort, Horizon, Impact, InMemoryActionCatalog,
    RankedAction, RecommendationEngine,
};
pub use router::audit_router;
pub use scoring::{RiskThresholds, RiskWeights, ScoringEngine};
