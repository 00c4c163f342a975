//! Caller-side audit lifecycle: records, persistence seam, and the service
//! composing the orchestrator with a store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::risk::domain::{AssessmentResult, SiteProfile};
use crate::risk::orchestrator::AuditOrchestrator;
use crate::risk::recommend::{ActionCatalog, CatalogError};

/// Outcome of a compute request. A completed-but-low-confidence assessment is
/// `Computed`; `Failed` only marks collaborator failures (catalog read).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    Computed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: String,
    pub site: SiteProfile,
    pub status: AuditStatus,
    pub requested_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AssessmentResult>,
}

/// Persistence seam so the HTTP layer can be exercised in isolation.
pub trait AuditStore: Send + Sync {
    fn upsert(&self, record: AuditRecord) -> Result<(), StoreError>;
    fn fetch(&self, id: &str) -> Result<Option<AuditRecord>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("audit store unavailable: {0}")]
    Unavailable(String),
}

/// In-memory store; recomputing an id overwrites the prior record, so
/// duplicate compute requests are harmless.
#[derive(Default)]
pub struct InMemoryAuditStore {
    records: Mutex<HashMap<String, AuditRecord>>,
}

impl InMemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuditStore for InMemoryAuditStore {
    fn upsert(&self, record: AuditRecord) -> Result<(), StoreError> {
        self.records
            .lock()
            .expect("audit store lock poisoned")
            .insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &str) -> Result<Option<AuditRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .expect("audit store lock poisoned")
            .get(id)
            .cloned())
    }
}

static AUDIT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_audit_id() -> String {
    let id = AUDIT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("audit-{id:06}")
}

/// Errors surfaced by the audit service.
#[derive(Debug, thiserror::Error)]
pub enum AuditServiceError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Service composing the assessment pipeline with audit persistence.
pub struct AuditService<C, S> {
    orchestrator: AuditOrchestrator<C>,
    store: Arc<S>,
}

impl<C, S> AuditService<C, S>
where
    C: ActionCatalog + 'static,
    S: AuditStore + 'static,
{
    pub fn new(orchestrator: AuditOrchestrator<C>, store: Arc<S>) -> Self {
        Self {
            orchestrator,
            store,
        }
    }

    /// Compute (or recompute) the assessment for a site and persist the
    /// record. An explicit `audit_id` overwrites that audit in place.
    pub async fn compute(
        &self,
        site: SiteProfile,
        audit_id: Option<String>,
    ) -> Result<AuditRecord, AuditServiceError> {
        let id = audit_id.unwrap_or_else(next_audit_id);

        match self.orchestrator.assess(&site).await {
            Ok(result) => {
                let record = AuditRecord {
                    id,
                    site,
                    status: AuditStatus::Computed,
                    requested_at: Utc::now(),
                    result: Some(result),
                };
                self.store.upsert(record.clone())?;
                Ok(record)
            }
            Err(err) => {
                self.store.upsert(AuditRecord {
                    id,
                    site,
                    status: AuditStatus::Failed,
                    requested_at: Utc::now(),
                    result: None,
                })?;
                Err(AuditServiceError::Catalog(err))
            }
        }
    }

    pub fn get(&self, id: &str) -> Result<Option<AuditRecord>, AuditServiceError> {
        Ok(self.store.fetch(id)?)
    }
}
