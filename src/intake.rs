//! Intake pipeline orchestration.
//!
//! Control flow: raw submission -> normalizer -> validation gate ->
//! duplicate check (webhook path only) -> scorer -> insert. Terminal
//! outcomes are `Accepted { duplicated }` via [`IntakeOutcome`] or a
//! rejection carried as [`AppError::Validation`]. Each submission is handled
//! independently and statelessly; the store is the only shared resource.

use crate::errors::AppError;
use crate::models::{CanonicalLead, LeadCategory, LeadSource};
use crate::normalizer;
use crate::scoring;
use crate::store::LeadStore;
use chrono::{Duration, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Suppress webhook re-insertion of the same `(email, marca_id)` identity
/// within this window. Business rule of the Google Forms bridge; not
/// configurable and not applied to the direct path.
pub const DEDUP_WINDOW_HOURS: i64 = 24;

/// Accepted terminal state of the pipeline.
#[derive(Debug)]
pub struct IntakeOutcome {
    pub lead_id: Uuid,
    /// Absent when the submission was deduplicated (scoring never ran).
    pub score: Option<i32>,
    pub categoria: Option<LeadCategory>,
    pub duplicated: bool,
}

/// Lead intake service, generic over the persistence seam.
pub struct IntakeService<S> {
    store: S,
    default_tenant_id: String,
}

impl<S: LeadStore> IntakeService<S> {
    pub fn new(store: S, default_tenant_id: impl Into<String>) -> Self {
        Self {
            store,
            default_tenant_id: default_tenant_id.into(),
        }
    }

    /// Runs one submission through the pipeline.
    ///
    /// Validation and insertion failures are terminal; a failed duplicate
    /// lookup is logged and treated as "no prior record" so a flaky query
    /// can never reject a lead.
    pub async fn process(
        &self,
        form: &Map<String, Value>,
        source: LeadSource,
    ) -> Result<IntakeOutcome, AppError> {
        let candidate = normalizer::normalize(form, source, &self.default_tenant_id)?;

        if normalizer::policy(source).dedupe_resubmissions {
            match self
                .store
                .find_latest_by_identity(&candidate.email, &candidate.marca_id)
                .await
            {
                Ok(Some(prev)) => {
                    let age = Utc::now().signed_duration_since(prev.created_at);
                    if age < Duration::hours(DEDUP_WINDOW_HOURS) {
                        tracing::warn!(
                            "Duplicate submission ({}h ago): {} / marca {}",
                            age.num_hours(),
                            candidate.email,
                            candidate.marca_id
                        );
                        return Ok(IntakeOutcome {
                            lead_id: prev.id,
                            score: None,
                            categoria: None,
                            duplicated: true,
                        });
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    // Fail open toward insertion.
                    tracing::warn!("Duplicate lookup failed, proceeding with insert: {}", e);
                }
            }
        }

        let score = scoring::score_for_capital(candidate.capital_disponivel);
        let categoria = scoring::category_for_score(score);
        let lead = CanonicalLead::from_candidate(candidate, score, categoria);

        let stored = self.store.insert_lead(&lead).await?;
        tracing::info!(
            "Lead salvo: {} | score {} | {}",
            stored.id,
            stored.score,
            stored.categoria.to_uppercase()
        );

        Ok(IntakeOutcome {
            lead_id: stored.id,
            score: Some(stored.score),
            categoria: Some(categoria),
            duplicated: false,
        })
    }
}
