use crate::config::Config;
use crate::errors::AppError;
use crate::intake::IntakeService;
use crate::models::{IntakeResponse, LeadSource};
use crate::scoring;
use crate::store::{LeadStore, PgLeadStore};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde_json::{json, Map, Value};
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: PgPool,
    /// Application configuration.
    pub config: Config,
}

impl AppState {
    fn intake(&self) -> IntakeService<PgLeadStore> {
        IntakeService::new(
            PgLeadStore::new(self.db.clone()),
            self.config.default_tenant_id.clone(),
        )
    }
}

fn as_form(payload: Value) -> Result<Map<String, Value>, AppError> {
    payload
        .as_object()
        .cloned()
        .ok_or_else(|| AppError::BadRequest("Payload deve ser um objeto JSON".to_string()))
}

/// Health check endpoint.
pub async fn health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "leadcapture-api",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

/// POST /api/leads
///
/// Direct landing-page submissions. Requires tenant and brand scoping in the
/// payload; always inserts (no duplicate suppression on this path).
pub async fn process_lead(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<IntakeResponse>), AppError> {
    tracing::info!("Novo lead via landing page");

    let form = as_form(payload)?;
    let outcome = state.intake().process(&form, LeadSource::Direct).await?;

    Ok((
        StatusCode::OK,
        Json(IntakeResponse {
            success: true,
            message: "Lead recebido com sucesso!".to_string(),
            lead_id: outcome.lead_id,
            score: outcome.score,
            category: outcome.categoria,
            duplicated: None,
        }),
    ))
}

/// POST /api/leads/google-forms
///
/// Google Forms webhook bridge. Missing tenant falls back to the configured
/// default; resubmissions within the dedup window answer success with the
/// existing lead id and `duplicated: true`.
pub async fn google_forms_lead(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<IntakeResponse>), AppError> {
    tracing::info!("Lead recebido via Google Forms");

    let form = as_form(payload)?;
    let outcome = state
        .intake()
        .process(&form, LeadSource::GoogleForms)
        .await?;

    let message = if outcome.duplicated {
        "Lead já existente (menos de 24h)".to_string()
    } else {
        "Lead do Google Forms recebido!".to_string()
    };

    Ok((
        StatusCode::OK,
        Json(IntakeResponse {
            success: true,
            message,
            lead_id: outcome.lead_id,
            score: outcome.score,
            category: outcome.categoria,
            duplicated: outcome.duplicated.then_some(true),
        }),
    ))
}

/// GET /api/leads/google-forms/health
///
/// Probe used by the Apps Script bridge to verify the integration is up.
pub async fn google_forms_health() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "Google Forms Integration",
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

/// GET /api/sistema/scoring
///
/// Scoring table and category criteria, for documentation and debugging.
pub async fn scoring_table() -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "tabela": scoring::scoring_table(),
            "criterios": {
                "hot": "score >= 80",
                "warm": "score >= 60",
                "cold": "score < 60",
            },
        })),
    )
}

/// GET /api/marcas/slug/:slug
///
/// Active-brand lookup used by landing pages during capture.
pub async fn get_brand_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, AppError> {
    let store = PgLeadStore::new(state.db.clone());
    let brand = store
        .find_brand_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Marca não encontrada".to_string()))?;

    Ok(Json(json!({ "success": true, "marca": brand })))
}
