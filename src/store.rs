//! Persistence boundary of the intake pipeline.
//!
//! The pipeline depends on exactly two store operations: a point query for
//! the most recent lead matching a contact identity, and an insert that
//! returns the persisted row. Both are black-box request/response calls; no
//! transaction spans them, so two near-simultaneous submissions for the same
//! identity can race past the duplicate check. That window is accepted and
//! documented, not guarded.

use crate::errors::AppError;
use crate::models::{Brand, CanonicalLead, Lead};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Minimal view of a prior lead, enough for the duplicate decision.
#[derive(Debug, Clone)]
pub struct LeadRef {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Most recent lead for `(email, marca_id)`, exact match as stored.
    async fn find_latest_by_identity(
        &self,
        email: &str,
        marca_id: &str,
    ) -> Result<Option<LeadRef>, AppError>;

    /// Inserts a canonical lead; the database assigns id and created_at.
    async fn insert_lead(&self, lead: &CanonicalLead) -> Result<Lead, AppError>;

    /// Active brand by slug, for landing pages.
    async fn find_brand_by_slug(&self, slug: &str) -> Result<Option<Brand>, AppError>;
}

/// Postgres-backed store used in production.
#[derive(Clone)]
pub struct PgLeadStore {
    pool: PgPool,
}

impl PgLeadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeadStore for PgLeadStore {
    async fn find_latest_by_identity(
        &self,
        email: &str,
        marca_id: &str,
    ) -> Result<Option<LeadRef>, AppError> {
        let row = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            SELECT id, created_at
            FROM leads
            WHERE email = $1 AND marca_id = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(marca_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, created_at)| LeadRef { id, created_at }))
    }

    async fn insert_lead(&self, lead: &CanonicalLead) -> Result<Lead, AppError> {
        let inserted = sqlx::query_as::<_, Lead>(
            r#"
            INSERT INTO leads (
                tenant_id, marca_id, nome, email, telefone,
                cidade, estado, documento, tipo_documento,
                capital_disponivel, score, categoria,
                status, fonte, mensagem_original, observacao
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING
                id, tenant_id, marca_id, nome, email, telefone,
                cidade, estado, documento, tipo_documento,
                capital_disponivel, score, categoria,
                status, fonte, mensagem_original, observacao, created_at
            "#,
        )
        .bind(&lead.tenant_id)
        .bind(&lead.marca_id)
        .bind(&lead.nome)
        .bind(&lead.email)
        .bind(&lead.telefone)
        .bind(&lead.cidade)
        .bind(&lead.estado)
        .bind(&lead.documento)
        .bind(lead.tipo_documento.map(|t| t.as_str()))
        .bind(lead.capital_disponivel)
        .bind(lead.score)
        .bind(lead.categoria.as_str())
        .bind(&lead.status)
        .bind(lead.fonte.as_str())
        .bind(&lead.mensagem_original)
        .bind(&lead.observacao)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!("Stored lead {} ({})", inserted.id, inserted.categoria);
        Ok(inserted)
    }

    async fn find_brand_by_slug(&self, slug: &str) -> Result<Option<Brand>, AppError> {
        let brand = sqlx::query_as::<_, Brand>(
            r#"
            SELECT id, tenant_id, nome, slug, emoji, invest_min, invest_max, id_segmento
            FROM marcas
            WHERE slug = $1 AND ativo = true
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        Ok(brand)
    }
}
