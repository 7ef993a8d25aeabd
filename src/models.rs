use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Initial status assigned to every freshly captured lead.
pub const INITIAL_STATUS: &str = "novo";

/// Ingestion path that produced a submission.
///
/// The tag is chosen by the caller (the HTTP route), never inferred from the
/// payload. It selects the field-alias table and the per-source behavior
/// policy used by the normalizer and the deduplicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeadSource {
    /// Landing-page form posting straight to the API.
    Direct,
    /// Google Forms webhook bridge (Apps Script).
    GoogleForms,
}

impl LeadSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::Direct => "direct",
            LeadSource::GoogleForms => "google-forms",
        }
    }
}

/// Lead temperature bucket derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadCategory {
    Hot,
    Warm,
    Cold,
}

impl LeadCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeadCategory::Hot => "hot",
            LeadCategory::Warm => "warm",
            LeadCategory::Cold => "cold",
        }
    }
}

/// Brazilian taxpayer document kind, distinguished solely by digit count
/// (11 digits = CPF, 14 = CNPJ).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    Cpf,
    Cnpj,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Cpf => "CPF",
            DocumentType::Cnpj => "CNPJ",
        }
    }
}

/// Output of the normalizer: one canonical record shape regardless of which
/// form generator produced the submission. Score and category are not yet
/// populated; the scorer derives them from `capital_disponivel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadCandidate {
    pub tenant_id: String,
    pub marca_id: String,
    pub fonte: LeadSource,
    pub nome: String,
    pub email: String,
    /// Digits only, at least 10 of them.
    pub telefone: String,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    /// Digits only, exactly 11 or 14 when present.
    pub documento: Option<String>,
    pub tipo_documento: Option<DocumentType>,
    /// Parsed from the free-text capital field; 0 when absent or unparseable.
    pub capital_disponivel: i64,
    pub mensagem_original: Option<String>,
    pub observacao: Option<String>,
}

/// Fully derived lead record, ready for insertion. Immutable once built:
/// later edits (status changes, notes) are dashboard operations outside the
/// intake pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalLead {
    pub tenant_id: String,
    pub marca_id: String,
    pub fonte: LeadSource,
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub documento: Option<String>,
    pub tipo_documento: Option<DocumentType>,
    pub capital_disponivel: i64,
    pub score: i32,
    pub categoria: LeadCategory,
    pub status: String,
    pub mensagem_original: Option<String>,
    pub observacao: Option<String>,
}

impl CanonicalLead {
    /// Promotes a normalized candidate by attaching the derived score and
    /// category. This is the only constructor, so score and category can
    /// never be set directly by a caller.
    pub fn from_candidate(candidate: LeadCandidate, score: i32, categoria: LeadCategory) -> Self {
        Self {
            tenant_id: candidate.tenant_id,
            marca_id: candidate.marca_id,
            fonte: candidate.fonte,
            nome: candidate.nome,
            email: candidate.email,
            telefone: candidate.telefone,
            cidade: candidate.cidade,
            estado: candidate.estado,
            documento: candidate.documento,
            tipo_documento: candidate.tipo_documento,
            capital_disponivel: candidate.capital_disponivel,
            score,
            categoria,
            status: INITIAL_STATUS.to_string(),
            mensagem_original: candidate.mensagem_original,
            observacao: candidate.observacao,
        }
    }
}

/// Persisted lead row as returned by the store. `id` and `created_at` are
/// assigned at insertion time by the database.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub tenant_id: String,
    pub marca_id: String,
    pub nome: String,
    pub email: String,
    pub telefone: String,
    pub cidade: Option<String>,
    pub estado: Option<String>,
    pub documento: Option<String>,
    pub tipo_documento: Option<String>,
    pub capital_disponivel: i64,
    pub score: i32,
    pub categoria: String,
    pub status: String,
    pub fonte: String,
    pub mensagem_original: Option<String>,
    pub observacao: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Brand/campaign record consulted by landing pages during capture.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Brand {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub nome: String,
    pub slug: String,
    pub emoji: Option<String>,
    pub invest_min: Option<i64>,
    pub invest_max: Option<i64>,
    pub id_segmento: Option<Uuid>,
}

/// JSON body returned to the caller for both ingestion paths.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntakeResponse {
    pub success: bool,
    pub message: String,
    pub lead_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<LeadCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicated: Option<bool>,
}
