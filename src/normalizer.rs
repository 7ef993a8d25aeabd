//! Submission normalization: heterogeneous form payloads in, one canonical
//! lead shape out.
//!
//! Each ingestion source carries its own ordered field-alias table (Google
//! Forms posts locale-specific labels such as "Nome completo" or
//! "Capital disponível") and its own behavior policy. Adding a new form
//! source is a data change here, not new branching in the pipeline.

use crate::errors::AppError;
use crate::models::{DocumentType, LeadCandidate, LeadSource};
use regex::Regex;
use serde_json::{Map, Value};

/// Max length for short text fields (names, cities).
const MAX_TEXT_LEN: usize = 255;
/// Max length kept from the free-text message.
const MAX_MESSAGE_LEN: usize = 1000;
/// Max length of the composed review note.
const MAX_NOTE_LEN: usize = 500;

/// Per-source behavior flags. The asymmetries between ingestion paths are
/// deliberate product behavior; keeping them in one table makes them
/// auditable instead of accidental.
#[derive(Debug, Clone, Copy)]
pub struct SourcePolicy {
    /// Fall back to the configured tenant when the payload omits one.
    /// Only the webhook path may default; direct submissions must carry it.
    pub defaults_tenant: bool,
    /// Suppress re-insertion within the dedup window (webhook retries and
    /// form resubmissions). The direct path always inserts.
    pub dedupe_resubmissions: bool,
    /// Trim and lowercase the e-mail during normalization.
    pub normalize_email_case: bool,
}

const DIRECT_POLICY: SourcePolicy = SourcePolicy {
    defaults_tenant: false,
    dedupe_resubmissions: false,
    normalize_email_case: false,
};

const GOOGLE_FORMS_POLICY: SourcePolicy = SourcePolicy {
    defaults_tenant: true,
    dedupe_resubmissions: true,
    normalize_email_case: true,
};

/// Behavior policy for an ingestion source.
pub fn policy(source: LeadSource) -> &'static SourcePolicy {
    match source {
        LeadSource::Direct => &DIRECT_POLICY,
        LeadSource::GoogleForms => &GOOGLE_FORMS_POLICY,
    }
}

/// Ordered candidate key names per canonical field; first present non-empty
/// value wins.
struct AliasTable {
    tenant_id: &'static [&'static str],
    marca_id: &'static [&'static str],
    nome: &'static [&'static str],
    email: &'static [&'static str],
    telefone: &'static [&'static str],
    cidade: &'static [&'static str],
    estado: &'static [&'static str],
    documento: &'static [&'static str],
    capital: &'static [&'static str],
    mensagem: &'static [&'static str],
}

const DIRECT_ALIASES: AliasTable = AliasTable {
    tenant_id: &["tenant_id"],
    marca_id: &["marca_id"],
    nome: &["nome", "name"],
    email: &["email"],
    telefone: &["telefone", "phone"],
    cidade: &["cidade"],
    estado: &["estado"],
    documento: &["documento"],
    capital: &["capital", "capital_disponivel"],
    mensagem: &["mensagem"],
};

const GOOGLE_FORMS_ALIASES: AliasTable = AliasTable {
    tenant_id: &["tenant_id"],
    marca_id: &["marca_id"],
    nome: &["nome", "Nome completo", "name"],
    email: &["email", "E-mail", "E-mail address"],
    telefone: &["telefone", "WhatsApp", "whatsapp"],
    cidade: &["cidade", "Cidade"],
    estado: &["estado", "Estado"],
    documento: &["documento", "CPF ou CNPJ", "cpf_cnpj"],
    capital: &["capital", "Capital disponível", "capital_disponivel"],
    mensagem: &["mensagem", "Mensagem", "message"],
};

fn alias_table(source: LeadSource) -> &'static AliasTable {
    match source {
        LeadSource::Direct => &DIRECT_ALIASES,
        LeadSource::GoogleForms => &GOOGLE_FORMS_ALIASES,
    }
}

/// Returns the first present, non-empty value among the aliased keys.
/// Scalar numbers are accepted and stringified; null and empty strings are
/// treated as absent.
fn first_value(form: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    for key in keys {
        match form.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            Some(Value::Bool(b)) => return Some(b.to_string()),
            _ => continue,
        }
    }
    None
}

/// Keeps only ASCII digits. Used for phone, document and capital fields.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Classifies a digits-only document by length: 11 = CPF, 14 = CNPJ.
pub fn classify_document(digits: &str) -> Option<DocumentType> {
    match digits.len() {
        11 => Some(DocumentType::Cpf),
        14 => Some(DocumentType::Cnpj),
        _ => None,
    }
}

/// Validates the e-mail shape: something@something.something, no whitespace.
pub fn is_valid_email(email: &str) -> bool {
    let email_regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
    email_regex.is_match(email.trim())
}

/// Trims and caps a free-text value at `max_len` characters.
fn sanitize_text(raw: &str, max_len: usize) -> String {
    raw.trim().chars().take(max_len).collect()
}

/// Formats an amount in R$ with pt-BR thousands separators (250000 ->
/// "250.000"), for the human-review note.
pub fn format_capital_br(capital: i64) -> String {
    let digits = capital.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i != 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

/// Normalizes a raw submission into a canonical lead candidate, or fails with
/// the first violated validation rule.
///
/// Check order is part of the contract: tenant/brand scoping first, then
/// name, e-mail shape, phone length, document shape. Callers get exactly one
/// failing field per rejection.
pub fn normalize(
    form: &Map<String, Value>,
    source: LeadSource,
    default_tenant_id: &str,
) -> Result<LeadCandidate, AppError> {
    let aliases = alias_table(source);
    let policy = policy(source);

    // Tenant scoping: the webhook path defaults, the direct path must carry it.
    let tenant_id = match first_value(form, aliases.tenant_id) {
        Some(id) => id.trim().to_string(),
        None if policy.defaults_tenant => default_tenant_id.to_string(),
        None => {
            return Err(AppError::Validation {
                field: "tenant_id",
                message: "Campo obrigatório: tenant_id".to_string(),
            })
        }
    };

    let marca_id = first_value(form, aliases.marca_id)
        .map(|id| id.trim().to_string())
        .ok_or_else(|| AppError::Validation {
            field: "marca_id",
            message: "Campo obrigatório: marca_id".to_string(),
        })?;

    let nome = first_value(form, aliases.nome)
        .map(|n| sanitize_text(&n, MAX_TEXT_LEN))
        .unwrap_or_default();
    if nome.chars().count() < 3 {
        return Err(AppError::Validation {
            field: "nome",
            message: "Nome deve ter pelo menos 3 caracteres".to_string(),
        });
    }

    let email_raw = first_value(form, aliases.email).unwrap_or_default();
    if !is_valid_email(&email_raw) {
        return Err(AppError::Validation {
            field: "email",
            message: "E-mail inválido".to_string(),
        });
    }
    let email = if policy.normalize_email_case {
        email_raw.trim().to_lowercase()
    } else {
        email_raw.trim().to_string()
    };

    let telefone = digits_only(&first_value(form, aliases.telefone).unwrap_or_default());
    if telefone.len() < 10 {
        return Err(AppError::Validation {
            field: "telefone",
            message: "Telefone inválido (mínimo 10 dígitos)".to_string(),
        });
    }

    // Document is optional; when present it must be a CPF or CNPJ.
    let (documento, tipo_documento) = match first_value(form, aliases.documento) {
        Some(raw) => {
            let digits = digits_only(&raw);
            match classify_document(&digits) {
                Some(tipo) => (Some(digits), Some(tipo)),
                None => {
                    return Err(AppError::Validation {
                        field: "documento",
                        message: "Documento inválido (CPF: 11 dígitos | CNPJ: 14 dígitos)"
                            .to_string(),
                    })
                }
            }
        }
        None => (None, None),
    };

    let capital_disponivel =
        crate::scoring::parse_capital(&first_value(form, aliases.capital).unwrap_or_default());

    let cidade = first_value(form, aliases.cidade).map(|c| sanitize_text(&c, MAX_TEXT_LEN));
    let estado = first_value(form, aliases.estado).map(|e| sanitize_text(&e, MAX_TEXT_LEN));

    let mensagem = first_value(form, aliases.mensagem);
    let mensagem_original = mensagem
        .as_ref()
        .map(|m| sanitize_text(m, MAX_MESSAGE_LEN))
        .filter(|m| !m.is_empty());

    // The webhook path composes a review note; the direct path echoes what
    // the form sent, if anything.
    let observacao = match source {
        LeadSource::GoogleForms => {
            let mut parts = vec![
                format!("Capital: R$ {}", format_capital_br(capital_disponivel)),
                "Origem: Google Forms".to_string(),
            ];
            if let Some(ref m) = mensagem_original {
                parts.push(format!("Mensagem: {}", m));
            }
            Some(sanitize_text(&parts.join(" | "), MAX_NOTE_LEN))
        }
        LeadSource::Direct => first_value(form, &["observacao"])
            .map(|o| sanitize_text(&o, MAX_NOTE_LEN))
            .filter(|o| !o.is_empty()),
    };

    Ok(LeadCandidate {
        tenant_id,
        marca_id,
        fonte: source,
        nome,
        email,
        telefone,
        cidade,
        estado,
        documento,
        tipo_documento,
        capital_disponivel,
        mensagem_original,
        observacao,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn form(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("test form must be an object")
    }

    fn direct_form() -> Map<String, Value> {
        form(json!({
            "tenant_id": "t1",
            "marca_id": "b1",
            "nome": "João Pereira",
            "email": "joao@example.com",
            "telefone": "(11) 91234-5678",
        }))
    }

    #[test]
    fn test_digits_only() {
        assert_eq!(digits_only("(11) 98888-7777"), "11988887777");
        assert_eq!(digits_only("123.456.789-01"), "12345678901");
        assert_eq!(digits_only("abc"), "");
    }

    #[test]
    fn test_classify_document() {
        assert_eq!(classify_document("12345678901"), Some(DocumentType::Cpf));
        assert_eq!(classify_document("12345678000199"), Some(DocumentType::Cnpj));
        assert_eq!(classify_document("123456789"), None);
        assert_eq!(classify_document(""), None);
    }

    #[test]
    fn test_email_shape() {
        assert!(is_valid_email("maria@x.com"));
        assert!(is_valid_email("  maria@x.com  "));
        assert!(!is_valid_email("maria@x"));
        assert!(!is_valid_email("maria x@x.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_format_capital_br() {
        assert_eq!(format_capital_br(0), "0");
        assert_eq!(format_capital_br(999), "999");
        assert_eq!(format_capital_br(1_000), "1.000");
        assert_eq!(format_capital_br(250_000), "250.000");
        assert_eq!(format_capital_br(1_234_567), "1.234.567");
    }

    #[test]
    fn test_direct_normalization_happy_path() {
        let lead = normalize(&direct_form(), LeadSource::Direct, "fallback").unwrap();
        assert_eq!(lead.tenant_id, "t1");
        assert_eq!(lead.marca_id, "b1");
        assert_eq!(lead.telefone, "11912345678");
        assert_eq!(lead.fonte, LeadSource::Direct);
        assert_eq!(lead.documento, None);
        assert_eq!(lead.tipo_documento, None);
    }

    #[test]
    fn test_direct_requires_tenant() {
        let mut f = direct_form();
        f.remove("tenant_id");
        let err = normalize(&f, LeadSource::Direct, "fallback").unwrap_err();
        match err {
            AppError::Validation { field, .. } => assert_eq!(field, "tenant_id"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_google_forms_defaults_tenant() {
        let f = form(json!({
            "marca_id": "b1",
            "Nome completo": "Maria Silva",
            "E-mail": "maria@x.com",
            "WhatsApp": "(11) 98888-7777",
        }));
        let lead = normalize(&f, LeadSource::GoogleForms, "tenant-default").unwrap();
        assert_eq!(lead.tenant_id, "tenant-default");
    }

    #[test]
    fn test_google_forms_aliases_and_note() {
        let f = form(json!({
            "marca_id": "b1",
            "Nome completo": "Maria Silva",
            "E-mail": "Maria@X.com",
            "WhatsApp": "(11) 98888-7777",
            "Capital disponível": "R$ 250.000",
            "CPF ou CNPJ": "123.456.789-01",
            "Mensagem": "Tenho interesse",
        }));
        let lead = normalize(&f, LeadSource::GoogleForms, "td").unwrap();
        assert_eq!(lead.nome, "Maria Silva");
        assert_eq!(lead.email, "maria@x.com");
        assert_eq!(lead.telefone, "11988887777");
        assert_eq!(lead.capital_disponivel, 250_000);
        assert_eq!(lead.documento.as_deref(), Some("12345678901"));
        assert_eq!(lead.tipo_documento, Some(DocumentType::Cpf));
        assert_eq!(
            lead.observacao.as_deref(),
            Some("Capital: R$ 250.000 | Origem: Google Forms | Mensagem: Tenho interesse")
        );
    }

    #[test]
    fn test_direct_keeps_email_case() {
        let mut f = direct_form();
        f.insert("email".into(), json!("Joao@Example.com"));
        let lead = normalize(&f, LeadSource::Direct, "td").unwrap();
        assert_eq!(lead.email, "Joao@Example.com");
    }

    #[test]
    fn test_validation_order_first_violation_wins() {
        // Everything is wrong; tenant scoping is reported first.
        let f = form(json!({}));
        match normalize(&f, LeadSource::Direct, "td").unwrap_err() {
            AppError::Validation { field, .. } => assert_eq!(field, "tenant_id"),
            other => panic!("unexpected error: {other}"),
        }

        // Webhook path defaults tenant, so the brand is the first failure.
        match normalize(&f, LeadSource::GoogleForms, "td").unwrap_err() {
            AppError::Validation { field, .. } => assert_eq!(field, "marca_id"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_email_reported_as_email() {
        let f = form(json!({
            "marca_id": "b1",
            "Nome completo": "Maria Silva",
            "WhatsApp": "(11) 98888-7777",
        }));
        match normalize(&f, LeadSource::GoogleForms, "td").unwrap_err() {
            AppError::Validation { field, .. } => assert_eq!(field, "email"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_phone_rejected() {
        let mut f = direct_form();
        f.insert("telefone".into(), json!("999-1234"));
        match normalize(&f, LeadSource::Direct, "td").unwrap_err() {
            AppError::Validation { field, .. } => assert_eq!(field, "telefone"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_bad_document_length_rejected() {
        let mut f = direct_form();
        f.insert("documento".into(), json!("123.456.789"));
        match normalize(&f, LeadSource::Direct, "td").unwrap_err() {
            AppError::Validation { field, .. } => assert_eq!(field, "documento"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let f = form(json!({
            "marca_id": "b1",
            "Nome completo": "Maria Silva",
            "E-mail": "Maria@X.com",
            "WhatsApp": "(11) 98888-7777",
            "Capital disponível": "R$ 250.000",
            "Mensagem": "Oi",
        }));
        let first = normalize(&f, LeadSource::GoogleForms, "td").unwrap();

        // Feed the canonical values back through the same path.
        let again = form(json!({
            "tenant_id": first.tenant_id,
            "marca_id": first.marca_id,
            "nome": first.nome,
            "email": first.email,
            "telefone": first.telefone,
            "capital": first.capital_disponivel.to_string(),
            "mensagem": first.mensagem_original,
        }));
        let second = normalize(&again, LeadSource::GoogleForms, "td").unwrap();
        assert_eq!(second.nome, first.nome);
        assert_eq!(second.email, first.email);
        assert_eq!(second.telefone, first.telefone);
        assert_eq!(second.capital_disponivel, first.capital_disponivel);
    }
}
