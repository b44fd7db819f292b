//! Maps free-form header names onto the canonical schema.
//!
//! Resolution is a pure function of the column names: a static keyword
//! table, evaluated in fixed field-priority order, where the first column
//! whose lower-cased name contains one of the field's keywords wins.

use shared::models::{CanonicalField, RawTable};
use std::collections::BTreeMap;

/// Existing column name (trimmed) → canonical field it should be renamed to.
/// Fields with no confident match are simply absent.
pub type RenameMap = BTreeMap<String, CanonicalField>;

/// Synonym table, Portuguese and English business/real-estate vocabulary.
/// Order encodes priority: Amount resolves before DueDate, and so on, so
/// an ambiguous column is claimed by the earlier field.
const SYNONYMS: &[(CanonicalField, &[&str])] = &[
    (
        CanonicalField::Amount,
        &[
            "valor", "total", "aluguel", "preço", "preco", "quantia", "montante", "devido",
            "debito", "arrecadado", "pagar", "cobrado", "mensalidade", "boleto", "price",
            "amount", "value", "cost",
        ],
    ),
    (
        CanonicalField::DueDate,
        &[
            "vencimento", "data", "venc", "dt_venc", "dia", "periodo", "competencia", "prazo",
            "limite", "date", "due_date", "deadline", "when",
        ],
    ),
    (
        CanonicalField::Tenant,
        &[
            "inquilino", "cliente", "locatario", "nome", "morador", "pessoa", "pagador",
            "responsavel", "condomino", "usuario", "sacado", "tenant", "name", "client", "payer",
        ],
    ),
    (
        CanonicalField::Status,
        &[
            "status", "estado", "situacao", "pagamento", "condicao", "posicao", "situ",
            "estagio", "state", "condition", "situation",
        ],
    ),
    (
        CanonicalField::PaidOn,
        &[
            "pago", "data_pagamento", "quitado", "recebido", "baixa", "confirmacao",
            "compensacao", "paid", "payment_date", "receipt",
        ],
    ),
    (
        CanonicalField::Property,
        &[
            "imovel", "unidade", "apartamento", "sala", "casa", "loja", "apto", "bloco",
            "edificio", "condominio", "property", "unit", "location",
        ],
    ),
];

/// Deterministic, content-blind schema matching. Never fails: missing
/// required fields are detected later by the normalizer.
pub fn resolve_columns(table: &RawTable) -> RenameMap {
    let trimmed: Vec<String> = table.headers.iter().map(|h| h.trim().to_string()).collect();

    // Candidate pool in original column order. A claimed column leaves the
    // pool so a later field cannot take it again.
    let mut pool: Vec<(String, String)> = trimmed
        .iter()
        .map(|h| (h.to_lowercase(), h.clone()))
        .collect();

    let mut renames = RenameMap::new();
    for (field, keywords) in SYNONYMS {
        // A column already carrying the exact canonical name takes precedence
        // over any keyword match.
        if trimmed.iter().any(|h| h == field.header()) {
            continue;
        }

        if let Some(pos) = pool
            .iter()
            .position(|(lower, _)| keywords.iter().any(|k| lower.contains(k)))
        {
            let (_, original) = pool.remove(pos);
            renames.insert(original, *field);
        }
    }
    renames
}
