//! Coerces raw cells into canonical types: Brazilian-format amounts,
//! mixed-format dates with a day-first preference, and the status enum.
//! Parsing failures are recovered locally wherever a sane default exists;
//! only missing required columns abort the pass.

use crate::config::settings::EngineSettings;
use crate::data::columns::RenameMap;
use crate::error::{EngineError, Result};
use crate::finance::accrual;
use chrono::NaiveDate;
use shared::models::{
    CanonicalField, CellValue, NormalizedRecord, RawTable, RowWarning, Status, WarningKind,
};
use std::collections::BTreeMap;
use tracing::warn;

/// Brazilian number and date handling for free-form cells.
pub mod brazilian_format {
    use chrono::NaiveDate;

    /// Parses amounts like `"R$ 1.234,56"` → `1234.56`.
    ///
    /// The thousands-dot removal only happens when a decimal comma is
    /// present; a cell like `"1234.56"` is taken as a plain dot-decimal
    /// number. That keeps canonical CSV exports re-ingestable.
    pub fn parse_amount(s: &str) -> Option<f64> {
        let s = s.trim();
        let s = s.strip_prefix("R$").unwrap_or(s).trim();
        if s.is_empty() {
            return None;
        }
        let normalized = if s.contains(',') {
            s.replace('.', "").replace(',', ".")
        } else {
            s.to_string()
        };
        normalized.trim().parse::<f64>().ok()
    }

    /// Mixed-format date parsing. `day_first` picks the winner for
    /// ambiguous slash dates (01/02/2026: Feb 1st when true, Jan 2nd when
    /// false). ISO dates are always accepted.
    pub fn parse_date(s: &str, day_first: bool) -> Option<NaiveDate> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        // Tolerate a trailing time component ("2026-02-10 00:00:00").
        let s = s.split_whitespace().next()?;

        const ISO: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];
        const DAY_FIRST: [&str; 4] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y"];
        const MONTH_FIRST: [&str; 4] = ["%m/%d/%Y", "%m-%d-%Y", "%m.%d.%Y", "%m/%d/%y"];

        let (preferred, fallback) = if day_first {
            (DAY_FIRST, MONTH_FIRST)
        } else {
            (MONTH_FIRST, DAY_FIRST)
        };

        ISO.iter()
            .chain(preferred.iter())
            .chain(fallback.iter())
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    }
}

/// Applies the rename map, validates the required fields, and turns every
/// surviving row into a [`NormalizedRecord`] with freshly computed accrual
/// columns. Original row order is preserved.
pub fn normalize(
    table: &RawTable,
    renames: &RenameMap,
    settings: &EngineSettings,
    today: NaiveDate,
) -> Result<(Vec<NormalizedRecord>, Vec<RowWarning>)> {
    let columns = canonical_columns(table, renames);

    let missing: Vec<String> = CanonicalField::REQUIRED
        .iter()
        .filter(|field| !columns.contains_key(field))
        .map(|field| field.header().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(EngineError::MissingRequiredColumns {
            missing,
            available: table.headers.iter().map(|h| h.trim().to_string()).collect(),
        });
    }

    let mut records = Vec::with_capacity(table.rows.len());
    let mut warnings = Vec::new();

    for (row_index, _) in table.rows.iter().enumerate() {
        let cell = |field: CanonicalField| -> Option<&CellValue> {
            columns
                .get(&field)
                .and_then(|&col| table.cell(row_index, col))
        };

        let due_date = cell(CanonicalField::DueDate).and_then(|c| parse_date_cell(c, settings.day_first));
        if due_date.is_none() {
            warnings.push(RowWarning {
                row: row_index,
                kind: WarningKind::DateUnparseable,
            });
            if settings.drop_unparseable_dates {
                warn!(row = row_index, "dropping row with unparseable due date");
                continue;
            }
        }

        let amount = match cell(CanonicalField::Amount).map(|c| parse_amount_cell(c)) {
            Some(Some(value)) if value >= 0.0 => value,
            // Unparseable (or negative, which violates the schema) becomes
            // zero debt rather than rejecting the row. Deliberate leniency;
            // the warning count is surfaced so it is not silent.
            _ => {
                warnings.push(RowWarning {
                    row: row_index,
                    kind: WarningKind::AmountUnparseable,
                });
                0.0
            }
        };

        let tenant = cell(CanonicalField::Tenant)
            .map(|c| c.to_string().trim().to_string())
            .unwrap_or_default();

        // No status column, or a value nobody recognizes: Pendente.
        let status = cell(CanonicalField::Status)
            .and_then(|c| c.as_text())
            .and_then(Status::parse)
            .unwrap_or(Status::Pending);

        let paid_on = cell(CanonicalField::PaidOn).and_then(|c| parse_date_cell(c, settings.day_first));

        let property = cell(CanonicalField::Property)
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string().trim().to_string());

        let mut record = NormalizedRecord {
            tenant,
            property,
            due_date,
            amount,
            status,
            paid_on,
            days_late: 0,
            late_fee: 0.0,
            interest: 0.0,
            total_due: amount,
        };
        accrual::refresh(&mut record, settings, today);
        records.push(record);
    }

    Ok((records, warnings))
}

/// Canonical field → column index, merging exact-named columns with the
/// resolver's renames. First matching column wins for each field.
fn canonical_columns(table: &RawTable, renames: &RenameMap) -> BTreeMap<CanonicalField, usize> {
    let all_fields = [
        CanonicalField::Amount,
        CanonicalField::DueDate,
        CanonicalField::Tenant,
        CanonicalField::Status,
        CanonicalField::PaidOn,
        CanonicalField::Property,
    ];

    let mut columns = BTreeMap::new();
    for (index, header) in table.headers.iter().enumerate() {
        let name = header.trim();
        let field = all_fields
            .iter()
            .copied()
            .find(|f| f.header() == name)
            .or_else(|| renames.get(name).copied());
        if let Some(field) = field {
            columns.entry(field).or_insert(index);
        }
    }
    columns
}

fn parse_amount_cell(cell: &CellValue) -> Option<f64> {
    match cell {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => brazilian_format::parse_amount(s),
        CellValue::Empty => None,
    }
}

fn parse_date_cell(cell: &CellValue, day_first: bool) -> Option<NaiveDate> {
    match cell {
        CellValue::Text(s) => brazilian_format::parse_date(s, day_first),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::columns::resolve_columns;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 20).unwrap()
    }

    fn text_row(cells: &[&str]) -> Vec<CellValue> {
        cells
            .iter()
            .map(|c| {
                if c.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(c.to_string())
                }
            })
            .collect()
    }

    fn run(headers: &[&str], rows: &[&[&str]]) -> Result<(Vec<NormalizedRecord>, Vec<RowWarning>)> {
        let table = RawTable {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows.iter().map(|r| text_row(r)).collect(),
        };
        let renames = resolve_columns(&table);
        normalize(&table, &renames, &EngineSettings::default(), today())
    }

    #[test]
    fn test_brazilian_amount() {
        let (records, warnings) = run(
            &["Inquilino", "Vencimento", "Valor"],
            &[&["João", "10/02/2026", "R$ 1.234,56"]],
        )
        .unwrap();
        assert!(warnings.is_empty());
        assert_eq!(records[0].amount, 1234.56);
    }

    #[test]
    fn test_parse_amount_variants() {
        use brazilian_format::parse_amount;
        assert_eq!(parse_amount("R$ 1.234,56"), Some(1234.56));
        assert_eq!(parse_amount("150,00"), Some(150.0));
        assert_eq!(parse_amount("1234.56"), Some(1234.56));
        assert_eq!(parse_amount("2500"), Some(2500.0));
        assert_eq!(parse_amount("  R$  3.000,00 "), Some(3000.0));
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_parse_date_day_first_preference() {
        use brazilian_format::parse_date;
        assert_eq!(
            parse_date("01/02/2026", true),
            NaiveDate::from_ymd_opt(2026, 2, 1)
        );
        assert_eq!(
            parse_date("01/02/2026", false),
            NaiveDate::from_ymd_opt(2026, 1, 2)
        );
        // Unambiguous inputs parse regardless of the preference.
        assert_eq!(
            parse_date("25/12/2025", false),
            NaiveDate::from_ymd_opt(2025, 12, 25)
        );
        assert_eq!(
            parse_date("2026-02-10", true),
            NaiveDate::from_ymd_opt(2026, 2, 10)
        );
        assert_eq!(
            parse_date("2026-02-10 00:00:00", true),
            NaiveDate::from_ymd_opt(2026, 2, 10)
        );
        assert_eq!(parse_date("not a date", true), None);
    }

    #[test]
    fn test_missing_required_columns() {
        let err = run(&["Inquilino", "Vencimento"], &[&["João", "10/02/2026"]]).unwrap_err();
        match err {
            EngineError::MissingRequiredColumns { missing, available } => {
                assert_eq!(missing, vec!["Valor".to_string()]);
                assert!(available.contains(&"Inquilino".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_defaults_to_pending_when_column_absent() {
        let (records, _) = run(
            &["Inquilino", "Vencimento", "Valor"],
            &[&["João", "10/02/2026", "100,00"]],
        )
        .unwrap();
        assert_eq!(records[0].status, Status::Pending);
    }

    #[test]
    fn test_unknown_status_value_defaults_to_pending() {
        let (records, _) = run(
            &["Inquilino", "Vencimento", "Valor", "Status"],
            &[&["João", "10/02/2026", "100,00", "???"]],
        )
        .unwrap();
        assert_eq!(records[0].status, Status::Pending);
    }

    #[test]
    fn test_unparseable_date_drops_row_with_warning() {
        let (records, warnings) = run(
            &["Inquilino", "Vencimento", "Valor"],
            &[
                &["João", "não sei", "100,00"],
                &["Maria", "15/02/2026", "200,00"],
            ],
        )
        .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tenant, "Maria");
        assert_eq!(
            warnings,
            vec![RowWarning {
                row: 0,
                kind: WarningKind::DateUnparseable
            }]
        );
    }

    #[test]
    fn test_lenient_mode_keeps_row_without_accrual() {
        let table = RawTable {
            headers: vec!["Inquilino".into(), "Vencimento".into(), "Valor".into()],
            rows: vec![text_row(&["João", "???", "100,00"])],
        };
        let settings = EngineSettings {
            drop_unparseable_dates: false,
            ..EngineSettings::default()
        };
        let (records, warnings) =
            normalize(&table, &resolve_columns(&table), &settings, today()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].due_date, None);
        assert_eq!(records[0].days_late, 0);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unparseable_amount_becomes_zero_with_warning() {
        let (records, warnings) = run(
            &["Inquilino", "Vencimento", "Valor"],
            &[&["João", "10/02/2026", "a combinar"]],
        )
        .unwrap();
        assert_eq!(records[0].amount, 0.0);
        assert_eq!(warnings[0].kind, WarningKind::AmountUnparseable);
    }

    #[test]
    fn test_negative_amount_is_zeroed() {
        let (records, warnings) = run(
            &["Inquilino", "Vencimento", "Valor"],
            &[&["João", "10/02/2026", "-50,00"]],
        )
        .unwrap();
        assert_eq!(records[0].amount, 0.0);
        assert_eq!(warnings[0].kind, WarningKind::AmountUnparseable);
    }

    #[test]
    fn test_renamed_columns_flow_through() {
        let (records, _) = run(
            &["Nome do Cliente", "Data Venc", "Total Cobrado", "Unidade"],
            &[&["Ana Costa", "30/01/2026", "3.000,00", "Loja 01"]],
        )
        .unwrap();
        assert_eq!(records[0].tenant, "Ana Costa");
        assert_eq!(records[0].amount, 3000.0);
        assert_eq!(records[0].property.as_deref(), Some("Loja 01"));
        assert_eq!(
            records[0].due_date,
            NaiveDate::from_ymd_opt(2026, 1, 30)
        );
    }

    #[test]
    fn test_derived_fields_computed_for_overdue_row() {
        let (records, _) = run(
            &["Inquilino", "Vencimento", "Valor", "Status"],
            &[&["Construtora XYZ", "10/12/2025", "15.000,00", "Atrasado"]],
        )
        .unwrap();
        let r = &records[0];
        // 2025-12-10 → 2026-02-20 is 72 days.
        assert_eq!(r.days_late, 72);
        assert!(r.late_fee > 0.0);
        assert!(r.interest > 0.0);
        assert!((r.total_due - (r.amount + r.late_fee + r.interest)).abs() < 1e-9);
    }

    #[test]
    fn test_row_order_preserved() {
        let (records, _) = run(
            &["Inquilino", "Vencimento", "Valor"],
            &[
                &["C", "10/02/2026", "1,00"],
                &["A", "11/02/2026", "2,00"],
                &["B", "12/02/2026", "3,00"],
            ],
        )
        .unwrap();
        let names: Vec<&str> = records.iter().map(|r| r.tenant.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }
}
