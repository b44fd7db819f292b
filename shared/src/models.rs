use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six logical fields every ingested rent roll is mapped onto.
///
/// Variant order is the resolution priority: when two fields' keyword sets
/// could both claim the same column, the earlier variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
    Amount,
    DueDate,
    Tenant,
    Status,
    PaidOn,
    Property,
}

impl CanonicalField {
    /// Header name as written in files. Brazilian rent rolls are the common
    /// case, so the canonical headers are the Portuguese ones.
    pub fn header(&self) -> &'static str {
        match self {
            CanonicalField::Amount => "Valor",
            CanonicalField::DueDate => "Vencimento",
            CanonicalField::Tenant => "Inquilino",
            CanonicalField::Status => "Status",
            CanonicalField::PaidOn => "Pago_em",
            CanonicalField::Property => "Imóvel",
        }
    }

    /// Fields that must be resolvable or the whole ingestion is rejected.
    pub const REQUIRED: [CanonicalField; 3] = [
        CanonicalField::Tenant,
        CanonicalField::DueDate,
        CanonicalField::Amount,
    ];
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// An untyped spreadsheet cell, as read from the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Empty,
}

impl CellValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Empty => Ok(()),
        }
    }
}

/// A generic table read straight out of a file, before any schema work.
///
/// Headers are kept exactly as the file claims them (order preserved,
/// whitespace-padded and duplicated names possible). Immutable after
/// ingestion; the normalizer consumes it to produce `NormalizedRecord`s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Index of the first column whose trimmed name equals `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }
}

/// Payment status of a single rent installment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Paid,
    Pending,
    Overdue,
}

impl Status {
    /// Accepts Portuguese and English spellings, case-insensitively.
    /// Unknown values return `None`; callers default those to `Pending`.
    pub fn parse(s: &str) -> Option<Status> {
        match s.trim().to_lowercase().as_str() {
            "pago" | "paga" | "quitado" | "paid" => Some(Status::Paid),
            "pendente" | "aberto" | "em aberto" | "pending" | "open" => Some(Status::Pending),
            "atrasado" | "atrasada" | "vencido" | "inadimplente" | "overdue" | "late" => {
                Some(Status::Overdue)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Portuguese display forms; these round-trip through Status::parse.
        let s = match self {
            Status::Paid => "Pago",
            Status::Pending => "Pendente",
            Status::Overdue => "Atrasado",
        };
        f.write_str(s)
    }
}

/// One rent-roll row after column resolution and value normalization,
/// including the derived accrual columns.
///
/// The derived fields (`days_late`, `late_fee`, `interest`, `total_due`)
/// are never set directly; they are recomputed from amount, due date and
/// status every time one of those changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub tenant: String,
    pub property: Option<String>,
    /// `None` only when the session runs with lenient date handling.
    pub due_date: Option<NaiveDate>,
    pub amount: f64,
    pub status: Status,
    pub paid_on: Option<NaiveDate>,
    pub days_late: i64,
    pub late_fee: f64,
    pub interest: f64,
    pub total_due: f64,
}

/// Non-fatal problem found while normalizing a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    DateUnparseable,
    AmountUnparseable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowWarning {
    /// Zero-based data row index in the source table.
    pub row: usize,
    pub kind: WarningKind,
}

/// Portfolio aggregates shown by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kpis {
    /// Sum of amounts already paid.
    pub confirmed_revenue: f64,
    /// Sum of total due (amount + fee + interest) over overdue rows.
    pub overdue_total: f64,
    pub overdue_count: usize,
    /// Sum of amounts still pending.
    pub pending_total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_portuguese_and_english() {
        assert_eq!(Status::parse("Pago"), Some(Status::Paid));
        assert_eq!(Status::parse("  paid "), Some(Status::Paid));
        assert_eq!(Status::parse("PENDENTE"), Some(Status::Pending));
        assert_eq!(Status::parse("Atrasado"), Some(Status::Overdue));
        assert_eq!(Status::parse("overdue"), Some(Status::Overdue));
        assert_eq!(Status::parse("???"), None);
    }

    #[test]
    fn test_status_display_round_trips() {
        for status in [Status::Paid, Status::Pending, Status::Overdue] {
            assert_eq!(Status::parse(&status.to_string()), Some(status));
        }
    }

    #[test]
    fn test_canonical_headers() {
        assert_eq!(CanonicalField::Amount.header(), "Valor");
        assert_eq!(CanonicalField::DueDate.header(), "Vencimento");
        assert_eq!(CanonicalField::Tenant.header(), "Inquilino");
    }

    #[test]
    fn test_raw_table_column_index_trims() {
        let table = RawTable {
            headers: vec!["  Valor  ".to_string(), "Vencimento".to_string()],
            rows: vec![],
        };
        assert_eq!(table.column_index("Valor"), Some(0));
        assert_eq!(table.column_index("Vencimento"), Some(1));
        assert_eq!(table.column_index("Inquilino"), None);
    }

    #[test]
    fn test_cell_value_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::Text("   ".to_string()).is_empty());
        assert!(!CellValue::Text("x".to_string()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
    }
}
