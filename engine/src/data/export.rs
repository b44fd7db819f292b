//! Canonical CSV export: UTF-8, comma-separated, canonical + derived
//! columns, numbers at full precision. Re-ingesting an export through the
//! pipeline reproduces the same derived values.

use crate::error::Result;
use csv::WriterBuilder;
use shared::models::NormalizedRecord;
use std::io::Write;

pub const EXPORT_HEADERS: [&str; 10] = [
    "Inquilino",
    "Imóvel",
    "Vencimento",
    "Valor",
    "Status",
    "Pago_em",
    "Dias Atraso",
    "Multa",
    "Juros",
    "Total Devido",
];

pub fn write_csv<W: Write>(records: &[NormalizedRecord], out: W) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(out);
    writer.write_record(EXPORT_HEADERS)?;
    for r in records {
        writer.write_record(&[
            r.tenant.clone(),
            r.property.clone().unwrap_or_default(),
            r.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            r.amount.to_string(),
            r.status.to_string(),
            r.paid_on.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            r.days_late.to_string(),
            r.late_fee.to_string(),
            r.interest.to_string(),
            r.total_due.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn to_csv_string(records: &[NormalizedRecord]) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(records, &mut buffer)?;
    // The writer only ever emits UTF-8.
    Ok(String::from_utf8(buffer).unwrap_or_default())
}
