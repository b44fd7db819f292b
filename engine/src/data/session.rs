//! Per-session state. One session owns one normalized record set,
//! replaced wholesale on upload and mutated field-by-field on edit; every
//! edit re-runs only the accrual calculator, never the ingestor/resolver.

use crate::config::settings::EngineSettings;
use crate::data::{columns, ingest, normalize};
use crate::error::Result;
use crate::finance::accrual;
use chrono::NaiveDate;
use shared::models::{Kpis, NormalizedRecord, RowWarning, Status};
use tracing::info;

/// Built-in sample rent roll, shown when no file has been uploaded yet.
/// Runs through the full pipeline like any other upload.
const DEMO_CSV: &str = "\
Inquilino;Imóvel;Vencimento;Valor;Status;Pago_em
João Silva;Apt 101;10/02/2026;R$ 2.500,00;Pago;10/02/2026
Maria Oliveira;Sala 20;15/02/2026;R$ 4.200,00;Pendente;
Construtora XYZ;Galpão B;10/12/2025;R$ 15.000,00;Atrasado;
Pedro Santos;Apt 304;25/02/2026;R$ 1.800,00;Pendente;
Ana Costa;Loja 01;30/01/2026;R$ 3.000,00;Atrasado;
Roberto Freire;Casa 05;05/02/2026;R$ 5.500,00;Pago;05/02/2026
";

pub struct Session {
    settings: EngineSettings,
    today: NaiveDate,
    records: Vec<NormalizedRecord>,
    warnings: Vec<RowWarning>,
}

impl Session {
    pub fn new(settings: EngineSettings, today: NaiveDate) -> Self {
        Session {
            settings,
            today,
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Runs the whole pipeline on an uploaded file and replaces the current
    /// record set. On error nothing changes.
    pub fn load(&mut self, bytes: &[u8], file_name: &str) -> Result<()> {
        let table = ingest::ingest(bytes, file_name)?;
        let renames = columns::resolve_columns(&table);
        let (records, warnings) =
            normalize::normalize(&table, &renames, &self.settings, self.today)?;
        info!(
            file = file_name,
            rows = records.len(),
            warnings = warnings.len(),
            renamed = renames.len(),
            "rent roll loaded"
        );
        self.records = records;
        self.warnings = warnings;
        Ok(())
    }

    pub fn load_demo(&mut self) -> Result<()> {
        self.load(DEMO_CSV.as_bytes(), "demo.csv")
    }

    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn warnings(&self) -> &[RowWarning] {
        &self.warnings
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Changing the rates re-prices the whole set.
    pub fn set_rates(&mut self, late_fee_percent: f64, monthly_interest_percent: f64) {
        self.settings.late_fee_percent = late_fee_percent;
        self.settings.monthly_interest_percent = monthly_interest_percent;
        for record in &mut self.records {
            accrual::refresh(record, &self.settings, self.today);
        }
    }

    pub fn set_amount(&mut self, index: usize, amount: f64) -> Option<&NormalizedRecord> {
        let record = self.records.get_mut(index)?;
        record.amount = amount;
        accrual::refresh(record, &self.settings, self.today);
        Some(&self.records[index])
    }

    pub fn set_due_date(&mut self, index: usize, due_date: NaiveDate) -> Option<&NormalizedRecord> {
        let record = self.records.get_mut(index)?;
        record.due_date = Some(due_date);
        accrual::refresh(record, &self.settings, self.today);
        Some(&self.records[index])
    }

    pub fn set_status(&mut self, index: usize, status: Status) -> Option<&NormalizedRecord> {
        let record = self.records.get_mut(index)?;
        record.status = status;
        accrual::refresh(record, &self.settings, self.today);
        Some(&self.records[index])
    }

    /// The payment date is informational; it feeds no derived field.
    pub fn set_paid_on(
        &mut self,
        index: usize,
        paid_on: Option<NaiveDate>,
    ) -> Option<&NormalizedRecord> {
        let record = self.records.get_mut(index)?;
        record.paid_on = paid_on;
        Some(&self.records[index])
    }

    pub fn kpis(&self) -> Kpis {
        let mut kpis = Kpis::default();
        for r in &self.records {
            match r.status {
                Status::Paid => kpis.confirmed_revenue += r.amount,
                Status::Pending => kpis.pending_total += r.amount,
                Status::Overdue => {
                    kpis.overdue_total += r.total_due;
                    kpis.overdue_count += 1;
                }
            }
        }
        kpis
    }

    /// Overdue records, worst first.
    pub fn delinquents(&self) -> Vec<&NormalizedRecord> {
        let mut rows: Vec<&NormalizedRecord> = self
            .records
            .iter()
            .filter(|r| r.status == Status::Overdue)
            .collect();
        rows.sort_by(|a, b| b.days_late.cmp(&a.days_late));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let today = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();
        let mut session = Session::new(EngineSettings::default(), today);
        session.load_demo().unwrap();
        session
    }

    #[test]
    fn test_demo_loads_all_rows() {
        let s = session();
        assert_eq!(s.records().len(), 6);
        assert!(s.warnings().is_empty());
    }

    #[test]
    fn test_kpis_match_demo_data() {
        let s = session();
        let kpis = s.kpis();
        // Paid: 2500 + 5500; pending: 4200 + 1800.
        assert_eq!(kpis.confirmed_revenue, 8000.0);
        assert_eq!(kpis.pending_total, 6000.0);
        assert_eq!(kpis.overdue_count, 2);
        // Overdue totals include fee and interest, so they exceed principal.
        assert!(kpis.overdue_total > 18000.0);
    }

    #[test]
    fn test_delinquents_sorted_worst_first() {
        let s = session();
        let rows = s.delinquents();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tenant, "Construtora XYZ");
        assert!(rows[0].days_late >= rows[1].days_late);
    }

    #[test]
    fn test_edit_status_recomputes_derived_fields() {
        let mut s = session();
        let overdue_index = s
            .records()
            .iter()
            .position(|r| r.tenant == "Construtora XYZ")
            .unwrap();
        assert!(s.records()[overdue_index].total_due > 15000.0);

        let updated = s.set_status(overdue_index, Status::Paid).unwrap();
        assert_eq!(updated.days_late, 0);
        assert_eq!(updated.late_fee, 0.0);
        assert_eq!(updated.total_due, 15000.0);
    }

    #[test]
    fn test_edit_amount_recomputes_derived_fields() {
        let mut s = session();
        let i = s
            .records()
            .iter()
            .position(|r| r.tenant == "Ana Costa")
            .unwrap();
        let before = s.records()[i].total_due;
        let updated = s.set_amount(i, 6000.0).unwrap();
        assert!(updated.total_due > before);
        assert_eq!(updated.amount, 6000.0);
    }

    #[test]
    fn test_edit_out_of_range_is_none() {
        let mut s = session();
        assert!(s.set_amount(99, 1.0).is_none());
    }

    #[test]
    fn test_set_rates_reprices_everything() {
        let mut s = session();
        let before = s.kpis().overdue_total;
        s.set_rates(20.0, 2.0);
        assert!(s.kpis().overdue_total > before);
    }

    #[test]
    fn test_load_replaces_wholesale() {
        let mut s = session();
        let csv = "Inquilino;Vencimento;Valor\nZé;01/03/2026;100,00\n";
        s.load(csv.as_bytes(), "novo.csv").unwrap();
        assert_eq!(s.records().len(), 1);
        assert_eq!(s.records()[0].tenant, "Zé");
    }

    #[test]
    fn test_failed_load_keeps_previous_records() {
        let mut s = session();
        let err = s.load("Inquilino;Vencimento\nJoão;01/01/2026\n".as_bytes(), "bad.csv");
        assert!(err.is_err());
        assert_eq!(s.records().len(), 6);
    }
}
