// Rent-roll engine entry point: ingest a spreadsheet, print the portfolio
// summary, optionally write the canonical CSV report and query BCB indices.
//
// Usage: rentroll [FILE.csv|FILE.xlsx] [REPORT.csv] [--ipca|--igpm]
use anyhow::{Context, Result};
use chrono::{Local, Months};
use engine::config::settings::EngineSettings;
use engine::data::export;
use engine::data::session::Session;
use engine::services::inflation::{self, InflationClient};
use shared::models::WarningKind;
use shared::utils::format_currency;
use std::fs;
use std::time::Duration;
use tracing::{info, warn};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let flags: Vec<&str> = args
        .iter()
        .filter(|a| a.starts_with("--"))
        .map(|a| a.as_str())
        .collect();
    let mut positional = args.iter().filter(|a| !a.starts_with("--"));
    let input = positional.next();
    let report_path = positional.next();

    let settings = EngineSettings::default();
    let today = Local::now().date_naive();
    let mut session = Session::new(settings, today);

    match input {
        Some(path) => {
            let bytes = fs::read(path).with_context(|| format!("reading '{path}'"))?;
            session.load(&bytes, path)?;
        }
        None => {
            info!("no file given, loading demonstration data");
            session.load_demo()?;
        }
    }

    print_summary(&session);

    if let Some(path) = report_path {
        let csv = export::to_csv_string(session.records())?;
        fs::write(path, csv).with_context(|| format!("writing '{path}'"))?;
        info!(file = %path, "canonical report written");
    }

    let indicator = flags.iter().find_map(|f| match *f {
        "--ipca" => inflation::Indicator::parse("IPCA"),
        "--igpm" => inflation::Indicator::parse("IGP-M"),
        _ => None,
    });
    if let Some(indicator) = indicator {
        print_inflation(&session, indicator, today)?;
    }

    Ok(())
}

fn print_summary(session: &Session) {
    let kpis = session.kpis();
    println!("Receita confirmada:  {}", format_currency(kpis.confirmed_revenue));
    println!(
        "Inadimplência:       {} ({} contratos)",
        format_currency(kpis.overdue_total),
        kpis.overdue_count
    );
    println!("Receita pendente:    {}", format_currency(kpis.pending_total));

    let date_warnings = session
        .warnings()
        .iter()
        .filter(|w| w.kind == WarningKind::DateUnparseable)
        .count();
    let amount_warnings = session.warnings().len() - date_warnings;
    if !session.warnings().is_empty() {
        warn!(
            dropped_dates = date_warnings,
            zeroed_amounts = amount_warnings,
            "some rows could not be fully parsed"
        );
    }

    let delinquents = session.delinquents();
    if !delinquents.is_empty() {
        println!("\nPagamentos atrasados:");
        for r in delinquents {
            println!(
                "  {:<20} {:>4} dias  {}",
                r.tenant,
                r.days_late,
                format_currency(r.total_due)
            );
        }
    }
}

fn print_inflation(
    session: &Session,
    indicator: inflation::Indicator,
    today: chrono::NaiveDate,
) -> Result<()> {
    let client = InflationClient::new(
        Duration::from_secs(session.settings().bcb_timeout_secs),
        Duration::from_secs(session.settings().bcb_cache_ttl_secs),
    )?;
    let start = today
        .checked_sub_months(Months::new(12))
        .unwrap_or(today);
    match client.index_series(indicator, start) {
        Some(series) => {
            println!(
                "\n{} acumulado 12 meses: {:.2}%",
                indicator,
                inflation::accumulated_percent(&series)
            );
        }
        // Lookup failures stay isolated from the rent-roll results.
        None => println!("\n{indicator}: indisponível no momento"),
    }
    Ok(())
}
