//! Banco Central do Brasil SGS series lookup (IPCA / IGP-M).
//!
//! This is an out-of-process collaborator: requests are synchronous with a
//! timeout, results are cached per (indicator, start date), and failures
//! are logged and swallowed; they never reach the normalization pipeline.

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Indicator {
    Ipca,
    IgpM,
}

impl Indicator {
    /// Fixed upstream SGS series identifiers.
    pub fn series_code(&self) -> u32 {
        match self {
            Indicator::Ipca => 433,
            Indicator::IgpM => 189,
        }
    }

    pub fn parse(s: &str) -> Option<Indicator> {
        match s.trim().to_uppercase().as_str() {
            "IPCA" => Some(Indicator::Ipca),
            "IGP-M" | "IGPM" => Some(Indicator::IgpM),
            _ => None,
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Indicator::Ipca => f.write_str("IPCA"),
            Indicator::IgpM => f.write_str("IGP-M"),
        }
    }
}

/// One monthly observation: percent variation for that month.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Wire format of the SGS JSON endpoint.
#[derive(Deserialize)]
struct SgsEntry {
    data: String,
    valor: String,
}

struct CacheEntry {
    fetched_at: Instant,
    series: Vec<IndexPoint>,
}

pub struct InflationClient {
    http: reqwest::blocking::Client,
    cache: Mutex<HashMap<(Indicator, NaiveDate), CacheEntry>>,
    ttl: Duration,
}

impl InflationClient {
    pub fn new(timeout: Duration, cache_ttl: Duration) -> reqwest::Result<Self> {
        let http = reqwest::blocking::Client::builder().timeout(timeout).build()?;
        Ok(InflationClient {
            http,
            cache: Mutex::new(HashMap::new()),
            ttl: cache_ttl,
        })
    }

    /// The series since `start`, or `None` on any failure. Errors never
    /// propagate past this boundary; the cause is logged.
    pub fn index_series(&self, indicator: Indicator, start: NaiveDate) -> Option<Vec<IndexPoint>> {
        if let Ok(cache) = self.cache.lock() {
            if let Some(entry) = cache.get(&(indicator, start)) {
                if entry.fetched_at.elapsed() < self.ttl {
                    return Some(entry.series.clone());
                }
            }
        }

        match self.fetch(indicator, start) {
            Ok(series) => {
                if let Ok(mut cache) = self.cache.lock() {
                    cache.insert(
                        (indicator, start),
                        CacheEntry {
                            fetched_at: Instant::now(),
                            series: series.clone(),
                        },
                    );
                }
                Some(series)
            }
            Err(e) => {
                error!(%indicator, %start, cause = %e, "BCB series lookup failed");
                None
            }
        }
    }

    fn fetch(&self, indicator: Indicator, start: NaiveDate) -> anyhow::Result<Vec<IndexPoint>> {
        let entries: Vec<SgsEntry> = self
            .http
            .get(series_url(indicator, start))
            .send()?
            .error_for_status()?
            .json()?;

        entries
            .into_iter()
            .map(|entry| {
                Ok(IndexPoint {
                    date: NaiveDate::parse_from_str(&entry.data, "%d/%m/%Y")?,
                    // SGS sends dot decimals, but tolerate the comma form.
                    value: entry.valor.trim().replace(',', ".").parse::<f64>()?,
                })
            })
            .collect()
    }
}

fn series_url(indicator: Indicator, start: NaiveDate) -> String {
    format!(
        "https://api.bcb.gov.br/dados/serie/bcdata.sgs.{}/dados?formato=json&dataInicial={}",
        indicator.series_code(),
        start.format("%d/%m/%Y")
    )
}

/// Sum of the monthly percents, the dashboard's "IPCA 12 meses" figure.
pub fn accumulated_percent(series: &[IndexPoint]) -> f64 {
    series.iter().map(|p| p.value).sum()
}
