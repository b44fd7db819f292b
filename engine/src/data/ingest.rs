//! Reads an uploaded spreadsheet of unknown encoding/delimiter into a
//! generic [`RawTable`]. Dispatch is extension-driven: `.xlsx` goes through
//! calamine, `.csv` through a prioritized sweep of (encoding, delimiter)
//! pairs with a sniffing fallback.

use crate::error::{EngineError, Result};
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use csv::ReaderBuilder;
use shared::models::{CellValue, RawTable};
use std::io::Cursor;
use tracing::debug;

/// Semicolon first: Brazilian exports overwhelmingly use it.
const DELIMITERS: [u8; 3] = [b';', b',', b'\t'];

#[derive(Debug, Clone, Copy)]
enum Charset {
    Utf8,
    Latin1,
    Windows1252,
}

const CHARSETS: [Charset; 3] = [Charset::Utf8, Charset::Latin1, Charset::Windows1252];

/// Entry point of the pipeline: bytes + file name in, `RawTable` out.
/// Never returns partial data; either the whole table parses or an error.
pub fn ingest(bytes: &[u8], file_name: &str) -> Result<RawTable> {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".xlsx") {
        ingest_xlsx(bytes)
    } else if lower.ends_with(".csv") {
        ingest_csv(bytes)
    } else {
        Err(EngineError::UnsupportedExtension(file_name.to_string()))
    }
}

fn ingest_csv(bytes: &[u8]) -> Result<RawTable> {
    for charset in CHARSETS {
        let Some(text) = decode(bytes, charset) else {
            continue;
        };
        for delimiter in DELIMITERS {
            if let Some(table) = parse_delimited(&text, delimiter) {
                // Success criterion: more than one parsed column.
                if table.headers.len() > 1 {
                    debug!(?charset, delimiter = %(delimiter as char), "CSV combination accepted");
                    return Ok(table);
                }
            }
        }
    }

    // Last resort: guess the delimiter from the header line, UTF-8 lossy.
    let text = String::from_utf8_lossy(bytes);
    if let Some(delimiter) = sniff_delimiter(&text) {
        if let Some(table) = parse_delimited(&text, delimiter) {
            debug!(delimiter = %(delimiter as char), "CSV accepted via delimiter sniffing");
            return Ok(table);
        }
    }

    Err(EngineError::Corrupt(
        "CSV could not be read under any supported encoding/delimiter combination".to_string(),
    ))
}

/// One (already decoded text, delimiter) attempt. Any record-level error
/// rejects the whole attempt so the next combination gets its turn.
fn parse_delimited(text: &str, delimiter: u8) -> Option<RawTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .ok()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.is_empty() {
        return None;
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.ok()?;
        let mut row: Vec<CellValue> = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(field.to_string())
                }
            })
            .collect();
        // Short rows are padded so every row lines up with the header.
        while row.len() < headers.len() {
            row.push(CellValue::Empty);
        }
        rows.push(row);
    }

    Some(RawTable { headers, rows })
}

fn decode(bytes: &[u8], charset: Charset) -> Option<String> {
    match charset {
        Charset::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
        // ISO-8859-1 maps every byte directly to its code point.
        Charset::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
        Charset::Windows1252 => {
            let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
            if had_errors {
                None
            } else {
                Some(text.into_owned())
            }
        }
    }
}

/// Guesses a delimiter from the header line: the most frequent ASCII
/// punctuation byte that could plausibly separate columns. Wider than the
/// prioritized sweep, so files using e.g. `|` or `:` still load.
fn sniff_delimiter(text: &str) -> Option<u8> {
    let first_line = text.lines().next()?;
    let mut counts = [0usize; 128];
    for &b in first_line.as_bytes() {
        if b.is_ascii() && !b.is_ascii_alphanumeric() && !is_non_delimiter(b) {
            counts[b as usize] += 1;
        }
    }
    counts
        .iter()
        .enumerate()
        .filter(|(_, &count)| count > 0)
        .max_by_key(|&(_, &count)| count)
        .map(|(b, _)| b as u8)
}

/// Punctuation that shows up inside header text rather than between columns.
fn is_non_delimiter(b: u8) -> bool {
    matches!(
        b,
        b' ' | b'"' | b'\'' | b'.' | b'-' | b'_' | b'(' | b')' | b'/' | b'%' | b'$' | b'\r'
    )
}

fn ingest_xlsx(bytes: &[u8]) -> Result<RawTable> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)
        .map_err(|e| EngineError::Corrupt(format!("XLSX open failed: {e}")))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| EngineError::Corrupt("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| EngineError::Corrupt(format!("XLSX sheet '{sheet}' unreadable: {e}")))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = rows_iter
        .next()
        .ok_or_else(|| EngineError::Corrupt(format!("sheet '{sheet}' is empty")))?
        .iter()
        .map(|cell| cell.to_string())
        .collect();

    let rows = rows_iter
        .map(|row| row.iter().map(convert_cell).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Bool(b) => CellValue::Text(b.to_string()),
        // Excel-native dates come out in ISO form so the date parser
        // downstream accepts them without locale guessing.
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::Text(naive.date().format("%Y-%m-%d").to_string()),
            None => CellValue::Empty,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
    }
}
