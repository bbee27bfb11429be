//! CSV loaders for the options chain and underlying price history
//!
//! This is the fatal boundary: unparseable dates or numbers, missing
//! columns, and duplicate price dates abort the run with context naming the
//! file and row. Past this point the core assumes well-formed tables and
//! only ever skips, never fails.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::models::{OptionChainStore, OptionQuote, PriceSeries};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct ChainRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Expiration")]
    expiration: String,
    #[serde(rename = "Strike")]
    strike: f64,
    #[serde(rename = "Close")]
    close: f64,
}

#[derive(Debug, Deserialize)]
struct PriceRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Close")]
    close: f64,
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .with_context(|| format!("invalid date '{}', expected {}", raw, DATE_FORMAT))
}

/// Load the options chain CSV (Date, Expiration, Strike, Close)
///
/// Row order within each quote date is preserved; the selector's tie-break
/// depends on it. Extra columns are ignored.
pub fn load_option_chains(path: &Path) -> Result<OptionChainStore> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open options chain {}", path.display()))?;

    let mut store = OptionChainStore::new();
    for (i, record) in reader.deserialize::<ChainRecord>().enumerate() {
        // Header occupies line 1
        let line = i + 2;
        let record =
            record.with_context(|| format!("{}: line {}", path.display(), line))?;

        store.push(OptionQuote {
            quote_date: parse_date(&record.date)
                .with_context(|| format!("{}: line {}", path.display(), line))?,
            expiration: parse_date(&record.expiration)
                .with_context(|| format!("{}: line {}", path.display(), line))?,
            strike: record.strike,
            close: record.close,
        });
    }

    info!(
        "Loaded {} option quotes across {} snapshot days from {}",
        store.quote_count(),
        store.day_count(),
        path.display()
    );
    Ok(store)
}

/// Load the underlying price history CSV (Date, Close), one row per trading
/// date with unique dates
pub fn load_price_series(path: &Path) -> Result<PriceSeries> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open price history {}", path.display()))?;

    let mut series = PriceSeries::new();
    for (i, record) in reader.deserialize::<PriceRecord>().enumerate() {
        let line = i + 2;
        let record =
            record.with_context(|| format!("{}: line {}", path.display(), line))?;
        let date = parse_date(&record.date)
            .with_context(|| format!("{}: line {}", path.display(), line))?;

        if !series.insert(date, record.close) {
            bail!(
                "{}: line {}: duplicate trading date {}",
                path.display(),
                line,
                date
            );
        }
    }

    info!(
        "Loaded {} trading days from {}",
        series.len(),
        path.display()
    );
    Ok(series)
}
