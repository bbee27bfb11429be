use anyhow::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::models::{BacktestConfig, BacktestResult, PriceSeries, SweepEntry};

/// Generate a human-readable summary report for a fixed-offset run
pub fn generate_run_report(
    result: &BacktestResult,
    config: &BacktestConfig,
    prices: &PriceSeries,
) -> String {
    let mut report = String::new();

    report.push_str("╔══════════════════════════════════════════════════════════════╗\n");
    report.push_str("║              WHEEL STRATEGY BACKTEST - SUMMARY               ║\n");
    report.push_str("╚══════════════════════════════════════════════════════════════╝\n\n");

    report.push_str("⚙️  CONFIGURATION\n");
    report.push_str("─────────────────────────────────────────\n");
    report.push_str(&format!("  Put offset below spot:   ${:.2}\n", config.offset));
    report.push_str(&format!("  Min days to expiration:  {}\n", config.expiration_days));
    report.push_str(&format!("  Call offset:             ${:.2}\n", config.call_offset));
    report.push_str(&format!("  Profit convention:       {}\n", config.convention));
    report.push('\n');

    report.push_str("📊 DATA\n");
    report.push_str("─────────────────────────────────────────\n");
    report.push_str(&format!("  Trading days:            {}\n", prices.len()));
    if let Some((start, end)) = prices.date_range() {
        report.push_str(&format!("  Date range:              {} to {}\n", start, end));
    }
    report.push('\n');

    report.push_str("📈 RESULTS\n");
    report.push_str("─────────────────────────────────────────\n");
    report.push_str(&format!("  Total trades:            {}\n", result.trade_count));
    report.push_str(&format!("  Puts assigned:           {}\n", result.assignment_count));
    report.push_str(&format!("  Win rate:                {:.1}%\n", result.win_rate * 100.0));
    report.push_str(&format!("  Total profit:            ${:.2}\n", result.total_profit));
    match result.min_cumulative_profit {
        Some(floor) => {
            report.push_str(&format!("  Min cumulative profit:   ${:.2}\n", floor));
        }
        None => report.push_str("  Min cumulative profit:   n/a\n"),
    }
    report.push_str(&format!("  Max drawdown:            ${:.2}\n", result.max_drawdown));
    report.push('\n');

    report.push_str("⏭️  SKIPPED DAYS\n");
    report.push_str("─────────────────────────────────────────\n");
    report.push_str(&format!("  No spot price:           {}\n", result.skips.no_spot_price));
    report.push_str(&format!("  No put candidate:        {}\n", result.skips.no_put_candidate));
    report.push_str(&format!("  No expiration price:     {}\n", result.skips.no_expiration_price));
    report.push_str(&format!("  Total skipped:           {}\n", result.skips.total()));

    report
}

/// Print the ranked offset comparison, top N rows
pub fn print_sweep_table(entries: &[SweepEntry], top: usize) {
    println!("\n{:=<72}", "");
    println!("OFFSET SWEEP - RANKED BY TOTAL PROFIT");
    println!("{:=<72}", "");
    println!(
        "{:>8} {:>14} {:>13} {:>12} {:>10}",
        "Offset", "Total Profit", "Assignments", "Win Rate", "Trades"
    );
    println!("{:-<72}", "");

    for entry in entries.iter().take(top) {
        println!(
            "{:>7.2}$ {:>13.2}$ {:>13} {:>11.1}% {:>10}",
            entry.offset,
            entry.total_profit,
            entry.assignments,
            entry.win_rate * 100.0,
            entry.trades
        );
    }
    println!("{:=<72}\n", "");
}

/// Export per-trade results with the cumulative column
pub fn export_trades_csv(result: &BacktestResult, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "entry_date",
        "put_strike",
        "put_assigned",
        "put_profit",
        "call_profit",
        "total_profit",
        "cumulative_profit",
    ])?;

    for (trade, cumulative) in result.trades.iter().zip(&result.cumulative_profit) {
        wtr.write_record([
            trade.entry_date.to_string(),
            format!("{:.2}", trade.put_strike),
            trade.put_assigned.to_string(),
            format!("{:.4}", trade.put_profit),
            format!("{:.4}", trade.call_profit),
            format!("{:.4}", trade.total_profit),
            format!("{:.4}", cumulative),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Export the (entry_date, cumulative_profit) series for charting
pub fn export_chart_series_csv(result: &BacktestResult, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["entry_date", "cumulative_profit"])?;
    for (trade, cumulative) in result.trades.iter().zip(&result.cumulative_profit) {
        wtr.write_record([
            trade.entry_date.to_string(),
            format!("{:.4}", cumulative),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Export the ranked sweep entries
pub fn export_sweep_csv(entries: &[SweepEntry], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["offset", "total_profit", "assignments", "win_rate", "trades"])?;
    for entry in entries {
        wtr.write_record([
            format!("{:.2}", entry.offset),
            format!("{:.4}", entry.total_profit),
            entry.assignments.to_string(),
            format!("{:.4}", entry.win_rate),
            entry.trades.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Export the full result to JSON
pub fn export_result_json(result: &BacktestResult, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    let mut file = File::create(path)?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
