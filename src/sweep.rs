use rayon::prelude::*;
use tracing::debug;

use crate::models::{
    BacktestConfig, OptionChainStore, PriceSeries, ProfitConvention, SweepEntry,
};
use crate::simulator::run_backtest;

/// Enumerate the offset grid: start, start+step, ... up to and including end
///
/// Returns an empty grid when start > end. `step` must be positive; the CLI
/// validates that before calling.
pub fn build_offset_grid(start: f64, end: f64, step: f64) -> Vec<f64> {
    let mut grid = Vec::new();
    let mut offset = start;
    // Epsilon keeps fractional steps from dropping the endpoint
    while offset <= end + 1e-9 {
        grid.push(offset);
        offset += step;
    }
    grid
}

/// Backtest every offset in the grid and rank the results
///
/// Each offset trial is a pure function of the shared read-only inputs, so
/// the grid runs data-parallel; results are collected and then sorted, which
/// keeps the ranking independent of completion order. Ranking is by total
/// profit descending, ties by offset ascending. Offsets that produce zero
/// trades are dropped, never reported as zero rows.
pub fn sweep_offsets(
    prices: &PriceSeries,
    chains: &OptionChainStore,
    offsets: &[f64],
    expiration_days: i64,
    call_offset: f64,
    convention: ProfitConvention,
) -> Vec<SweepEntry> {
    let mut entries: Vec<SweepEntry> = offsets
        .par_iter()
        .filter_map(|&offset| {
            let config = BacktestConfig {
                offset,
                expiration_days,
                call_offset,
                convention,
            };
            let result = run_backtest(prices, chains, &config);
            if result.trade_count == 0 {
                debug!("offset {:.2} produced no trades, dropped from ranking", offset);
                return None;
            }
            Some(SweepEntry {
                offset,
                total_profit: result.total_profit,
                assignments: result.assignment_count,
                win_rate: result.win_rate,
                trades: result.trade_count,
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.total_profit
            .total_cmp(&a.total_profit)
            .then(a.offset.total_cmp(&b.offset))
    });

    entries
}
