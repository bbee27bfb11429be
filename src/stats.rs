use crate::models::{BacktestResult, SkipCounts, TradeOutcome};

/// Fold per-day trade outcomes into a `BacktestResult`
///
/// `trades` must already be in entry-date order; the cumulative series and
/// every summary figure are computed in that order.
pub fn aggregate(trades: Vec<TradeOutcome>, skips: SkipCounts) -> BacktestResult {
    let mut cumulative_profit = Vec::with_capacity(trades.len());
    let mut running = 0.0;
    for trade in &trades {
        running += trade.total_profit;
        cumulative_profit.push(running);
    }

    let trade_count = trades.len() as u32;
    let assignment_count = trades.iter().filter(|t| t.put_assigned).count() as u32;
    let wins = trades.iter().filter(|t| t.total_profit > 0.0).count();
    let win_rate = if trades.is_empty() {
        0.0
    } else {
        wins as f64 / trades.len() as f64
    };

    let total_profit = cumulative_profit.last().copied().unwrap_or(0.0);
    let min_cumulative_profit = cumulative_profit
        .iter()
        .copied()
        .fold(None, |min: Option<f64>, v| {
            Some(min.map_or(v, |m| m.min(v)))
        });

    BacktestResult {
        max_drawdown: max_drawdown(&cumulative_profit),
        trades,
        cumulative_profit,
        trade_count,
        assignment_count,
        win_rate,
        total_profit,
        min_cumulative_profit,
        skips,
    }
}

/// Largest peak-to-trough decline of the cumulative series
///
/// The peak starts at zero (cumulative profit before any trade), so a run
/// that only ever loses still registers the full decline. This is the
/// classical drawdown; the series floor is reported separately as
/// `min_cumulative_profit`.
fn max_drawdown(cumulative: &[f64]) -> f64 {
    let mut peak = 0.0_f64;
    let mut worst = 0.0_f64;
    for &value in cumulative {
        if value > peak {
            peak = value;
        }
        let drawdown = peak - value;
        if drawdown > worst {
            worst = drawdown;
        }
    }
    worst
}
