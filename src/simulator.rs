use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::models::{
    BacktestConfig, BacktestResult, OptionChainStore, PriceSeries, ProfitConvention, SkipCounts,
    SkipReason, TradeOutcome,
};
use crate::selector::select_contract;
use crate::stats;

/// Profit of a short leg settled at expiration
///
/// `intrinsic_loss` is the amount the option finished in the money against
/// the seller (strike - price for a put, price - strike for a call).
fn short_leg_profit(
    convention: ProfitConvention,
    premium: f64,
    assigned: bool,
    intrinsic_loss: f64,
) -> f64 {
    if !assigned {
        return premium;
    }
    match convention {
        ProfitConvention::PremiumExcluded => -intrinsic_loss,
        ProfitConvention::PremiumIncluded => premium - intrinsic_loss,
    }
}

/// Evaluate one entry date as an independent wheel trial
///
/// Sell the put nearest (spot - offset), check assignment at its expiration,
/// and if assigned immediately sell a call struck near the assignment price.
/// Positions are never carried across entry dates; every date stands alone.
/// Any lookup miss degrades to a `SkipReason`, never an error.
pub fn evaluate_entry_date(
    entry_date: NaiveDate,
    prices: &PriceSeries,
    chains: &OptionChainStore,
    config: &BacktestConfig,
) -> Result<TradeOutcome, SkipReason> {
    let spot = prices
        .close_on(entry_date)
        .ok_or(SkipReason::NoSpotPrice)?;

    let target_strike = spot - config.offset;
    let min_expiration = entry_date + Duration::days(config.expiration_days);

    let put = select_contract(chains.chain_for(entry_date), target_strike, min_expiration)
        .ok_or(SkipReason::NoPutCandidate)?;

    let price_at_expiration = prices
        .close_on(put.expiration)
        .ok_or(SkipReason::NoExpirationPrice)?;

    let assigned = price_at_expiration < put.strike;
    let put_profit = short_leg_profit(
        config.convention,
        put.close,
        assigned,
        put.strike - price_at_expiration,
    );

    // Conditional call leg, written the day the put was assigned. A missing
    // call candidate or call-expiry price zeroes the leg; the put result
    // still counts.
    let call_profit = if assigned {
        call_leg_profit(put.expiration, price_at_expiration, prices, chains, config)
    } else {
        0.0
    };

    Ok(TradeOutcome {
        entry_date,
        put_strike: put.strike,
        put_assigned: assigned,
        put_profit,
        call_profit,
        total_profit: put_profit + call_profit,
    })
}

fn call_leg_profit(
    assignment_date: NaiveDate,
    assignment_price: f64,
    prices: &PriceSeries,
    chains: &OptionChainStore,
    config: &BacktestConfig,
) -> f64 {
    let target_strike = assignment_price + config.call_offset;
    let min_expiration = assignment_date + Duration::days(config.expiration_days);

    let Some(call) = select_contract(
        chains.chain_for(assignment_date),
        target_strike,
        min_expiration,
    ) else {
        return 0.0;
    };

    let Some(price_at_expiration) = prices.close_on(call.expiration) else {
        return 0.0;
    };

    let assigned = price_at_expiration > call.strike;
    short_leg_profit(
        config.convention,
        call.close,
        assigned,
        price_at_expiration - call.strike,
    )
}

/// Run the full backtest over every date in the price series
pub fn run_backtest(
    prices: &PriceSeries,
    chains: &OptionChainStore,
    config: &BacktestConfig,
) -> BacktestResult {
    let mut trades = Vec::new();
    let mut skips = SkipCounts::default();

    for entry_date in prices.dates() {
        match evaluate_entry_date(entry_date, prices, chains, config) {
            Ok(trade) => trades.push(trade),
            Err(reason) => {
                debug!("skipping {}: {}", entry_date, reason);
                skips.record(reason);
            }
        }
    }

    stats::aggregate(trades, skips)
}
