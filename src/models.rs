use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// A single option quote from one day's chain snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct OptionQuote {
    /// Day the quote was observed (the chain snapshot date)
    pub quote_date: NaiveDate,
    pub expiration: NaiveDate,
    pub strike: f64,
    /// Quoted close price, used as the premium received when selling
    pub close: f64,
}

/// Date-indexed lookup of underlying closing prices
///
/// Dates are unique; a missing date is a defined miss (`None`), never an
/// error. Iteration order over dates is ascending and drives the
/// simulator's entry-date loop.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    closes: BTreeMap<NaiveDate, f64>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a closing price. Returns false if the date was already present
    /// (callers treat duplicate dates as malformed input).
    pub fn insert(&mut self, date: NaiveDate, close: f64) -> bool {
        self.closes.insert(date, close).is_none()
    }

    pub fn close_on(&self, date: NaiveDate) -> Option<f64> {
        self.closes.get(&date).copied()
    }

    /// Trading dates in ascending order
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.closes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.closes.keys().next()?;
        let last = self.closes.keys().next_back()?;
        Some((*first, *last))
    }
}

/// Option quotes grouped by quote date
///
/// Within a day the quotes keep their source listing order; nearest-strike
/// selection breaks ties by first occurrence, so this order is load-bearing.
#[derive(Debug, Clone, Default)]
pub struct OptionChainStore {
    by_quote_date: HashMap<NaiveDate, Vec<OptionQuote>>,
    quote_count: usize,
}

impl OptionChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, quote: OptionQuote) {
        self.by_quote_date
            .entry(quote.quote_date)
            .or_default()
            .push(quote);
        self.quote_count += 1;
    }

    /// The day's chain snapshot, empty when no quotes exist for the date
    pub fn chain_for(&self, date: NaiveDate) -> &[OptionQuote] {
        self.by_quote_date
            .get(&date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn quote_count(&self) -> usize {
        self.quote_count
    }

    pub fn day_count(&self) -> usize {
        self.by_quote_date.len()
    }
}

/// How the assigned leg's profit is accounted
///
/// Two conventions circulate for short option P&L on assignment. Which one a
/// backtest uses changes every assigned trade, so it is an explicit named
/// flag rather than a hard-coded formula.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
pub enum ProfitConvention {
    /// Assigned leg loses the full intrinsic amount; the collected premium
    /// is not netted against it (put: -(strike - price_at_expiration))
    #[default]
    PremiumExcluded,
    /// Collected premium is netted against the intrinsic loss
    /// (put: premium - (strike - price_at_expiration))
    PremiumIncluded,
}

impl std::fmt::Display for ProfitConvention {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfitConvention::PremiumExcluded => write!(f, "premium-excluded"),
            ProfitConvention::PremiumIncluded => write!(f, "premium-included"),
        }
    }
}

/// Why an entry date produced no trade
///
/// Lookup misses are expected outcomes, not errors. Keeping them as a
/// tagged signal (instead of swallowing everything in a catch-all) means
/// genuinely malformed input still surfaces as a hard failure at the loader
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Entry date absent from the price series
    NoSpotPrice,
    /// No quote meets the expiration floor on the entry date
    NoPutCandidate,
    /// The selected put's expiration date has no underlying price
    NoExpirationPrice,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoSpotPrice => write!(f, "no spot price"),
            SkipReason::NoPutCandidate => write!(f, "no put candidate"),
            SkipReason::NoExpirationPrice => write!(f, "no expiration price"),
        }
    }
}

/// Tally of skipped entry dates by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    pub no_spot_price: u32,
    pub no_put_candidate: u32,
    pub no_expiration_price: u32,
}

impl SkipCounts {
    pub fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::NoSpotPrice => self.no_spot_price += 1,
            SkipReason::NoPutCandidate => self.no_put_candidate += 1,
            SkipReason::NoExpirationPrice => self.no_expiration_price += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.no_spot_price + self.no_put_candidate + self.no_expiration_price
    }
}

/// Configuration for a single fixed-offset backtest
#[derive(Debug, Clone, Copy)]
pub struct BacktestConfig {
    /// Dollars below spot for the put strike target
    pub offset: f64,
    /// Minimum days until expiration, measured from the quote date
    pub expiration_days: i64,
    /// Dollars above the assignment price for the call strike target
    pub call_offset: f64,
    pub convention: ProfitConvention,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            offset: 5.0,
            expiration_days: 1,
            call_offset: 5.0,
            convention: ProfitConvention::default(),
        }
    }
}

/// Result of one entry date's wheel trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeOutcome {
    pub entry_date: NaiveDate,
    pub put_strike: f64,
    pub put_assigned: bool,
    pub put_profit: f64,
    /// 0.0 when the put was not assigned or no call leg could be opened
    pub call_profit: f64,
    pub total_profit: f64,
}

/// Aggregated outcome of a full backtest run
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    /// Trades ordered by entry date
    pub trades: Vec<TradeOutcome>,
    /// Running sum of total_profit, same order as `trades`
    pub cumulative_profit: Vec<f64>,
    pub trade_count: u32,
    /// Put legs that ended assigned
    pub assignment_count: u32,
    /// Fraction of trades with total_profit > 0, in [0, 1]
    pub win_rate: f64,
    pub total_profit: f64,
    /// Floor of the cumulative-profit series. This is what the strategy's
    /// original report labeled "max drawdown"; it is kept under its honest
    /// name since it is not peak-relative.
    pub min_cumulative_profit: Option<f64>,
    /// True peak-to-trough drawdown of the cumulative series, measured from
    /// a starting equity of zero. Always >= 0.
    pub max_drawdown: f64,
    pub skips: SkipCounts,
}

/// One row of the offset sweep ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepEntry {
    pub offset: f64,
    pub total_profit: f64,
    pub assignments: u32,
    pub win_rate: f64,
    pub trades: u32,
}
