use chrono::NaiveDate;

use crate::models::OptionQuote;

/// Pick the contract closest to a target strike from one day's chain
///
/// Candidates must expire on or after `min_expiration`. Among those, the
/// quote minimizing |strike - target_strike| wins; on an exact tie the
/// first-listed candidate wins (scan in listing order, replace only on a
/// strictly smaller difference). `None` means no candidate qualified and is
/// a normal outcome the caller maps to a skip, never an error.
pub fn select_contract(
    quotes: &[OptionQuote],
    target_strike: f64,
    min_expiration: NaiveDate,
) -> Option<&OptionQuote> {
    let mut best: Option<(&OptionQuote, f64)> = None;

    for quote in quotes {
        if quote.expiration < min_expiration {
            continue;
        }

        let diff = (quote.strike - target_strike).abs();
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((quote, diff)),
        }
    }

    best.map(|(quote, _)| quote)
}
