// Normalization engine: turns a raw snapshot plus an optional prior-day
// baseline into the display-ready derived record. Pure functions, no I/O.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::*;

/// Implied CNY/USD rate used when the carbonate pair cannot provide one
pub fn fallback_conversion_rate() -> Decimal {
    Decimal::new(698, 2) // 6.98
}

/// Where an instrument's day-over-day change came from.
///
/// Change data can originate from three independent places: the scraped
/// change fields on the quote itself, or a computed delta against the
/// prior-day baseline, or nowhere. Exactly one wins, in that order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeSource {
    /// The quote carries explicit change fields from upstream; absolute
    /// change is already USD-denominated here (CNY gets divided by the
    /// conversion rate during classification).
    Scraped {
        change: Option<Decimal>,
        change_percent: Option<Decimal>,
    },
    /// Computed against a valid prior-day price
    HistoryDerived { baseline: Decimal },
    /// No scraped fields and no usable baseline
    Unavailable,
}

/// Implied CNY/USD rate from the carbonate spot pair. A zero or absent leg
/// degrades to the fixed fallback rather than failing.
pub fn compute_conversion_rate(carbonate: &SpotQuote) -> Decimal {
    match carbonate.price_cny {
        Some(cny) if !cny.is_zero() && !carbonate.price.is_zero() => cny / carbonate.price,
        _ => fallback_conversion_rate(),
    }
}

/// The shared percent-change primitive. A zero or absent previous value
/// means "no baseline" and yields None, never zero.
pub fn percent_change(current: Decimal, previous: Option<Decimal>) -> Option<Decimal> {
    match previous {
        Some(prev) if !prev.is_zero() => Some((current - prev) / prev * Decimal::ONE_HUNDRED),
        _ => None,
    }
}

/// Pick the authoritative change source for an instrument.
///
/// `baseline` must already have same-day-stale history filtered out; a zero
/// baseline is discarded here.
pub fn classify_change_source(
    quote: &SpotQuote,
    baseline: Option<Decimal>,
    rate: Decimal,
) -> ChangeSource {
    let scraped_abs = quote
        .change_usd
        .or_else(|| quote.change_cny.map(|cny| cny / rate));

    // An explicit 0 from upstream is a real "no change", so presence of the
    // field decides, not its value.
    if scraped_abs.is_some() || quote.change_percent.is_some() {
        return ChangeSource::Scraped {
            change: scraped_abs,
            change_percent: quote.change_percent,
        };
    }

    match baseline {
        Some(prev) if !prev.is_zero() => ChangeSource::HistoryDerived { baseline: prev },
        _ => ChangeSource::Unavailable,
    }
}

/// Resolve an instrument's (change, changePercent), rounded to 2 dp.
pub fn resolve_instrument_change(
    quote: &SpotQuote,
    baseline: Option<Decimal>,
    rate: Decimal,
) -> (Option<Decimal>, Option<Decimal>) {
    match classify_change_source(quote, baseline, rate) {
        ChangeSource::Scraped {
            change,
            change_percent,
        } => (change.map(round2), change_percent.map(round2)),
        ChangeSource::HistoryDerived { baseline } => (
            Some(round2(quote.price - baseline)),
            percent_change(quote.price, Some(baseline)).map(round2),
        ),
        ChangeSource::Unavailable => (None, None),
    }
}

/// Convert the futures curve to USD and attach percent changes.
///
/// Output order equals input order; this is the x-axis of the futures chart
/// and must never be re-sorted. The percent change is computed on CNY
/// values so a pure CNY-market move is not polluted by the implied FX rate.
/// `history` must already have same-day-stale baselines filtered out.
pub fn convert_futures(
    futures: &[FutureQuote],
    rate: Decimal,
    history: Option<&HistorySnapshot>,
) -> Vec<DerivedFuture> {
    // Keyed by contract code, last write wins on duplicates
    let baseline: HashMap<&str, Decimal> = history
        .map(|h| {
            h.futures
                .iter()
                .map(|f| (f.contract.as_str(), f.price_cny))
                .collect()
        })
        .unwrap_or_default();

    futures
        .iter()
        .map(|f| {
            let price = (f.price_cny / rate)
                .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                .to_i64()
                .unwrap_or_default();

            let change = baseline
                .get(f.contract.as_str())
                .copied()
                .filter(|prev| !prev.is_zero())
                .and_then(|prev| percent_change(f.price_cny, Some(prev)))
                .map(round2);

            DerivedFuture {
                contract: f.contract.clone(),
                month: f.month.clone(),
                price_cny: f.price_cny,
                price,
                change,
            }
        })
        .collect()
}

/// Build the complete derived record for one request.
///
/// `now` supplies both the lastUpdated stamp and the date used for the
/// history staleness check.
pub fn build_response(
    current: &Snapshot,
    history: Option<&HistorySnapshot>,
    now: DateTime<Utc>,
) -> DerivedPrices {
    let today = now.date_naive();
    let rate = compute_conversion_rate(&current.carbonate);

    // A baseline dated today would compare the snapshot to itself
    let usable = history.filter(|h| h.date != today);

    let carbonate = derive_instrument(&current.carbonate, usable.map(|h| h.carbonate.price), rate);
    let spodumene = derive_instrument(&current.spodumene, usable.map(|h| h.spodumene.price), rate);
    let futures = convert_futures(&current.futures, rate, usable);

    DerivedPrices {
        carbonate,
        spodumene,
        futures,
        conversion_rate: rate.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero),
        last_updated: now,
        history_date: history.map(|h| h.date),
    }
}

/// Reject snapshots with malformed numeric data. A negative price would
/// silently corrupt the conversion rate for every derived field, so this is
/// the one input problem that surfaces as an error instead of degrading.
/// Zero prices stay valid: they degrade to the fallback rate / null changes.
pub fn validate_snapshot(snapshot: &Snapshot) -> Result<()> {
    validate_spot(&snapshot.carbonate)?;
    validate_spot(&snapshot.spodumene)?;

    for f in &snapshot.futures {
        if f.price_cny < Decimal::ZERO {
            return Err(PricesError::InvalidQuote(format!(
                "futures contract {} has negative price: {}",
                f.contract, f.price_cny
            )));
        }
    }

    Ok(())
}

fn validate_spot(quote: &SpotQuote) -> Result<()> {
    if quote.price < Decimal::ZERO {
        return Err(PricesError::InvalidQuote(format!(
            "{}: negative USD price: {}",
            quote.id, quote.price
        )));
    }
    if let Some(cny) = quote.price_cny {
        if cny < Decimal::ZERO {
            return Err(PricesError::InvalidQuote(format!(
                "{}: negative CNY price: {}",
                quote.id, cny
            )));
        }
    }
    Ok(())
}

fn derive_instrument(
    quote: &SpotQuote,
    baseline: Option<Decimal>,
    rate: Decimal,
) -> DerivedInstrument {
    let (change, change_percent) = resolve_instrument_change(quote, baseline, rate);

    DerivedInstrument {
        id: quote.id.clone(),
        name: quote.name.clone(),
        grade: quote.grade.clone(),
        price: quote.price,
        price_cny: quote.price_cny,
        unit: quote.unit.clone(),
        spot_only: quote.spot_only,
        change,
        change_percent,
    }
}

fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
