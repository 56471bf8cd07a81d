
use crate::config::SaleSelection;
use crate::models::{PropertyRecord, RawProperty, RawTransaction};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

/// Mean year used by the recency window; leap days are ignored.
pub const SECONDS_PER_YEAR: i64 = 365 * 86_400;

// ── Parsers ───────────────────────────────────────────────────────────────────

/// Parse price: strip everything except digits.
/// "&pound;450,000" → Some(450000) | "£1,250,000" → Some(1250000) | "POA" → Some(0)
///
/// `None` only when the digit run does not fit in a `u64`.
pub fn parse_price(s: &str) -> Option<u64> {
    // The entity spelling carries no digits, so it falls away with the separators.
    let cleaned: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if cleaned.is_empty() {
        return Some(0);
    }
    cleaned.parse().ok()
}

/// Parse dates: "4 Nov 2020" (listing pages) or ISO
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(d) = NaiveDate::parse_from_str(s, "%d %b %Y") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%d/%m/%Y") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%b %d, %Y") {
        return Some(d);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%d %B %Y") {
        return Some(d);
    }

    None
}

// ── Recency window ────────────────────────────────────────────────────────────

/// Whole years between `date_sold` and `as_of`, floored; a sale exactly `years` ago is kept.
pub fn is_within_years(date_sold: NaiveDate, as_of: NaiveDateTime, years: u32) -> bool {
    let elapsed = as_of - date_sold.and_time(chrono::NaiveTime::MIN);
    let whole_years = elapsed.num_seconds().div_euclid(SECONDS_PER_YEAR);
    whole_years <= i64::from(years)
}

// ── Raw property → PropertyRecord ─────────────────────────────────────────────

/// Pick the transaction that stands for the property's sale.
pub fn select_sale(property: &RawProperty, selection: SaleSelection) -> Option<&RawTransaction> {
    match selection {
        SaleSelection::First => property.transactions.first(),
        SaleSelection::Latest => property
            .transactions
            .iter()
            .filter_map(|t| parse_date(&t.date_sold).map(|d| (d, t)))
            .max_by_key(|(d, _)| *d)
            .map(|(_, t)| t),
    }
}

/// Outcome of normalising one raw entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalised {
    Kept(PropertyRecord),
    /// Sold before the recency window.
    OutOfWindow,
    /// No usable transaction; logged and skipped.
    Malformed,
}

pub fn property_to_record(
    property: &RawProperty,
    selection: SaleSelection,
    as_of: NaiveDateTime,
    years: u32,
) -> Normalised {
    let Some(sale) = select_sale(property, selection) else {
        warn!("Skipping {:?}: no transactions", property.address);
        return Normalised::Malformed;
    };

    let Some(date_sold) = parse_date(&sale.date_sold) else {
        warn!("Skipping {:?}: unreadable sale date {:?}", property.address, sale.date_sold);
        return Normalised::Malformed;
    };

    if !is_within_years(date_sold, as_of, years) {
        debug!("{}: sold {} is outside {} years", property.address, date_sold, years);
        return Normalised::OutOfWindow;
    }

    let Some(price) = parse_price(&sale.display_price) else {
        warn!("Skipping {:?}: price {:?} is out of range", property.address, sale.display_price);
        return Normalised::Malformed;
    };

    Normalised::Kept(PropertyRecord {
        address: property.address.trim().to_string(),
        property_type: property.property_type.trim().to_string(),
        price,
        date_sold,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
