use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

// ── Property record ───────────────────────────────────────────────────────────

/// One in-window sale, normalised from a raw property entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertyRecord {
    pub address: String,
    pub property_type: String,
    pub price: u64,  // whole pounds
    pub date_sold: NaiveDate,
}

// ── Crawl state ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationState {
    pub current_page: u32,
    pub first_page: u32,
    pub last_page: u32,
}

impl PaginationState {
    pub fn is_last(&self) -> bool {
        self.current_page >= self.last_page
    }

    /// Number of pages the server says exist (at least one).
    pub fn total_pages(&self) -> u32 {
        self.last_page.saturating_sub(self.first_page).saturating_add(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CrawlResult {
    /// Server-side match count, before the recency filter.
    pub result_count: u64,
    pub properties: Vec<PropertyRecord>,
    pub pagination: PaginationState,
}

// ── Raw payload (window.__PRELOADED_STATE__) ──────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct RawPayload {
    pub results: RawResults,
    pub pagination: RawPagination,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResults {
    #[serde(deserialize_with = "lenient_u64")]
    pub result_count: u64,
    #[serde(default)]
    pub properties: Vec<RawProperty>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProperty {
    pub address: String,
    #[serde(default)]
    pub property_type: String,
    #[serde(default)]
    pub transactions: Vec<RawTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    pub display_price: String,  // "&pound;450,000"
    pub date_sold: String,      // "4 Nov 2020"
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RawPagination {
    #[serde(deserialize_with = "lenient_u32")]
    pub current: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub first: u32,
    #[serde(deserialize_with = "lenient_u32")]
    pub last: u32,
}

// ── Lenient integers ──────────────────────────────────────────────────────────

/// Counts show up as `1204` or as display text like `"1,204"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    match NumberOrText::deserialize(d)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => {
            let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
            digits
                .parse()
                .map_err(|_| serde::de::Error::custom(format!("not a count: {:?}", s)))
        }
    }
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let n = lenient_u64(d)?;
    u32::try_from(n).map_err(|_| serde::de::Error::custom(format!("page number out of range: {}", n)))
}
