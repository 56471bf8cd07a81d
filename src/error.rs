//! Error taxonomy for one lookup: bad input, broken page, broken transport,
//! and the crawl-level wrapper that pins failures to a page.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No postcode entered.")]
    Missing,

    #[error("Not a valid UK postcode: {input:?}")]
    Invalid { input: String },
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no <script> starts with the state marker {marker:?}")]
    MissingMarker { marker: String },

    #[error("state payload is not the expected JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("cannot build a URL for page {page} from {base:?}")]
    InvalidUrl { page: u32, base: String },

    #[error("request for page {page} failed: {source}")]
    Transport {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("page {page} returned HTTP {status}")]
    Status { page: u32, status: u16 },
}

/// Aborts the whole crawl; anything accumulated before it is dropped.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("fetching page {page} failed after {pages_processed} page(s)")]
    Fetch {
        page: u32,
        pages_processed: u32,
        #[source]
        source: FetchError,
    },

    #[error("reading page {page} failed after {pages_processed} page(s)")]
    Extraction {
        page: u32,
        pages_processed: u32,
        #[source]
        source: ExtractionError,
    },

    #[error("page {page} reported current page {reported}, which does not advance")]
    Stalled {
        page: u32,
        pages_processed: u32,
        reported: u32,
    },

    #[error("crawl cancelled before page {page}")]
    Cancelled { page: u32, pages_processed: u32 },
}

impl CrawlError {
    /// Page number the crawl was on when it broke.
    pub fn page(&self) -> u32 {
        match self {
            CrawlError::Fetch { page, .. }
            | CrawlError::Extraction { page, .. }
            | CrawlError::Stalled { page, .. }
            | CrawlError::Cancelled { page, .. } => *page,
        }
    }

    pub fn pages_processed(&self) -> u32 {
        match self {
            CrawlError::Fetch { pages_processed, .. }
            | CrawlError::Extraction { pages_processed, .. }
            | CrawlError::Stalled { pages_processed, .. }
            | CrawlError::Cancelled { pages_processed, .. } => *pages_processed,
        }
    }
}
