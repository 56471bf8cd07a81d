//! Crawl controller: page source → state payload → recency filter → accumulator.
//!
//! ## Loop
//!
//! 1. Fetch page 1; its payload fixes `result_count` and the first/last page bounds.
//! 2. Normalise every property on the page and keep the in-window sales.
//! 3. Take `current` from the page just fetched (the server owns pagination).
//! 4. While `current < last`, fetch `current + 1`.
//!
//! Any fetch or extraction failure aborts the crawl. Properties accumulated from
//! earlier pages are dropped with it: a partial list is never returned as success.

use crate::config::SaleSelection;
use crate::error::CrawlError;
use crate::models::{CrawlResult, PaginationState, PropertyRecord, RawPayload};
use crate::scraper::PageSource;
use crate::scraper::cleaner::{Normalised, property_to_record};
use crate::scraper::parsers::parse_state_payload;
use crate::validation::ValidPostcode;
use chrono::NaiveDateTime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Largest up-front reservation for the accumulator.
const MAX_RESERVED: usize = 1024;

#[derive(Debug, Clone)]
pub struct CrawlOptions {
    pub state_marker: String,
    pub sale_selection: SaleSelection,
    pub years: u32,
    /// "Now" for the recency window.
    pub as_of: NaiveDateTime,
}

pub struct Crawler<S> {
    source: S,
    options: CrawlOptions,
}

impl<S: PageSource> Crawler<S> {
    pub fn new(source: S, options: CrawlOptions) -> Self {
        Self { source, options }
    }

    pub async fn crawl(
        &self,
        postcode: &ValidPostcode,
        cancel: &CancellationToken,
    ) -> Result<CrawlResult, CrawlError> {
        self.crawl_with_progress(postcode, cancel, |_| {}).await
    }

    /// As [`Crawler::crawl`], calling `on_page` after each page has been accumulated.
    pub async fn crawl_with_progress<F>(
        &self,
        postcode: &ValidPostcode,
        cancel: &CancellationToken,
        mut on_page: F,
    ) -> Result<CrawlResult, CrawlError>
    where
        F: FnMut(&PaginationState),
    {
        let first = self.fetch_payload(postcode, 1, 0, cancel).await?;
        let mut acc = start_result(&first);
        self.accumulate(1, &first, &mut acc.properties);
        let mut pages_processed = 1u32;
        on_page(&acc.pagination);

        while !acc.pagination.is_last() {
            let page = acc.pagination.current_page + 1;
            let payload = self.fetch_payload(postcode, page, pages_processed, cancel).await?;

            let reported = payload.pagination.current;
            if reported <= acc.pagination.current_page {
                return Err(CrawlError::Stalled { page, pages_processed, reported });
            }
            acc.pagination.current_page = reported;

            self.accumulate(page, &payload, &mut acc.properties);
            pages_processed += 1;
            on_page(&acc.pagination);
        }

        info!(
            "{}: {} results, {} sold within {} years over {} page(s)",
            postcode,
            acc.result_count,
            acc.properties.len(),
            self.options.years,
            pages_processed
        );
        Ok(acc)
    }

    /// One fetch + extract step, with failures pinned to `page`.
    async fn fetch_payload(
        &self,
        postcode: &ValidPostcode,
        page: u32,
        pages_processed: u32,
        cancel: &CancellationToken,
    ) -> Result<RawPayload, CrawlError> {
        if cancel.is_cancelled() {
            return Err(CrawlError::Cancelled { page, pages_processed });
        }

        let html = self
            .source
            .fetch_page(postcode, page)
            .await
            .map_err(|source| CrawlError::Fetch { page, pages_processed, source })?;

        parse_state_payload(&html, &self.options.state_marker)
            .map_err(|source| CrawlError::Extraction { page, pages_processed, source })
    }

    /// Append the in-window sales of one page.
    fn accumulate(&self, page: u32, payload: &RawPayload, into: &mut Vec<PropertyRecord>) {
        let mut skipped = 0usize;
        for property in &payload.results.properties {
            match property_to_record(
                property,
                self.options.sale_selection,
                self.options.as_of,
                self.options.years,
            ) {
                Normalised::Kept(record) => into.push(record),
                Normalised::OutOfWindow | Normalised::Malformed => skipped += 1,
            }
        }
        debug!("Page {}: {} entries, {} skipped", page, payload.results.properties.len(), skipped);
        info!("Page {}/{}: {} in-window sales so far", page, payload.pagination.last, into.len());
    }
}

fn start_result(payload: &RawPayload) -> CrawlResult {
    let reserve = usize::try_from(payload.results.result_count)
        .unwrap_or(MAX_RESERVED)
        .min(MAX_RESERVED);

    CrawlResult {
        result_count: payload.results.result_count,
        properties: Vec::with_capacity(reserve),
        pagination: PaginationState {
            current_page: payload.pagination.current,
            first_page: payload.pagination.first,
            last_page: payload.pagination.last,
        },
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
