pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::error::FetchError;
use crate::validation::ValidPostcode;
use anyhow::Result;
use async_trait::async_trait;
use tracing::info;
use url::Url;

use self::http_client::HttpClient;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Where result pages come from. One call is one page, raw HTML out.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, postcode: &ValidPostcode, page: u32) -> Result<String, FetchError>;
}

// ── Sold-prices scraper ───────────────────────────────────────────────────────

pub struct SoldPricesScraper {
    client: HttpClient,
    base_url: String,
}

impl SoldPricesScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL for one result page.  e.g. SW1A 1AA, page 2 → /house-prices/SW1A%201AA.html?page=2
    fn page_url(&self, postcode: &ValidPostcode, page: u32) -> Result<Url, FetchError> {
        let invalid = || FetchError::InvalidUrl { page, base: self.base_url.clone() };

        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .push(&format!("{}.html", postcode));
        url.query_pairs_mut().append_pair("page", &page.to_string());
        Ok(url)
    }
}

#[async_trait]
impl PageSource for SoldPricesScraper {
    async fn fetch_page(&self, postcode: &ValidPostcode, page: u32) -> Result<String, FetchError> {
        let url = self.page_url(postcode, page)?;
        info!("Fetching page {} ({})", page, url);

        let html = self.client.get_text(url.as_str(), page).await?;
        info!("  Page {}: {} bytes", page, html.len());
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::validate;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn scraper_for(base_url: &str) -> SoldPricesScraper {
        let config = ScraperConfig { base_url: base_url.to_string(), ..ScraperConfig::default() };
        SoldPricesScraper::new(&config).unwrap()
    }

    #[test]
    fn test_page_url_encodes_postcode() {
        let scraper = scraper_for("https://www.rightmove.co.uk/house-prices/");
        let pc = validate("sw1a1aa").unwrap();
        let url = scraper.page_url(&pc, 2).unwrap();
        assert_eq!(url.as_str(), "https://www.rightmove.co.uk/house-prices/SW1A%201AA.html?page=2");
    }

    #[test]
    fn test_unusable_base_url() {
        let scraper = scraper_for("not a url");
        let pc = validate("M1 1AE").unwrap();
        assert!(matches!(scraper.page_url(&pc, 1), Err(FetchError::InvalidUrl { page: 1, .. })));
    }

    #[tokio::test]
    async fn test_fetch_page_hits_listing_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/house-prices/M1%201AE.html"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let scraper = scraper_for(&format!("{}/house-prices", server.uri()));
        let pc = validate("M1 1AE").unwrap();
        let html = tokio_test::assert_ok!(scraper.fetch_page(&pc, 3).await);
        assert_eq!(html, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_page_reports_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let scraper = scraper_for(&server.uri());
        let pc = validate("M1 1AE").unwrap();
        let err = tokio_test::assert_err!(scraper.fetch_page(&pc, 2).await);
        assert!(matches!(err, FetchError::Status { page: 2, status: 503 }));
    }
}
