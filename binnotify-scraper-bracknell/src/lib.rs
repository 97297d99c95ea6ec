//! Scraper for Bracknell Forest Council's waste collection days page.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::{Captures, Regex};
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use binnotify_core::{
    html::strip_tags,
    model::{CollectionEvent, Councils, ScraperId},
    ports::{CollectionScraper, ScrapeError, validate_scrape_input},
};

const BASE_URL: &str = "https://selfservice.mybfc.bracknell-forest.gov.uk";
const COLLECTION_PAGE: &str = "/w/webpage/waste-collection-days";
const PARSE_FAILURE: &str = "failed to parse next collection time";

// "Your next food collection is Monday 26 February 2024"
static NEXT_COLLECTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"Your next (?P<category>[A-Za-z\s]+?) collection is [A-Za-z]+ (?P<day>\d{1,2}) (?P<month>[A-Za-z]+) (?P<year>\d{4})",
    )
    .expect("next collection pattern is valid")
});

/// Collection days scraper for Bracknell Forest.
pub struct BracknellScraper {
    client: Client,
    base_url: String,
    id: ScraperId,
}

impl BracknellScraper {
    /// Create a new scraper bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, BASE_URL)
    }

    /// Create a scraper talking to another host, e.g. a local test server.
    #[must_use]
    pub fn with_base_url<S: Into<String>>(client: Client, base_url: S) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            id: Councils::Bracknell.into(),
        }
    }
}

#[async_trait]
impl CollectionScraper for BracknellScraper {
    fn id(&self) -> &ScraperId {
        &self.id
    }

    async fn scrape(
        &self,
        postcode: &str,
        address_code: &str,
    ) -> Result<Vec<CollectionEvent>, ScrapeError> {
        validate_scrape_input(postcode, address_code)?;

        debug!(postcode, address_code, "requesting bracknell collection page");
        let req = self
            .client
            .get(format!("{}{COLLECTION_PAGE}", self.base_url))
            .query(&[("postcode", postcode.trim()), ("address", address_code.trim())]);

        let page = fetch_text(req).await?;
        parse_collection_page(&page)
    }
}

/// Build the scraper bundle for Bracknell.
#[must_use]
pub fn plugin(client: Client) -> Arc<dyn CollectionScraper> {
    Arc::new(BracknellScraper::new(client))
}

/// Parse every "Your next ... collection is ..." sentence on a page.
///
/// # Errors
///
/// Returns [`ScrapeError::NoCollections`] when the page has no such sentence,
/// or [`ScrapeError::Parse`] when a sentence names an impossible date.
pub fn parse_collection_page(html: &str) -> Result<Vec<CollectionEvent>, ScrapeError> {
    let text = strip_tags(html);

    let events = NEXT_COLLECTION
        .captures_iter(&text)
        .map(|captures| event_from(&captures))
        .collect::<Result<Vec<_>, _>>()?;

    if events.is_empty() {
        return Err(ScrapeError::NoCollections);
    }
    Ok(events)
}

/// Parse the first "Your next ... collection is ..." sentence in `text`.
///
/// # Errors
///
/// Returns [`ScrapeError::Parse`] when the sentence is missing or incomplete.
pub fn parse_collection_time(text: &str) -> Result<CollectionEvent, ScrapeError> {
    let captures = NEXT_COLLECTION
        .captures(text)
        .ok_or_else(|| ScrapeError::Parse(PARSE_FAILURE.to_owned()))?;
    event_from(&captures)
}

fn event_from(captures: &Captures<'_>) -> Result<CollectionEvent, ScrapeError> {
    let field = |name: &str| {
        captures
            .name(name)
            .map(|found| found.as_str().trim())
            .ok_or_else(|| ScrapeError::Parse(PARSE_FAILURE.to_owned()))
    };

    let category = field("category")?;
    let raw_date = format!("{} {} {}", field("day")?, field("month")?, field("year")?);
    let date = NaiveDate::parse_from_str(&raw_date, "%d %B %Y")
        .map_err(|err| ScrapeError::Parse(format!("{PARSE_FAILURE}: {err}")))?;

    Ok(CollectionEvent::new(category, date))
}

// Small helper to fetch a page body with status handling.
async fn fetch_text(req: RequestBuilder) -> Result<String, ScrapeError> {
    req.send()
        .await
        .map_err(ScrapeError::from)?
        .error_for_status()
        .map_err(ScrapeError::from)?
        .text()
        .await
        .map_err(ScrapeError::from)
}
