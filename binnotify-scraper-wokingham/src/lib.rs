//! Scraper for Wokingham Borough Council's bin collection day finder.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use chrono::NaiveDate;
use regex::Regex;
use reqwest::{Client, RequestBuilder};
use tracing::debug;

use binnotify_core::{
    html::{element_text_with_class, first_element_text, segments_after},
    model::{CollectionEvent, Councils, ScraperId},
    ports::{CollectionScraper, ScrapeError, validate_scrape_input},
};

const BASE_URL: &str = "https://www.wokingham.gov.uk";
const FINDER_PAGE: &str = "/rubbish-and-recycling/waste-collection/find-your-bin-collection-day";

const CARD_MARKER: &str = "card--waste";
const DATE_CLASS: &str = "card__date";

// "Household waste (week 2)" -> "Household waste"
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<category>[A-Za-z\s]+?)\s*(?:\(week \d+\))?$").expect("heading pattern is valid")
});

// "Friday 06/03/2026", "Today 27/02/2026"
static CARD_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<day>\d{2})/(?P<month>\d{2})/(?P<year>\d{4})").expect("date pattern is valid")
});

/// Collection day finder scraper for Wokingham.
pub struct WokinghamScraper {
    client: Client,
    base_url: String,
    id: ScraperId,
}

impl WokinghamScraper {
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
            id: Councils::Wokingham.into(),
        }
    }
}

#[async_trait]
impl CollectionScraper for WokinghamScraper {
    fn id(&self) -> &ScraperId {
        &self.id
    }

    async fn scrape(
        &self,
        postcode: &str,
        address_code: &str,
    ) -> Result<Vec<CollectionEvent>, ScrapeError> {
        validate_scrape_input(postcode, address_code)?;

        debug!(postcode, address_code, "requesting wokingham collection dates");
        // Same fields the finder form submits when "Show collection dates" is pressed.
        let req = self
            .client
            .post(format!("{}{FINDER_PAGE}", self.base_url))
            .form(&[
                ("postcode_search_csv", postcode.trim()),
                ("address_options_csv", address_code.trim()),
                ("op", "Show collection dates"),
            ]);

        let page = fetch_text(req).await?;
        let events = parse_collection_page(&page)?;
        debug!(cards = events.len(), "parsed wokingham collection cards");
        Ok(events)
    }
}

/// Build the scraper bundle for Wokingham.
#[must_use]
pub fn plugin(client: Client) -> Arc<dyn CollectionScraper> {
    Arc::new(WokinghamScraper::new(client))
}

/// Parse every waste card on a results page.
///
/// # Errors
///
/// Returns [`ScrapeError::NoCollections`] when the page has no cards, and
/// [`ScrapeError::Parse`] when headings and dates do not pair up or a card
/// cannot be parsed.
pub fn parse_collection_page(html: &str) -> Result<Vec<CollectionEvent>, ScrapeError> {
    let cards = segments_after(html, CARD_MARKER);
    if cards.is_empty() {
        return Err(ScrapeError::NoCollections);
    }

    let headings: Vec<String> = cards
        .iter()
        .filter_map(|card| first_element_text(card, "h3"))
        .collect();
    let dates: Vec<String> = cards
        .iter()
        .filter_map(|card| element_text_with_class(card, DATE_CLASS))
        .collect();

    if headings.len() != dates.len() {
        return Err(ScrapeError::Parse(
            "mismatched headings and dates count".to_owned(),
        ));
    }

    headings
        .iter()
        .zip(&dates)
        .map(|(heading, date_text)| parse_collection(heading, date_text))
        .collect()
}

/// Parse one card's heading and date text.
///
/// # Errors
///
/// Returns [`ScrapeError::Parse`] for an empty or unrecognised heading, or a
/// date text without a valid `DD/MM/YYYY` date.
pub fn parse_collection(heading: &str, date_text: &str) -> Result<CollectionEvent, ScrapeError> {
    let heading = heading.trim();
    if heading.is_empty() {
        return Err(ScrapeError::Parse("empty heading".to_owned()));
    }

    let category = HEADING
        .captures(heading)
        .and_then(|captures| captures.name("category"))
        .map(|found| found.as_str().trim().to_owned())
        .ok_or_else(|| ScrapeError::Parse("failed to parse bin type from heading".to_owned()))?;

    let captures = CARD_DATE
        .captures(date_text.trim())
        .ok_or_else(|| ScrapeError::Parse("failed to parse date from date text".to_owned()))?;
    let number = |name: &str| {
        captures
            .name(name)
            .and_then(|found| found.as_str().parse::<u32>().ok())
            .ok_or_else(|| ScrapeError::Parse("failed to parse date from date text".to_owned()))
    };

    let year = i32::try_from(number("year")?)
        .map_err(|err| ScrapeError::Parse(format!("invalid year: {err}")))?;
    let date = NaiveDate::from_ymd_opt(year, number("month")?, number("day")?)
        .ok_or_else(|| ScrapeError::Parse(format!("invalid date in {date_text:?}")))?;

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
