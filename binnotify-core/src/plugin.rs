//! Registry for all council scrapers.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::ScraperId;
use crate::ports::{CollectionScraper, ScrapeError};

/// Registry that resolves scrapers by name, ignoring case.
pub struct ScraperRegistry {
    scrapers: HashMap<String, Arc<dyn CollectionScraper>>,
}

impl ScraperRegistry {
    /// Build a registry from the provided scraper list.
    ///
    /// A later scraper registered under the same name replaces an earlier one.
    #[must_use]
    pub fn new(scrapers: Vec<Arc<dyn CollectionScraper>>) -> Self {
        let scrapers = scrapers
            .into_iter()
            .map(|scraper| (scraper.id().normalized(), scraper))
            .collect();
        Self { scrapers }
    }

    /// Names of all registered scrapers, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scrapers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Look up the scraper for the given name.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::UnknownScraper`] when nothing is registered
    /// under that name.
    pub fn resolve(&self, id: &ScraperId) -> Result<Arc<dyn CollectionScraper>, ScrapeError> {
        self.scrapers
            .get(&id.normalized())
            .map(Arc::clone)
            .ok_or_else(|| ScrapeError::UnknownScraper(id.0.clone()))
    }
}
