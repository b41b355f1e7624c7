use std::collections::BTreeSet;
use std::time::Duration;

use chrono::Local;
use tokio::task::spawn_blocking;

use crate::model::{BurbDocument, Card, Configuration, HoodDocument, ScrapeMetadata};
use crate::parse::parse_cards;
use crate::request::Fetch;
use crate::store::HoodStore;
use crate::{info_time, Error, Result};

/// Outcome of a batch run over every configured hood.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScrapeSummary {
    pub scraped: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

/// Scrapes hoods and their burbs one request at a time and persists one document per hood.
pub struct HoodScraper<F> {
    config: Configuration,
    fetcher: F,
    store: HoodStore,
    burb_delay: Duration,
}

impl<F: Fetch> HoodScraper<F> {
    pub fn new(config: Configuration, fetcher: F, store: HoodStore, burb_delay: Duration) -> Self {
        Self {
            config,
            fetcher,
            store,
            burb_delay,
        }
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Hoods that already have a persisted document.
    pub fn get_scraped_hoods(&self) -> Result<BTreeSet<String>> {
        self.store.scraped_hoods()
    }

    /// Scrapes the hood page and the requested burbs (all configured ones when `burbs` is
    /// `None` or empty), then saves the document, replacing any earlier one.
    ///
    /// An unknown hood is an error. Unknown burbs are logged and skipped, pages that fail to
    /// load contribute no cards.
    pub async fn scrape_hood(&self, hood: &str, burbs: Option<&[String]>) -> Result<HoodDocument> {
        let start_time = Local::now();
        let hood_spec = self
            .config
            .neighborhoods
            .get(hood)
            .ok_or_else(|| Error::HoodNotFound(hood.to_string()))?;
        let hood_url = format!("{}/{hood}", self.base_url());

        tracing::info!(hood, url = %hood_url, "scraping neighborhood page");
        let hood_cards = self.get_page_cards(&hood_url).await?;

        let burbs_to_scrape = match burbs {
            Some(requested) if !requested.is_empty() => requested,
            _ => hood_spec.burbs.as_slice(),
        };

        let mut scraped_burbs = Vec::with_capacity(burbs_to_scrape.len());
        for burb in burbs_to_scrape {
            if !hood_spec.burbs.contains(burb) {
                tracing::warn!(hood, burb = %burb, "burb not found in hood");
                continue;
            }
            scraped_burbs.push(self.scrape_burb(hood, burb).await?);
            tokio::time::sleep(self.burb_delay).await;
        }

        let metadata = ScrapeMetadata {
            scraped_at: crate::model::timestamp(),
            base_url: self.config.base_url.clone(),
        };
        let doc = HoodDocument::new(
            hood.to_string(),
            hood_spec.description.clone(),
            hood_url,
            hood_cards,
            scraped_burbs,
            metadata,
        );

        let path = self.store.save(&doc)?;
        info_time!(
            start_time,
            "Saved hood {} ({} cards, {} burbs) to {}",
            hood,
            doc.total_pages,
            doc.total_burbs,
            path.display()
        );
        Ok(doc)
    }

    pub async fn scrape_burb(&self, hood: &str, burb: &str) -> Result<BurbDocument> {
        let burb_url = format!("{}/{hood}/{burb}", self.base_url());
        tracing::info!(hood, burb, url = %burb_url, "scraping burb");

        let cards = self.get_page_cards(&burb_url).await?;
        Ok(BurbDocument::new(burb.to_string(), burb_url, cards))
    }

    /// Cards listed on a hood or burb page. A page that can't be fetched yields no cards.
    pub async fn get_page_cards(&self, url: &str) -> Result<Vec<Card>> {
        let html = match self.fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(url, error = %e, "error scraping page");
                return Ok(Vec::new());
            }
        };

        let extracted = spawn_blocking(move || parse_cards(&html)).await??;
        Ok(extracted.into_logged_items(url))
    }

    /// Scrapes every configured hood in turn. With `resume` hoods that already have a
    /// document are skipped without any request. A failing hood is logged and the batch moves on.
    pub async fn scrape_all(&self, resume: bool) -> Result<ScrapeSummary> {
        let start_time = Local::now();
        let already_scraped = if resume {
            self.get_scraped_hoods()?
        } else {
            BTreeSet::new()
        };

        let mut summary = ScrapeSummary::default();
        for hood in self.config.neighborhoods.keys() {
            if already_scraped.contains(hood) {
                tracing::info!(hood = %hood, "skipping already scraped hood");
                summary.skipped.push(hood.clone());
                continue;
            }
            match self.scrape_hood(hood, None).await {
                Ok(_) => summary.scraped.push(hood.clone()),
                Err(e) => {
                    tracing::error!(hood = %hood, error = %e, "error scraping hood");
                    summary.failed.push(hood.clone());
                }
            }
        }

        info_time!(
            start_time,
            "Scraping completed: {} scraped, {} skipped, {} failed",
            summary.scraped.len(),
            summary.skipped.len(),
            summary.failed.len()
        );
        Ok(summary)
    }
}
