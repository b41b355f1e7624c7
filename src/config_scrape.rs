use std::fs;
use std::path::Path;

use indexmap::IndexMap;

use crate::model::Configuration;
use crate::parse::parse_listing;
use crate::request::Fetch;
use crate::store::write_pretty_json;
use crate::Result;

/// Reads the mirror's front page into a [`Configuration`].
pub struct ConfigScraper<F> {
    fetcher: F,
    base_url: String,
}

impl<F: Fetch> ConfigScraper<F> {
    pub fn new(fetcher: F, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { fetcher, base_url }
    }

    /// Failing to fetch the page is fatal, a hood that can't be extracted is logged and skipped.
    pub async fn scrape_main_page(&self) -> Result<Configuration> {
        let html = match self.fetcher.fetch(&self.base_url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::error!(url = %self.base_url, error = %e, "error scraping main page");
                return Err(e);
            }
        };

        let mut neighborhoods = IndexMap::new();
        for (name, spec) in parse_listing(&html)?.into_logged_items("neighborhood") {
            tracing::info!(hood = %name, burbs = spec.burbs.len(), "scraped neighborhood");
            neighborhoods.insert(name, spec);
        }

        Ok(Configuration {
            base_url: self.base_url.clone(),
            neighborhoods,
        })
    }
}

pub fn save_config(config: &Configuration, path: &Path) -> Result<()> {
    write_pretty_json(path, config)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

pub fn load_config(path: &Path) -> Result<Configuration> {
    let raw = fs::read_to_string(path).inspect_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "error loading config");
    })?;
    Ok(serde_json::from_str(&raw)?)
}
