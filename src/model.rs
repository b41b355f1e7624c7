//! Documents exchanged between the stages. Field names match the JSON on disk.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Output of the config scrape, input of the content scrape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub base_url: String,
    /// Hoods in the order the listing page shows them.
    #[serde(alias = "groups")]
    pub neighborhoods: IndexMap<String, HoodSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HoodSpec {
    #[serde(default)]
    pub description: String,
    #[serde(alias = "subgroups", default)]
    pub burbs: Vec<String>,
}

/// One archived page as listed on a hood or burb page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub last_modified: String,
    #[serde(default)]
    pub has_sound: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurbDocument {
    pub name: String,
    #[serde(default)]
    pub url: String,
    pub cards: Vec<Card>,
    #[serde(default)]
    pub total_pages: usize,
}

impl BurbDocument {
    pub fn new(name: String, url: String, cards: Vec<Card>) -> Self {
        Self {
            total_pages: cards.len(),
            name,
            url,
            cards,
        }
    }
}

/// Everything scraped for one hood. Persisted as `<data_dir>/<name>.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoodDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    pub cards: Vec<Card>,
    #[serde(default)]
    pub total_pages: usize,
    #[serde(default)]
    pub burbs: Vec<BurbDocument>,
    #[serde(default)]
    pub total_burbs: usize,
    #[serde(default)]
    pub metadata: ScrapeMetadata,
}

impl HoodDocument {
    /// Builds the document, deriving the totals from the collections.
    pub fn new(
        name: String,
        description: String,
        url: String,
        cards: Vec<Card>,
        burbs: Vec<BurbDocument>,
        metadata: ScrapeMetadata,
    ) -> Self {
        Self {
            total_pages: cards.len(),
            total_burbs: burbs.len(),
            name,
            description,
            url,
            cards,
            burbs,
            metadata,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapeMetadata {
    pub scraped_at: String,
    pub base_url: String,
}

/// Card projected for the flattened dataset. Drops `last_modified`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatItem {
    pub title: String,
    pub url: String,
    pub has_sound: bool,
    pub source: Source,
}

impl FlatItem {
    pub fn new(card: &Card, source: Source) -> Self {
        Self {
            title: card.title.clone(),
            url: card.url.clone(),
            has_sound: card.has_sound,
            source,
        }
    }
}

/// Where a flattened item came from: `{"t":"h","h":..}` or `{"t":"b","h":..,"b":..}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t")]
pub enum Source {
    #[serde(rename = "h")]
    Hood {
        #[serde(rename = "h")]
        hood: String,
    },
    #[serde(rename = "b")]
    Burb {
        #[serde(rename = "h")]
        hood: String,
        #[serde(rename = "b")]
        burb: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlattenMetadata {
    pub total_pages: usize,
    pub total_hoods: usize,
    pub hoods: Vec<String>,
    pub generated_at: String,
    pub chunks: usize,
}

/// Local time in the format used by every timestamp field.
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
