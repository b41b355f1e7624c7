//! GEOCITIES NEIGHBORHOOD ARCHIVER
//!
//! Three stages that only talk to each other through files:
//! `config_scrape` reads the mirror's listing page into a config document,
//! `process` scrapes every hood and burb named there into one JSON file per hood,
//! `flatten` turns those files into gzipped chunks for random sampling.

pub mod cli;
pub mod config_scrape;
mod error;
pub mod flatten;
pub mod logging;
mod macros;
pub mod model;
pub mod parse;
pub mod process;
pub mod request;
pub mod store;

pub use error::{Error, Result};

pub const BASE_URL: &str = "https://geocities.restorativland.org";
pub const CONFIG_PATH: &str = "geocities_config.json";
pub const DATA_DIR: &str = "geocities_data";
pub const FLATTENED_OUTPUT: &str = "geocities_flattened.json";
pub const CHUNK_SIZE: usize = 10_000;
/// Pause after every burb request, in milliseconds.
pub const BURB_DELAY_MS: u64 = 1_000;
pub const REQUEST_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str = concat!("hoodscrap/", env!("CARGO_PKG_VERSION"));

/// Stripped from every card URL.
const URL_PREFIX: &str = "www.geocities.com/";
const SOUND_GLYPH: char = '🔊';
const LAST_MODIFIED_MARKER: &str = "Last modified:";
const UNTITLED: &str = "Untitled";
