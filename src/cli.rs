use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config_scrape::{load_config, save_config, ConfigScraper};
use crate::flatten::flatten;
use crate::process::HoodScraper;
use crate::request::HttpFetcher;
use crate::store::HoodStore;
use crate::{
    Result, BASE_URL, BURB_DELAY_MS, CHUNK_SIZE, CONFIG_PATH, DATA_DIR, FLATTENED_OUTPUT,
    REQUEST_TIMEOUT_SECS, USER_AGENT,
};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scrape the mirror's front page into the config file.
    Config(ConfigArgs),
    /// Scrape hoods and burbs listed in the config file, one JSON file per hood.
    Scrape(ScrapeArgs),
    /// Flatten scraped hood files into gzipped chunks.
    Flatten(FlattenArgs),
}

#[derive(Debug, Args)]
pub struct HttpArgs {
    /// Request timeout.
    #[arg(long, default_value_t = REQUEST_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    #[arg(long, default_value = USER_AGENT)]
    pub user_agent: String,
}

impl HttpArgs {
    fn fetcher(&self) -> Result<HttpFetcher> {
        HttpFetcher::new(&self.user_agent, Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Mirror to read the neighborhood listing from.
    #[arg(long, default_value = BASE_URL)]
    pub base_url: String,

    /// Output path for the config file.
    #[arg(long, default_value = CONFIG_PATH)]
    pub out: PathBuf,

    #[command(flatten)]
    pub http: HttpArgs,
}

#[derive(Debug, Args)]
pub struct ScrapeArgs {
    /// Config file written by `config`.
    #[arg(long, default_value = CONFIG_PATH)]
    pub config: PathBuf,

    /// Directory receiving one `<hood>.json` per hood.
    #[arg(long, default_value = DATA_DIR)]
    pub out_dir: PathBuf,

    /// Scrape only this hood.
    #[arg(long)]
    pub hood: Option<String>,

    /// Scrape only these burbs of `--hood`.
    #[arg(long, num_args = 0.., requires = "hood")]
    pub burbs: Option<Vec<String>>,

    /// Skip hoods that already have a file in `--out-dir`.
    #[arg(long)]
    pub resume: bool,

    /// Pause after each burb request (politeness).
    #[arg(long, default_value_t = BURB_DELAY_MS)]
    pub delay_ms: u64,

    #[command(flatten)]
    pub http: HttpArgs,
}

#[derive(Debug, Args)]
pub struct FlattenArgs {
    /// Directory of scraped hood files.
    #[arg(long, default_value = DATA_DIR)]
    pub input: PathBuf,

    /// Output path; a trailing `.json` is dropped to form the file name base.
    #[arg(long, default_value = FLATTENED_OUTPUT)]
    pub output: PathBuf,

    /// Maximum items per chunk file.
    #[arg(long, default_value_t = CHUNK_SIZE)]
    pub chunk_size: usize,
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Config(args) => run_config(args).await,
        Command::Scrape(args) => run_scrape(args).await,
        Command::Flatten(args) => run_flatten(args),
    }
}

async fn run_config(args: ConfigArgs) -> Result<()> {
    let scraper = ConfigScraper::new(args.http.fetcher()?, args.base_url);
    let config = scraper.scrape_main_page().await?;
    save_config(&config, &args.out)?;
    tracing::info!(hoods = config.neighborhoods.len(), "successfully scraped neighborhoods");
    Ok(())
}

async fn run_scrape(args: ScrapeArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let store = HoodStore::open(&args.out_dir)?;
    let scraper = HoodScraper::new(
        config,
        args.http.fetcher()?,
        store,
        Duration::from_millis(args.delay_ms),
    );

    match args.hood {
        Some(hood) => {
            if args.resume && scraper.get_scraped_hoods()?.contains(&hood) {
                tracing::info!(hood = %hood, "skipping already scraped hood");
                return Ok(());
            }
            scraper.scrape_hood(&hood, args.burbs.as_deref()).await?;
        }
        None => {
            scraper.scrape_all(args.resume).await?;
        }
    }
    Ok(())
}

fn run_flatten(args: FlattenArgs) -> Result<()> {
    flatten(&args.input, &args.output, args.chunk_size)?;
    Ok(())
}
