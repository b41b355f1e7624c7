use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The selector you are trying to scrape for is missing. Selector: {0}")]
    ParseMissingSelector(String),
    #[error("Expected element is missing from the markup: {0}")]
    MissingElement(&'static str),

    #[error("Hood {0} not found in config")]
    HoodNotFound(String),
    #[error("Chunk size must be at least 1, got {0}")]
    InvalidChunkSize(usize),

    #[error("Io Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Couldn't persist a temporary file: {0}")]
    Persist(#[from] tempfile::PersistError),
    #[error("Json Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Couldn't initialize logging: {0}")]
    Logging(String),

    #[error("Tokio Join Error, couldn't await a task! {0}")]
    RuntimeJoin(#[from] tokio::task::JoinError),

    #[error("Reqwest Error: {0}")]
    Reqwest(#[from] reqwest::Error),
}
