use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid api key header: {0}")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),
}
