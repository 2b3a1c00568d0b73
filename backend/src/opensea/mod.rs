pub mod client;
pub mod errors;
pub mod fetcher;

pub use client::OpenSeaClient;
pub use errors::MarketError;
pub use fetcher::MarketSource;
