pub mod config;
pub mod db;
pub mod mail;
pub mod monitor;
pub mod opensea;
pub mod snapshot;

pub mod error;
pub mod logger;
pub mod time;
