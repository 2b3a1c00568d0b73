pub mod extract;
pub mod types;

pub use extract::{extract_best_offer, extract_floor_price, extract_last_sale};
pub use types::*;
