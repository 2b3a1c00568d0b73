use thiserror::Error;

/// Why a single snapshot field could not be read from an otherwise
/// successful upstream response.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("no listings in response")]
    NoListings,

    #[error("no sale events in response")]
    NoSaleEvents,

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("{field} is not numeric: {raw}")]
    NotNumeric { field: &'static str, raw: String },
}
