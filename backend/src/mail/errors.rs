use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail rejected with status {0}")]
    Rejected(u16),
}
