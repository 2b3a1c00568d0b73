pub mod dispatcher;
pub mod errors;
pub mod mailjet;
pub mod types;

use async_trait::async_trait;

pub use dispatcher::MailDispatcher;
pub use errors::MailError;
pub use mailjet::MailjetClient;
pub use types::{Mailbox, OutboundMessage};

/// Outbound mail transport. Returns the provider's status code on success.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &OutboundMessage) -> Result<u16, MailError>;
}
