use std::sync::Arc;

use market::Notification;
use tracing::{error, info};

use crate::mail::MailTransport;
use crate::mail::types::{Mailbox, OutboundMessage};

/// Addresses composed notifications and hands them to a transport.
///
/// Delivery failures are logged and reported as `false`; they never undo
/// work done earlier in the cycle.
pub struct MailDispatcher {
    transport: Arc<dyn MailTransport>,
    from: Mailbox,
    to: Mailbox,
}

impl MailDispatcher {
    pub fn new(transport: Arc<dyn MailTransport>, from: Mailbox, to: Mailbox) -> Self {
        Self {
            transport,
            from,
            to,
        }
    }

    pub async fn dispatch(&self, notification: &Notification) -> bool {
        let message = OutboundMessage {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: notification.subject.clone(),
            html_body: notification.html_body.clone(),
        };

        match self.transport.send(&message).await {
            Ok(code) => {
                info!(code, subject = %message.subject, "sent mail");
                true
            }
            Err(e) => {
                error!(error = %e, subject = %message.subject, "failed to send mail");
                false
            }
        }
    }
}
