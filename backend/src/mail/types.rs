use serde::Serialize;

/// An address plus display name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Mailbox {
    pub email: String,
    pub name: String,
}

/// Transport-agnostic outbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    pub from: Mailbox,
    pub to: Mailbox,
    pub subject: String,
    pub html_body: String,
}
