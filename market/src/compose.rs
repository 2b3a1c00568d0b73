use std::fmt::Display;

use chrono::{DateTime, Utc};

use crate::snapshot::{Snapshot, describe};

/// Fixed product name every subject starts with.
pub const PRODUCT_NAME: &str = "Lighthouse";

/// Composed mail content, ready for a transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub html_body: String,
}

/// Collects subject fragments; the first joins with ": ", the rest with " & ".
struct Subject {
    text: String,
    fragments: usize,
}

impl Subject {
    fn new() -> Self {
        Self {
            text: PRODUCT_NAME.to_string(),
            fragments: 0,
        }
    }

    fn push(&mut self, first: &str, follow_up: &str) {
        if self.fragments == 0 {
            self.text.push_str(": ");
            self.text.push_str(first);
        } else {
            self.text.push_str(" & ");
            self.text.push_str(follow_up);
        }
        self.fragments += 1;
    }
}

/// Describes what changed between `old` and `new`.
///
/// With no `old` snapshot the result is a first-data notice listing the
/// current values. The body always ends with the send time and a link to the
/// collection page.
pub fn compose(
    old: Option<&Snapshot>,
    new: &Snapshot,
    collection_url: &str,
    sent_at: DateTime<Utc>,
) -> Notification {
    let mut subject = Subject::new();
    let mut lines = Vec::new();

    match old {
        Some(old) => {
            if old.floor != new.floor {
                subject.push("Floor price change", "floor price change");
                lines.push(transition(
                    "Floor price change!",
                    old.floor.as_ref(),
                    new.floor.as_ref(),
                ));
            }

            if old.last_sale != new.last_sale {
                subject.push("New sale", "new sale");
                lines.push(transition(
                    "New sale detected!",
                    old.last_sale.as_ref(),
                    new.last_sale.as_ref(),
                ));
            }

            let old_offer = old.best_offer.as_ref().map(|o| o.value);
            let new_offer = new.best_offer.as_ref().map(|o| o.value);
            if old_offer != new_offer {
                subject.push("Best offer change", "best offer change");
                lines.push(transition(
                    "Best offer change!",
                    old.best_offer.as_ref(),
                    new.best_offer.as_ref(),
                ));
            }
        }
        None => {
            subject.push("First data", "first data");
            lines.push(format!("<p>Floor price: {}</p>", describe(new.floor.as_ref())));
            lines.push(format!("<p>Last sale: {}</p>", describe(new.last_sale.as_ref())));
            lines.push(format!("<p>Best offer: {}</p>", describe(new.best_offer.as_ref())));
        }
    }

    lines.push(format!(
        "<p>Sending email at {}</p>",
        sent_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(format!("<a href='{collection_url}'>{collection_url}</a>"));

    Notification {
        subject: subject.text,
        html_body: lines.concat(),
    }
}

fn transition<T: Display>(label: &str, old: Option<&T>, new: Option<&T>) -> String {
    format!("<p>{label} {} -> {}</p>", describe(old), describe(new))
}

/// Public page of a collection on the marketplace.
pub fn collection_url(slug: &str) -> String {
    format!("https://opensea.io/collection/{slug}")
}
