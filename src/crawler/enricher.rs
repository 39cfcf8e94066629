//! Detail page enrichment
//!
//! Visits a candidate's detail page and fills in its description and event
//! type. Enrichment is best-effort: any failure hands the candidate back
//! exactly as it came in.

use crate::crawler::fetcher::Fetcher;
use crate::event::EventRecord;
use scraper::{Html, Selector};
use std::sync::{Arc, LazyLock};

/// Description sources, tried in order
static DESCRIPTION_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(&[
        ".field-name-body .field-item",
        ".event-description",
        ".content",
    ])
});

/// Event type sources, tried in order
static EVENT_TYPE_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    parse_selectors(&[".field-name-field-event-type .field-item", ".event-type"])
});

fn parse_selectors(sources: &[&str]) -> Vec<Selector> {
    sources
        .iter()
        .map(|css| Selector::parse(css).expect("detail selector must be valid"))
        .collect()
}

/// Fields read from a detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDetails {
    pub description: Option<String>,
    pub event_type: Option<String>,
}

impl EventDetails {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.event_type.is_none()
    }
}

/// Reads description and event type from a detail page
///
/// For each field the selectors are tried in order; the text of every
/// element one selector matches is joined and trimmed, and the first
/// non-empty result wins.
pub fn extract_details(html: &str) -> EventDetails {
    let document = Html::parse_document(html);
    EventDetails {
        description: first_text(&document, &DESCRIPTION_SELECTORS),
        event_type: first_text(&document, &EVENT_TYPE_SELECTORS),
    }
}

fn first_text(document: &Html, selectors: &[Selector]) -> Option<String> {
    selectors.iter().find_map(|selector| {
        let text = document
            .select(selector)
            .flat_map(|element| element.text())
            .collect::<String>();
        let text = text.trim();
        if text.is_empty() {
            None
        } else {
            Some(text.to_string())
        }
    })
}

/// Applies extracted details to a candidate
///
/// Only description and event type change; a field with no match keeps
/// its current value.
pub fn apply_details(mut candidate: EventRecord, details: EventDetails) -> EventRecord {
    if let Some(description) = details.description {
        candidate.set_description(&description);
    }
    if let Some(event_type) = details.event_type {
        candidate.event_type = Some(event_type);
    }
    candidate
}

/// Best-effort detail page enricher
#[derive(Debug, Clone)]
pub struct Enricher {
    fetcher: Arc<Fetcher>,
}

impl Enricher {
    pub fn new(fetcher: Arc<Fetcher>) -> Self {
        Self { fetcher }
    }

    /// Enriches a candidate from its detail page
    ///
    /// Never fails: fetch errors, empty pages, and pages with none of the
    /// known fields all return the candidate unchanged.
    pub async fn enrich(&self, candidate: EventRecord) -> EventRecord {
        let html = match self.fetcher.fetch_page(&candidate.source_url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(
                    "Error fetching event details for {}: {}",
                    candidate.source_url,
                    e
                );
                return candidate;
            }
        };

        if html.trim().is_empty() {
            tracing::debug!("Empty detail page for {}", candidate.source_url);
            return candidate;
        }

        let details = extract_details(&html);
        if details.is_empty() {
            tracing::debug!("No details found at {}", candidate.source_url);
            return candidate;
        }

        apply_details(candidate, details)
    }
}
