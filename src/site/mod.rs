//! URL handling for the calendar site
//!
//! This module knows how the site lays out its URLs: where the monthly
//! listing pages live, how event links resolve against the site root, and
//! how an event's department is read from its path.

mod listing;
mod resolve;

pub use listing::{base_url, month_url};
pub use resolve::{department_from_url, parse_absolute, resolve_href};
