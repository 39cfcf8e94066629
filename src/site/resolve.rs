use crate::{SiteError, SiteResult};
use url::Url;

/// Parses a URL that must be absolute http(s)
pub fn parse_absolute(url_str: &str) -> SiteResult<Url> {
    let url = Url::parse(url_str)?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(SiteError::InvalidScheme(url.scheme().to_string()));
    }

    Ok(url)
}

/// Resolves an event link href to an absolute URL
///
/// Returns None if the link should be ignored:
/// - empty hrefs
/// - javascript:, mailto:, tel: schemes and data: URIs
/// - fragment-only links
/// - anything that doesn't resolve to http(s)
///
/// # Examples
///
/// ```
/// use civic_calendar::site::resolve_href;
/// use url::Url;
///
/// let base = Url::parse("https://www.wayland.ma.us").unwrap();
/// let url = resolve_href("/select-board/events/1", &base).unwrap();
/// assert_eq!(url.as_str(), "https://www.wayland.ma.us/select-board/events/1");
/// ```
pub fn resolve_href(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    if absolute.scheme() == "http" || absolute.scheme() == "https" {
        Some(absolute)
    } else {
        None
    }
}

/// Derives the department from the first path segment of an event URL
///
/// `https://www.wayland.ma.us/board-assessors/events/123` yields
/// `board-assessors`. A URL with an empty path yields None.
pub fn department_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .next()
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_string())
}
