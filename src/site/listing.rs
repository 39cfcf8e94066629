use crate::config::SiteConfig;
use crate::site::parse_absolute;
use crate::{SiteError, SiteResult};
use url::Url;

/// Parses the configured site root
pub fn base_url(site: &SiteConfig) -> SiteResult<Url> {
    parse_absolute(&site.base_url)
}

/// Builds the listing page URL for one calendar month
///
/// The month is appended to the calendar path as `YYYY-MM`.
///
/// # Examples
///
/// ```
/// use civic_calendar::config::SiteConfig;
/// use civic_calendar::site::month_url;
///
/// let site = SiteConfig::default();
/// let url = month_url(&site, 2025, 9).unwrap();
/// assert_eq!(url.as_str(), "https://www.wayland.ma.us/calendar/month/2025-09");
/// ```
pub fn month_url(site: &SiteConfig, year: i32, month: u32) -> SiteResult<Url> {
    if !(1..=12).contains(&month) {
        return Err(SiteError::InvalidMonth { year, month });
    }

    let base = base_url(site)?;
    let path = format!("{}{:04}-{:02}", site.calendar_path, year, month);
    Ok(base.join(&path)?)
}
