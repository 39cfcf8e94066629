//! Month listing parser
//!
//! Turns one month's calendar page into candidate [`EventRecord`]s.
//!
//! Extraction runs an ordered list of [`DayLocator`] strategies. Each
//! strategy only finds day containers and reads their day-of-month; the
//! first strategy that produces at least one candidate wins. Turning the
//! links inside a day into candidates is shared by every strategy.

use crate::event::EventRecord;
use crate::site::{department_from_url, resolve_href};
use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::ops::Range;
use std::sync::LazyLock;
use url::Url;

/// Time token embedded in link text, e.g. "6:00pm" or "10:30AM"
static TIME_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}:\d{2}[ap]m)").expect("time token regex must be valid")
});

/// Leading day number of a table cell's text; a bare number counts too
static LEADING_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,2})(?:\s|$)").expect("leading day regex must be valid")
});

static DATE_BOX: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".calendar-month .date-box").expect("date box selector must be valid")
});

static DAY_NUMBER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".day-number").expect("day number selector must be valid"));

static CALENDAR_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".calendar td").expect("calendar cell selector must be valid"));

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("anchor selector must be valid"));

/// Classes the site uses for grid padding days from the previous/next month
const ADJACENT_MONTH_CLASSES: &[&str] = &[
    "prev-month",
    "next-month",
    "other-month",
    "adjacent-month",
    "out-of-month",
];

/// Most padding cells a grid shows before the first of the month
const DAYS_PER_WEEK: usize = 7;

/// A day container found on the page
#[derive(Debug, Clone, Copy)]
pub struct DayCell<'a> {
    /// Day of month as printed on the page
    pub day: u32,

    /// Element whose anchors belong to that day
    pub element: ElementRef<'a>,
}

/// A strategy for locating day containers in a listing page
pub trait DayLocator: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Finds day containers in document order
    fn locate<'a>(&self, document: &'a Html) -> Vec<DayCell<'a>>;
}

/// Primary strategy: `.calendar-month .date-box` with a `.day-number` child
#[derive(Debug, Default, Clone, Copy)]
pub struct DateBoxLocator;

impl DayLocator for DateBoxLocator {
    fn name(&self) -> &'static str {
        "date-box"
    }

    fn locate<'a>(&self, document: &'a Html) -> Vec<DayCell<'a>> {
        document
            .select(&DATE_BOX)
            .filter_map(|element| {
                let text = element
                    .select(&DAY_NUMBER)
                    .next()?
                    .text()
                    .collect::<String>();
                let day = text.trim().parse::<u32>().ok()?;
                Some(DayCell { day, element })
            })
            .collect()
    }
}

/// Fallback strategy: any `.calendar td` whose text starts with a day number
#[derive(Debug, Default, Clone, Copy)]
pub struct TableCellLocator;

impl DayLocator for TableCellLocator {
    fn name(&self) -> &'static str {
        "table-cell"
    }

    fn locate<'a>(&self, document: &'a Html) -> Vec<DayCell<'a>> {
        document
            .select(&CALENDAR_CELL)
            .filter_map(|element| {
                let text = element.text().collect::<String>();
                let day = LEADING_DAY
                    .captures(&text)?
                    .get(1)?
                    .as_str()
                    .parse::<u32>()
                    .ok()?;
                Some(DayCell { day, element })
            })
            .collect()
    }
}

/// Parser for monthly listing pages
pub struct MonthParser {
    base_url: Url,
    strategies: Vec<Box<dyn DayLocator>>,
}

impl MonthParser {
    /// Creates a parser with the date-box strategy followed by the table-cell fallback
    pub fn new(base_url: Url) -> Self {
        Self::with_strategies(
            base_url,
            vec![Box::new(DateBoxLocator), Box::new(TableCellLocator)],
        )
    }

    /// Creates a parser with a custom strategy order
    pub fn with_strategies(base_url: Url, strategies: Vec<Box<dyn DayLocator>>) -> Self {
        Self {
            base_url,
            strategies,
        }
    }

    /// Extracts candidates for `year`-`month` from a listing page
    ///
    /// Strategies run in order until one yields a non-empty list. An empty
    /// result from every strategy is not an error.
    pub fn parse_month(&self, html: &str, year: i32, month: u32) -> Vec<EventRecord> {
        let document = Html::parse_document(html);

        for strategy in &self.strategies {
            let cells = strategy.locate(&document);
            let candidates = extract_candidates(&cells, year, month, &self.base_url);

            if !candidates.is_empty() {
                tracing::info!(
                    "Found {} events for {}-{:02} using {} strategy",
                    candidates.len(),
                    year,
                    month,
                    strategy.name()
                );
                return candidates;
            }

            tracing::debug!(
                "Strategy {} found no events for {}-{:02}",
                strategy.name(),
                year,
                month
            );
        }

        tracing::info!("Found 0 events for {}-{:02}", year, month);
        Vec::new()
    }
}

/// Parses a listing page with the default strategies
///
/// # Example
///
/// ```
/// use civic_calendar::crawler::parse_month;
/// use url::Url;
///
/// let html = r#"<div class="calendar-month"><div class="date-box">
///     <span class="day-number">4</span>
///     <a href="/select-board/events/1">6:00pm Select Board</a>
/// </div></div>"#;
/// let base = Url::parse("https://www.wayland.ma.us").unwrap();
/// let events = parse_month(html, 2025, 9, &base);
/// assert_eq!(events[0].title, "Select Board");
/// assert_eq!(events[0].time.as_deref(), Some("6:00pm"));
/// ```
pub fn parse_month(html: &str, year: i32, month: u32, base_url: &Url) -> Vec<EventRecord> {
    MonthParser::new(base_url.clone()).parse_month(html, year, month)
}

/// Splits link text into (title, time)
///
/// The first time token is removed from the text and the rest trimmed.
/// Without a token the whole trimmed text is the title.
pub fn split_time(text: &str) -> (String, Option<String>) {
    let text = text.trim();
    match TIME_TOKEN.find(text) {
        Some(token) => {
            let mut title = String::with_capacity(text.len());
            title.push_str(&text[..token.start()]);
            title.push_str(&text[token.end()..]);
            (title.trim().to_string(), Some(token.as_str().to_string()))
        }
        None => (text.to_string(), None),
    }
}

/// Turns one anchor into a candidate dated `date`
///
/// Returns None when the anchor has no usable href or no title remains
/// after removing the time token.
pub fn candidate_from_link(
    link: ElementRef<'_>,
    date: NaiveDate,
    base_url: &Url,
) -> Option<EventRecord> {
    let href = link.value().attr("href")?;
    let text = link.text().collect::<String>();
    if text.trim().is_empty() {
        return None;
    }

    let source_url = resolve_href(href, base_url)?;
    let (title, time) = split_time(&text);
    if title.is_empty() {
        return None;
    }

    let mut candidate = EventRecord::candidate(title, date, time, source_url.as_str());
    candidate.department = department_from_url(&source_url);
    Some(candidate)
}

/// Applies the same-month guard and link extraction to located day cells
fn extract_candidates(
    cells: &[DayCell<'_>],
    year: i32,
    month: u32,
    base_url: &Url,
) -> Vec<EventRecord> {
    let in_month: Vec<&DayCell<'_>> = cells
        .iter()
        .filter(|cell| !is_adjacent_month(cell.element))
        .collect();

    let days: Vec<u32> = in_month.iter().map(|cell| cell.day).collect();
    let span = month_span(&days);

    let mut candidates = Vec::new();
    for cell in &in_month[span] {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, cell.day) else {
            tracing::debug!("Skipping day {} not in {}-{:02}", cell.day, year, month);
            continue;
        };

        for link in cell.element.select(&ANCHOR) {
            if let Some(candidate) = candidate_from_link(link, date, base_url) {
                candidates.push(candidate);
            }
        }
    }

    candidates
}

fn is_adjacent_month(element: ElementRef<'_>) -> bool {
    element
        .value()
        .classes()
        .any(|class| ADJACENT_MONTH_CLASSES.contains(&class))
}

/// Index range of the day cells that belong to the requested month
///
/// Day numbers only decrease in document order where the grid wraps into
/// another month. A short leading run from day 22 or later that ends on day
/// 28 or later and wraps to 1 is the previous month's tail. A later wrap to
/// 1 starts the next month. Any other decrease gives no evidence either way
/// and both sides are kept.
fn month_span(days: &[u32]) -> Range<usize> {
    let wraps: Vec<usize> = (1..days.len())
        .filter(|&i| days[i] < days[i - 1])
        .collect();

    let mut start = 0;
    let mut later = wraps.as_slice();
    if let Some((&first, rest)) = wraps.split_first() {
        let previous_tail = first <= DAYS_PER_WEEK
            && days[0] >= 22
            && days[first - 1] >= 28
            && days[first] == 1;
        if previous_tail {
            start = first;
            later = rest;
        }
    }

    let end = later
        .iter()
        .copied()
        .find(|&i| days[i] == 1)
        .unwrap_or(days.len());

    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://www.wayland.ma.us").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn date_box_page(days: &[(u32, &str)]) -> String {
        let boxes: String = days
            .iter()
            .map(|(day, links)| {
                format!(
                    r#"<div class="date-box"><span class="day-number">{}</span>{}</div>"#,
                    day, links
                )
            })
            .collect();
        format!(
            r#"<html><body><div class="calendar-month">{}</div></body></html>"#,
            boxes
        )
    }

    #[test]
    fn test_split_time_leading_token() {
        let (title, time) = split_time("6:00pm Select Board");
        assert_eq!(title, "Select Board");
        assert_eq!(time.as_deref(), Some("6:00pm"));
    }

    #[test]
    fn test_split_time_without_token() {
        let (title, time) = split_time("Select Board");
        assert_eq!(title, "Select Board");
        assert_eq!(time, None);
    }

    #[test]
    fn test_split_time_case_insensitive_and_trailing() {
        let (title, time) = split_time("  Conservation Commission 7:30PM ");
        assert_eq!(title, "Conservation Commission");
        assert_eq!(time.as_deref(), Some("7:30PM"));
    }

    #[test]
    fn test_split_time_only_first_token_removed() {
        let (title, time) = split_time("9:00am Budget Hearing until 11:00am");
        assert_eq!(title, "Budget Hearing until 11:00am");
        assert_eq!(time.as_deref(), Some("9:00am"));
    }

    #[test]
    fn test_primary_strategy_extracts_fields() {
        let html = date_box_page(&[(
            4,
            r#"<a href="/board-assessors/events/123">6:00pm Board of Assessors</a>"#,
        )]);
        let events = parse_month(&html, 2025, 9, &base_url());

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.title, "Board of Assessors");
        assert_eq!(event.time.as_deref(), Some("6:00pm"));
        assert_eq!(event.date, date(2025, 9, 4));
        assert_eq!(event.department.as_deref(), Some("board-assessors"));
        assert_eq!(
            event.source_url,
            "https://www.wayland.ma.us/board-assessors/events/123"
        );
        assert_eq!(event.description, None);
        assert_eq!(event.event_type, None);
    }

    #[test]
    fn test_primary_strategy_multiple_links_per_day() {
        let html = date_box_page(&[
            (
                2,
                r#"<a href="/planning-board/events/1">7:00pm Planning Board</a>
                   <a href="/select-board/events/2">Select Board</a>"#,
            ),
            (3, ""),
        ]);
        let events = parse_month(&html, 2025, 9, &base_url());
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].title, "Select Board");
        assert_eq!(events[1].time, None);
    }

    #[test]
    fn test_links_without_title_are_discarded() {
        let html = date_box_page(&[(
            5,
            r#"<a href="/select-board/events/1">6:00pm</a>
               <a href="/select-board/events/2">   </a>
               <a>Finance Committee</a>
               <a href="/finance/events/3">Finance Committee</a>"#,
        )]);
        let events = parse_month(&html, 2025, 9, &base_url());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Finance Committee");
    }

    #[test]
    fn test_absolute_links_kept() {
        let html = date_box_page(&[(
            8,
            r#"<a href="https://other.example.org/events/9">School Committee</a>"#,
        )]);
        let events = parse_month(&html, 2025, 9, &base_url());
        assert_eq!(events[0].source_url, "https://other.example.org/events/9");
        assert_eq!(events[0].department.as_deref(), Some("events"));
    }

    #[test]
    fn test_fallback_runs_when_primary_empty() {
        let html = r#"
            <html><body><table class="calendar"><tr>
                <td>3 <a href="/zoning/events/7">7:30pm Zoning Board of Appeals</a></td>
                <td>4 </td>
                <td>no day here <a href="/x/events/8">Ignored</a></td>
            </tr></table></body></html>
        "#;
        let events = parse_month(html, 2025, 9, &base_url());

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Zoning Board of Appeals");
        assert_eq!(events[0].time.as_deref(), Some("7:30pm"));
        assert_eq!(events[0].date, date(2025, 9, 3));
        assert_eq!(events[0].department.as_deref(), Some("zoning"));
    }

    #[test]
    fn test_fallback_not_used_when_primary_has_events() {
        let html = r#"
            <html><body>
            <div class="calendar-month"><div class="date-box">
                <span class="day-number">10</span>
                <a href="/select-board/events/1">Select Board</a>
            </div></div>
            <table class="calendar"><tr>
                <td>11 <a href="/planning-board/events/2">Planning Board</a></td>
            </tr></table>
            </body></html>
        "#;
        let events = parse_month(html, 2025, 9, &base_url());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Select Board");
    }

    #[test]
    fn test_fallback_used_when_primary_boxes_have_no_links() {
        let html = r#"
            <html><body>
            <div class="calendar-month"><div class="date-box">
                <span class="day-number">10</span>
            </div></div>
            <table class="calendar"><tr>
                <td>11 <a href="/planning-board/events/2">Planning Board</a></td>
            </tr></table>
            </body></html>
        "#;
        let events = parse_month(html, 2025, 9, &base_url());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Planning Board");
    }

    #[test]
    fn test_empty_page_yields_nothing() {
        let events = parse_month("<html><body></body></html>", 2025, 9, &base_url());
        assert!(events.is_empty());
    }

    #[test]
    fn test_day_number_zero_padded_in_date() {
        let html = date_box_page(&[(7, r#"<a href="/a/events/1">Library Trustees</a>"#)]);
        let events = parse_month(&html, 2025, 2, &base_url());
        assert_eq!(events[0].date.to_string(), "2025-02-07");
    }

    #[test]
    fn test_invalid_day_for_month_skipped() {
        let html = date_box_page(&[
            (30, r#"<a href="/a/events/1">Board of Health</a>"#),
            (31, r#"<a href="/a/events/2">Ghost Meeting</a>"#),
        ]);
        let events = parse_month(&html, 2025, 9, &base_url());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Board of Health");
    }

    #[test]
    fn test_padding_days_from_adjacent_months_skipped() {
        let html = date_box_page(&[
            (31, r#"<a href="/a/events/1">August Meeting</a>"#),
            (1, r#"<a href="/a/events/2">Early September</a>"#),
            (15, r#"<a href="/a/events/3">Mid September</a>"#),
            (30, r#"<a href="/a/events/4">Late September</a>"#),
            (1, r#"<a href="/a/events/5">October Meeting</a>"#),
        ]);
        let events = parse_month(&html, 2025, 9, &base_url());
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Early September", "Mid September", "Late September"]);
    }

    #[test]
    fn test_adjacent_month_class_skipped() {
        let html = r#"
            <div class="calendar-month">
                <div class="date-box"><span class="day-number">2</span>
                    <a href="/a/events/1">In Month</a></div>
                <div class="date-box next-month"><span class="day-number">3</span>
                    <a href="/a/events/2">Next Month</a></div>
            </div>
        "#;
        let events = parse_month(html, 2025, 9, &base_url());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "In Month");
    }

    #[test]
    fn test_month_span() {
        assert_eq!(month_span(&[]), 0..0);
        assert_eq!(month_span(&[3, 7, 12]), 0..3);
        assert_eq!(month_span(&[29, 30, 31, 1, 2, 3, 4, 1]), 3..7);
        assert_eq!(month_span(&[4, 4, 9]), 0..3);
        assert_eq!(month_span(&[5, 1]), 0..1);
        // a full month followed by the next month's head
        assert_eq!(month_span(&[1, 2, 30, 1, 2]), 0..3);
        // sparse grid with no wrap to 1 keeps everything
        assert_eq!(month_span(&[28, 3]), 0..2);
        assert_eq!(month_span(&[30]), 0..1);
    }

    #[test]
    fn test_sparse_fallback_grid_keeps_month_events() {
        let html = r#"
            <html><body><table class="calendar"><tr>
                <td>31 <a href="/finance/events/1">Finance Committee</a></td>
                <td>1</td><td>2</td><td>3</td>
                <td>4 <a href="/select-board/events/2">6:00pm Select Board</a></td>
            </tr></table></body></html>
        "#;
        let events = parse_month(html, 2025, 9, &base_url());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Select Board");
        assert_eq!(events[0].date, date(2025, 9, 4));

        // A padding day that is also valid in the month is not misdated
        let html = html.replace("<td>31 ", "<td>30 ");
        let events = parse_month(&html, 2025, 10, &base_url());
        let found: Vec<_> = events.iter().map(|e| (e.title.as_str(), e.date)).collect();
        assert_eq!(found, vec![("Select Board", date(2025, 10, 4))]);
    }

    #[test]
    fn test_decrease_without_wrap_keeps_both_days() {
        let html = date_box_page(&[
            (28, r#"<a href="/a/events/1">Late Meeting</a>"#),
            (3, r#"<a href="/a/events/2">Early Meeting</a>"#),
        ]);
        let events = parse_month(&html, 2025, 10, &base_url());
        let titles: Vec<_> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Late Meeting", "Early Meeting"]);
    }

    #[test]
    fn test_bare_day_cells_located_by_fallback() {
        let document = Html::parse_document(
            r#"<table class="calendar"><tr><td>1</td><td> 2 </td><td>x</td></tr></table>"#,
        );
        let days: Vec<_> = TableCellLocator
            .locate(&document)
            .iter()
            .map(|cell| cell.day)
            .collect();
        assert_eq!(days, vec![1, 2]);
    }

    struct NeverFinds;

    impl DayLocator for NeverFinds {
        fn name(&self) -> &'static str {
            "never"
        }

        fn locate<'a>(&self, _document: &'a Html) -> Vec<DayCell<'a>> {
            Vec::new()
        }
    }

    #[test]
    fn test_custom_strategy_order() {
        let html = date_box_page(&[(4, r#"<a href="/a/events/1">Select Board</a>"#)]);
        let parser = MonthParser::with_strategies(
            base_url(),
            vec![Box::new(NeverFinds), Box::new(DateBoxLocator)],
        );
        let events = parser.parse_month(&html, 2025, 9);
        assert_eq!(events.len(), 1);

        let parser = MonthParser::with_strategies(base_url(), vec![Box::new(NeverFinds)]);
        assert!(parser.parse_month(&html, 2025, 9).is_empty());
    }
}
