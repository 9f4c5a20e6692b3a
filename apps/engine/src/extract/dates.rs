//! Date-range parsing shared by the education and experience extractors.
//! Handles "Jan 2020 - Present", "2019-2021", "March 2018 to June 2019",
//! and degrades malformed ranges to whichever end parsed.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::{DateEnd, DateRange, PartialDate, Span};

const MONTH: &str = r"(?:jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|jun(?:e)?|jul(?:y)?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";
const YEAR: &str = r"(?:19|20)\d{2}";
const OPEN_END: &str = r"(?:present|current|now|ongoing)";
const SEP: &str = r"\s*(?:[-\u{2013}\u{2014}]|to|until)\s*";

static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    let date = format!(r"(?:{MONTH}\.?\s+)?{YEAR}");
    Regex::new(&format!(
        r"(?i)\b({date}){SEP}({date}|{OPEN_END})\b"
    ))
    .expect("valid range regex")
});

static SINGLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b({MONTH}\.?\s+{YEAR})\b")).expect("valid single-date regex")
});

static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"\b{YEAR}\b")).expect("valid year regex"));

static OPEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)^{OPEN_END}$")).expect("valid open-end regex"));

/// Finds the first date range (or single date) in `text`. The span is
/// relative to `text`; callers add their base offset.
pub fn find_range(text: &str) -> Option<(DateRange, Span)> {
    if let Some(caps) = RANGE_RE.captures(text) {
        let whole = caps.get(0)?;
        let start = parse_partial(&caps[1]);
        let end_token = &caps[2];
        let end = if OPEN_RE.is_match(end_token.trim()) {
            DateEnd::Open
        } else {
            match parse_partial(end_token) {
                Some(d) => DateEnd::Known(d),
                None => DateEnd::Unknown,
            }
        };
        let range = DateRange { start, end };
        if !range.is_empty() {
            return Some((range, Span::new(whole.start(), whole.end())));
        }
    }

    if let Some(caps) = SINGLE_RE.captures(text) {
        let m = caps.get(1)?;
        if let Some(d) = parse_partial(m.as_str()) {
            return Some((
                DateRange {
                    start: Some(d),
                    end: DateEnd::Unknown,
                },
                Span::new(m.start(), m.end()),
            ));
        }
    }

    // Last resort: a bare year reads as a partially-known start.
    if let Some(m) = YEAR_RE.find(text) {
        if let Ok(year) = m.as_str().parse() {
            return Some((
                DateRange {
                    start: Some(PartialDate::year(year)),
                    end: DateEnd::Unknown,
                },
                Span::new(m.start(), m.end()),
            ));
        }
    }

    None
}

/// Parses "Jan 2020", "March 2018", or "2019" into a PartialDate.
pub fn parse_partial(token: &str) -> Option<PartialDate> {
    let token = token.trim().trim_end_matches('.');
    let lower = token.to_lowercase();

    if let Some((month_part, year_part)) = lower.rsplit_once(char::is_whitespace) {
        let year: i32 = year_part.trim().parse().ok()?;
        let month = month_number(month_part.trim().trim_end_matches('.'))?;
        return Some(PartialDate::month(year, month));
    }

    lower.parse().ok().map(PartialDate::year)
}

fn month_number(name: &str) -> Option<u32> {
    if name.len() < 3 {
        return None;
    }
    match &name[..3] {
        "jan" => Some(1),
        "feb" => Some(2),
        "mar" => Some(3),
        "apr" => Some(4),
        "may" => Some(5),
        "jun" => Some(6),
        "jul" => Some(7),
        "aug" => Some(8),
        "sep" => Some(9),
        "oct" => Some(10),
        "nov" => Some(11),
        "dec" => Some(12),
        _ => None,
    }
}
