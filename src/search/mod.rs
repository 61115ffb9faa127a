//! Search Module
//!
//! Bookkeeping for the search box: query sanitization, the minimum query
//! length, paging through results, and telling superseded responses apart.
//! Issuing the requests is left to the caller.

mod session;

pub use session::{SearchRequest, SearchSession};

use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;

// == Public Constants ==
/// Queries shorter than this clear the results instead of searching
pub const MIN_QUERY_LEN: usize = 3;

/// Longest query sent to the movie database, in characters
pub const MAX_QUERY_LEN: usize = 50;

/// Results per page returned by the movie database
pub const RESULTS_PER_PAGE: u32 = 10;

/// How long input must be idle before a search starts
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>?").expect("valid tag regex"));

static DISALLOWED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s\-.,]").expect("valid character regex"));

// == Sanitize Query ==
/// Cleans user input before it is used as a search term.
///
/// Trims whitespace, strips anything that looks like a markup tag, drops
/// characters other than word characters, whitespace, `-`, `.` and `,`,
/// then truncates to [`MAX_QUERY_LEN`] characters.
///
/// Word characters are Unicode-aware, so accented letters and non-Latin
/// scripts are kept, and the length limit counts `char`s rather than bytes
/// or UTF-16 units.
pub fn sanitize_query(input: &str) -> String {
    let trimmed = input.trim();
    let without_tags = TAG_RE.replace_all(trimmed, "");
    let cleaned = DISALLOWED_RE.replace_all(&without_tags, "");
    cleaned.chars().take(MAX_QUERY_LEN).collect()
}

/// Number of result pages for `total_results` hits.
pub fn total_pages(total_results: u32) -> u32 {
    total_results.div_ceil(RESULTS_PER_PAGE)
}
