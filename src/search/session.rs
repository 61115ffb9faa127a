//! Search session state: current query, page, and which search is newest.

use serde::Serialize;

use super::{sanitize_query, total_pages, MIN_QUERY_LEN};

// == Search Request ==
/// One page request the caller should issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRequest {
    /// Sanitized search term
    pub query: String,
    /// 1-based page number
    pub page: u32,
    /// Search this page belongs to; bumps on every new query
    pub generation: u64,
}

// == Search Session ==
/// Tracks the active search so paging and stale responses are handled.
#[derive(Debug, Default)]
pub struct SearchSession {
    query: Option<String>,
    page: u32,
    total_results: Option<u32>,
    generation: u64,
}

impl SearchSession {
    pub fn new() -> Self {
        Self::default()
    }

    // == Begin ==
    /// Starts a new search for `input`.
    ///
    /// Input shorter than the minimum length clears the session and returns
    /// None. Any earlier search is superseded either way.
    pub fn begin(&mut self, input: &str) -> Option<SearchRequest> {
        self.generation += 1;
        self.page = 0;
        self.total_results = None;

        let trimmed = input.trim();
        if trimmed.chars().count() < MIN_QUERY_LEN {
            self.query = None;
            return None;
        }

        self.query = Some(sanitize_query(trimmed));
        self.page = 1;
        self.request()
    }

    // == Record Results ==
    /// Records the total hit count reported for a response.
    ///
    /// Returns false and ignores the count when the response belongs to a
    /// superseded search.
    pub fn record_results(&mut self, request: &SearchRequest, total_results: u32) -> bool {
        if !self.is_current(request) {
            return false;
        }
        self.total_results = Some(total_results);
        true
    }

    // == Next Page ==
    /// Advances to the next page if the current search has more results.
    pub fn next_page(&mut self) -> Option<SearchRequest> {
        let total = self.total_results?;
        if self.page >= total_pages(total) {
            return None;
        }
        self.page += 1;
        self.request()
    }

    /// Whether `request` belongs to the newest search.
    pub fn is_current(&self, request: &SearchRequest) -> bool {
        self.query.is_some() && request.generation == self.generation
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    fn request(&self) -> Option<SearchRequest> {
        let query = self.query.clone()?;
        Some(SearchRequest {
            query,
            page: self.page,
            generation: self.generation,
        })
    }
}
