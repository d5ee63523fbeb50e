use async_trait::async_trait;
use tracing::{debug, warn};

use super::types::{MovieRequest, MovieSummary};
use crate::util::QueryParams;

pub const ALL_GENRES: &str = "All";

#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    Decode(String),
}

/// Where the view gets its movies from.
#[async_trait]
pub trait MovieSource: Send + Sync {
    async fn fetch_movies(&self, request: &MovieRequest) -> Result<Vec<MovieSummary>, BrowseError>;
}

/// Page, year and genre selection. Transitions are pure; `MovieBrowser`
/// applies them and refetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub page: u32,
    pub year: Option<i32>,
    pub genre: String,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            page: 1,
            year: None,
            genre: ALL_GENRES.to_string(),
        }
    }
}

impl FilterState {
    pub fn from_query(params: &QueryParams) -> Self {
        let page = params.get_parsed::<u32>("page").unwrap_or(1).max(1);
        let year = params.get_parsed::<i32>("year").filter(|y| *y != 0);
        let genre = params
            .get("genre")
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .unwrap_or(ALL_GENRES)
            .to_string();
        Self { page, year, genre }
    }

    /// The query string that reproduces this state, without the leading `?`.
    pub fn query_string(&self) -> String {
        let mut query = format!("page={}", self.page);
        if let Some(year) = self.year {
            query.push_str(&format!("&year={}", year));
        }
        if self.genre != ALL_GENRES {
            query.push_str(&format!("&genre={}", urlencoding::encode(&self.genre)));
        }
        query
    }

    pub fn to_request(&self) -> MovieRequest {
        MovieRequest {
            page: self.page,
            year: self.year,
            genre: Some(self.genre.clone()).filter(|g| !g.is_empty() && g != ALL_GENRES),
        }
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    pub fn next(&self) -> Self {
        self.with_page(self.page.saturating_add(1))
    }

    pub fn previous(&self) -> Self {
        self.with_page(self.page.saturating_sub(1))
    }

    pub fn with_year(&self, year: Option<i32>) -> Self {
        Self {
            year,
            ..self.clone()
        }
    }

    pub fn with_genre(&self, genre: impl Into<String>) -> Self {
        Self {
            genre: genre.into(),
            ..self.clone()
        }
    }
}

/// A refresh that has started but not settled yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRefresh {
    pub seq: u64,
    pub request: MovieRequest,
}

/// The movie list view: filter state plus whatever the last settled
/// fetch produced.
///
/// Overlapping refreshes are applied in the order they settle, so a slow
/// stale response can overwrite a newer one.
pub struct MovieBrowser<S> {
    source: S,
    filter: FilterState,
    movies: Vec<MovieSummary>,
    loading: bool,
    error: Option<String>,
    next_seq: u64,
    last_settled: Option<u64>,
}

impl<S: MovieSource> MovieBrowser<S> {
    pub fn new(source: S) -> Self {
        Self::with_filter(source, FilterState::default())
    }

    pub fn with_filter(source: S, filter: FilterState) -> Self {
        Self {
            source,
            filter,
            movies: Vec::new(),
            loading: false,
            error: None,
            next_seq: 0,
            last_settled: None,
        }
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn movies(&self) -> &[MovieSummary] {
        &self.movies
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Sequence number of the refresh that settled last.
    pub fn last_settled(&self) -> Option<u64> {
        self.last_settled
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn begin_refresh(&mut self) -> PendingRefresh {
        self.loading = true;
        self.error = None;
        self.next_seq += 1;
        let pending = PendingRefresh {
            seq: self.next_seq,
            request: self.filter.to_request(),
        };
        debug!(seq = pending.seq, request = ?pending.request, "Refreshing movies");
        pending
    }

    pub fn complete_refresh(
        &mut self,
        pending: PendingRefresh,
        result: Result<Vec<MovieSummary>, BrowseError>,
    ) {
        match result {
            Ok(movies) => {
                self.movies = movies;
                self.error = None;
            }
            Err(e) => {
                warn!(seq = pending.seq, error = %e, "Fetching movies failed");
                let message = e.to_string();
                self.error = Some(if message.is_empty() {
                    "Failed to fetch movies".to_string()
                } else {
                    message
                });
            }
        }
        self.loading = false;
        self.last_settled = Some(pending.seq);
    }

    pub async fn refresh(&mut self) {
        let pending = self.begin_refresh();
        let result = self.source.fetch_movies(&pending.request).await;
        self.complete_refresh(pending, result);
    }

    pub async fn set_filter(&mut self, filter: FilterState) {
        self.filter = filter;
        self.refresh().await;
    }

    pub async fn set_page(&mut self, page: u32) {
        let filter = self.filter.with_page(page);
        self.set_filter(filter).await;
    }

    pub async fn next_page(&mut self) {
        let filter = self.filter.next();
        self.set_filter(filter).await;
    }

    /// Stays on page 1 when already there, but still refetches.
    pub async fn previous_page(&mut self) {
        let filter = self.filter.previous();
        self.set_filter(filter).await;
    }

    pub async fn set_year(&mut self, year: Option<i32>) {
        let filter = self.filter.with_year(year);
        self.set_filter(filter).await;
    }

    pub async fn set_genre(&mut self, genre: impl Into<String>) {
        let filter = self.filter.with_genre(genre);
        self.set_filter(filter).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeSource {
        requests: Mutex<Vec<MovieRequest>>,
        replies: Mutex<VecDeque<Result<Vec<MovieSummary>, BrowseError>>>,
    }

    impl FakeSource {
        fn reply(self, reply: Result<Vec<MovieSummary>, BrowseError>) -> Self {
            self.replies.lock().unwrap().push_back(reply);
            self
        }

        fn requests(&self) -> Vec<MovieRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MovieSource for FakeSource {
        async fn fetch_movies(
            &self,
            request: &MovieRequest,
        ) -> Result<Vec<MovieSummary>, BrowseError> {
            self.requests.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn movie(title: &str) -> MovieSummary {
        MovieSummary {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    fn titles<S: MovieSource>(browser: &MovieBrowser<S>) -> Vec<&str> {
        browser.movies().iter().map(|m| m.display_title()).collect()
    }

    #[test]
    fn test_filter_defaults() {
        let filter = FilterState::default();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.year, None);
        assert_eq!(filter.genre, "All");
        assert_eq!(filter.to_request(), MovieRequest { page: 1, year: None, genre: None });
    }

    #[test]
    fn test_filter_transitions() {
        let filter = FilterState::default();
        assert_eq!(filter.previous().page, 1);
        assert_eq!(filter.next().page, 2);
        assert_eq!(filter.next().next().previous().page, 2);
        assert_eq!(filter.with_page(0).page, 1);

        let filter = filter.with_year(Some(2021)).with_genre("Comedy");
        assert_eq!(
            filter.to_request(),
            MovieRequest { page: 1, year: Some(2021), genre: Some("Comedy".to_string()) }
        );
        assert_eq!(filter.with_genre("").to_request().genre, None);
    }

    #[test]
    fn test_filter_query_round_trip() {
        let filter = FilterState { page: 3, year: Some(2020), genre: "Science Fiction".to_string() };
        assert_eq!(filter.query_string(), "page=3&year=2020&genre=Science%20Fiction");
        assert_eq!(FilterState::default().query_string(), "page=1");
    }

    #[test]
    fn test_filter_from_query() {
        let params: QueryParams = [("page", "0"), ("year", "0"), ("genre", " ")].into_iter().collect();
        assert_eq!(FilterState::from_query(&params), FilterState::default());

        let params: QueryParams = [("page", "4"), ("year", "2019"), ("genre", "Fantasy")]
            .into_iter()
            .collect();
        let filter = FilterState::from_query(&params);
        assert_eq!(filter, FilterState { page: 4, year: Some(2019), genre: "Fantasy".to_string() });
    }

    #[tokio::test]
    async fn test_loading_flag_on_success_and_failure() {
        let source = FakeSource::default()
            .reply(Ok(vec![movie("A")]))
            .reply(Err(BrowseError::Transport("connection refused".to_string())));
        let mut browser = MovieBrowser::new(source);
        assert!(!browser.loading());

        let pending = browser.begin_refresh();
        assert!(browser.loading());
        let result = browser.source().fetch_movies(&pending.request).await;
        browser.complete_refresh(pending, result);
        assert!(!browser.loading());

        let pending = browser.begin_refresh();
        assert!(browser.loading());
        let result = browser.source().fetch_movies(&pending.request).await;
        browser.complete_refresh(pending, result);
        assert!(!browser.loading());
    }

    #[tokio::test]
    async fn test_success_replaces_movies() {
        let source = FakeSource::default()
            .reply(Ok(vec![movie("A"), movie("B")]))
            .reply(Ok(vec![movie("C")]));
        let mut browser = MovieBrowser::new(source);

        browser.refresh().await;
        assert_eq!(titles(&browser), vec!["A", "B"]);
        browser.next_page().await;
        assert_eq!(titles(&browser), vec!["C"]);
        assert_eq!(browser.error(), None);
    }

    #[tokio::test]
    async fn test_failure_keeps_movies_and_sets_error() {
        let source = FakeSource::default()
            .reply(Ok(vec![movie("A")]))
            .reply(Err(BrowseError::Status {
                status: 500,
                message: r#"{"error":"boom"}"#.to_string(),
            }))
            .reply(Ok(vec![movie("B")]));
        let mut browser = MovieBrowser::new(source);

        browser.refresh().await;
        browser.set_year(Some(2021)).await;
        assert_eq!(titles(&browser), vec!["A"]);
        assert_eq!(browser.error(), Some(r#"{"error":"boom"}"#));

        // Retry with the same filter clears the error.
        browser.refresh().await;
        assert_eq!(titles(&browser), vec!["B"]);
        assert_eq!(browser.error(), None);

        let requests = browser.source().requests();
        assert_eq!(requests[1], requests[2]);
    }

    #[tokio::test]
    async fn test_empty_error_message_still_shows() {
        let source = FakeSource::default().reply(Err(BrowseError::Decode(String::new())));
        let mut browser = MovieBrowser::new(source);
        browser.refresh().await;
        assert!(!browser.error().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_previous_at_first_page_refetches_once() {
        let mut browser = MovieBrowser::new(FakeSource::default());
        browser.previous_page().await;
        assert_eq!(browser.filter().page, 1);
        assert_eq!(
            browser.source().requests(),
            vec![MovieRequest { page: 1, year: None, genre: None }]
        );
    }

    #[tokio::test]
    async fn test_each_mutator_refetches() {
        let mut browser = MovieBrowser::new(FakeSource::default());
        browser.set_genre("Comedy").await;
        browser.set_year(Some(2020)).await;
        browser.next_page().await;
        browser.set_genre("All").await;
        browser.set_page(7).await;

        let pages: Vec<MovieRequest> = browser.source().requests();
        assert_eq!(pages.len(), 5);
        assert_eq!(pages[0].genre.as_deref(), Some("Comedy"));
        assert_eq!(pages[1].year, Some(2020));
        assert_eq!(pages[2].page, 2);
        assert_eq!(pages[3].genre, None);
        assert_eq!(pages[4], MovieRequest { page: 7, year: Some(2020), genre: None });
    }

    #[tokio::test]
    async fn test_identical_filters_identical_requests() {
        let mut browser = MovieBrowser::new(FakeSource::default());
        browser.set_genre("Animation").await;
        browser.refresh().await;
        let requests = browser.source().requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], requests[1]);
    }

    #[test]
    fn test_overlapping_refreshes_last_settled_wins() {
        let mut browser = MovieBrowser::new(FakeSource::default());
        let first = browser.begin_refresh();
        browser.filter = browser.filter.next();
        let second = browser.begin_refresh();
        assert!(second.seq > first.seq);

        browser.complete_refresh(second, Ok(vec![movie("fresh")]));
        browser.complete_refresh(first, Ok(vec![movie("stale")]));
        assert_eq!(titles(&browser), vec!["stale"]);
        assert_eq!(browser.last_settled(), Some(1));
        assert!(!browser.loading());
    }
}
