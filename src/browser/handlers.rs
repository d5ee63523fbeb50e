use axum::{
    extract::{Query, State},
    response::{Html, Redirect},
};

use super::client::InProcessSource;
use super::render::{render_page, PageOptions, PAGE_PATH};
use super::state::{FilterState, MovieBrowser};
use crate::server::AppState;
use crate::util::QueryParams;

/// `GET /movies`. The filter state comes in on the query string, every
/// control on the page links back here with the state changed.
pub async fn movies_page(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Html<String> {
    let filter = FilterState::from_query(&params);
    let mut browser = MovieBrowser::with_filter(InProcessSource::new(state.clone()), filter);
    browser.refresh().await;

    Html(render_page(&browser, &PageOptions::from_config(&state.config)))
}

pub async fn index() -> Redirect {
    Redirect::to(PAGE_PATH)
}
