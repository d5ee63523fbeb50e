use std::fmt::Write;

use super::state::{FilterState, MovieBrowser, MovieSource, ALL_GENRES};
use crate::config::Config;

pub const PAGE_PATH: &str = "/movies";

/// Everything the page needs besides the view state itself.
pub struct PageOptions<'a> {
    pub years: &'a [i32],
    pub genres: &'a [String],
    pub image_base_url: &'a str,
}

impl<'a> PageOptions<'a> {
    pub fn from_config(config: &'a Config) -> Self {
        Self {
            years: &config.browser.years,
            genres: &config.browser.genres,
            image_base_url: &config.tmdb.image_base_url,
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn link(filter: &FilterState) -> String {
    format!("{}?{}", PAGE_PATH, filter.query_string())
}

pub fn heading(filter: &FilterState) -> String {
    let year = filter
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "All Years".to_string());
    format!("{} {} Movie List", year, filter.genre)
}

pub fn render_page<S: MovieSource>(browser: &MovieBrowser<S>, options: &PageOptions) -> String {
    let filter = browser.filter();
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n<title>Movies</title>\n</head>\n<body>\n");
    html.push_str("<main class=\"movies\">\n");

    // Year selector. Changing the year keeps page and genre.
    let _ = writeln!(html, "<form method=\"get\" action=\"{}\" class=\"filters\">", PAGE_PATH);
    let _ = writeln!(html, "<input type=\"hidden\" name=\"page\" value=\"{}\">", filter.page);
    let _ = writeln!(
        html,
        "<input type=\"hidden\" name=\"genre\" value=\"{}\">",
        escape_html(&filter.genre)
    );
    html.push_str("<select name=\"year\" onchange=\"this.form.submit()\">\n");
    html.push_str("<option value=\"\">Select Year</option>\n");
    for year in options.years {
        let selected = if filter.year == Some(*year) { " selected" } else { "" };
        let _ = writeln!(html, "<option value=\"{0}\"{1}>{0}</option>", year, selected);
    }
    html.push_str("</select>\n<button type=\"submit\">Filter</button>\n</form>\n");

    html.push_str("<p class=\"tagline\">Online streaming</p>\n");
    let _ = writeln!(html, "<h1>{}</h1>", escape_html(&heading(filter)));

    html.push_str("<nav class=\"genres\">\n");
    for genre in options.genres {
        let target = filter.with_genre(genre.as_str());
        let class = if *genre == filter.genre || (genre == ALL_GENRES && filter.genre.is_empty()) {
            "button active"
        } else {
            "button"
        };
        let _ = writeln!(
            html,
            "<a class=\"{}\" href=\"{}\">{}</a>",
            class,
            escape_html(&link(&target)),
            escape_html(genre)
        );
    }
    html.push_str("</nav>\n");

    if let Some(error) = browser.error() {
        html.push_str("<div class=\"error\">\n<p>Couldn’t load movies:</p>\n");
        let _ = writeln!(html, "<pre>{}</pre>", escape_html(error));
        let _ = writeln!(
            html,
            "<a class=\"button retry\" href=\"{}\">Retry</a>",
            escape_html(&link(filter))
        );
        html.push_str("</div>\n");
    } else {
        html.push_str("<div class=\"grid\">\n");
        for movie in browser.movies() {
            html.push_str("<div class=\"card\">\n");
            if let Some(poster) = movie.poster_url(options.image_base_url) {
                let _ = writeln!(
                    html,
                    "<img src=\"{}\" alt=\"{}\" width=\"500\" height=\"750\">",
                    escape_html(&poster),
                    escape_html(movie.display_title())
                );
            }
            let _ = writeln!(html, "<h3>{}</h3>", escape_html(movie.display_title()));
            let _ = writeln!(html, "<span class=\"year\">{}</span>", escape_html(movie.release_year()));
            if let Some(ref overview) = movie.overview {
                let _ = writeln!(html, "<p>{}</p>", escape_html(overview));
            }
            html.push_str("</div>\n");
        }
        html.push_str("</div>\n");

        let _ = writeln!(
            html,
            "<div class=\"pagination\">\n<a class=\"button\" href=\"{}\">Previous</a>\n<a class=\"button\" href=\"{}\">Next</a>\n</div>",
            escape_html(&link(&filter.previous())),
            escape_html(&link(&filter.next()))
        );
    }

    if browser.loading() {
        html.push_str("<div class=\"loading\">Loading…</div>\n");
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}
