/// TMDB movie genre ids, from `/genre/movie/list`.
const MOVIE_GENRES: &[(&str, u32)] = &[
    ("Action", 28),
    ("Adventure", 12),
    ("Animation", 16),
    ("Comedy", 35),
    ("Crime", 80),
    ("Documentary", 99),
    ("Drama", 18),
    ("Family", 10751),
    ("Fantasy", 14),
    ("History", 36),
    ("Horror", 27),
    ("Music", 10402),
    ("Mystery", 9648),
    ("Romance", 10749),
    ("Science Fiction", 878),
    ("TV Movie", 10770),
    ("Thriller", 53),
    ("War", 10752),
    ("Western", 37),
];

pub fn genre_id(name: &str) -> Option<u32> {
    let name = name.trim();
    MOVIE_GENRES
        .iter()
        .find(|(genre, _)| genre.eq_ignore_ascii_case(name))
        .map(|(_, id)| *id)
}

/// Map a genre name to the id `with_genres` expects. Ids and names we
/// don't know are passed through untouched.
pub fn resolve_genre(value: &str) -> String {
    match genre_id(value) {
        Some(id) => id.to_string(),
        None => value.to_string(),
    }
}
