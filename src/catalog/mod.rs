pub mod client;
pub mod genre;

pub use client::*;
pub use genre::resolve_genre;
