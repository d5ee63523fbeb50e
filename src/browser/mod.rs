pub mod client;
pub mod handlers;
pub mod render;
pub mod state;
pub mod types;

pub use client::{InProcessSource, ProxyClient};
pub use handlers::*;
pub use render::{render_page, PageOptions};
pub use state::*;
pub use types::*;
