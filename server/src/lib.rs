//! botdeck server: session-gated pages and a mock trading-bot API.

pub mod handlers;
pub mod portfolio;
pub mod state;
pub mod store;
pub mod tower_middle;

pub use handlers::http::routes::{Router, build_router};
pub use state::AppState;
