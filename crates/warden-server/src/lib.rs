//! # warden-server
//!
//! axum binding of the Warden token core: login, refresh, logout and a few
//! protected endpoints guarded by the authentication and role middleware.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod users;

pub use config::{AppConfig, load_config};
pub use error::ApiError;
pub use router::build_router;
pub use state::AppState;
pub use users::InMemoryUserStore;
