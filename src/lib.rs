pub mod app;
pub mod auth;
pub mod comments;
pub mod config;
pub mod error;
pub mod state;

pub use app::{build_app, serve};
pub use config::AppConfig;
pub use state::AppState;
