//! HTTP gateway for the ShortLink URL shortener.
//!
//! Translates HTTP requests into [`Shortener`](shortlink_core::Shortener)
//! calls and renders JSON responses. The gateway validates URLs before the
//! store is touched and never builds short codes itself.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod telemetry;

pub use app::App;
pub use state::AppState;
