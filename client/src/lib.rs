//! Client engine for a shared pixel canvas: viewport math, a placement
//! cooldown, polling with stale-result suppression, and session handling.

pub mod api;
pub mod app;
pub mod command;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod http;
pub mod placement;
pub mod session;
pub mod sink;
pub mod store;
pub mod sync;
pub mod terminal;
pub mod time_format;
pub mod viewport;

#[cfg(test)]
mod testing;

pub use api::{CanvasApi, Credentials};
pub use app::App;
pub use command::Command;
pub use config::Config;
pub use error::{ClientError, Result};
pub use http::HttpApi;
pub use placement::{PlaceOutcome, PlacementController};
pub use session::{Identity, SessionState};
pub use sink::PresentationSink;
pub use sync::SyncScheduler;
pub use viewport::Viewport;
