//! Core hubctl library: configuration, hub session, progress-stream decoding,
//! server start/stop orchestration and workspace calls.

pub mod config;
pub mod error;
pub mod events;
pub mod interrupt;
pub mod models;
pub mod server;
pub mod session;
pub mod workspace;

pub use config::HubConfig;
pub use error::{HubError, HubErrorKind, HubResult};
pub use session::Session;
