//! Server lifecycle: launch and wait for readiness, stop and wait for removal.
//!
//! - `start`: launch request, then consume the progress stream until ready
//! - `stop`: stop request, then poll the user model until the server is gone
//! - `pacer`: injectable sleep used between stop polls

mod pacer;
mod start;
mod stop;

pub use pacer::{Pacer, TokioPacer};
pub use start::{LaunchState, launch_state, start_server};
pub use stop::{POLL_INTERVAL, StopStep, next_stop_step, stop_server, stop_server_with};
