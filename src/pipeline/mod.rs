//! Pipeline entry points for rate planning operations.
//!
//! - `run_channels`: Summarize channel classes and catalog sizes
//! - `run_resolve`: Resolve the negotiated rates of one channel
//! - `run_replay`: Replay a recorded event script
//! - `run_validate`: Check the configuration

pub mod channels;
pub mod replay;
pub mod report;
pub mod resolve;
pub mod validate;

pub use channels::{ChannelSummary, run_channels};
pub use replay::{ReplayScript, ReplaySummary, run_replay};
pub use report::render_table;
pub use resolve::{ResolveRequest, run_resolve};
pub use validate::run_validate;
