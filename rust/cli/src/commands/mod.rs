//! Command handler modules for the dobble CLI.
//!
//! Each command lives in its own module with the same shape:
//!
//! - Public handler function: `pub fn handle_COMMAND_command(...) -> Result<(), CliError>`
//! - Output streams (`&mut dyn Write`) passed in, so tests capture them
//! - Errors propagated as [`CliError`](crate::CliError)
//!
//! `serve` and `join` build their own tokio runtime; the rest are synchronous.

mod cfg;
mod deal;
mod join;
mod serve;
mod stats;

pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use join::{JoinOptions, handle_join_command};
pub use serve::{ServeOptions, handle_serve_command};
pub use stats::handle_stats_command;

use crate::error::CliError;

/// Multi-threaded runtime for the networked commands.
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Io)
}
