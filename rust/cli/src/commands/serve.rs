//! Serve command handler.
//!
//! Resolves the layered configuration, starts a [`GameServer`] and blocks
//! until the match is over. The outcome is printed as JSON; progress goes to
//! `err` so `out` stays machine readable.

use crate::config::{FlagOverrides, load_with_sources};
use crate::error::CliError;
use crate::io_utils::ensure_parent_dir;
use crate::ui;
use dobble_server::protocol::{Endianness, IntWidth, WireFormat};
use dobble_server::{GameServer, LogFormat, MatchOutcome, ServerConfig, init_logging};
use std::io::Write;
use std::path::PathBuf;

/// Command-line values for `dobble serve`. `None` falls back to the
/// environment, the config file, then the defaults.
#[derive(Debug, Clone, Default)]
pub struct ServeOptions {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub players: Option<usize>,
    pub seed: Option<u64>,
    pub starting_cards: Option<u32>,
    pub action_log: Option<PathBuf>,
    /// Integer width in bytes (4 or 8)
    pub int_width: Option<u8>,
    pub big_endian: bool,
    pub log_format: LogFormat,
}

impl ServeOptions {
    fn wire_format(&self) -> Result<WireFormat, CliError> {
        let width = match self.int_width {
            None => IntWidth::default(),
            Some(bytes) => IntWidth::from_bytes(bytes).ok_or_else(|| {
                CliError::InvalidInput(format!("int width must be 4 or 8, got {bytes}"))
            })?,
        };
        let endianness = if self.big_endian {
            Endianness::Big
        } else {
            Endianness::Little
        };
        Ok(WireFormat::new(width, endianness))
    }
}

/// Runs one match to completion.
///
/// Returns [`CliError::Interrupted`] on Ctrl+C; the server is shut down and
/// every connection dropped before returning.
pub fn handle_serve_command(
    opts: ServeOptions,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let wire = opts.wire_format()?;
    let resolved = load_with_sources()?.apply_flags(FlagOverrides {
        host: opts.host.clone(),
        port: opts.port,
        players: opts.players,
        seed: opts.seed,
        starting_cards: opts.starting_cards,
    })?;
    let cfg = resolved.config;

    let mut server_config = ServerConfig::new(cfg.host.clone(), cfg.port)
        .with_players(cfg.players)
        .with_rules(cfg.rules())
        .with_wire_format(wire);
    if let Some(seed) = cfg.seed {
        server_config = server_config.with_seed(seed);
    }
    if let Some(path) = &opts.action_log {
        ensure_parent_dir(path).map_err(CliError::InvalidInput)?;
        server_config = server_config.with_action_log(path);
    }
    let server = GameServer::new(server_config)?;

    if !init_logging(opts.log_format) {
        ui::display_warning(err, "logging was already initialized")?;
    }

    let runtime = super::runtime()?;
    let outcome = runtime.block_on(run_until_over(server, cfg.players, err))?;

    let json = serde_json::to_string_pretty(&outcome)
        .map_err(|e| CliError::InvalidInput(format!("Failed to serialize outcome: {}", e)))?;
    writeln!(out, "{}", json)?;
    Ok(())
}

async fn run_until_over(
    server: GameServer,
    players: usize,
    err: &mut dyn Write,
) -> Result<MatchOutcome, CliError> {
    let handle = server.start().await?;
    ui::write_status(
        err,
        &format!("listening on {} for {} player(s)", handle.address(), players),
    )?;

    let wait = handle.wait();
    tokio::pin!(wait);
    tokio::select! {
        outcome = &mut wait => Ok(outcome?),
        _ = tokio::signal::ctrl_c() => {
            Err(CliError::Interrupted("server stopped by Ctrl+C".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format_from_options() {
        let opts = ServeOptions {
            int_width: Some(8),
            big_endian: true,
            ..ServeOptions::default()
        };
        assert_eq!(
            opts.wire_format().unwrap(),
            WireFormat::new(IntWidth::Eight, Endianness::Big)
        );
        assert_eq!(
            ServeOptions::default().wire_format().unwrap(),
            WireFormat::default()
        );
    }

    #[test]
    fn test_bad_int_width_is_rejected() {
        let opts = ServeOptions {
            int_width: Some(2),
            ..ServeOptions::default()
        };
        assert!(matches!(opts.wire_format(), Err(CliError::InvalidInput(_))));
    }
}
