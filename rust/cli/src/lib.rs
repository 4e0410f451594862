//! # Dobble CLI Library
//!
//! Command-line front end for the Dobble match server. It hosts matches,
//! joins them as a human or a bot, and inspects decks and action logs.
//!
//! ## Main Entry Point
//!
//! The primary entry point is the [`run`] function, which parses command-line arguments
//! and executes the appropriate subcommand.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::io;
//! let args = vec!["dobble", "serve", "--players", "2", "--port", "9000"];
//! let code = dobble_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `serve`: Host one match and print its outcome
//! - `join`: Connect to a server and play, interactively or with a bot
//! - `deal`: Deal a top card and player cards for inspection
//! - `cfg`: Display the resolved configuration
//! - `stats`: Aggregate statistics from action logs

use clap::Parser;
use std::io::Write;
pub mod cli;
mod commands;
mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
#[macro_use]
mod macros;
pub mod ui;
pub mod validation;

use cli::{Commands, DobbleCli};
use commands::{
    JoinOptions, ServeOptions, handle_cfg_command, handle_deal_command, handle_join_command,
    handle_serve_command, handle_stats_command,
};

pub use error::{BatchValidationError, CliError};

/// Main entry point for the CLI application.
///
/// Parses command-line arguments and dispatches to the appropriate subcommand handler.
///
/// # Arguments
///
/// * `args` - Iterator over command-line arguments (typically `std::env::args()`)
/// * `out` - Output stream for normal output (typically `stdout`)
/// * `err` - Output stream for error messages (typically `stderr`)
///
/// # Returns
///
/// Exit code: `0` for success, `2` for errors, `130` for interruptions
///
/// # Example
///
/// ```
/// use std::io;
/// let args = vec!["dobble", "deal", "--seed", "42"];
/// let code = dobble_cli::run(args, &mut io::stdout(), &mut io::stderr());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    const COMMANDS: &[&str] = &["serve", "join", "deal", "cfg", "stats"];
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match DobbleCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version go to stdout and succeed
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                if write!(out, "{}", e).is_err() {
                    return exit_code::ERROR;
                }
                return exit_code::SUCCESS;
            }
            write_or_exit!(err, "{}", e);
            write_or_exit!(err, "Dobble CLI");
            write_or_exit!(err, "Usage: dobble <command> [options]\n");
            write_or_exit!(err, "Commands:");
            for c in COMMANDS {
                write_or_exit!(err, "  {}", c);
            }
            write_or_exit!(err, "\nFor full help, run: dobble --help");
            return exit_code::ERROR;
        }
    };

    let result = match cli.cmd {
        Commands::Serve {
            host,
            port,
            players,
            seed,
            starting_cards,
            action_log,
            int_width,
            big_endian,
            log_format,
        } => handle_serve_command(
            ServeOptions {
                host,
                port,
                players,
                seed,
                starting_cards,
                action_log,
                int_width,
                big_endian,
                log_format,
            },
            out,
            err,
        ),
        Commands::Join {
            addr,
            name,
            bot,
            seed,
        } => {
            // Use stdin for real input (supports both TTY and piped stdin)
            let stdin = std::io::stdin();
            let mut stdin_lock = stdin.lock();
            handle_join_command(
                JoinOptions {
                    addr,
                    name,
                    bot,
                    seed,
                },
                out,
                err,
                &mut stdin_lock,
            )
        }
        Commands::Deal { seed, players } => handle_deal_command(seed, players, out),
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Stats { input } => handle_stats_command(input, out, err),
    };

    match result {
        Ok(()) => exit_code::SUCCESS,
        Err(CliError::Interrupted(msg)) => {
            let _ = ui::display_warning(err, &msg);
            exit_code::INTERRUPTED
        }
        Err(e) => {
            write_or_exit!(err, "Error: {}", e);
            exit_code::ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_args(args: &[&str]) -> (i32, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(args.iter().copied(), &mut out, &mut err);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn test_deal_dispatch() {
        let (code, out, _) = run_args(&["dobble", "deal", "--seed", "42", "--players", "3"]);
        assert_eq!(code, exit_code::SUCCESS);
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn test_help_goes_to_stdout() {
        let (code, out, err) = run_args(&["dobble", "--help"]);
        assert_eq!(code, exit_code::SUCCESS);
        assert!(out.contains("serve"));
        assert!(err.is_empty());
    }

    #[test]
    fn test_unknown_command_lists_commands() {
        let (code, out, err) = run_args(&["dobble", "shuffle"]);
        assert_eq!(code, exit_code::ERROR);
        assert!(out.is_empty());
        assert!(err.contains("Usage: dobble <command> [options]"));
        for c in ["serve", "join", "deal", "cfg", "stats"] {
            assert!(err.contains(&format!("  {c}")));
        }
    }

    #[test]
    fn test_handler_errors_map_to_exit_code_two() {
        let (code, _, err) = run_args(&["dobble", "stats", "--input", "/nonexistent/log.jsonl"]);
        assert_eq!(code, exit_code::ERROR);
        assert!(err.contains("Error: "));
    }

    #[test]
    fn test_serve_flags_parse() {
        let cli = DobbleCli::try_parse_from([
            "dobble",
            "serve",
            "--players",
            "2",
            "--int-width",
            "8",
            "--big-endian",
            "--log-format",
            "json",
        ])
        .unwrap();
        match cli.cmd {
            Commands::Serve {
                players,
                int_width,
                big_endian,
                log_format,
                ..
            } => {
                assert_eq!(players, Some(2));
                assert_eq!(int_width, Some(8));
                assert!(big_endian);
                assert_eq!(log_format, dobble_server::LogFormat::Json);
            }
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_log_format_is_a_usage_error() {
        let (code, _, err) = run_args(&["dobble", "serve", "--log-format", "xml"]);
        assert_eq!(code, exit_code::ERROR);
        assert!(err.contains("xml"));
    }
}
