//! Command-line surface of the `dobble` binary.

use clap::{Parser, Subcommand};
use dobble_server::LogFormat;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dobble")]
#[command(version, about = "Dobble match server and terminal client")]
pub struct DobbleCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Host one match and print its outcome as JSON
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Players to wait for before the match starts
        #[arg(long)]
        players: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        starting_cards: Option<u32>,
        /// Append every action to this JSONL file
        #[arg(long)]
        action_log: Option<PathBuf>,
        /// Wire integer width in bytes (4 or 8)
        #[arg(long)]
        int_width: Option<u8>,
        #[arg(long)]
        big_endian: bool,
        /// `text` or `json`
        #[arg(long, default_value = "text")]
        log_format: LogFormat,
    },
    /// Join a running server, interactively or with a bot
    Join {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: String,
        #[arg(long, default_value = "")]
        name: String,
        /// Let a bot play: baseline or random
        #[arg(long)]
        bot: Option<String>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Deal a top card and one card per player
    Deal {
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 2)]
        players: usize,
    },
    /// Show the resolved configuration and where each value came from
    Cfg,
    /// Summarize an action log file or a directory of them
    Stats {
        #[arg(long)]
        input: String,
    },
}
