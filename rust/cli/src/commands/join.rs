//! # Join Command
//!
//! Connects to a running `dobble serve` and plays one match, either
//! interactively from `input` or with one of the bots from `dobble-ai`.
//!
//! Interactive input is read on the calling thread; network traffic runs on
//! a tokio runtime owned by the command. Every state the server pushes while
//! waiting for a reply is kept, so the board shown after an action is the
//! latest one the server has sent.

use crate::error::CliError;
use crate::formatters::{format_code, format_state};
use crate::io_utils::read_stdin_line;
use crate::ui;
use crate::validation::{ParseResult, parse_command};
use dobble_ai::create_bot;
use dobble_engine::game::GameSnapshot;
use dobble_engine::player::PlayerId;
use dobble_engine::rules::ReturnCode;
use dobble_server::{GameClient, ServerMessage};
use std::io::{BufRead, Write};
use tokio::runtime::Runtime;

/// Command-line values for `dobble join`.
#[derive(Debug, Clone)]
pub struct JoinOptions {
    /// `host:port` of the server
    pub addr: String,
    pub name: String,
    /// Bot kind; `None` plays interactively
    pub bot: Option<String>,
    /// Seed for randomized bots
    pub seed: Option<u64>,
}

/// Handle the join command.
///
/// # Returns
///
/// * `Ok(())` when the match finished or the player quit
/// * `Err(CliError::Network)` when the connection fails or the server drops it
/// * `Err(CliError::InvalidInput)` for an unknown bot kind
pub fn handle_join_command(
    opts: JoinOptions,
    out: &mut dyn Write,
    err: &mut dyn Write,
    input: &mut dyn BufRead,
) -> Result<(), CliError> {
    let bot = match &opts.bot {
        Some(kind) => Some(create_bot(kind, opts.seed).ok_or_else(|| {
            CliError::InvalidInput(format!(
                "unknown bot '{}' (expected one of: {})",
                kind,
                dobble_ai::BOT_KINDS.join(", ")
            ))
        })?),
        None => None,
    };

    let runtime = super::runtime()?;
    let client = runtime.block_on(GameClient::connect(opts.addr.as_str(), &opts.name))?;
    writeln!(
        out,
        "Joined {} as player {} ({} symbols per card)",
        opts.addr,
        client.player_id(),
        client.symbols_per_card()
    )?;
    ui::write_status(err, "waiting for the other players")?;

    match bot {
        Some(mut bot) => {
            let summary = runtime.block_on(
                client.play_until_finished(|state, me| bot.choose_action(state, me)),
            )?;
            writeln!(
                out,
                "{}: {} action(s) sent, {} accepted, {} rejected",
                bot.name(),
                summary.actions_sent,
                summary.successes,
                summary.rejections
            )?;
            if !summary.finished {
                return Err(CliError::Network(
                    "server closed the connection before the match finished".to_string(),
                ));
            }
            write_result(out, summary.final_state.as_ref(), summary.player_id)?;
            Ok(())
        }
        None => play_interactive(&runtime, client, out, err, input),
    }
}

enum Pumped {
    State,
    Code(ReturnCode),
    Finished,
}

/// Reads messages until a state arrives, or a return code when `until_code`
/// is set. States seen on the way replace `latest`.
fn pump(
    runtime: &Runtime,
    client: &mut GameClient,
    latest: &mut Option<GameSnapshot>,
    until_code: bool,
) -> Result<Pumped, CliError> {
    loop {
        match runtime.block_on(client.next_message())? {
            Some(ServerMessage::GameState(state)) => {
                *latest = Some(state);
                if !until_code {
                    return Ok(Pumped::State);
                }
            }
            Some(ServerMessage::ReturnCode(code)) => {
                if until_code {
                    return Ok(Pumped::Code(code));
                }
            }
            Some(ServerMessage::FinishGame) => return Ok(Pumped::Finished),
            Some(ServerMessage::Metadata { .. }) => {}
            None => {
                return Err(CliError::Network(
                    "server closed the connection".to_string(),
                ));
            }
        }
    }
}

fn play_interactive(
    runtime: &Runtime,
    mut client: GameClient,
    out: &mut dyn Write,
    err: &mut dyn Write,
    input: &mut dyn BufRead,
) -> Result<(), CliError> {
    let me = client.player_id();
    let mut latest = None;

    if let Pumped::Finished = pump(runtime, &mut client, &mut latest, false)? {
        return write_result(out, latest.as_ref(), me);
    }
    if let Some(state) = &latest {
        writeln!(out, "{}", format_state(state, me))?;
    }

    loop {
        write!(out, "Enter command (play <symbol>/swap <id>/freeze <id>/reroll/state/q): ")?;
        out.flush()?;

        let Some(line) = read_stdin_line(input) else {
            runtime.block_on(client.finish())?;
            writeln!(out, "Left the match.")?;
            return Ok(());
        };
        if line.is_empty() {
            continue;
        }

        let pumped = match parse_command(&line) {
            ParseResult::Quit => {
                runtime.block_on(client.finish())?;
                writeln!(out, "Left the match.")?;
                return Ok(());
            }
            ParseResult::Invalid(msg) => {
                ui::write_error(err, &msg)?;
                continue;
            }
            ParseResult::State => {
                runtime.block_on(client.request_state())?;
                pump(runtime, &mut client, &mut latest, false)?
            }
            ParseResult::Action(action) => {
                runtime.block_on(client.send_action(&action))?;
                pump(runtime, &mut client, &mut latest, true)?
            }
        };

        match pumped {
            Pumped::Finished => return write_result(out, latest.as_ref(), me),
            Pumped::Code(code) => writeln!(out, "{}", format_code(code))?,
            Pumped::State => {}
        }
        if let Some(state) = &latest {
            writeln!(out, "{}", format_state(state, me))?;
        }
    }
}

fn write_result(
    out: &mut dyn Write,
    last_state: Option<&GameSnapshot>,
    me: PlayerId,
) -> Result<(), CliError> {
    let winner = last_state.and_then(|state| {
        state
            .winner
            .and_then(|id| state.players.iter().find(|p| p.id == id))
            .or_else(|| state.players.iter().find(|p| p.cards_in_hand_count == 0))
    });
    match winner {
        Some(p) if p.id == me => writeln!(out, "Match over. You won!")?,
        Some(p) => writeln!(out, "Match over. Winner: #{} {}", p.id, p.name)?,
        None => writeln!(out, "Match over.")?,
    }
    Ok(())
}
