//! Statistics over action logs.
//!
//! Reads the JSONL action logs written by `dobble serve --action-log` and
//! reports how many actions each player sent, how many were accepted, which
//! return codes the rejected ones got, and who won.

use crate::error::{BatchValidationError, CliError};
use crate::io_utils::read_text;
use crate::ui;
use dobble_engine::logger::ActionRecord;
use dobble_engine::player::{ActionKind, PlayerId};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Default, Serialize)]
struct PlayerStats {
    actions: u64,
    successes: u64,
    cards_played: u64,
    rejections: u64,
    wins: u64,
}

#[derive(Debug, Default, Serialize)]
struct Summary {
    matches: u64,
    finished: u64,
    actions: u64,
    successes: u64,
    rejections: BTreeMap<String, u64>,
    players: BTreeMap<PlayerId, PlayerStats>,
}

#[derive(Default)]
struct StatsState {
    summary: Summary,
    skipped: u64,
    corrupted: Vec<BatchValidationError<String>>,
    out_of_order: u64,
}

/// Aggregates statistics from an action log file, or from every `.jsonl`
/// file under a directory (one file per match).
///
/// Malformed lines are skipped and reported on `err`. A file with nothing
/// but malformed lines is an error. Records numbered out of order produce
/// a warning and a failing exit code after the summary is printed.
pub fn handle_stats_command(
    input: String,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let path = Path::new(&input);
    let mut state = StatsState::default();

    if path.is_dir() {
        let mut stack = vec![path.to_path_buf()];
        while let Some(d) = stack.pop() {
            let rd = match std::fs::read_dir(&d) {
                Ok(v) => v,
                Err(_) => continue,
            };
            for e in rd.filter_map(Result::ok) {
                let p = e.path();
                if p.is_dir() {
                    stack.push(p);
                } else if p.extension().is_some_and(|ext| ext == "jsonl") {
                    match read_text(&p) {
                        Ok(content) => consume_log(&p.display().to_string(), &content, &mut state),
                        Err(e) => ui::write_error(err, &e)?,
                    }
                }
            }
        }
    } else {
        match read_text(path) {
            Ok(content) => consume_log(&input, &content, &mut state),
            Err(e) => {
                ui::write_error(err, &e)?;
                return Err(CliError::InvalidInput(e));
            }
        }
    }

    for problem in &state.corrupted {
        ui::write_error(err, &format!("Skipped corrupted record at {}", problem))?;
    }
    if state.skipped > 0 {
        ui::write_error(
            err,
            &format!("Discarded {} incomplete final line(s)", state.skipped),
        )?;
    }
    if !path.is_dir()
        && state.summary.actions == 0
        && (!state.corrupted.is_empty() || state.skipped > 0)
    {
        ui::write_error(err, "Invalid record")?;
        return Err(CliError::InvalidInput("Invalid record".to_string()));
    }
    if state.out_of_order > 0 {
        ui::display_warning(
            err,
            &format!("{} record(s) numbered out of order", state.out_of_order),
        )?;
    }

    let json_output = serde_json::to_string_pretty(&state.summary)
        .map_err(|e| CliError::InvalidInput(format!("Failed to serialize stats: {}", e)))?;
    writeln!(out, "{}", json_output)?;

    if state.out_of_order == 0 {
        Ok(())
    } else {
        Err(CliError::InvalidInput(
            "Action log validation failed".to_string(),
        ))
    }
}

fn consume_log(name: &str, content: &str, state: &mut StatsState) {
    let has_trailing_nl = content.ends_with('\n');
    let lines: Vec<(usize, &str)> = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .collect();

    let mut last_seq = 0u64;
    let mut counted = false;
    let mut winner = None;
    for (i, (line_no, line)) in lines.iter().enumerate() {
        let rec: ActionRecord = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                if i == lines.len() - 1 && !has_trailing_nl {
                    state.skipped += 1;
                } else {
                    state.corrupted.push(BatchValidationError {
                        item_context: format!("{}:{}", name, line_no + 1),
                        message: e.to_string(),
                    });
                }
                continue;
            }
        };

        if rec.seq <= last_seq {
            state.out_of_order += 1;
        }
        last_seq = rec.seq;
        counted = true;

        let summary = &mut state.summary;
        let player = summary.players.entry(rec.player_id).or_default();
        summary.actions += 1;
        player.actions += 1;
        if rec.code.is_success() {
            summary.successes += 1;
            player.successes += 1;
            if rec.action.kind() == ActionKind::PlayCard {
                player.cards_played += 1;
            }
            if rec.finished && winner.is_none() {
                winner = Some(rec.player_id);
            }
        } else {
            player.rejections += 1;
            *summary
                .rejections
                .entry(rec.code.as_str().to_string())
                .or_default() += 1;
        }
    }

    if counted {
        state.summary.matches += 1;
    }
    if let Some(id) = winner {
        state.summary.finished += 1;
        state.summary.players.entry(id).or_default().wins += 1;
    }
}
