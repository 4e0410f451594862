//! Parsing of interactive client commands.
//!
//! The `join` command reads one command per line:
//!
//! | input | meaning |
//! |-------|---------|
//! | `play <symbol>` / `p <symbol>` | play a symbol from your card |
//! | `swap <player>` | swap cards with another player |
//! | `freeze <player>` | freeze another player |
//! | `reroll` / `r` | replace your card |
//! | `state` / `s` | ask for the current state |
//! | `quit` / `q` | leave the match |

use dobble_engine::cards::Symbol;
use dobble_engine::player::Action;

/// Result of parsing one line of interactive input.
#[derive(Debug, PartialEq)]
pub enum ParseResult {
    /// Send this action to the server
    Action(Action),
    /// Request a fresh state
    State,
    /// User entered quit command (q or quit)
    Quit,
    /// Invalid input with error message
    Invalid(String),
}

/// Parses one line of interactive input (case-insensitive).
///
/// # Example
///
/// ```rust
/// # use dobble_cli::validation::{parse_command, ParseResult};
/// use dobble_engine::cards::Symbol;
/// use dobble_engine::player::Action;
///
/// assert_eq!(
///     parse_command("play 12"),
///     ParseResult::Action(Action::PlayCard { symbol: Symbol(12) })
/// );
/// assert_eq!(parse_command("FREEZE 2"), ParseResult::Action(Action::Freeze { target: 2 }));
/// assert_eq!(parse_command("q"), ParseResult::Quit);
///
/// match parse_command("fold") {
///     ParseResult::Invalid(msg) => assert!(msg.contains("Unrecognized")),
///     _ => panic!("Expected Invalid"),
/// }
/// ```
pub fn parse_command(input: &str) -> ParseResult {
    let input = input.trim().to_lowercase();
    let parts: Vec<&str> = input.split_whitespace().collect();

    let Some(&command) = parts.first() else {
        return ParseResult::Invalid("Empty input".to_string());
    };
    let argument = |what: &str| -> Result<u32, String> {
        let raw = parts
            .get(1)
            .ok_or_else(|| format!("'{command}' requires a {what} (e.g., '{command} 3')"))?;
        raw.parse::<u32>()
            .map_err(|_| format!("Invalid {what}: {raw}"))
    };

    let parsed = match command {
        "q" | "quit" => return ParseResult::Quit,
        "s" | "state" => return ParseResult::State,
        "r" | "reroll" => return ParseResult::Action(Action::Reroll),
        "p" | "play" => argument("symbol").map(|v| Action::PlayCard { symbol: Symbol(v) }),
        "swap" => argument("player id").map(|target| Action::Swap { target }),
        "freeze" => argument("player id").map(|target| Action::Freeze { target }),
        other => {
            return ParseResult::Invalid(format!(
                "Unrecognized command '{other}'. Valid commands: play <symbol>, swap <player>, freeze <player>, reroll, state, quit"
            ));
        }
    };
    match parsed {
        Ok(action) => ParseResult::Action(action),
        Err(msg) => ParseResult::Invalid(msg),
    }
}
