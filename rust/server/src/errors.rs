//! Error types for every layer of the server.
//!
//! Game-rule violations never show up here: they are
//! [`ReturnCode`](dobble_engine::rules::ReturnCode)s sent back to the player.
//! These errors end a connection, a match, or a client.

use dobble_engine::errors::GameError;
use thiserror::Error;

/// Malformed or unexpected bytes on the wire.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported wire format: width byte {width}, endianness byte {endianness}")]
    BadHandshake { width: u8, endianness: u8 },
    #[error("unknown request tag {0}")]
    UnknownTag(i64),
    #[error("expected {expected} but received tag {found}")]
    UnexpectedTag { expected: &'static str, found: i64 },
    #[error("unknown return code {0}")]
    UnknownReturnCode(i64),
    #[error("invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: i64 },
}

/// The start barrier could not release a unit.
#[derive(Debug, Error)]
pub enum BarrierError {
    #[error("lobby closed with {arrived} of {expected} players")]
    Abandoned { arrived: usize, expected: usize },
    #[error("match was cancelled before it started")]
    Cancelled,
    #[error("failed to set up the match: {0}")]
    Setup(#[from] GameError),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session storage poisoned")]
    StoragePoisoned,
}

/// Ends a single player's connection; other players are unaffected.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Barrier(#[from] BarrierError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("outbound queue closed")]
    Closed,
    #[error("player fell too far behind the broadcasts")]
    Lagged,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Failed to open action log: {0}")]
    ActionLog(#[source] std::io::Error),
    #[error(transparent)]
    Barrier(#[from] BarrierError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("server was shut down before the match ended")]
    Shutdown,
    #[error("server task join error: {0}")]
    Join(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    Connect(#[from] std::io::Error),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("server closed the connection")]
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = ProtocolError::UnexpectedTag {
            expected: "END_REQUEST",
            found: 9,
        };
        assert_eq!(err.to_string(), "expected END_REQUEST but received tag 9");

        let err = BarrierError::Abandoned {
            arrived: 1,
            expected: 4,
        };
        assert_eq!(err.to_string(), "lobby closed with 1 of 4 players");
    }

    #[test]
    fn protocol_errors_convert_into_connection_errors() {
        let err: ConnectionError = ProtocolError::UnknownTag(42).into();
        assert!(matches!(
            err,
            ConnectionError::Protocol(ProtocolError::UnknownTag(42))
        ));
        assert_eq!(err.to_string(), "protocol violation: unknown request tag 42");
    }

    #[test]
    fn setup_errors_surface_through_the_barrier() {
        let err: ServerError = BarrierError::from(GameError::NoPlayers).into();
        assert!(err.to_string().contains("failed to set up the match"));
    }
}
