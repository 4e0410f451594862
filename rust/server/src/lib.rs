//! # dobble-server: Networked Match Host
//!
//! Runs one symbol-matching match over TCP. Players connect, exchange a
//! short handshake, wait at a start barrier until the lobby is full, then
//! race to play cards. Every accepted action is applied under one lock and
//! the new state is broadcast to every player.
//!
//! - [`protocol`] - fixed-width integer wire codec
//! - [`barrier`] - start barrier releasing all players at once
//! - [`broadcaster`] - per-player outbound queues
//! - [`session`] - the shared match behind its lock
//! - [`action_log`] - action log writer thread
//! - [`connection`] - one task per connected player
//! - [`server`] - listener, accept loop and match lifecycle
//! - [`client`] - client side of the protocol

pub mod action_log;
pub mod barrier;
pub mod broadcaster;
pub mod client;
pub mod connection;
pub mod errors;
pub mod logging;
pub mod protocol;
pub mod server;
pub mod session;

pub use barrier::{BarrierCoordinator, StartBarrier};
pub use broadcaster::{Broadcaster, Frame, Subscription};
pub use client::{ClientSummary, GameClient};
pub use connection::{ConnectionBroker, Disconnect};
pub use errors::{
    BarrierError, ClientError, ConnectionError, ProtocolError, ServerError, SessionError,
};
pub use logging::{init_logging, init_test_logging, LogEntry, LogFormat, TestLogSubscriber};
pub use protocol::{Endianness, FrameReader, IntWidth, Request, ServerMessage, WireFormat};
pub use server::{GameServer, ServerConfig, ServerHandle};
pub use session::{GameSession, MatchOutcome, Standing};
