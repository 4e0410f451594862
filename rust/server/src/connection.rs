//! One unit per connected player: handshake, wait at the start barrier, then
//! serve requests until the match ends or the player leaves.

use std::sync::Arc;

use dobble_engine::player::{PlayerId, Seat};
use dobble_engine::rules::ReturnCode;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use crate::barrier::StartBarrier;
use crate::broadcaster::{Broadcaster, Frame, FrameReceiver, Subscription};
use crate::errors::{ConnectionError, ProtocolError};
use crate::protocol::{encode_metadata, encode_return_code, FrameReader, Request, WireFormat};
use crate::session::GameSession;

/// Why a connection ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disconnect {
    /// The match finished.
    MatchFinished,
    /// The player sent `FINISH_GAME`.
    PlayerFinished,
    /// The player closed the socket.
    PeerClosed,
}

pub struct ConnectionBroker {
    player_id: PlayerId,
    stream: TcpStream,
    wire: WireFormat,
    symbols_per_card: u32,
    barrier: StartBarrier<Arc<GameSession>>,
    broadcaster: Broadcaster,
}

impl ConnectionBroker {
    pub fn new(
        player_id: PlayerId,
        stream: TcpStream,
        wire: WireFormat,
        symbols_per_card: u32,
        barrier: StartBarrier<Arc<GameSession>>,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            player_id,
            stream,
            wire,
            symbols_per_card,
            barrier,
            broadcaster,
        }
    }

    pub async fn run(self) -> Result<Disconnect, ConnectionError> {
        let ConnectionBroker {
            player_id,
            stream,
            wire,
            symbols_per_card,
            barrier,
            broadcaster,
        } = self;
        let (read_half, mut write_half) = stream.into_split();
        let mut reader = FrameReader::new(read_half, wire);

        write_half.write_all(&wire.handshake()).await?;
        let mut name = reader.read_name().await?;
        if name.is_empty() {
            name = format!("Player {player_id}");
        }
        write_half
            .write_all(&encode_metadata(wire, symbols_per_card, player_id))
            .await?;
        tracing::info!(player_id, name = %name, "handshake complete");

        // subscribe before arriving so no broadcast after the release is missed
        let (subscription, outbound) = broadcaster.subscribe(player_id);
        let writer = spawn_writer(player_id, write_half, outbound);

        let result = match barrier.arrive(Seat::new(player_id, name)).await {
            Ok(session) => serve(player_id, &mut reader, &subscription, &session).await,
            Err(err) => Err(err.into()),
        };

        // dropping the subscription closes the queue; the writer flushes what
        // is left and closes the socket. An evicted player is not waited for.
        drop(subscription);
        if matches!(result, Err(ConnectionError::Lagged)) {
            writer.abort();
        }
        match writer.await {
            Err(err) if !err.is_cancelled() => {
                tracing::warn!(player_id, error = %err, "writer task failed");
            }
            _ => {}
        }
        drop(reader);

        match &result {
            Ok(reason) => tracing::info!(player_id, reason = ?reason, "connection closed"),
            Err(err) => tracing::warn!(player_id, error = %err, "connection dropped"),
        }
        result
    }
}

async fn serve<R>(
    player_id: PlayerId,
    reader: &mut FrameReader<R>,
    subscription: &Subscription,
    session: &GameSession,
) -> Result<Disconnect, ConnectionError>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let wire = session.wire_format();
    let mut finished = session.watch_finished();

    // let the client know the match has started
    session.send_state(subscription)?;

    loop {
        if *finished.borrow_and_update() {
            return Ok(Disconnect::MatchFinished);
        }
        let request = tokio::select! {
            changed = finished.changed() => {
                if changed.is_err() {
                    return Ok(Disconnect::MatchFinished);
                }
                continue;
            }
            _ = subscription.evicted() => return Err(ConnectionError::Lagged),
            request = reader.read_request() => request,
        };

        match request {
            Ok(Some(Request::GameState)) => session.send_state(subscription)?,
            Ok(Some(Request::MakeAction(raw))) => {
                let code = match raw.action() {
                    Some(action) => session.receive_action(player_id, action)?,
                    None => {
                        tracing::debug!(
                            player_id,
                            kind = raw.kind,
                            argument = raw.argument,
                            "malformed action"
                        );
                        ReturnCode::InvalidAction
                    }
                };
                push(subscription, Frame::from(encode_return_code(wire, code))).await?;
            }
            Ok(Some(Request::FinishGame)) => return Ok(Disconnect::PlayerFinished),
            Ok(None) => return Ok(Disconnect::PeerClosed),
            Err(err @ ProtocolError::Io(_)) => return Err(err.into()),
            Err(err) => {
                tracing::warn!(player_id, error = %err, "protocol violation");
                return Err(err.into());
            }
        }
    }
}

async fn push(subscription: &Subscription, frame: Frame) -> Result<(), ConnectionError> {
    tokio::select! {
        sent = subscription.send(frame) => sent.map_err(|_| ConnectionError::Closed),
        _ = subscription.evicted() => Err(ConnectionError::Lagged),
    }
}

/// Drains one player's outbound queue into the socket.
fn spawn_writer(
    player_id: PlayerId,
    mut socket: OwnedWriteHalf,
    mut outbound: FrameReceiver,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            if let Err(err) = socket.write_all(&frame).await {
                tracing::debug!(player_id, error = %err, "socket write failed");
                // stop accepting frames so senders notice
                outbound.close();
                return;
            }
        }
        let _ = socket.shutdown().await;
    })
}
