//! Client side of the wire protocol, used by the terminal client, the bots
//! and the integration tests.

use dobble_engine::game::GameSnapshot;
use dobble_engine::player::{Action, PlayerId};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::{ClientError, ProtocolError};
use crate::protocol::{
    encode_action, encode_finish_request, encode_name, encode_state_request, FrameReader,
    ServerMessage, WireFormat,
};

const INBOUND_BUFFER: usize = 64;

/// What happened during [`GameClient::play_until_finished`].
#[derive(Debug, Clone)]
pub struct ClientSummary {
    pub player_id: PlayerId,
    pub actions_sent: u64,
    pub successes: u64,
    pub rejections: u64,
    /// `false` when the server closed the connection without `FINISH_GAME`
    pub finished: bool,
    pub final_state: Option<GameSnapshot>,
}

impl ClientSummary {
    pub fn won(&self) -> bool {
        self.final_state
            .as_ref()
            .and_then(|state| state.winner)
            .is_some_and(|winner| winner == self.player_id)
    }
}

pub struct GameClient {
    player_id: PlayerId,
    symbols_per_card: u32,
    wire: WireFormat,
    writer: OwnedWriteHalf,
    inbound: mpsc::Receiver<Result<ServerMessage, ProtocolError>>,
    reader: JoinHandle<()>,
}

impl std::fmt::Debug for GameClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameClient")
            .field("player_id", &self.player_id)
            .field("symbols_per_card", &self.symbols_per_card)
            .field("wire", &self.wire)
            .finish()
    }
}

impl GameClient {
    /// Connects, sends `name` and waits for the game metadata.
    pub async fn connect<A: ToSocketAddrs>(addr: A, name: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect(addr).await?;
        let (mut read_half, mut writer) = stream.into_split();

        let mut handshake = [0u8; 2];
        read_half
            .read_exact(&mut handshake)
            .await
            .map_err(|err| ClientError::Handshake(err.to_string()))?;
        let wire = WireFormat::from_handshake(handshake)?;
        writer.write_all(&encode_name(name)).await?;

        let mut reader = FrameReader::new(read_half, wire);
        let (symbols_per_card, player_id) = match reader.read_server_message().await? {
            Some(ServerMessage::Metadata {
                symbols_per_card,
                player_id,
            }) => (symbols_per_card, player_id),
            Some(other) => {
                return Err(ClientError::Handshake(format!(
                    "expected game metadata, received {other:?}"
                )))
            }
            None => return Err(ClientError::Disconnected),
        };
        tracing::debug!(player_id, symbols_per_card, "joined match");

        let (tx, inbound) = mpsc::channel(INBOUND_BUFFER);
        let reader = tokio::spawn(async move {
            loop {
                let message = match reader.read_server_message().await {
                    Ok(Some(message)) => Ok(message),
                    Ok(None) => break,
                    Err(err) => Err(err),
                };
                let failed = message.is_err();
                if tx.send(message).await.is_err() || failed {
                    break;
                }
            }
        });

        Ok(Self {
            player_id,
            symbols_per_card,
            wire,
            writer,
            inbound,
            reader,
        })
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn symbols_per_card(&self) -> u32 {
        self.symbols_per_card
    }

    pub fn wire_format(&self) -> WireFormat {
        self.wire
    }

    pub async fn request_state(&mut self) -> Result<(), ClientError> {
        self.writer
            .write_all(&encode_state_request(self.wire))
            .await?;
        Ok(())
    }

    pub async fn send_action(&mut self, action: &Action) -> Result<(), ClientError> {
        self.writer
            .write_all(&encode_action(self.wire, action))
            .await?;
        Ok(())
    }

    /// Tells the server this player is leaving.
    pub async fn finish(&mut self) -> Result<(), ClientError> {
        self.writer
            .write_all(&encode_finish_request(self.wire))
            .await?;
        Ok(())
    }

    /// Next decoded message; `None` once the server has closed the connection.
    pub async fn next_message(&mut self) -> Result<Option<ServerMessage>, ClientError> {
        match self.inbound.recv().await {
            Some(message) => Ok(Some(message?)),
            None => Ok(None),
        }
    }

    /// Lets `decide` pick actions until the match ends.
    ///
    /// `decide` is only consulted for a state it has not seen yet and while
    /// no earlier action is awaiting its return code. A rejected action
    /// triggers a state request so the next decision starts from fresh data.
    pub async fn play_until_finished<F>(mut self, mut decide: F) -> Result<ClientSummary, ClientError>
    where
        F: FnMut(&GameSnapshot, PlayerId) -> Option<Action>,
    {
        let mut summary = ClientSummary {
            player_id: self.player_id,
            actions_sent: 0,
            successes: 0,
            rejections: 0,
            finished: false,
            final_state: None,
        };
        let mut fresh = false;
        let mut in_flight = false;

        loop {
            if fresh && !in_flight {
                fresh = false;
                if let Some(state) = &summary.final_state {
                    if let Some(action) = decide(state, self.player_id) {
                        self.send_action(&action).await?;
                        summary.actions_sent += 1;
                        in_flight = true;
                    }
                }
            }

            match self.next_message().await? {
                Some(ServerMessage::GameState(state)) => {
                    summary.final_state = Some(state);
                    fresh = true;
                }
                Some(ServerMessage::ReturnCode(code)) => {
                    in_flight = false;
                    if code.is_success() {
                        summary.successes += 1;
                    } else {
                        summary.rejections += 1;
                        tracing::debug!(player_id = self.player_id, code = %code, "action rejected");
                        self.request_state().await?;
                    }
                }
                Some(ServerMessage::FinishGame) => {
                    summary.finished = true;
                    if let Some(state) = summary.final_state.as_mut() {
                        state.has_finished = true;
                        state.winner = state
                            .players
                            .iter()
                            .find(|p| p.cards_in_hand_count == 0)
                            .map(|p| p.id);
                    }
                    return Ok(summary);
                }
                Some(ServerMessage::Metadata { .. }) => {}
                None => return Ok(summary),
            }
        }
    }
}

impl Drop for GameClient {
    fn drop(&mut self) {
        self.reader.abort();
    }
}
