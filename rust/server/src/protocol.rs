//! Binary wire protocol.
//!
//! Every field is a signed integer of a fixed width (4 or 8 bytes) in a fixed
//! byte order. The server announces both in the first two bytes it sends:
//! the width in bytes, then `0` for little endian or `1` for big endian.
//! Player names travel as [`NAME_LEN`]-byte NUL-padded buffers.
//!
//! Client requests all end with an `END_REQUEST` tag:
//!
//! ```text
//! SEND_GAME_STATE END_REQUEST
//! MAKE_ACTION kind argument checksum END_REQUEST
//! FINISH_GAME END_REQUEST
//! ```
//!
//! Server messages:
//!
//! ```text
//! SEND_GAME_METADATA symbols_per_card player_id END_REQUEST
//! SEND_GAME_STATE symbols_per_card top_card[..] player_count
//!     (id name[32] card[..] cards_left
//!      swap_charges swap_cooldown freeze_charges freeze_cooldown
//!      reroll_charges reroll_cooldown frozen_count)* END_REQUEST
//! SEND_RETURN_CODE code
//! FINISH_GAME
//! ```

use dobble_engine::cards::{Card, Symbol};
use dobble_engine::game::{GameSnapshot, PlayerSnapshot};
use dobble_engine::player::{AbilityState, Action, PlayerId};
use dobble_engine::rules::ReturnCode;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::errors::ProtocolError;

/// Size of the fixed name buffer.
pub const NAME_LEN: usize = 32;

/// Upper bound for pre-allocating vectors from untrusted counts.
const MAX_PREALLOC: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntWidth {
    #[default]
    Four,
    Eight,
}

impl IntWidth {
    pub fn bytes(self) -> usize {
        match self {
            IntWidth::Four => 4,
            IntWidth::Eight => 8,
        }
    }

    pub fn from_bytes(bytes: u8) -> Option<Self> {
        match bytes {
            4 => Some(IntWidth::Four),
            8 => Some(IntWidth::Eight),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Integer width and byte order for one server run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WireFormat {
    pub width: IntWidth,
    pub endianness: Endianness,
}

impl WireFormat {
    pub fn new(width: IntWidth, endianness: Endianness) -> Self {
        Self { width, endianness }
    }

    /// The two bytes that open every connection.
    pub fn handshake(self) -> [u8; 2] {
        let order = match self.endianness {
            Endianness::Little => 0,
            Endianness::Big => 1,
        };
        [self.width.bytes() as u8, order]
    }

    pub fn from_handshake(bytes: [u8; 2]) -> Result<Self, ProtocolError> {
        let bad = || ProtocolError::BadHandshake {
            width: bytes[0],
            endianness: bytes[1],
        };
        let width = IntWidth::from_bytes(bytes[0]).ok_or_else(bad)?;
        let endianness = match bytes[1] {
            0 => Endianness::Little,
            1 => Endianness::Big,
            _ => return Err(bad()),
        };
        Ok(Self { width, endianness })
    }

    /// Appends `value`. With 4-byte integers, values outside `i32` saturate.
    pub fn put_int(self, out: &mut Vec<u8>, value: i64) {
        match self.width {
            IntWidth::Four => {
                let v = value.clamp(i32::MIN as i64, i32::MAX as i64) as i32;
                match self.endianness {
                    Endianness::Little => out.extend_from_slice(&v.to_le_bytes()),
                    Endianness::Big => out.extend_from_slice(&v.to_be_bytes()),
                }
            }
            IntWidth::Eight => match self.endianness {
                Endianness::Little => out.extend_from_slice(&value.to_le_bytes()),
                Endianness::Big => out.extend_from_slice(&value.to_be_bytes()),
            },
        }
    }

    /// Reads one integer from the first `width` bytes of `buf`.
    fn get_int(self, buf: &[u8; 8]) -> i64 {
        match self.width {
            IntWidth::Four => {
                let mut b = [0u8; 4];
                b.copy_from_slice(&buf[..4]);
                let v = match self.endianness {
                    Endianness::Little => i32::from_le_bytes(b),
                    Endianness::Big => i32::from_be_bytes(b),
                };
                v as i64
            }
            IntWidth::Eight => match self.endianness {
                Endianness::Little => i64::from_le_bytes(*buf),
                Endianness::Big => i64::from_be_bytes(*buf),
            },
        }
    }
}

/// Message tags shared by both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    SendGameState = 0,
    EndRequest = 1,
    SendGameMetadata = 2,
    MakeAction = 3,
    FinishGame = 4,
    SendReturnCode = 5,
}

impl Tag {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<Tag> {
        match code {
            0 => Some(Tag::SendGameState),
            1 => Some(Tag::EndRequest),
            2 => Some(Tag::SendGameMetadata),
            3 => Some(Tag::MakeAction),
            4 => Some(Tag::FinishGame),
            5 => Some(Tag::SendReturnCode),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::SendGameState => "SEND_GAME_STATE",
            Tag::EndRequest => "END_REQUEST",
            Tag::SendGameMetadata => "SEND_GAME_METADATA",
            Tag::MakeAction => "MAKE_ACTION",
            Tag::FinishGame => "FINISH_GAME",
            Tag::SendReturnCode => "SEND_RETURN_CODE",
        }
    }
}

/// Raw `MAKE_ACTION` payload. The checksum is carried for compatibility and
/// never checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionRequest {
    pub kind: i64,
    pub argument: i64,
    pub checksum: i64,
}

impl ActionRequest {
    /// `None` when the kind is unknown or the argument is out of range.
    pub fn action(&self) -> Option<Action> {
        Action::from_parts(self.kind, self.argument)
    }
}

/// A request decoded on the server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    GameState,
    MakeAction(ActionRequest),
    FinishGame,
}

/// A message decoded on the client side.
///
/// Game states carry no finish flag on the wire; a decoded
/// [`GameSnapshot`] always has `has_finished == false`, no winner and
/// `turn == 0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Metadata {
        symbols_per_card: u32,
        player_id: PlayerId,
    },
    GameState(GameSnapshot),
    ReturnCode(ReturnCode),
    FinishGame,
}

/// Builds one outbound message.
#[derive(Debug)]
pub struct Encoder {
    format: WireFormat,
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new(format: WireFormat) -> Self {
        Self {
            format,
            buf: Vec::with_capacity(64),
        }
    }

    pub fn tag(&mut self, tag: Tag) -> &mut Self {
        self.int(tag.code())
    }

    pub fn int(&mut self, value: i64) -> &mut Self {
        self.format.put_int(&mut self.buf, value);
        self
    }

    pub fn card(&mut self, card: &Card) -> &mut Self {
        for symbol in card.symbols() {
            self.int(symbol.id() as i64);
        }
        self
    }

    pub fn name(&mut self, name: &str) -> &mut Self {
        self.buf.extend_from_slice(&encode_name(name));
        self
    }

    pub fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buf)
    }
}

/// Pads `name` with NULs, truncating on a char boundary so at least one NUL
/// remains.
pub fn encode_name(name: &str) -> [u8; NAME_LEN] {
    let mut out = [0u8; NAME_LEN];
    let mut end = name.len().min(NAME_LEN - 1);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    out[..end].copy_from_slice(&name.as_bytes()[..end]);
    out
}

/// Text up to the first NUL, lossily decoded and trimmed.
pub fn decode_name(buf: &[u8]) -> String {
    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).trim().to_string()
}

pub fn encode_metadata(format: WireFormat, symbols_per_card: u32, player_id: PlayerId) -> Vec<u8> {
    Encoder::new(format)
        .tag(Tag::SendGameMetadata)
        .int(symbols_per_card as i64)
        .int(player_id as i64)
        .tag(Tag::EndRequest)
        .finish()
}

pub fn encode_state(format: WireFormat, snapshot: &GameSnapshot) -> Vec<u8> {
    let mut enc = Encoder::new(format);
    enc.tag(Tag::SendGameState)
        .int(snapshot.symbols_per_card as i64)
        .card(&snapshot.top_card)
        .int(snapshot.players.len() as i64);
    for p in &snapshot.players {
        enc.int(p.id as i64)
            .name(&p.name)
            .card(&p.card)
            .int(p.cards_in_hand_count as i64);
        for ability in [p.swap, p.freeze, p.reroll] {
            enc.int(ability.charges as i64).int(ability.cooldown as i64);
        }
        enc.int(p.is_frozen_count as i64);
    }
    enc.tag(Tag::EndRequest).finish()
}

pub fn encode_return_code(format: WireFormat, code: ReturnCode) -> Vec<u8> {
    Encoder::new(format)
        .tag(Tag::SendReturnCode)
        .int(code.code())
        .finish()
}

pub fn encode_finish(format: WireFormat) -> Vec<u8> {
    Encoder::new(format).tag(Tag::FinishGame).finish()
}

pub fn encode_action(format: WireFormat, action: &Action) -> Vec<u8> {
    Encoder::new(format)
        .tag(Tag::MakeAction)
        .int(action.kind().code())
        .int(action.argument())
        .int(0)
        .tag(Tag::EndRequest)
        .finish()
}

pub fn encode_state_request(format: WireFormat) -> Vec<u8> {
    Encoder::new(format)
        .tag(Tag::SendGameState)
        .tag(Tag::EndRequest)
        .finish()
}

pub fn encode_finish_request(format: WireFormat) -> Vec<u8> {
    Encoder::new(format)
        .tag(Tag::FinishGame)
        .tag(Tag::EndRequest)
        .finish()
}

/// Decodes messages from one side of a connection.
#[derive(Debug)]
pub struct FrameReader<R> {
    inner: R,
    format: WireFormat,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R, format: WireFormat) -> Self {
        Self { inner, format }
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    pub async fn read_int(&mut self) -> Result<i64, ProtocolError> {
        let mut buf = [0u8; 8];
        self.inner
            .read_exact(&mut buf[..self.format.width.bytes()])
            .await?;
        Ok(self.format.get_int(&buf))
    }

    /// Next tag, or `None` if the peer closed the stream between messages.
    async fn read_tag(&mut self) -> Result<Option<i64>, ProtocolError> {
        let mut buf = [0u8; 8];
        if self.inner.read(&mut buf[..1]).await? == 0 {
            return Ok(None);
        }
        self.inner
            .read_exact(&mut buf[1..self.format.width.bytes()])
            .await?;
        Ok(Some(self.format.get_int(&buf)))
    }

    async fn read_u32(&mut self, field: &'static str) -> Result<u32, ProtocolError> {
        let value = self.read_int().await?;
        u32::try_from(value).map_err(|_| ProtocolError::InvalidValue { field, value })
    }

    async fn expect_end(&mut self) -> Result<(), ProtocolError> {
        let found = self.read_int().await?;
        if found != Tag::EndRequest.code() {
            return Err(ProtocolError::UnexpectedTag {
                expected: Tag::EndRequest.as_str(),
                found,
            });
        }
        Ok(())
    }

    pub async fn read_name(&mut self) -> Result<String, ProtocolError> {
        let mut buf = [0u8; NAME_LEN];
        self.inner.read_exact(&mut buf).await?;
        Ok(decode_name(&buf))
    }

    async fn read_card(&mut self, len: u32) -> Result<Card, ProtocolError> {
        let mut symbols = Vec::with_capacity((len as usize).min(MAX_PREALLOC));
        for _ in 0..len {
            symbols.push(Symbol(self.read_u32("symbol").await?));
        }
        Card::new(symbols).ok_or(ProtocolError::InvalidValue {
            field: "card",
            value: len as i64,
        })
    }

    async fn read_ability(&mut self) -> Result<AbilityState, ProtocolError> {
        Ok(AbilityState {
            charges: self.read_u32("charges").await?,
            cooldown: self.read_u32("cooldown").await?,
        })
    }

    /// Server side: the next client request, `None` on a clean close.
    pub async fn read_request(&mut self) -> Result<Option<Request>, ProtocolError> {
        let Some(code) = self.read_tag().await? else {
            return Ok(None);
        };
        let request = match Tag::from_code(code) {
            Some(Tag::SendGameState) => Request::GameState,
            Some(Tag::MakeAction) => Request::MakeAction(ActionRequest {
                kind: self.read_int().await?,
                argument: self.read_int().await?,
                checksum: self.read_int().await?,
            }),
            Some(Tag::FinishGame) => Request::FinishGame,
            Some(_) => {
                return Err(ProtocolError::UnexpectedTag {
                    expected: "a request tag",
                    found: code,
                })
            }
            None => return Err(ProtocolError::UnknownTag(code)),
        };
        self.expect_end().await?;
        Ok(Some(request))
    }

    /// Client side: the next server message, `None` on a clean close.
    pub async fn read_server_message(&mut self) -> Result<Option<ServerMessage>, ProtocolError> {
        let Some(code) = self.read_tag().await? else {
            return Ok(None);
        };
        let message = match Tag::from_code(code) {
            Some(Tag::SendGameMetadata) => {
                let symbols_per_card = self.read_u32("symbols_per_card").await?;
                let player_id = self.read_u32("player_id").await?;
                self.expect_end().await?;
                ServerMessage::Metadata {
                    symbols_per_card,
                    player_id,
                }
            }
            Some(Tag::SendGameState) => ServerMessage::GameState(self.read_state().await?),
            Some(Tag::SendReturnCode) => {
                let value = self.read_int().await?;
                let code =
                    ReturnCode::from_code(value).ok_or(ProtocolError::UnknownReturnCode(value))?;
                ServerMessage::ReturnCode(code)
            }
            Some(Tag::FinishGame) => ServerMessage::FinishGame,
            Some(_) => {
                return Err(ProtocolError::UnexpectedTag {
                    expected: "a server message tag",
                    found: code,
                })
            }
            None => return Err(ProtocolError::UnknownTag(code)),
        };
        Ok(Some(message))
    }

    async fn read_state(&mut self) -> Result<GameSnapshot, ProtocolError> {
        let symbols_per_card = self.read_u32("symbols_per_card").await?;
        let top_card = self.read_card(symbols_per_card).await?;
        let count = self.read_u32("player count").await?;
        let mut players = Vec::with_capacity((count as usize).min(MAX_PREALLOC));
        for _ in 0..count {
            let id = self.read_u32("player_id").await?;
            let name = self.read_name().await?;
            let card = self.read_card(symbols_per_card).await?;
            let cards_in_hand_count = self.read_u32("cards_in_hand_count").await?;
            let swap = self.read_ability().await?;
            let freeze = self.read_ability().await?;
            let reroll = self.read_ability().await?;
            let is_frozen_count = self.read_u32("is_frozen_count").await?;
            players.push(PlayerSnapshot {
                id,
                name,
                card,
                cards_in_hand_count,
                swap,
                freeze,
                reroll,
                is_frozen_count,
            });
        }
        self.expect_end().await?;
        Ok(GameSnapshot {
            symbols_per_card,
            top_card,
            players,
            has_finished: false,
            winner: None,
            turn: 0,
        })
    }
}
