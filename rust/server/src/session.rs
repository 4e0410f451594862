use crate::action_log::ActionLog;
use crate::broadcaster::{Broadcaster, Frame, Subscription};
use crate::errors::{ConnectionError, SessionError};
use crate::protocol::{encode_finish, encode_state, WireFormat};
use dobble_engine::engine::GameEngine;
use dobble_engine::errors::GameError;
use dobble_engine::game::GameSnapshot;
use dobble_engine::player::{Action, PlayerId, Seat};
use dobble_engine::rules::{GameRules, ReturnCode};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::watch;

/// Where one player stood when the match ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub id: PlayerId,
    pub name: String,
    pub cards_in_hand_count: u32,
}

/// Summary of a match, produced once every connection has ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub finished: bool,
    pub winner: Option<PlayerId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner_name: Option<String>,
    /// Successful card plays
    pub turns: u64,
    /// Every action received, rejected ones included
    pub actions: u64,
    pub standings: Vec<Standing>,
}

struct MatchState {
    engine: GameEngine,
    log: ActionLog,
}

/// The running match: one engine behind one lock, plus the broadcaster that
/// publishes every successful change.
///
/// Applying an action, logging it and broadcasting the new state happen under
/// the same lock, so every player receives fully applied states in the order
/// the actions were accepted. States sent to a single player are queued under
/// that lock too, so no player sees an older state after a newer one.
pub struct GameSession {
    state: Mutex<MatchState>,
    broadcaster: Broadcaster,
    wire: WireFormat,
    symbols_per_card: u32,
    finished: watch::Sender<bool>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("wire", &self.wire)
            .field("symbols_per_card", &self.symbols_per_card)
            .field("finished", &*self.finished.borrow())
            .finish()
    }
}

impl GameSession {
    pub fn new(
        seats: Vec<Seat>,
        rules: GameRules,
        seed: Option<u64>,
        log: ActionLog,
        broadcaster: Broadcaster,
        wire: WireFormat,
    ) -> Result<Self, GameError> {
        let symbols_per_card = rules.symbols_per_card;
        let engine = GameEngine::new(seats, rules, seed)?;
        tracing::info!(
            players = engine.players().len(),
            top_card = %engine.top_card(),
            "match initialized"
        );
        let (finished, _) = watch::channel(false);
        Ok(Self {
            state: Mutex::new(MatchState { engine, log }),
            broadcaster,
            wire,
            symbols_per_card,
            finished,
        })
    }

    pub fn wire_format(&self) -> WireFormat {
        self.wire
    }

    pub fn symbols_per_card(&self) -> u32 {
        self.symbols_per_card
    }

    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    fn lock(&self) -> Result<MutexGuard<'_, MatchState>, SessionError> {
        self.state.lock().map_err(|_| SessionError::StoragePoisoned)
    }

    /// Applies `action` for `player_id` and returns the result code.
    ///
    /// On success every subscriber receives the new state. When that action
    /// ends the match, subscribers also receive `FINISH_GAME`, the
    /// broadcaster is closed and [`GameSession::watch_finished`] flips.
    pub fn receive_action(
        &self,
        player_id: PlayerId,
        action: Action,
    ) -> Result<ReturnCode, SessionError> {
        let mut state = self.lock()?;
        let code = state.engine.apply_action(player_id, action);
        let finished = state.engine.has_finished();

        state.log.record(player_id, action, code, finished);
        tracing::info!(
            player_id,
            kind = ?action.kind(),
            argument = action.argument(),
            code = %code,
            "action applied"
        );

        if code.is_success() {
            let frame = Frame::from(encode_state(self.wire, &state.engine.snapshot()));
            let delivered = self.broadcaster.broadcast(frame);
            tracing::debug!(delivered, turn = state.engine.turn(), "state broadcast");

            if finished {
                self.broadcaster
                    .broadcast(Frame::from(encode_finish(self.wire)));
                self.broadcaster.close_all();
                self.finished.send_replace(true);
                tracing::info!(
                    winner = ?state.engine.winner(),
                    turns = state.engine.turn(),
                    "match finished"
                );
            }
        }
        Ok(code)
    }

    pub fn snapshot(&self) -> Result<GameSnapshot, SessionError> {
        Ok(self.lock()?.engine.snapshot())
    }

    /// Queues the current state for one player without releasing the lock
    /// in between, so it lands in that player's queue in the same order as
    /// the broadcasts. A full queue evicts the player.
    pub fn send_state(&self, subscription: &Subscription) -> Result<(), ConnectionError> {
        let state = self.lock()?;
        let frame = Frame::from(encode_state(self.wire, &state.engine.snapshot()));
        match subscription.try_send(frame) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(ConnectionError::Lagged),
            Err(TrySendError::Closed(_)) => Err(ConnectionError::Closed),
        }
    }

    pub fn is_finished(&self) -> bool {
        *self.finished.borrow()
    }

    /// Receiver that observes `true` once the match has a winner.
    pub fn watch_finished(&self) -> watch::Receiver<bool> {
        self.finished.subscribe()
    }

    /// Stops logging and waits until every record so far is on disk.
    pub async fn close_action_log(&self) -> Result<(), SessionError> {
        let writer = self.lock()?.log.close();
        if let Some(writer) = writer {
            match tokio::task::spawn_blocking(move || writer.join()).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => tracing::warn!("action log writer panicked"),
                Err(err) => tracing::warn!(error = %err, "failed to wait for the action log"),
            }
        }
        Ok(())
    }

    pub fn outcome(&self) -> Result<MatchOutcome, SessionError> {
        let state = self.lock()?;
        let engine = &state.engine;
        let winner = engine.winner();
        Ok(MatchOutcome {
            finished: engine.has_finished(),
            winner,
            winner_name: winner
                .and_then(|id| engine.player(id))
                .map(|p| p.name().to_string()),
            turns: engine.turn(),
            actions: state.log.count(),
            standings: engine
                .players()
                .iter()
                .map(|p| Standing {
                    id: p.id(),
                    name: p.name().to_string(),
                    cards_in_hand_count: p.cards_in_hand_count(),
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcaster::OUTBOUND_BUFFER;
    use crate::protocol::{FrameReader, ServerMessage};
    use dobble_engine::logger::MatchLogger;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn session(players: u32, rules: GameRules, log: ActionLog) -> (GameSession, Broadcaster) {
        let seats = (0..players).map(|i| Seat::new(i, format!("p{i}"))).collect();
        let broadcaster = Broadcaster::new();
        let session = GameSession::new(
            seats,
            rules,
            Some(31),
            log,
            broadcaster.clone(),
            WireFormat::default(),
        )
        .expect("session");
        (session, broadcaster)
    }

    async fn decode(frame: &Frame) -> ServerMessage {
        FrameReader::new(&frame[..], WireFormat::default())
            .read_server_message()
            .await
            .expect("decodes")
            .expect("one message")
    }

    fn play(session: &GameSession, id: PlayerId) -> ReturnCode {
        let symbol = session.snapshot().unwrap().playable_symbol(id).unwrap();
        session
            .receive_action(id, Action::PlayCard { symbol })
            .unwrap()
    }

    #[tokio::test]
    async fn success_is_broadcast_to_everyone() {
        let (session, bus) = session(3, GameRules::default(), ActionLog::disabled());
        let mut receivers: Vec<_> = (0..3).map(|id| bus.subscribe(id)).collect();

        assert_eq!(play(&session, 1), ReturnCode::Success);

        let expected = session.snapshot().unwrap();
        for (_, rx) in receivers.iter_mut() {
            let frame = rx.try_recv().expect("state frame");
            match decode(&frame).await {
                ServerMessage::GameState(state) => {
                    assert_eq!(state.top_card, expected.top_card);
                    assert_eq!(state.players, expected.players);
                }
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn rejections_are_not_broadcast() {
        let (session, bus) = session(2, GameRules::default(), ActionLog::disabled());
        let (_sub, mut rx) = bus.subscribe(0);
        assert_eq!(
            session.receive_action(0, Action::Reroll).unwrap(),
            ReturnCode::CooldownActive
        );
        assert_eq!(
            session.receive_action(9, Action::Reroll).unwrap(),
            ReturnCode::PlayerNotFound
        );
        assert!(rx.try_recv().is_err());
        assert!(!session.is_finished());
    }

    #[tokio::test]
    async fn winning_play_sends_finish_and_closes_broadcasts() {
        let rules = GameRules {
            starting_cards: 1,
            ..GameRules::default()
        };
        let (session, bus) = session(2, rules, ActionLog::disabled());
        let (_a, mut rx_a) = bus.subscribe(0);
        let (_b, mut rx_b) = bus.subscribe(1);
        let mut finished = session.watch_finished();

        assert_eq!(play(&session, 0), ReturnCode::Success);

        for rx in [&mut rx_a, &mut rx_b] {
            let state = rx.try_recv().unwrap();
            assert!(matches!(decode(&state).await, ServerMessage::GameState(_)));
            let finish = rx.try_recv().unwrap();
            assert_eq!(decode(&finish).await, ServerMessage::FinishGame);
        }
        assert_eq!(bus.subscriber_count(), 0);
        finished.changed().await.unwrap();
        assert!(*finished.borrow());

        // nothing is accepted afterwards
        assert_eq!(
            session.receive_action(1, Action::Reroll).unwrap(),
            ReturnCode::InvalidAction
        );

        let outcome = session.outcome().unwrap();
        assert!(outcome.finished);
        assert_eq!(outcome.winner, Some(0));
        assert_eq!(outcome.winner_name.as_deref(), Some("p0"));
        assert_eq!(outcome.turns, 1);
        assert_eq!(outcome.actions, 2);
        assert_eq!(outcome.standings[0].cards_in_hand_count, 0);
    }

    #[tokio::test]
    async fn every_action_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let log = ActionLog::spawn(MatchLogger::create(&path).unwrap()).unwrap();
        let (session, _bus) = session(2, GameRules::default(), log);

        play(&session, 0);
        session.receive_action(1, Action::Reroll).unwrap();
        session.close_action_log().await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"code\":\"success\""));
        assert!(lines[1].contains("\"code\":\"cooldown_active\""));
    }

    #[test]
    fn concurrent_actions_are_serialized() {
        let (session, bus) = session(4, GameRules::default(), ActionLog::disabled());
        let (_sub, mut rx) = bus.subscribe(0);
        let session = Arc::new(session);

        let handles: Vec<_> = (0..4u32)
            .map(|id| {
                let session = Arc::clone(&session);
                thread::spawn(move || {
                    let mut successes = 0u64;
                    for _ in 0..5 {
                        let Some(symbol) = session.snapshot().unwrap().playable_symbol(id) else {
                            continue;
                        };
                        let code = session
                            .receive_action(id, Action::PlayCard { symbol })
                            .unwrap();
                        if code.is_success() {
                            successes += 1;
                        }
                    }
                    successes
                })
            })
            .collect();
        let successes: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();

        let outcome = session.outcome().unwrap();
        assert_eq!(outcome.turns, successes);
        let mut broadcasts = 0;
        while rx.try_recv().is_ok() {
            broadcasts += 1;
        }
        assert_eq!(broadcasts, successes);
    }

    fn hand_total(state: &GameSnapshot) -> u32 {
        state.players.iter().map(|p| p.cards_in_hand_count).sum()
    }

    #[test]
    fn requested_states_never_overtake_broadcasts() {
        let rules = GameRules {
            starting_cards: 40,
            ..GameRules::default()
        };
        let (session, bus) = session(2, rules, ActionLog::disabled());
        let (sub, mut rx) = bus.subscribe(0);
        let session = Arc::new(session);
        let drained = Arc::new(AtomicUsize::new(0));

        let drainer = {
            let drained = Arc::clone(&drained);
            thread::spawn(move || {
                let mut frames = Vec::new();
                while let Some(frame) = rx.blocking_recv() {
                    frames.push(frame);
                    drained.fetch_add(1, Ordering::AcqRel);
                }
                frames
            })
        };
        let requester = {
            let session = Arc::clone(&session);
            let drained = Arc::clone(&drained);
            thread::spawn(move || {
                for sent in 0..3000 {
                    // leave room for the broadcasts
                    while sent > drained.load(Ordering::Acquire) + OUTBOUND_BUFFER / 2 {
                        thread::yield_now();
                    }
                    session.send_state(&sub).unwrap();
                }
                assert!(!sub.is_evicted());
            })
        };
        let players = {
            let session = Arc::clone(&session);
            thread::spawn(move || {
                while !session.is_finished() {
                    for id in 0..2 {
                        play(&session, id);
                        thread::yield_now();
                    }
                }
            })
        };

        players.join().unwrap();
        requester.join().unwrap();
        // the match is over, so the broadcaster no longer holds the queue
        let frames = drainer.join().unwrap();
        assert!(frames.len() > 3000);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let mut previous = u32::MAX;
        for frame in &frames {
            match runtime.block_on(decode(frame)) {
                ServerMessage::GameState(state) => {
                    let total = hand_total(&state);
                    assert!(total <= previous, "{total} cards after {previous}");
                    previous = total;
                }
                ServerMessage::FinishGame => {}
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn a_full_queue_evicts_on_the_next_state() {
        let (session, bus) = session(2, GameRules::default(), ActionLog::disabled());
        let (sub, mut rx) = bus.subscribe(0);

        for _ in 0..OUTBOUND_BUFFER {
            session.send_state(&sub).unwrap();
        }
        assert!(matches!(
            session.send_state(&sub),
            Err(ConnectionError::Lagged)
        ));
        assert!(sub.is_evicted());
        assert_eq!(bus.subscriber_count(), 0);

        drop(sub);
        let mut queued = 0;
        while rx.recv().await.is_some() {
            queued += 1;
        }
        assert_eq!(queued, OUTBOUND_BUFFER);
    }
}
