//! Start barrier: holds every connection until the lobby is full, builds the
//! match exactly once, then releases everyone with the same value.

use dobble_engine::errors::GameError;
use dobble_engine::player::Seat;
use tokio::sync::{mpsc, oneshot};

use crate::errors::BarrierError;

struct Arrival<T> {
    seat: Seat,
    go: oneshot::Sender<T>,
}

/// Handle used by connection units to signal arrival.
pub struct StartBarrier<T> {
    arrivals: mpsc::Sender<Arrival<T>>,
}

impl<T> Clone for StartBarrier<T> {
    fn clone(&self) -> Self {
        Self {
            arrivals: self.arrivals.clone(),
        }
    }
}

/// Waits for all arrivals, builds the shared value and releases the units.
pub struct BarrierCoordinator<T> {
    expected: usize,
    arrivals: mpsc::Receiver<Arrival<T>>,
}

impl<T> StartBarrier<T> {
    pub fn new(expected: usize) -> (StartBarrier<T>, BarrierCoordinator<T>) {
        let (tx, rx) = mpsc::channel(expected.max(1));
        (
            StartBarrier { arrivals: tx },
            BarrierCoordinator {
                expected,
                arrivals: rx,
            },
        )
    }

    /// Signals arrival and waits for the go signal.
    ///
    /// Consumes the handle: once every handle has arrived or been dropped,
    /// the coordinator knows no more players are coming.
    pub async fn arrive(self, seat: Seat) -> Result<T, BarrierError> {
        let (go, released) = oneshot::channel();
        self.arrivals
            .send(Arrival { seat, go })
            .await
            .map_err(|_| BarrierError::Cancelled)?;
        drop(self);
        released.await.map_err(|_| BarrierError::Cancelled)
    }
}

impl<T: Clone> BarrierCoordinator<T> {
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Collects `expected` arrivals, calls `build` once with their seats in
    /// id order, and hands a clone of the result to every unit.
    ///
    /// Fails if every [`StartBarrier`] handle is dropped before the lobby
    /// fills, or if `build` fails; waiting units then see
    /// [`BarrierError::Cancelled`].
    pub async fn run<F>(mut self, build: F) -> Result<T, BarrierError>
    where
        F: FnOnce(Vec<Seat>) -> Result<T, GameError>,
    {
        let mut arrived = Vec::with_capacity(self.expected);
        while arrived.len() < self.expected {
            match self.arrivals.recv().await {
                Some(arrival) => {
                    tracing::info!(
                        player_id = arrival.seat.id,
                        name = %arrival.seat.name,
                        arrived = arrived.len() + 1,
                        expected = self.expected,
                        "player arrived at start barrier"
                    );
                    arrived.push(arrival);
                }
                None => {
                    return Err(BarrierError::Abandoned {
                        arrived: arrived.len(),
                        expected: self.expected,
                    })
                }
            }
        }
        // late arrivals are refused
        self.arrivals.close();

        arrived.sort_by_key(|a| a.seat.id);
        let seats = arrived.iter().map(|a| a.seat.clone()).collect();
        let value = build(seats)?;

        for arrival in arrived {
            if arrival.go.send(value.clone()).is_err() {
                tracing::warn!(
                    player_id = arrival.seat.id,
                    "player left before the match started"
                );
            }
        }
        tracing::info!(players = self.expected, "start barrier released");
        Ok(value)
    }
}
