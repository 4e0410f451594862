use dobble_engine::player::PlayerId;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{mpsc, Notify};

/// Per-connection outbound queue length. A player that falls this far behind
/// is evicted and their connection closed.
pub const OUTBOUND_BUFFER: usize = 256;

/// One encoded message, shared between every queue it is pushed to.
pub type Frame = Arc<[u8]>;

pub type FrameSender = mpsc::Sender<Frame>;
pub type FrameReceiver = mpsc::Receiver<Frame>;

/// Set once a subscriber's queue overflowed or closed.
#[derive(Debug, Default)]
struct Eviction {
    evicted: AtomicBool,
    notify: Notify,
}

impl Eviction {
    fn trigger(&self) {
        self.evicted.store(true, Ordering::Release);
        self.notify.notify_one();
    }

    fn is_set(&self) -> bool {
        self.evicted.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone)]
struct Subscriber {
    id: usize,
    player_id: PlayerId,
    sender: FrameSender,
    eviction: Arc<Eviction>,
}

/// Registration of one player's outbound queue.
///
/// Dropping it unregisters the queue and releases this handle's sender, so
/// the writer draining the queue ends once nothing else can push to it.
pub struct Subscription {
    broadcaster: Broadcaster,
    subscriber_id: usize,
    player_id: PlayerId,
    sender: FrameSender,
    eviction: Arc<Eviction>,
}

impl Subscription {
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Queues a message for this player only.
    pub async fn send(&self, frame: Frame) -> Result<(), mpsc::error::SendError<Frame>> {
        self.sender.send(frame).await
    }

    /// Queues a message without waiting. A full or closed queue evicts the
    /// player, the same as a failed broadcast.
    pub fn try_send(&self, frame: Frame) -> Result<(), mpsc::error::TrySendError<Frame>> {
        let result = self.sender.try_send(frame);
        if let Err(e) = &result {
            tracing::warn!(player_id = self.player_id, error = %e, "evicting player");
            self.broadcaster.unsubscribe(self.subscriber_id);
            self.eviction.trigger();
        }
        result
    }

    pub fn is_evicted(&self) -> bool {
        self.eviction.is_set()
    }

    /// Resolves once this player has been evicted from the broadcaster.
    /// The connection is expected to close when it does.
    pub async fn evicted(&self) {
        while !self.eviction.is_set() {
            self.eviction.notify.notified().await;
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.broadcaster.unsubscribe(self.subscriber_id);
    }
}

/// Fans encoded messages out to every connected player.
#[derive(Debug, Clone, Default)]
pub struct Broadcaster {
    inner: Arc<BroadcasterInner>,
}

#[derive(Debug, Default)]
struct BroadcasterInner {
    subscribers: RwLock<Vec<Subscriber>>,
    next_id: AtomicUsize,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new outbound queue for `player_id` and returns the
    /// registration plus the receiving end for the connection's writer.
    pub fn subscribe(&self, player_id: PlayerId) -> (Subscription, FrameReceiver) {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);
        let eviction = Arc::new(Eviction::default());
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Subscriber {
                id,
                player_id,
                sender: tx.clone(),
                eviction: Arc::clone(&eviction),
            });

        tracing::debug!(player_id, subscriber_id = id, "player subscribed to broadcasts");

        let subscription = Subscription {
            broadcaster: self.clone(),
            subscriber_id: id,
            player_id,
            sender: tx,
            eviction,
        };
        (subscription, rx)
    }

    /// Pushes `frame` to every subscriber without waiting. Subscribers whose
    /// queue is full or closed are evicted: removed here and signalled through
    /// [`Subscription::evicted`] so their connection ends. Returns how many
    /// queues took it.
    pub fn broadcast(&self, frame: Frame) -> usize {
        let subscribers = self
            .inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        tracing::trace!(
            subscriber_count = subscribers.len(),
            bytes = frame.len(),
            "broadcasting frame"
        );

        let mut failed = Vec::new();
        for subscriber in &subscribers {
            if let Err(e) = subscriber.sender.try_send(Arc::clone(&frame)) {
                tracing::warn!(
                    player_id = subscriber.player_id,
                    subscriber_id = subscriber.id,
                    error = %e,
                    "evicting player"
                );
                failed.push(subscriber.id);
                subscriber.eviction.trigger();
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(&failed);
        }
        subscribers.len() - failed.len()
    }

    pub fn unsubscribe(&self, subscriber_id: usize) {
        self.remove_subscribers(&[subscriber_id]);
    }

    /// Forgets every subscriber. Queues stay open while their
    /// [`Subscription`] is alive.
    pub fn close_all(&self) {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn remove_subscribers(&self, ids: &[usize]) {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|s| !ids.contains(&s.id));
    }
}
