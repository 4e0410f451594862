//! Action log writer that keeps file I/O off the match lock.
//!
//! Records are numbered by the session while it holds the lock and handed to
//! a dedicated thread, which appends them in the same order.

use std::thread::JoinHandle;

use dobble_engine::logger::{ActionRecord, MatchLogger};
use dobble_engine::player::{Action, PlayerId};
use dobble_engine::rules::ReturnCode;
use tokio::sync::mpsc;

#[derive(Debug)]
pub struct ActionLog {
    seq: u64,
    sender: Option<mpsc::UnboundedSender<ActionRecord>>,
    writer: Option<JoinHandle<()>>,
}

impl ActionLog {
    /// Numbers actions without writing them anywhere.
    pub fn disabled() -> Self {
        Self {
            seq: 0,
            sender: None,
            writer: None,
        }
    }

    /// Moves `logger` onto a writer thread.
    pub fn spawn(mut logger: MatchLogger) -> std::io::Result<Self> {
        let (sender, mut records) = mpsc::unbounded_channel::<ActionRecord>();
        let writer = std::thread::Builder::new()
            .name("action-log".to_string())
            .spawn(move || {
                while let Some(record) = records.blocking_recv() {
                    if let Err(err) = logger.write(&record) {
                        tracing::warn!(
                            seq = record.seq,
                            error = %err,
                            "failed to write action log"
                        );
                    }
                }
            })?;
        Ok(Self {
            seq: 0,
            sender: Some(sender),
            writer: Some(writer),
        })
    }

    /// Numbers the action and queues it for the writer. Never blocks.
    pub fn record(
        &mut self,
        player_id: PlayerId,
        action: Action,
        code: ReturnCode,
        finished: bool,
    ) {
        self.seq += 1;
        let Some(sender) = &self.sender else {
            return;
        };
        let record = ActionRecord {
            seq: self.seq,
            player_id,
            action,
            code,
            finished,
            ts: None,
        };
        if sender.send(record).is_err() {
            tracing::warn!(seq = self.seq, "action log writer is gone");
        }
    }

    /// Actions numbered so far.
    pub fn count(&self) -> u64 {
        self.seq
    }

    /// Stops accepting records. The returned writer exits once everything
    /// queued so far is on disk.
    pub fn close(&mut self) -> Option<JoinHandle<()>> {
        self.sender = None;
        self.writer.take()
    }
}
