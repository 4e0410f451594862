use serde::{Deserialize, Serialize};

use crate::player::{Action, PlayerId};
use crate::rules::ReturnCode;

/// One applied action, as written to the action log.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Position of this action in the match (1-based, rejected actions included)
    pub seq: u64,
    pub player_id: PlayerId,
    pub action: Action,
    pub code: ReturnCode,
    /// True once the match has a winner
    #[serde(default)]
    pub finished: bool,
    /// Timestamp when the action was applied (RFC3339 format)
    #[serde(default)]
    pub ts: Option<String>,
}

use chrono::{SecondsFormat, Utc};
use std::fs::{create_dir_all, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Appends [`ActionRecord`]s to a JSONL file.
pub struct MatchLogger {
    writer: Option<BufWriter<File>>,
    seq: u64,
}

impl std::fmt::Debug for MatchLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchLogger")
            .field("seq", &self.seq)
            .field("enabled", &self.writer.is_some())
            .finish()
    }
}

impl MatchLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                let _ = create_dir_all(parent);
            }
        }
        let f = File::create(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(f)),
            seq: 0,
        })
    }

    /// Logger that numbers records but writes nothing.
    pub fn disabled() -> Self {
        Self {
            writer: None,
            seq: 0,
        }
    }

    /// Records numbered so far.
    pub fn count(&self) -> u64 {
        self.seq
    }

    pub fn record(
        &mut self,
        player_id: PlayerId,
        action: Action,
        code: ReturnCode,
        finished: bool,
    ) -> std::io::Result<ActionRecord> {
        self.seq += 1;
        let record = ActionRecord {
            seq: self.seq,
            player_id,
            action,
            code,
            finished,
            ts: None,
        };
        self.write(&record)?;
        Ok(record)
    }

    pub fn write(&mut self, record: &ActionRecord) -> std::io::Result<()> {
        // inject timestamp if missing
        let mut rec = record.clone();
        if rec.ts.is_none() {
            rec.ts = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        let line = serde_json::to_string(&rec).map_err(std::io::Error::other)?;
        if let Some(w) = &mut self.writer {
            w.write_all(line.as_bytes())?;
            w.write_all(b"\n")?;
            w.flush()?;
        }
        Ok(())
    }
}
