use std::str::FromStr;
use std::time::Duration;
use anyhow::Result;
use log::{debug, trace};
use lru::LruCache;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use crate::error::Error;
use crate::flow::{FlowId, Record};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Kind {
    None,
    FirstCome,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    Drop,
    Mark,
}

/// Reconciles flows observed on more than one interface. The first
/// interface to report a logical flow owns it until the entry expires;
/// records from any other interface are dropped or marked as duplicates.
pub struct Deduper {
    kind:   Kind,
    mode:   Mode,
    expiry: Duration,
    seen:   LruCache<FlowId, Entry>,
}

#[derive(Debug)]
struct Entry {
    if_index: u32,
    expiry:   Instant,
}

impl Deduper {
    pub fn new(kind: Kind, mode: Mode, expiry: Duration) -> Self {
        Self {
            kind:   kind,
            mode:   mode,
            expiry: expiry,
            seen:   LruCache::unbounded(),
        }
    }

    pub fn dedup(&mut self, batch: Vec<Record>, now: Instant) -> Vec<Record> {
        if self.kind == Kind::None {
            return batch;
        }

        self.expire(now);

        let mut out = Vec::with_capacity(batch.len());
        for mut rec in batch {
            if !self.check(&rec.id, now) {
                out.push(rec);
            } else if self.mode == Mode::Mark {
                rec.duplicate = true;
                out.push(rec);
            } else {
                trace!("dropping duplicate {}", rec.id);
            }
        }
        out
    }

    /// Returns true when the flow is already owned by another interface.
    fn check(&mut self, id: &FlowId, now: Instant) -> bool {
        let key = id.logical();

        if let Some(entry) = self.seen.peek(&key) {
            if entry.expiry > now && entry.if_index != id.if_index {
                return true;
            }
        }

        self.seen.put(key, Entry {
            if_index: id.if_index,
            expiry:   now + self.expiry,
        });

        false
    }

    fn expire(&mut self, now: Instant) {
        while let Some((_, entry)) = self.seen.peek_lru() {
            if entry.expiry > now {
                break;
            }
            self.seen.pop_lru();
        }
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub async fn run(
        mut self,
        mut rx: Receiver<Vec<Record>>,
        tx:     Sender<Vec<Record>>,
        token:  CancellationToken,
    ) -> Result<()> {
        loop {
            let batch = tokio::select! {
                _     = token.cancelled() => break,
                batch = rx.recv()         => match batch {
                    Some(batch) => self.dedup(batch, Instant::now()),
                    None        => break,
                },
            };

            if batch.is_empty() {
                continue;
            }

            tokio::select! {
                _   = token.cancelled() => break,
                res = tx.send(batch)    => if res.is_err() { break },
            }
        }

        debug!("deduper finished");

        Ok(())
    }
}

impl FromStr for Kind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none"       => Ok(Kind::None),
            "first-come" => Ok(Kind::FirstCome),
            other        => Err(Error::Deduper(other.to_owned())),
        }
    }
}

impl Mode {
    pub fn new(just_mark: bool) -> Self {
        match just_mark {
            true  => Mode::Mark,
            false => Mode::Drop,
        }
    }
}
