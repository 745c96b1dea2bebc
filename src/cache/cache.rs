use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use log::{debug, trace};
use tokio::sync::Notify;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use crate::flow::{Clock, FlowId, Metrics, RawRecord, Record};
use crate::tracer::Flush;

/// Aggregates raw records per flow and evicts them as exportable records
/// once they outlive the active timeout or the cache runs out of room.
///
/// Only the task running `Cache::run` touches the map; everything else
/// reaches it through channels or a `FlushHandle`.
pub struct Cache {
    max:     usize,
    timeout: Duration,
    clock:   Clock,
    flush:   Arc<Notify>,
    entries: HashMap<FlowId, Entry>,
    order:   BTreeSet<(Instant, FlowId)>,
}

#[derive(Debug)]
struct Entry {
    metrics: Metrics,
    created: Instant,
}

#[derive(Clone)]
pub struct FlushHandle {
    notify: Arc<Notify>,
}

impl Cache {
    pub fn new(max: usize, timeout: Duration) -> Self {
        Self {
            max:     max.max(1),
            timeout: timeout,
            clock:   Clock::new(),
            flush:   Arc::new(Notify::new()),
            entries: HashMap::new(),
            order:   BTreeSet::new(),
        }
    }

    pub fn flusher(&self) -> FlushHandle {
        FlushHandle {
            notify: self.flush.clone(),
        }
    }

    /// Merges a record, returning the entry evicted to make room for it.
    pub fn insert(&mut self, rec: RawRecord, now: Instant) -> Option<Record> {
        let RawRecord { id, metrics } = rec;

        if let Some(entry) = self.entries.get_mut(&id) {
            entry.metrics.merge(&metrics);
            return None;
        }

        let evicted = match self.entries.len() >= self.max {
            true  => self.pop(),
            false => None,
        };

        self.order.insert((now, id));
        self.entries.insert(id, Entry {
            metrics: metrics,
            created: now,
        });

        evicted
    }

    /// Evicts every entry created at least one active timeout before `now`.
    pub fn expire(&mut self, now: Instant) -> Vec<Record> {
        let mut expired = Vec::new();

        while let Some(&(created, _)) = self.order.iter().next() {
            if created + self.timeout > now {
                break;
            }

            if let Some(rec) = self.pop() {
                expired.push(rec);
            }
        }

        expired
    }

    pub fn drain(&mut self) -> Vec<Record> {
        let clock = self.clock;
        self.order.clear();
        self.entries.drain().map(|(id, entry)| {
            Record::new(id, entry.metrics, &clock)
        }).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn pop(&mut self) -> Option<Record> {
        let first = self.order.iter().next().cloned()?;
        self.order.remove(&first);

        let (_, id) = first;
        let entry = self.entries.remove(&id)?;
        trace!("evicting {} created {:?} ago", id, entry.created.elapsed());

        Some(Record::new(id, entry.metrics, &self.clock))
    }

    pub async fn run(
        mut self,
        mut rx: Receiver<RawRecord>,
        tx:     Sender<Vec<Record>>,
        token:  CancellationToken,
    ) -> Result<()> {
        let flush     = self.flush.clone();
        let mut timer = interval_at(Instant::now() + self.timeout, self.timeout);

        loop {
            let batch = tokio::select! {
                _   = token.cancelled() => break,
                rec = rx.recv()         => match rec {
                    Some(rec) => self.insert(rec, Instant::now()).into_iter().collect(),
                    None      => {
                        debug!("flow cache input closed, flushing {} flows", self.len());
                        let rest = self.drain();
                        emit(&tx, rest, &token).await;
                        break;
                    }
                },
                _   = timer.tick()      => self.expire(Instant::now()),
                _   = flush.notified()  => {
                    debug!("flushing {} flows on request", self.len());
                    self.drain()
                },
            };

            if !emit(&tx, batch, &token).await {
                break;
            }
        }

        debug!("flow cache finished");

        Ok(())
    }
}

/// Forwards a non-empty batch, returning false once forwarding is impossible.
async fn emit(tx: &Sender<Vec<Record>>, batch: Vec<Record>, token: &CancellationToken) -> bool {
    if batch.is_empty() {
        return true;
    }

    trace!("evicted {} flows", batch.len());

    tokio::select! {
        _   = token.cancelled() => false,
        res = tx.send(batch)    => res.is_ok(),
    }
}

impl Flush for FlushHandle {
    fn flush(&self) {
        self.notify.notify_one();
    }
}
