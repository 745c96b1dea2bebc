use std::sync::Arc;
use std::thread;
use std::time::Duration;
use anyhow::{Context, Result};
use log::{debug, log_enabled, warn, Level::Debug};
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use crate::flow::{decode, RawRecord};
use super::{Flush, ReadError, Source, Stats};

const BACKOFF: Duration = Duration::from_millis(100);

/// Reads single-packet flows the probe could not store in its own map and
/// forwards them to the flow cache.
pub struct RingBufTracer {
    source:  Arc<dyn Source>,
    flusher: Arc<dyn Flush>,
    stats:   Stats,
}

impl RingBufTracer {
    pub fn new(source: Arc<dyn Source>, flusher: Arc<dyn Flush>, log_timeout: Duration) -> Self {
        Self {
            source:  source,
            flusher: flusher,
            stats:   Stats::new(log_timeout),
        }
    }

    /// Blocking loop, run on a dedicated thread until the source closes, the
    /// token is cancelled or the downstream channel goes away.
    pub fn trace(&self, tx: Sender<RawRecord>, token: CancellationToken) {
        let debugging = log_enabled!(Debug);

        while !token.is_cancelled() {
            let record = match self.next(debugging) {
                Ok(Some(record)) => record,
                Ok(None)         => {
                    debug!("ring buffer closed, exiting trace loop");
                    return;
                }
                Err(e) => {
                    warn!("ignoring flow event: {:#}", e);
                    continue;
                }
            };

            if tx.blocking_send(record).is_err() {
                debug!("flow cache gone, exiting trace loop");
                return;
            }
        }

        debug!("exiting trace loop due to cancellation");
    }

    fn next(&self, debugging: bool) -> Result<Option<RawRecord>> {
        let data = match self.source.read() {
            Ok(data)               => data,
            Err(ReadError::Closed) => return Ok(None),
            Err(e)                 => {
                thread::sleep(BACKOFF);
                return Err(e).context("reading from ring buffer");
            }
        };

        let record = decode(&data).context("parsing ring buffer event")?;

        let map_full = record.metrics.map_full();
        if debugging {
            self.stats.record(map_full);
        }

        if map_full {
            self.flusher.flush();
        }

        Ok(Some(record))
    }
}
