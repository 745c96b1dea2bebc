use std::sync::Arc;
use anyhow::Result;
use log::{debug, trace};
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use crate::flow::Record;
use super::Exporter;

pub async fn sink(
    exporter: Arc<dyn Exporter>,
    mut rx:   Receiver<Vec<Record>>,
    token:    CancellationToken,
) -> Result<()> {
    loop {
        let batch = tokio::select! {
            _     = token.cancelled() => break,
            batch = rx.recv()         => match batch {
                Some(batch) => batch,
                None        => break,
            },
        };

        trace!("exporting {} flows", batch.len());
        exporter.export(batch);
    }

    debug!("export sink finished");

    Ok(())
}
