use std::time::Duration;
use futures_util::sink::SinkExt;
use log::{debug, warn};
use tokio::net::TcpStream;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{Receiver, Sender, channel};
use tokio::sync::mpsc::error::TrySendError::*;
use tokio::time::sleep;
use tokio_serde::{SymmetricallyFramed, formats::SymmetricalJson};
use tokio_util::codec::{FramedWrite, LengthDelimitedCodec};
use crate::flow::Record;
use super::Exporter;

/// Ships batches as length-delimited JSON frames over a TCP connection,
/// reconnecting whenever the peer goes away.
pub struct Tcp {
    tx: Sender<Vec<Record>>,
}

impl Tcp {
    pub fn new(addr: String, handle: &Handle) -> Self {
        let (tx, rx) = channel(1024);
        handle.spawn(dispatch(addr, rx));
        Self { tx }
    }
}

impl Exporter for Tcp {
    fn export(&self, batch: Vec<Record>) {
        match self.tx.try_send(batch) {
            Ok(())         => (),
            Err(Full(b))   => warn!("export queue full, dropping {} flows", b.len()),
            Err(Closed(b)) => warn!("exporter stopped, dropping {} flows", b.len()),
        }
    }
}

async fn dispatch(addr: String, mut rx: Receiver<Vec<Record>>) {
    loop {
        let sock = connect(&addr).await;

        let mut length = LengthDelimitedCodec::new();
        length.set_max_frame_length(32 * 1024 * 1024);
        let framed = FramedWrite::new(sock, length);
        let format = SymmetricalJson::<Vec<Record>>::default();

        let mut codec = SymmetricallyFramed::new(framed, format);

        loop {
            let batch = match rx.recv().await {
                Some(batch) => batch,
                None        => {
                    debug!("tcp exporter finished");
                    return;
                }
            };

            if let Err(e) = codec.send(batch).await {
                warn!("write error: {}", e);
                break;
            }
        }
    }
}

async fn connect(addr: &str) -> TcpStream {
    loop {
        let err = match TcpStream::connect(addr).await {
            Ok(sock) => return sock,
            Err(e)   => e,
        };

        warn!("connection to {} failed: {}", addr, err);

        sleep(Duration::from_secs(1)).await;
    }
}
