use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use futures::StreamExt;
use tokio::net::TcpListener;
use tokio::runtime::Handle;
use tokio::sync::mpsc::channel;
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, LengthDelimitedCodec};
use tokio_util::sync::CancellationToken;
use crate::fake::{self, FakeExporter};
use crate::flow::{Clock, Record};
use super::*;

fn record(src_port: u16) -> Record {
    let mut rec = Record::new(fake::flow(src_port, 80, 3), fake::metrics(3, 44, 1, 2), &Clock::new());
    rec.interface = "foo".into();
    rec.agent_ip  = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 13));
    rec
}

#[tokio::test]
async fn sink_hands_batches_to_exporter() {
    let exporter = Arc::new(FakeExporter::new());
    let (tx, rx) = channel(10);

    let task = tokio::spawn(sink(exporter.clone(), rx, CancellationToken::new()));

    tx.send(vec![record(1), record(2)]).await.unwrap();
    tx.send(vec![record(3)]).await.unwrap();
    drop(tx);
    task.await.unwrap().unwrap();

    let flows = exporter.drain();
    assert_eq!(vec![1, 2, 3], flows.iter().map(|r| r.id.src_port).collect::<Vec<_>>());
}

#[tokio::test]
async fn tcp_frames_json() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr     = listener.local_addr()?;

    let tcp = Tcp::new(addr.to_string(), &Handle::current());
    tcp.export(vec![record(1), record(2)]);

    let (sock, _) = timeout(Duration::from_secs(5), listener.accept()).await??;
    let mut frames = FramedRead::new(sock, LengthDelimitedCodec::new());

    let frame = timeout(Duration::from_secs(5), frames.next()).await?.unwrap()?;
    let flows: Vec<Record> = serde_json::from_slice(&frame)?;

    assert_eq!(2, flows.len());
    assert_eq!(fake::flow(1, 80, 3), flows[0].id);
    assert_eq!("foo", flows[0].interface);
    assert_eq!(44,    flows[1].metrics.bytes);
    assert_eq!(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 13)), flows[1].agent_ip);

    Ok(())
}
