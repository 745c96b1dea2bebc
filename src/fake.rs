use std::collections::HashMap;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::Mutex;
use pnet::util::MacAddr;
use crate::export::Exporter;
use crate::flow::{encode, Direction, FlowId, Metrics, Protocol, RawRecord, Record};
use crate::link::Resolver;
use crate::tracer::{Flush, ReadError, Source};

pub struct FakeSource {
    tx: Mutex<Option<Sender<io::Result<Vec<u8>>>>>,
    rx: Receiver<io::Result<Vec<u8>>>,
}

impl FakeSource {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx: Mutex::new(Some(tx)),
            rx: rx,
        }
    }

    pub fn push(&self, rec: &RawRecord) {
        self.send(Ok(encode(rec).unwrap()));
    }

    pub fn push_bytes(&self, data: Vec<u8>) {
        self.send(Ok(data));
    }

    pub fn fail(&self, msg: &str) {
        self.send(Err(io::Error::new(io::ErrorKind::Other, msg.to_owned())));
    }

    fn send(&self, event: io::Result<Vec<u8>>) {
        if let Some(tx) = self.tx.lock().as_ref() {
            tx.send(event).unwrap();
        }
    }
}

impl Source for FakeSource {
    fn read(&self) -> Result<Vec<u8>, ReadError> {
        match self.rx.recv() {
            Ok(Ok(data)) => Ok(data),
            Ok(Err(e))   => Err(ReadError::Io(e)),
            Err(_)       => Err(ReadError::Closed),
        }
    }

    fn close(&self) {
        self.tx.lock().take();
    }
}

#[derive(Default)]
pub struct CountingFlusher {
    count: AtomicUsize,
}

impl CountingFlusher {
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Flush for CountingFlusher {
    fn flush(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct SliceResolver(pub HashMap<u32, String>);

impl SliceResolver {
    pub fn new(links: &[(u32, &str)]) -> Self {
        Self(links.iter().map(|(index, name)| (*index, name.to_string())).collect())
    }
}

impl Resolver for SliceResolver {
    fn lookup(&self, index: u32) -> Option<String> {
        self.0.get(&index).cloned()
    }
}

pub struct FakeExporter {
    tx: Sender<Vec<Record>>,
    rx: Receiver<Vec<Record>>,
}

impl FakeExporter {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn get(&self, timeout: Duration) -> Option<Vec<Record>> {
        self.rx.recv_timeout(timeout).ok()
    }

    pub fn drain(&self) -> Vec<Record> {
        self.rx.try_iter().flatten().collect()
    }
}

impl Exporter for FakeExporter {
    fn export(&self, batch: Vec<Record>) {
        let _ = self.tx.send(batch);
    }
}

pub fn flow(src_port: u16, dst_port: u16, if_index: u32) -> FlowId {
    FlowId {
        eth_protocol: 0x0800,
        direction:    Direction::Ingress,
        src_mac:      MacAddr::new(0x02, 0, 0, 0, 0, 1),
        dst_mac:      MacAddr::new(0x02, 0, 0, 0, 0, 2),
        src_addr:     IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
        dst_addr:     IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
        src_port:     src_port,
        dst_port:     dst_port,
        protocol:     Protocol::TCP,
        icmp_type:    0,
        icmp_code:    0,
        if_index:     if_index,
    }
}

pub fn metrics(packets: u32, bytes: u64, start: u64, end: u64) -> Metrics {
    Metrics {
        packets: packets,
        bytes:   bytes,
        start:   start,
        end:     end,
        ..Default::default()
    }
}
