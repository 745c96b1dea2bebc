use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::time::SystemTime;
use pnet::util::MacAddr;
use serde::{Serialize, Deserialize};
use super::clock::Clock;

pub const MAP_FULL: u8 = libc::E2BIG as u8;

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct FlowId {
    pub eth_protocol: u16,
    pub direction:    Direction,
    pub src_mac:      MacAddr,
    pub dst_mac:      MacAddr,
    pub src_addr:     IpAddr,
    pub dst_addr:     IpAddr,
    pub src_port:     u16,
    pub dst_port:     u16,
    pub protocol:     Protocol,
    pub icmp_type:    u8,
    pub icmp_code:    u8,
    pub if_index:     u32,
}

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct Metrics {
    pub packets: u32,
    pub bytes:   u64,
    pub start:   u64,
    pub end:     u64,
    pub flags:   u16,
    pub errno:   u8,
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Protocol {
    ICMP,
    TCP,
    UDP,
    ICMPv6,
    Other(u8),
}

#[derive(Copy, Clone, Debug, Serialize, Deserialize, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Direction {
    Ingress, Egress, Unknown
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawRecord {
    pub id:      FlowId,
    pub metrics: Metrics,
}

/// A flow record as handed to exporters.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Record {
    pub id:              FlowId,
    pub metrics:         Metrics,
    pub time_flow_start: SystemTime,
    pub time_flow_end:   SystemTime,
    pub interface:       String,
    pub agent_ip:        IpAddr,
    pub duplicate:       bool,
}

impl FlowId {
    /// Identity of the traffic regardless of the interface it was seen on.
    pub fn logical(&self) -> FlowId {
        FlowId {
            if_index: 0,
            ..*self
        }
    }
}

impl Metrics {
    pub fn merge(&mut self, other: &Metrics) {
        self.packets = self.packets.saturating_add(other.packets);
        self.bytes   = self.bytes.saturating_add(other.bytes);
        self.start   = self.start.min(other.start);
        self.end     = self.end.max(other.end);
        self.flags  |= other.flags;
    }

    pub fn map_full(&self) -> bool {
        self.errno == MAP_FULL
    }
}

impl RawRecord {
    pub fn new(id: FlowId, metrics: Metrics) -> Self {
        Self { id, metrics }
    }
}

impl Record {
    pub fn new(id: FlowId, metrics: Metrics, clock: &Clock) -> Self {
        Self {
            id:              id,
            metrics:         metrics,
            time_flow_start: clock.wall(metrics.start),
            time_flow_end:   clock.wall(metrics.end),
            interface:       String::new(),
            agent_ip:        IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            duplicate:       false,
        }
    }
}

impl From<u8> for Protocol {
    fn from(n: u8) -> Self {
        match n {
            1  => Protocol::ICMP,
            6  => Protocol::TCP,
            17 => Protocol::UDP,
            58 => Protocol::ICMPv6,
            n  => Protocol::Other(n),
        }
    }
}

impl From<u8> for Direction {
    fn from(n: u8) -> Self {
        match n {
            0 => Direction::Ingress,
            1 => Direction::Egress,
            _ => Direction::Unknown,
        }
    }
}

impl fmt::Display for FlowId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} {}:{} -> {}:{} if {}",
               self.protocol,
               self.src_addr, self.src_port,
               self.dst_addr, self.dst_port,
               self.if_index,
        )
    }
}
