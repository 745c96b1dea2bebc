use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;
use anyhow::Result;
use pnet::util::MacAddr;
use super::*;

fn id() -> FlowId {
    FlowId {
        eth_protocol: 0x0800,
        direction:    Direction::Egress,
        src_mac:      MacAddr::new(1, 2, 3, 4, 5, 6),
        dst_mac:      MacAddr::new(6, 5, 4, 3, 2, 1),
        src_addr:     IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
        dst_addr:     IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 7)),
        src_port:     123,
        dst_port:     456,
        protocol:     Protocol::TCP,
        icmp_type:    0,
        icmp_code:    0,
        if_index:     3,
    }
}

#[test]
fn decode_event() -> Result<()> {
    let metrics = Metrics {
        packets: 2,
        bytes:   20,
        start:   1_000,
        end:     2_000,
        flags:   0x12,
        errno:   MAP_FULL,
    };

    let data = encode(&RawRecord::new(id(), metrics))?;
    assert_eq!(RECORD_SIZE, data.len());

    let rec = decode(&data)?;
    assert_eq!(id(), rec.id);
    assert_eq!(metrics, rec.metrics);
    assert!(rec.metrics.map_full());

    Ok(())
}

#[test]
fn decode_fields_at_offsets() -> Result<()> {
    let mut data = encode(&RawRecord::new(id(), Metrics::default()))?;
    data[0]  = 0xDD;
    data[1]  = 0x86;
    data[54] = 9;
    data[2]  = 0;

    let rec = decode(&data)?;
    assert_eq!(0x86DD,             rec.id.eth_protocol);
    assert_eq!(Direction::Ingress, rec.id.direction);
    assert_eq!(9,                  rec.id.if_index);
    assert_eq!(Ipv4Addr::new(10, 0, 0, 1), rec.id.src_addr);

    Ok(())
}

#[test]
fn decode_short_event() {
    let data = [0u8; RECORD_SIZE - 1];
    assert!(decode(&data).is_err());
}

#[test]
fn merge_metrics() {
    let mut m = Metrics { packets: 2, bytes: 20, start: 50, end: 60, flags: 0x01, errno: 0 };
    m.merge(&Metrics { packets: 1, bytes: 24, start: 40, end: 55, flags: 0x10, errno: 0 });
    m.merge(&Metrics { packets: 4, bytes: 1,  start: 45, end: 90, flags: 0x01, errno: 0 });

    assert_eq!(7,    m.packets);
    assert_eq!(45,   m.bytes);
    assert_eq!(40,   m.start);
    assert_eq!(90,   m.end);
    assert_eq!(0x11, m.flags);
}

#[test]
fn logical_masks_interface() {
    let mut other = id();
    other.if_index = 4;

    assert_ne!(id(), other);
    assert_eq!(id().logical(), other.logical());
    assert_eq!(0, other.logical().if_index);
}

#[test]
fn protocol_numbers() {
    assert_eq!(Protocol::ICMP,      Protocol::from(1));
    assert_eq!(Protocol::UDP,       Protocol::from(17));
    assert_eq!(Protocol::Other(47), Protocol::from(47));
}

#[test]
fn wall_clock() {
    let clock = Clock::new();
    let now   = clock::monotonic();
    let a     = clock.wall(now);
    let b     = clock.wall(now + 1_000_000_000);
    assert_eq!(Duration::from_secs(1), b.duration_since(a).unwrap());
}
