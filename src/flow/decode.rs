use std::io::{Cursor, Read};
use std::net::{IpAddr, Ipv6Addr};
use anyhow::{Result, anyhow};
use byteorder::{LittleEndian as LE, ReadBytesExt, WriteBytesExt};
use pnet::util::MacAddr;
use super::flow::{Direction, FlowId, Metrics, Protocol, RawRecord};

pub const ID_SIZE:      usize = 58;
pub const METRICS_SIZE: usize = 31;
pub const RECORD_SIZE:  usize = ID_SIZE + METRICS_SIZE;

pub fn decode(data: &[u8]) -> Result<RawRecord> {
    if data.len() < RECORD_SIZE {
        return Err(anyhow!("short event: {} < {} bytes", data.len(), RECORD_SIZE));
    }

    let mut cur = Cursor::new(data);

    let id = FlowId {
        eth_protocol: cur.read_u16::<LE>()?,
        direction:    Direction::from(cur.read_u8()?),
        src_mac:      mac(&mut cur)?,
        dst_mac:      mac(&mut cur)?,
        src_addr:     ip(&mut cur)?,
        dst_addr:     ip(&mut cur)?,
        src_port:     cur.read_u16::<LE>()?,
        dst_port:     cur.read_u16::<LE>()?,
        protocol:     Protocol::from(cur.read_u8()?),
        icmp_type:    cur.read_u8()?,
        icmp_code:    cur.read_u8()?,
        if_index:     cur.read_u32::<LE>()?,
    };

    let metrics = Metrics {
        packets: cur.read_u32::<LE>()?,
        bytes:   cur.read_u64::<LE>()?,
        start:   cur.read_u64::<LE>()?,
        end:     cur.read_u64::<LE>()?,
        flags:   cur.read_u16::<LE>()?,
        errno:   cur.read_u8()?,
    };

    Ok(RawRecord::new(id, metrics))
}

pub fn encode(rec: &RawRecord) -> Result<Vec<u8>> {
    let RawRecord { id, metrics } = rec;
    let mut buf = Vec::with_capacity(RECORD_SIZE);

    buf.write_u16::<LE>(id.eth_protocol)?;
    buf.write_u8(direction(id.direction))?;
    buf.extend_from_slice(&octets(id.src_mac));
    buf.extend_from_slice(&octets(id.dst_mac));
    buf.extend_from_slice(&v6(id.src_addr).octets());
    buf.extend_from_slice(&v6(id.dst_addr).octets());
    buf.write_u16::<LE>(id.src_port)?;
    buf.write_u16::<LE>(id.dst_port)?;
    buf.write_u8(protocol(id.protocol))?;
    buf.write_u8(id.icmp_type)?;
    buf.write_u8(id.icmp_code)?;
    buf.write_u32::<LE>(id.if_index)?;

    buf.write_u32::<LE>(metrics.packets)?;
    buf.write_u64::<LE>(metrics.bytes)?;
    buf.write_u64::<LE>(metrics.start)?;
    buf.write_u64::<LE>(metrics.end)?;
    buf.write_u16::<LE>(metrics.flags)?;
    buf.write_u8(metrics.errno)?;

    Ok(buf)
}

fn mac(cur: &mut Cursor<&[u8]>) -> Result<MacAddr> {
    let mut b = [0u8; 6];
    cur.read_exact(&mut b)?;
    Ok(MacAddr::new(b[0], b[1], b[2], b[3], b[4], b[5]))
}

fn ip(cur: &mut Cursor<&[u8]>) -> Result<IpAddr> {
    let mut b = [0u8; 16];
    cur.read_exact(&mut b)?;
    let ip = Ipv6Addr::from(b);
    Ok(match ip.to_ipv4_mapped() {
        Some(ip4) => IpAddr::V4(ip4),
        None      => IpAddr::V6(ip),
    })
}

fn octets(mac: MacAddr) -> [u8; 6] {
    let MacAddr(a, b, c, d, e, f) = mac;
    [a, b, c, d, e, f]
}

fn v6(ip: IpAddr) -> Ipv6Addr {
    match ip {
        IpAddr::V4(ip) => ip.to_ipv6_mapped(),
        IpAddr::V6(ip) => ip,
    }
}

fn direction(dir: Direction) -> u8 {
    match dir {
        Direction::Ingress => 0,
        Direction::Egress  => 1,
        Direction::Unknown => 0xFF,
    }
}

fn protocol(proto: Protocol) -> u8 {
    match proto {
        Protocol::ICMP     => 1,
        Protocol::TCP      => 6,
        Protocol::UDP      => 17,
        Protocol::ICMPv6   => 58,
        Protocol::Other(n) => n,
    }
}
