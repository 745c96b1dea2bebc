use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use crate::error::Error;
use super::*;

fn links() -> Vec<Link> {
    vec![
        Link {
            name:     "lo".into(),
            up:       true,
            loopback: true,
            ips:      vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
        },
        Link {
            name:     "eth0".into(),
            up:       true,
            loopback: false,
            ips:      vec![
                IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1)),
                IpAddr::V4(Ipv4Addr::new(192, 168, 1, 13)),
            ],
        },
        Link {
            name:     "eth1".into(),
            up:       false,
            loopback: false,
            ips:      vec![IpAddr::V4(Ipv4Addr::new(10, 1, 1, 1))],
        },
    ]
}

#[test]
fn select_external() {
    let ip = select(&links(), &Iface::External, Family::Any);
    assert_eq!(Ok(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 13))), ip);

    let ip = select(&links(), &Iface::External, Family::IPv6);
    assert_eq!(Ok(IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1))), ip);
}

#[test]
fn select_local_and_named() {
    let ip = select(&links(), &Iface::Local, Family::IPv4);
    assert_eq!(Ok(IpAddr::V4(Ipv4Addr::LOCALHOST)), ip);

    let ip = select(&links(), &Iface::Name("eth1".into()), Family::Any);
    assert_eq!(Ok(IpAddr::V4(Ipv4Addr::new(10, 1, 1, 1))), ip);

    assert!(select(&links(), &Iface::Local, Family::IPv6).is_err());
    assert!(select(&links(), &Iface::Name("eth9".into()), Family::Any).is_err());
}

#[test]
fn parse_iface() {
    assert_eq!(Ok(Iface::External),               "external".parse::<Iface>());
    assert_eq!(Ok(Iface::Local),                  "local".parse::<Iface>());
    assert_eq!(Ok(Iface::Name("br0".into())),     "name:br0".parse::<Iface>());
    assert!(matches!("name:".parse::<Iface>(),    Err(Error::Invalid(_))));
    assert!(matches!("internal".parse::<Iface>(), Err(Error::Invalid(_))));
    assert_eq!(Ok(Family::IPv6),                  "ipv6".parse::<Family>());
    assert!("ipv5".parse::<Family>().is_err());
}

#[test]
fn links_resolve() {
    let links = Links::default();
    assert_eq!(None, links.lookup(3));

    links.update(vec![(3, "foo".to_string()), (4, "bar".to_string())]);
    assert_eq!(Some("foo".to_string()), links.lookup(3));

    let clone = links.clone();
    clone.update(vec![(4, "baz".to_string())]);
    assert_eq!(None,                    links.lookup(3));
    assert_eq!(Some("baz".to_string()), links.lookup(4));
}
