use std::net::IpAddr;
use std::str::FromStr;
use pnet::datalink::{self, NetworkInterface};
use crate::error::Error;

/// Which interface supplies the agent's own address.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Iface {
    External,
    Local,
    Name(String),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Family {
    Any,
    IPv4,
    IPv6,
}

#[derive(Clone, Debug)]
pub struct Link {
    pub name:     String,
    pub up:       bool,
    pub loopback: bool,
    pub ips:      Vec<IpAddr>,
}

pub fn address(iface: &Iface, family: Family) -> Result<IpAddr, Error> {
    let links = datalink::interfaces().iter().map(Link::from).collect::<Vec<_>>();
    select(&links, iface, family)
}

pub fn select(links: &[Link], iface: &Iface, family: Family) -> Result<IpAddr, Error> {
    let matches = |link: &&Link| match iface {
        Iface::External   => link.up && !link.loopback,
        Iface::Local      => link.loopback,
        Iface::Name(name) => &link.name == name,
    };

    let wanted = |ip: &IpAddr| match family {
        Family::Any  => true,
        Family::IPv4 => ip.is_ipv4(),
        Family::IPv6 => ip.is_ipv6(),
    };

    let mut candidates = links.iter().filter(matches).flat_map(|link| {
        link.ips.iter().copied()
    }).filter(wanted).collect::<Vec<_>>();

    // prefer IPv4 when any family will do
    candidates.sort_by_key(|ip| ip.is_ipv6());

    candidates.into_iter().next().ok_or_else(|| {
        Error::Address(format!("no {:?} address on {:?} interface", family, iface))
    })
}

impl From<&NetworkInterface> for Link {
    fn from(iface: &NetworkInterface) -> Self {
        Self {
            name:     iface.name.clone(),
            up:       iface.is_up(),
            loopback: iface.is_loopback(),
            ips:      iface.ips.iter().map(|net| net.ip()).collect(),
        }
    }
}

impl FromStr for Iface {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "external" => Ok(Iface::External),
            "local"    => Ok(Iface::Local),
            _          => match s.strip_prefix("name:") {
                Some(name) if !name.is_empty() => Ok(Iface::Name(name.to_owned())),
                _ => Err(Error::Invalid(format!("agent ip iface '{}'", s))),
            },
        }
    }
}

impl FromStr for Family {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "any"  => Ok(Family::Any),
            "ipv4" => Ok(Family::IPv4),
            "ipv6" => Ok(Family::IPv6),
            _      => Err(Error::Invalid(format!("agent ip type '{}'", s))),
        }
    }
}
