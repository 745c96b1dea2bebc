use std::net::IpAddr;
use std::time::Duration;
use crate::dedup::{Kind, Mode};
use crate::error::Error;
use crate::link::{Family, Iface};

#[derive(Clone, Debug)]
pub struct Config {
    pub export:               String,
    pub target_host:          String,
    pub target_port:          u16,
    pub kafka_brokers:        Vec<String>,
    pub kafka_topic:          String,
    pub cache_max_flows:      usize,
    pub cache_active_timeout: Duration,
    pub buffer_length:        usize,
    pub deduper:              String,
    pub deduper_just_mark:    bool,
    pub deduper_fc_expiry:    Option<Duration>,
    pub log_timeout:          Duration,
    pub agent_ip:             Option<IpAddr>,
    pub agent_ip_iface:       String,
    pub agent_ip_type:        String,
    pub interfaces_refresh:   Duration,
}

/// Where flows go, checked for shape but not for reachability.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Export {
    Grpc  { host: String, port: u16 },
    Kafka { brokers: Vec<String>, topic: String },
    Tcp   { host: String, port: u16 },
}

impl Config {
    pub fn validate(&self) -> Result<(), Error> {
        self.target()?;
        self.dedup()?;
        self.agent_ip_source()?;

        if self.cache_max_flows == 0 {
            return Err(Error::Invalid("cache max flows must be positive".into()));
        }

        if self.cache_active_timeout == Duration::from_secs(0) {
            return Err(Error::Invalid("cache active timeout must be positive".into()));
        }

        if self.buffer_length == 0 {
            return Err(Error::Invalid("buffer length must be positive".into()));
        }

        Ok(())
    }

    pub fn target(&self) -> Result<Export, Error> {
        let host = || match self.target_host.as_str() {
            ""   => Err(Error::Missing("target host")),
            host => Ok(host.to_owned()),
        };

        let port = || match self.target_port {
            0    => Err(Error::Missing("target port")),
            port => Ok(port),
        };

        match self.export.as_str() {
            "grpc"  => Ok(Export::Grpc { host: host()?, port: port()? }),
            "tcp"   => Ok(Export::Tcp  { host: host()?, port: port()? }),
            "kafka" => {
                let brokers = self.kafka_brokers.iter().filter(|b| !b.is_empty()).cloned().collect::<Vec<_>>();
                if brokers.is_empty() {
                    return Err(Error::Missing("kafka brokers"));
                }
                let topic = match self.kafka_topic.as_str() {
                    ""    => return Err(Error::Missing("kafka topic")),
                    topic => topic.to_owned(),
                };
                Ok(Export::Kafka { brokers, topic })
            },
            kind => Err(Error::Export(kind.to_owned())),
        }
    }

    pub fn dedup(&self) -> Result<(Kind, Mode, Duration), Error> {
        let kind   = self.deduper.parse::<Kind>()?;
        let mode   = Mode::new(self.deduper_just_mark);
        let expiry = self.deduper_fc_expiry.unwrap_or(self.cache_active_timeout * 2);
        Ok((kind, mode, expiry))
    }

    pub fn agent_ip_source(&self) -> Result<(Iface, Family), Error> {
        Ok((self.agent_ip_iface.parse()?, self.agent_ip_type.parse()?))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            export:               "grpc".to_owned(),
            target_host:          String::new(),
            target_port:          0,
            kafka_brokers:        Vec::new(),
            kafka_topic:          "network-flows".to_owned(),
            cache_max_flows:      5000,
            cache_active_timeout: Duration::from_secs(5),
            buffer_length:        50,
            deduper:              "none".to_owned(),
            deduper_just_mark:    false,
            deduper_fc_expiry:    None,
            log_timeout:          Duration::from_secs(5),
            agent_ip:             None,
            agent_ip_iface:       "external".to_owned(),
            agent_ip_type:        "any".to_owned(),
            interfaces_refresh:   Duration::from_secs(60),
        }
    }
}
