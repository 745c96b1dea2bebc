use std::net::IpAddr;
use std::sync::Arc;
use anyhow::Result;
use log::debug;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio_util::sync::CancellationToken;
use crate::flow::Record;
use crate::link::Resolver;

pub struct Decorator {
    links:    Arc<dyn Resolver>,
    agent_ip: IpAddr,
}

impl Decorator {
    pub fn new(links: Arc<dyn Resolver>, agent_ip: IpAddr) -> Self {
        Self { links, agent_ip }
    }

    pub fn decorate(&self, rec: &mut Record) {
        rec.interface = self.links.lookup(rec.id.if_index).unwrap_or_default();
        rec.agent_ip  = self.agent_ip;
    }

    pub async fn run(
        self,
        mut rx: Receiver<Vec<Record>>,
        tx:     Sender<Vec<Record>>,
        token:  CancellationToken,
    ) -> Result<()> {
        loop {
            let mut batch = tokio::select! {
                _     = token.cancelled() => break,
                batch = rx.recv()         => match batch {
                    Some(batch) => batch,
                    None        => break,
                },
            };

            batch.iter_mut().for_each(|rec| self.decorate(rec));

            tokio::select! {
                _   = token.cancelled() => break,
                res = tx.send(batch)    => if res.is_err() { break },
            }
        }

        debug!("decorator finished");

        Ok(())
    }
}
