use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use log::{debug, info};
use parking_lot::RwLock;
use pnet::datalink::{self, NetworkInterface};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use super::Resolver;

/// Snapshot of the host's interfaces, kept current by `Links::watch`.
#[derive(Clone, Default)]
pub struct Links {
    names: Arc<RwLock<HashMap<u32, String>>>,
}

impl Links {
    pub fn new() -> Self {
        let links = Self::default();
        links.update(names(datalink::interfaces()));
        links
    }

    pub fn update<I: IntoIterator<Item = (u32, String)>>(&self, links: I) {
        let names = links.into_iter().collect::<HashMap<_, _>>();

        let mut curr = self.names.write();
        if *curr != names {
            debug!("interfaces changed: {:?}", names);
        }
        *curr = names;
    }

    pub async fn watch(self, interval: Duration, token: CancellationToken) {
        info!("watching interfaces every {:?}", interval);
        loop {
            tokio::select! {
                _ = token.cancelled()  => break,
                _ = sleep(interval)    => (),
            }

            match tokio::task::spawn_blocking(datalink::interfaces).await {
                Ok(ifaces) => self.update(names(ifaces)),
                Err(e)     => debug!("interface refresh failed: {}", e),
            }
        }
        debug!("link monitor finished");
    }
}

impl Resolver for Links {
    fn lookup(&self, index: u32) -> Option<String> {
        self.names.read().get(&index).cloned()
    }
}

fn names(ifaces: Vec<NetworkInterface>) -> impl Iterator<Item = (u32, String)> {
    ifaces.into_iter().map(|iface| (iface.index, iface.name))
}
