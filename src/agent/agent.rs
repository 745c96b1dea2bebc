use std::net::IpAddr;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use anyhow::{Result, anyhow};
use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use log::{debug, error, info, warn};
use tokio::sync::mpsc::channel;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use crate::cache::Cache;
use crate::decorate::Decorator;
use crate::dedup::Deduper;
use crate::export::{self, Exporter};
use crate::link::{self, Resolver};
use crate::tracer::{Flush, Flushers, RingBufTracer, Source};
use super::{Config, State, Status};

const GRACE: Duration = Duration::from_secs(5);

/// Capabilities the pipeline consumes but does not own.
pub struct Deps {
    pub source:   Arc<dyn Source>,
    pub flusher:  Option<Arc<dyn Flush>>,
    pub links:    Arc<dyn Resolver>,
    pub exporter: Arc<dyn Exporter>,
}

pub struct Agent {
    cfg:      Config,
    deps:     Deps,
    agent_ip: IpAddr,
    state:    State,
}

type Stage = BoxFuture<'static, (&'static str, Result<()>)>;

impl Agent {
    /// Validates the configuration and resolves the agent address; nothing
    /// is started until `run`.
    pub fn new(cfg: Config, deps: Deps) -> Result<Self> {
        cfg.validate()?;

        let agent_ip = match cfg.agent_ip {
            Some(ip) => ip,
            None     => {
                let (iface, family) = cfg.agent_ip_source()?;
                link::address(&iface, family)?
            }
        };

        debug!("agent address {}, export {}", agent_ip, cfg.export);

        Ok(Self {
            cfg:      cfg,
            deps:     deps,
            agent_ip: agent_ip,
            state:    State::new(),
        })
    }

    pub fn state(&self) -> State {
        self.state.clone()
    }

    pub fn agent_ip(&self) -> IpAddr {
        self.agent_ip
    }

    /// Runs the pipeline until `token` is cancelled or a stage stops on its
    /// own, which is reported as an error.
    ///
    /// Shutdown closes the source and lets each stage finish once its input
    /// is drained, upstream first. Stages still running after `GRACE` are
    /// stopped through their own token.
    pub async fn run(self, token: CancellationToken) -> Result<()> {
        let state  = self.state.clone();
        let source = self.deps.source.clone();
        let stop   = CancellationToken::new();

        state.set(Status::Starting);
        info!("starting flow agent");

        let mut stages = match self.start(&stop) {
            Ok(stages) => stages,
            Err(e)     => {
                error!("agent setup failed: {:?}", e);
                stop.cancel();
                source.close();
                state.set(Status::Failed);
                return Err(e);
            }
        };

        state.set(Status::Started);
        info!("flow agent started");

        let failure = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            Some((name, res)) = stages.next() => Some(match res {
                Ok(()) => anyhow!("{} stage terminated unexpectedly", name),
                Err(e) => e.context(format!("{} stage failed", name)),
            }),
        };

        state.set(Status::Stopping);
        info!("stopping flow agent");

        source.close();

        let drain = async {
            while let Some((name, res)) = stages.next().await {
                match res {
                    Ok(()) => debug!("{} stage stopped", name),
                    Err(e) => warn!("{} stage stopped with error: {:?}", name, e),
                }
            }
        };

        if timeout(GRACE, drain).await.is_err() {
            warn!("pipeline stages still running after {:?}", GRACE);
        }

        stop.cancel();

        match failure {
            None    => {
                state.set(Status::Stopped);
                info!("flow agent stopped");
                Ok(())
            }
            Some(e) => {
                state.set(Status::Failed);
                error!("flow agent failed: {:?}", e);
                Err(e)
            }
        }
    }

    fn start(self, token: &CancellationToken) -> Result<FuturesUnordered<Stage>> {
        let Self { cfg, deps, agent_ip, .. } = self;
        let Deps { source, flusher, links, exporter } = deps;

        let (kind, mode, expiry) = cfg.dedup()?;
        let size = cfg.buffer_length;

        let (raw_tx,       raw_rx)       = channel(size);
        let (evicted_tx,   evicted_rx)   = channel(size);
        let (deduped_tx,   deduped_rx)   = channel(size);
        let (decorated_tx, decorated_rx) = channel(size);

        let cache     = Cache::new(cfg.cache_max_flows, cfg.cache_active_timeout);
        let deduper   = Deduper::new(kind, mode, expiry);
        let decorator = Decorator::new(links, agent_ip);

        let mut flushers = Flushers::new();
        if let Some(flusher) = flusher {
            flushers.add(flusher);
        }
        flushers.add(Arc::new(cache.flusher()));

        let tracer = RingBufTracer::new(source, Arc::new(flushers), cfg.log_timeout);

        let stages = FuturesUnordered::new();

        let (done_tx, done_rx) = oneshot::channel();
        let intake_token = token.clone();
        thread::Builder::new().name("ringbuf".into()).spawn(move || {
            tracer.trace(raw_tx, intake_token);
            let _ = done_tx.send(());
        })?;

        stages.push(async move {
            match done_rx.await {
                Ok(()) => ("intake", Ok(())),
                Err(_) => ("intake", Err(anyhow!("intake thread panicked"))),
            }
        }.boxed());

        stages.push(task("cache",     cache.run(raw_rx, evicted_tx, token.clone())));
        stages.push(task("deduper",   deduper.run(evicted_rx, deduped_tx, token.clone())));
        stages.push(task("decorator", decorator.run(deduped_rx, decorated_tx, token.clone())));
        stages.push(task("export",    export::sink(exporter, decorated_rx, token.clone())));

        Ok(stages)
    }
}

fn task<F>(name: &'static str, stage: F) -> Stage
where
    F: std::future::Future<Output = Result<()>> + Send + 'static,
{
    let handle = tokio::spawn(stage);
    async move {
        match handle.await {
            Ok(res) => (name, res),
            Err(e)  => (name, Err(e.into())),
        }
    }.boxed()
}
