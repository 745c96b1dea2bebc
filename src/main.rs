use std::sync::Arc;
use std::thread;
use std::time::Duration;
use anyhow::{Result, anyhow};
use clap::{App, ArgMatches, load_yaml, value_t};
use env_logger::Builder;
use jemallocator::Jemalloc;
use log::{info, warn};
use log::LevelFilter::*;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tokio::runtime::{Handle, Runtime};
use tokio_util::sync::CancellationToken;
use kflow::agent::{Agent, Config, Deps, Export};
use kflow::args::{duration, list, opt};
use kflow::export::{Exporter, Tcp};
use kflow::link::Links;
use kflow::tracer::FileSource;

#[global_allocator]
static ALLOC: Jemalloc = Jemalloc;

fn main() -> Result<()> {
    let yaml = load_yaml!("args.yml");
    let ver  = env!("CARGO_PKG_VERSION");
    let args = App::from_yaml(&yaml).version(ver).get_matches();

    let (module, level) = match args.occurrences_of("verbose") {
        0 => (Some(module_path!()), Info),
        1 => (Some(module_path!()), Debug),
        2 => (Some(module_path!()), Trace),
        _ => (None,                 Trace),
    };
    Builder::from_default_env().filter(module, level).init();

    info!("initializing kflow {}", ver);

    let input = value_t!(args, "input", String)?;
    let cfg   = config(&args)?;

    let shutdown = CancellationToken::new();
    let mut signals = Signals::new(&[SIGINT, SIGTERM])?;
    let cancel = shutdown.clone();
    thread::Builder::new().name("signals".into()).spawn(move || {
        if let Some(signal) = signals.forever().next() {
            info!("received signal {}, shutting down", signal);
            cancel.cancel();
        }
    })?;

    let rt = Runtime::new()?;

    let result = rt.block_on(run(cfg, input, shutdown));
    rt.shutdown_timeout(Duration::from_secs(1));

    if let Err(e) = &result {
        warn!("kflow exiting: {:?}", e);
    }

    result
}

async fn run(cfg: Config, input: String, shutdown: CancellationToken) -> Result<()> {
    let exporter: Arc<dyn Exporter> = match cfg.target()? {
        Export::Tcp { host, port } => Arc::new(Tcp::new(format!("{}:{}", host, port), &Handle::current())),
        other                      => return Err(anyhow!("{:?} exporter not available", other)),
    };

    let source = Arc::new(FileSource::open(&input)?);
    let links  = Links::new();

    tokio::spawn(links.clone().watch(cfg.interfaces_refresh, shutdown.child_token()));

    let deps = Deps {
        source:   source,
        flusher:  None,
        links:    Arc::new(links),
        exporter: exporter,
    };

    let agent = Agent::new(cfg, deps)?;
    info!("agent address {}", agent.agent_ip());

    let result = agent.run(shutdown.clone()).await;
    shutdown.cancel();
    result
}

fn config(args: &ArgMatches) -> Result<Config> {
    let defaults = Config::default();

    let export = args.value_of("export").map(String::from).unwrap_or(defaults.export);
    let port   = opt(args.value_of("port"))?.unwrap_or(defaults.target_port);

    Ok(Config {
        export:               export,
        target_host:          args.value_of("host").unwrap_or("").to_owned(),
        target_port:          port,
        kafka_brokers:        list(args, "brokers"),
        kafka_topic:          args.value_of("topic").map(String::from).unwrap_or(defaults.kafka_topic),
        cache_max_flows:      opt(args.value_of("max-flows"))?.unwrap_or(defaults.cache_max_flows),
        cache_active_timeout: duration(args, "active-timeout")?.unwrap_or(defaults.cache_active_timeout),
        buffer_length:        opt(args.value_of("buffer"))?.unwrap_or(defaults.buffer_length),
        deduper:              args.value_of("deduper").map(String::from).unwrap_or(defaults.deduper),
        deduper_just_mark:    args.is_present("just-mark"),
        deduper_fc_expiry:    duration(args, "dedup-expiry")?,
        log_timeout:          duration(args, "log-timeout")?.unwrap_or(defaults.log_timeout),
        agent_ip:             opt(args.value_of("agent-ip"))?,
        agent_ip_iface:       args.value_of("agent-ip-iface").map(String::from).unwrap_or(defaults.agent_ip_iface),
        agent_ip_type:        args.value_of("agent-ip-type").map(String::from).unwrap_or(defaults.agent_ip_type),
        interfaces_refresh:   duration(args, "refresh")?.unwrap_or(defaults.interfaces_refresh),
    })
}
