use anyhow::Context;
use clap::Parser;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use wirefleet::config::FleetConfig;
use wirefleet::engine::{sink_from, StandaloneEngineFactory};
use wirefleet::watcher::FsMappingsWatcher;
use wirefleet::{mappings_root, FleetManager, Mock, Proxy, ReloadEvent};

#[derive(Parser, Debug)]
#[command(name = "wirefleet", about = "Run a fleet of standalone mock-HTTP servers")]
struct Args {
    /// Fleet configuration file
    #[arg(short, long, env = "WIREFLEET_CONFIG", default_value = "wirefleet.yaml")]
    config: PathBuf,
    /// Record from the upstream targets instead of replaying mappings
    #[arg(short, long)]
    record: bool,
    /// Restart instances when their mapping files change
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = FleetConfig::from_file(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;

    let watch = if args.watch && args.record {
        // Record mode writes mappings itself; watching them would
        // restart instances mid-recording.
        warn!("--watch is ignored in record mode");
        false
    } else {
        args.watch
    };

    let factory = StandaloneEngineFactory::new(&config.engine.binary, &config.engine.mappings_dir);
    let manager = Arc::new(FleetManager::new(Box::new(factory)));
    let (reload_tx, reload_rx) = mpsc::channel();

    let mut targets: HashMap<Uuid, (Proxy, Mock)> = HashMap::new();
    for proxy_cfg in &config.proxies {
        let proxy = proxy_cfg.to_proxy();
        for mock_cfg in &proxy_cfg.mocks {
            let mock = Mock::new(&proxy, &mock_cfg.name);
            manager
                .play(&proxy, &mock, args.record, sink_from(std::io::stdout()))
                .with_context(|| format!("failed to start mock '{}/{}'", proxy.name, mock.name))?;
            if watch {
                attach_watcher(&manager, &config.engine.mappings_dir, &proxy, &mock, &reload_tx);
            }
            targets.insert(mock.id, (proxy.clone(), mock));
        }
    }

    info!(instances = manager.running_count(), "fleet up; press Ctrl-C to stop");

    if watch {
        let manager = Arc::clone(&manager);
        let mappings_dir = config.engine.mappings_dir.clone();
        std::thread::spawn(move || {
            reload_loop(manager, targets, mappings_dir, reload_tx, reload_rx);
        });
    }

    tokio::signal::ctrl_c().await.ok();
    info!("shutting down fleet");
    manager.stop_all();
    Ok(())
}

fn attach_watcher(
    manager: &FleetManager,
    mappings_dir: &std::path::Path,
    proxy: &Proxy,
    mock: &Mock,
    reload_tx: &mpsc::Sender<ReloadEvent>,
) {
    let root = mappings_dir.join(mappings_root(proxy, mock));
    match FsMappingsWatcher::subscribe(mock.id, &root, reload_tx.clone()) {
        Ok(watcher) => manager.add_watcher(mock, Box::new(watcher)),
        Err(err) => warn!(?err, mock = %mock.name, "mappings watcher unavailable"),
    }
}

/// Restarts instances whose mappings changed. A save typically produces
/// a burst of events, so changes are drained for a settle window and
/// each affected instance restarts once.
fn reload_loop(
    manager: Arc<FleetManager>,
    targets: HashMap<Uuid, (Proxy, Mock)>,
    mappings_dir: PathBuf,
    reload_tx: mpsc::Sender<ReloadEvent>,
    reload_rx: mpsc::Receiver<ReloadEvent>,
) {
    while let Ok(event) = reload_rx.recv() {
        let mut pending: HashSet<Uuid> = HashSet::new();
        pending.insert(event.mock_id);
        while let Ok(more) = reload_rx.recv_timeout(Duration::from_millis(500)) {
            pending.insert(more.mock_id);
        }

        for id in pending {
            let Some((proxy, mock)) = targets.get(&id) else {
                continue;
            };
            info!(mock = %mock.name, "mappings changed; restarting instance");
            match manager.play(proxy, mock, false, sink_from(std::io::stdout())) {
                // Restart tears the old watcher down with the old
                // instance, so attach a fresh one.
                Ok(()) => attach_watcher(&manager, &mappings_dir, proxy, mock, &reload_tx),
                Err(err) => warn!(%err, mock = %mock.name, "restart failed"),
            }
        }
    }
}
