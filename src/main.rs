use anyhow::{Context, Result, bail};
use clap::Parser;
use lsrouted::network::load_neighbors;
use lsrouted::node::start_node;
use lsrouted::{Label, NodeConfig, NodeContext};
use std::path::PathBuf;
use tokio::net::UdpSocket;
use tokio::runtime::Builder;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lsrouted", about = "Link-state routing node")]
struct Cli {
    /// Label of the local router (single ASCII character)
    label: char,

    /// Local UDP port
    port: u16,

    /// Total number of routers in the network
    router_count: usize,

    /// Neighbor discovery file (label,host,port,cost per line)
    discovery_file: PathBuf,

    /// Periodically change the cost of a random local link
    #[arg(long)]
    dynamic: bool,

    /// JSON file with node settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Delay before processing advertisements, so the other routers can start
    #[arg(long)]
    startup_delay_ms: Option<u64>,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let Some(label) = Label::from_char(cli.label) else {
        bail!("router label must be an ASCII character, got {:?}", cli.label);
    };
    if cli.router_count == 0 {
        bail!("router count must be at least 1");
    }

    let mut config = match &cli.config {
        Some(path) => NodeConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => NodeConfig::default(),
    };
    if let Some(delay) = cli.startup_delay_ms {
        config.startup_delay_ms = delay;
    }

    let rt = Builder::new_multi_thread().enable_all().build()?;

    rt.block_on(async {
        let neighbors = load_neighbors(&cli.discovery_file).await?;
        let socket = UdpSocket::bind(("0.0.0.0", cli.port))
            .await
            .with_context(|| format!("binding UDP port {}", cli.port))?;

        let ctx = NodeContext::new(label, config, neighbors);
        let node = start_node(ctx, cli.router_count, socket, cli.dynamic)?;

        tokio::signal::ctrl_c().await?;
        info!("Shutting down router {}", label);
        node.shutdown().await;
        Ok::<(), anyhow::Error>(())
    })
}
