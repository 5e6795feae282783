//! Node orchestration: the shared context handed to every task, the node
//! loop that owns the topology, and the startup / shutdown of the tasks.

pub mod dynamic;
pub mod queue;

pub use queue::TransferQueue;

use crate::Label;
use crate::algorithms::calculate_shortest_paths;
use crate::config::NodeConfig;
use crate::network::transport::network_task;
use crate::network::{LinkState, Neighbor, Topology};
use crate::protocol::{FloodController, FloodOutcome, FloodStats, Lsa};
use crate::routing_table::ForwardingTable;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// State shared by the network, node-loop and dynamic tasks.
///
/// Everything here is either immutable after startup or internally
/// synchronized; the topology is not part of it.
#[derive(Debug)]
pub struct NodeContext {
    pub label: Label,
    pub config: NodeConfig,
    pub neighbors: Vec<Neighbor>,
    /// Network task -> node loop.
    pub inbound: TransferQueue,
    /// Node loop -> network task.
    pub outbound: TransferQueue,
}

impl NodeContext {
    pub fn new(label: Label, config: NodeConfig, neighbors: Vec<Neighbor>) -> Self {
        Self {
            label,
            config,
            neighbors,
            inbound: TransferQueue::new(),
            outbound: TransferQueue::new(),
        }
    }

    /// Queues one advertisement per neighbor for the local links, so they
    /// enter the topology through the flood controller like any other.
    pub fn queue_neighbors(&self) {
        for neighbor in &self.neighbors {
            let lsa = Lsa::new(
                self.config.initial_hop_count,
                0,
                self.label,
                neighbor.label,
                i32::try_from(neighbor.cost).unwrap_or(i32::MAX),
            );
            self.inbound.push(lsa.encode());
        }
    }
}

/// Result of one shortest-path recomputation.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingSnapshot {
    pub router: Label,
    /// Number of recomputations so far; 0 until the first one.
    pub generation: u64,
    pub computed_at: DateTime<Utc>,
    pub table: ForwardingTable,
    pub local_links: Vec<LinkState>,
    pub flood_stats: FloodStats,
}

impl RoutingSnapshot {
    fn initial(router: Label) -> Self {
        Self {
            router,
            generation: 0,
            computed_at: Utc::now(),
            table: ForwardingTable::new(),
            local_links: Vec::new(),
            flood_stats: FloodStats::default(),
        }
    }
}

/// Owner of the topology: drains the inbound queue through the flood
/// controller and recomputes routes once the queue runs dry.
pub struct NodeLoop {
    ctx: Arc<NodeContext>,
    topology: Topology,
    flood: FloodController,
    generation: u64,
    publisher: watch::Sender<RoutingSnapshot>,
}

impl NodeLoop {
    pub fn new(ctx: Arc<NodeContext>, router_count: usize) -> (Self, watch::Receiver<RoutingSnapshot>) {
        let (publisher, snapshots) = watch::channel(RoutingSnapshot::initial(ctx.label));
        let topology = Topology::new(router_count, ctx.config.undirected);
        let node = Self {
            ctx,
            topology,
            flood: FloodController::new(),
            generation: 0,
            publisher,
        };
        (node, snapshots)
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Processes everything currently queued, then recomputes if the
    /// topology changed. Returns whether a recomputation ran.
    pub fn process_pending(&mut self) -> bool {
        while let Some(packet) = self.ctx.inbound.try_pop() {
            if let FloodOutcome::Forward(packet) = self.flood.handle(&mut self.topology, packet) {
                self.ctx.outbound.push(packet);
            }
        }

        if !self.topology.take_dirty() {
            return false;
        }
        self.recompute();
        true
    }

    fn recompute(&mut self) {
        let table = calculate_shortest_paths(&self.topology, self.ctx.label);
        self.generation += 1;

        info!("Forwarding table for {} (#{}):\n{}", self.ctx.label, self.generation, table);
        debug!("Topology:\n{}", self.topology);

        let snapshot = RoutingSnapshot {
            router: self.ctx.label,
            generation: self.generation,
            computed_at: Utc::now(),
            table,
            local_links: self.topology.links_from(self.ctx.label),
            flood_stats: self.flood.stats(),
        };
        self.publisher.send_replace(snapshot);
    }

    pub async fn run(mut self, mut shutdown_rx: broadcast::Receiver<()>) {
        info!("Node loop started for {}", self.ctx.label);
        loop {
            self.process_pending();

            tokio::select! {
                _ = shutdown_rx.recv() => {
                    debug!("Node loop shutting down");
                    break;
                }
                _ = self.ctx.inbound.notified() => {}
            }
        }
    }
}

/// Running node: task handles, the snapshot feed and the shutdown switch.
pub struct NodeHandle {
    local_addr: SocketAddr,
    snapshots: watch::Receiver<RoutingSnapshot>,
    shutdown_tx: broadcast::Sender<()>,
    handles: Vec<JoinHandle<()>>,
}

impl NodeHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn subscribe(&self) -> watch::Receiver<RoutingSnapshot> {
        self.snapshots.clone()
    }

    pub fn latest(&self) -> RoutingSnapshot {
        self.snapshots.borrow().clone()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Task terminated abnormally: {}", e);
            }
        }
    }
}

/// Starts the network task, the node loop and, if requested, the dynamic
/// cost changer on an already bound socket.
pub fn start_node(
    ctx: NodeContext,
    router_count: usize,
    socket: UdpSocket,
    dynamic: bool,
) -> std::io::Result<NodeHandle> {
    let local_addr = socket.local_addr()?;
    let ctx = Arc::new(ctx);
    let (shutdown_tx, _) = broadcast::channel(1);
    let (node_loop, snapshots) = NodeLoop::new(ctx.clone(), router_count);

    ctx.queue_neighbors();

    let mut handles = vec![
        start_network_task(socket, ctx.clone(), shutdown_tx.subscribe()),
        start_node_loop(node_loop, ctx.clone(), shutdown_tx.subscribe()),
    ];
    if dynamic {
        handles.push(start_dynamic_task(ctx.clone(), snapshots.clone(), shutdown_tx.subscribe()));
    }

    info!(
        "Router {} listening on {} with {} neighbors",
        ctx.label,
        local_addr,
        ctx.neighbors.len()
    );

    Ok(NodeHandle {
        local_addr,
        snapshots,
        shutdown_tx,
        handles,
    })
}

fn start_network_task(
    socket: UdpSocket,
    ctx: Arc<NodeContext>,
    shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        network_task(socket, ctx, shutdown_rx).await;
    })
}

fn start_node_loop(
    node_loop: NodeLoop,
    ctx: Arc<NodeContext>,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    let delay = ctx.config.startup_delay();
    tokio::spawn(async move {
        if !delay.is_zero() {
            info!("Waiting {:?} for the other routers to start", delay);
            tokio::select! {
                _ = shutdown_rx.recv() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        node_loop.run(shutdown_rx).await;
    })
}

fn start_dynamic_task(
    ctx: Arc<NodeContext>,
    snapshots: watch::Receiver<RoutingSnapshot>,
    shutdown_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        dynamic::dynamic_task(ctx, snapshots, shutdown_rx).await;
    })
}
