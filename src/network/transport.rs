use crate::network::Neighbor;
use crate::node::NodeContext;
use crate::protocol::{Lsa, LsaBuffer};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Larger than any advertisement so oversized datagrams are detected.
const RECV_BUFFER_SIZE: usize = 64;

/// Sends one advertisement to every neighbor as a single datagram.
/// Returns how many sends succeeded; a failing neighbor does not stop the rest.
pub async fn flood_packet(socket: &UdpSocket, packet: &LsaBuffer, neighbors: &[Neighbor]) -> usize {
    let mut sent = 0;
    for neighbor in neighbors {
        match socket.send_to(packet, neighbor.addr).await {
            Ok(_) => sent += 1,
            Err(e) => warn!("Failed to send advertisement to {} ({}): {}", neighbor.label, neighbor.addr, e),
        }
    }
    sent
}

/// Network side of the node: flushes the outbound queue to every neighbor
/// and feeds received advertisements to the inbound queue.
pub async fn network_task(socket: UdpSocket, ctx: Arc<NodeContext>, mut shutdown_rx: broadcast::Receiver<()>) {
    let receive_timeout = ctx.config.receive_timeout();
    let mut buf = [0u8; RECV_BUFFER_SIZE];

    info!("Network task started for {}", ctx.label);

    loop {
        while let Some(packet) = ctx.outbound.try_pop() {
            let sent = flood_packet(&socket, &packet, &ctx.neighbors).await;
            debug!(lsa = %Lsa::decode(&packet), sent, "flooded");
        }

        tokio::select! {
            _ = shutdown_rx.recv() => {
                debug!("Network task shutting down");
                break;
            }
            _ = ctx.outbound.notified() => {}
            received = timeout(receive_timeout, socket.recv_from(&mut buf)) => {
                match received {
                    Err(_) => {}
                    Ok(Ok((len, from))) => match Lsa::from_datagram(&buf[..len]) {
                        Some(packet) => ctx.inbound.push(packet),
                        None => debug!("Ignoring {} byte datagram from {}", len, from),
                    },
                    Ok(Err(e)) => warn!("Failed to receive datagram: {}", e),
                }
            }
        }
    }
}
