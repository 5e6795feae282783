use crate::Label;
use crate::config::NodeConfig;
use crate::network::LinkState;
use crate::node::{NodeContext, RoutingSnapshot};
use crate::protocol::Lsa;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::time::{Instant, interval_at};
use tracing::{debug, info};

/// Picks one local link and builds the advertisement that moves its cost by
/// up to `dynamic_cost_jitter` in either direction, never below
/// `minimum_cost`. The sequence number is the link's next one.
pub fn plan_cost_change<R: Rng>(
    rng: &mut R,
    local: Label,
    local_links: &[LinkState],
    config: &NodeConfig,
) -> Option<(LinkState, Lsa)> {
    if local_links.is_empty() {
        return None;
    }

    let link = local_links[rng.gen_range(0..local_links.len())];
    let jitter = i64::from(config.dynamic_cost_jitter);
    let delta = rng.gen_range(-jitter..=jitter);
    let cost = (i64::from(link.cost) + delta)
        .max(i64::from(config.minimum_cost))
        .min(i64::from(i32::MAX));

    let lsa = Lsa::new(
        config.initial_hop_count,
        link.sequence.wrapping_add(1),
        local,
        link.destination,
        cost as i32,
    );
    Some((link, lsa))
}

/// Periodically injects a cost change for a random local link.
///
/// Waits for the first published routing snapshot, and only ever reads link
/// state from snapshots; the topology stays owned by the node loop.
pub async fn dynamic_task(
    ctx: Arc<NodeContext>,
    mut snapshots: watch::Receiver<RoutingSnapshot>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    tokio::select! {
        _ = shutdown_rx.recv() => return,
        first = snapshots.wait_for(|snapshot| snapshot.generation > 0) => {
            if first.is_err() {
                return;
            }
        }
    }

    let period = ctx.config.dynamic_interval();
    let mut ticker = interval_at(Instant::now() + period, period);
    let mut rng = StdRng::from_entropy();

    info!("Dynamic cost changes enabled every {:?}", period);

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                debug!("Dynamic task shutting down");
                break;
            }
            _ = ticker.tick() => {
                let local_links = snapshots.borrow().local_links.clone();
                if let Some((link, lsa)) = plan_cost_change(&mut rng, ctx.label, &local_links, &ctx.config) {
                    info!(
                        "Changing cost to reach {} from {} to {}",
                        link.destination, link.cost, lsa.cost
                    );
                    ctx.inbound.push(lsa.encode());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn link(dest: u8, cost: u32, sequence: u8) -> LinkState {
        LinkState { destination: Label(dest), cost, sequence }
    }

    #[test]
    fn test_no_links_no_change() {
        let mut rng = StdRng::seed_from_u64(3);
        assert!(plan_cost_change(&mut rng, Label(b'A'), &[], &NodeConfig::default()).is_none());
    }

    #[test]
    fn test_change_stays_in_bounds_and_advances_sequence() {
        let mut rng = StdRng::seed_from_u64(3);
        let config = NodeConfig::default();
        let links = [link(b'B', 3, 0), link(b'C', 20, 255)];

        for _ in 0..500 {
            let (chosen, lsa) = plan_cost_change(&mut rng, Label(b'A'), &links, &config).unwrap();
            assert_eq!(lsa.source, Label(b'A'));
            assert_eq!(lsa.destination, chosen.destination);
            assert_eq!(lsa.hop_count, config.initial_hop_count);
            assert_eq!(lsa.sequence, chosen.sequence.wrapping_add(1));
            assert!(lsa.cost >= 1);
            assert!((i64::from(lsa.cost) - i64::from(chosen.cost)).abs() <= 4 || lsa.cost == 1);
        }
    }

    #[test]
    fn test_cost_clamped_to_minimum() {
        let mut rng = StdRng::seed_from_u64(9);
        let config = NodeConfig { minimum_cost: 2, ..NodeConfig::default() };
        for _ in 0..200 {
            let (_, lsa) = plan_cost_change(&mut rng, Label(b'A'), &[link(b'B', 1, 4)], &config).unwrap();
            assert!((2..=5).contains(&lsa.cost));
            assert_eq!(lsa.sequence, 5);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_waits_for_first_snapshot_then_injects() {
        let config = NodeConfig { minimum_cost: 3, ..NodeConfig::default() };
        let ctx = Arc::new(NodeContext::new(Label(b'A'), config, Vec::new()));
        let (publisher, snapshots) = watch::channel(RoutingSnapshot::initial(Label(b'A')));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let task = tokio::spawn(dynamic_task(ctx.clone(), snapshots, shutdown_rx));

        // Several periods pass with no routing table published yet.
        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(ctx.inbound.is_empty());

        publisher.send_replace(RoutingSnapshot {
            generation: 1,
            local_links: vec![link(b'B', 1, 3)],
            ..RoutingSnapshot::initial(Label(b'A'))
        });
        tokio::time::sleep(ctx.config.dynamic_interval() + Duration::from_secs(1)).await;

        let lsa = Lsa::decode(&ctx.inbound.try_pop().expect("no cost change injected"));
        assert_eq!(lsa.source, Label(b'A'));
        assert_eq!(lsa.destination, Label(b'B'));
        assert_eq!(lsa.sequence, 4);
        assert_eq!(lsa.hop_count, ctx.config.initial_hop_count);
        assert!((3..=5).contains(&lsa.cost));
        assert!(ctx.inbound.is_empty());

        shutdown_tx.send(()).unwrap();
        task.await.unwrap();
    }
}
