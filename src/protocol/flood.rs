use crate::network::Topology;
use crate::protocol::lsa::{self, Lsa, LsaBuffer};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Sequence number is not the next expected one for an existing link.
    Stale,
    NegativeCost,
    SelfLink,
    /// A label could not be admitted to a full topology.
    Capacity,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Stale => write!(f, "stale sequence number"),
            RejectReason::NegativeCost => write!(f, "negative cost"),
            RejectReason::SelfLink => write!(f, "source equals destination"),
            RejectReason::Capacity => write!(f, "router capacity exhausted"),
        }
    }
}

/// Terminal state of one advertisement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloodOutcome {
    Rejected(RejectReason),
    /// Applied, but the hop count reached zero.
    Dropped,
    /// Applied; the buffer carries the decremented hop count.
    Forward(LsaBuffer),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloodStats {
    pub received: u64,
    pub rejected: u64,
    pub dropped: u64,
    pub forwarded: u64,
}

#[derive(Debug, Default)]
pub struct FloodController {
    stats: FloodStats,
}

impl FloodController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> FloodStats {
        self.stats
    }

    /// Applies `buffer` to the topology and decides whether it travels on.
    pub fn handle(&mut self, topology: &mut Topology, mut buffer: LsaBuffer) -> FloodOutcome {
        self.stats.received += 1;
        let advertisement = Lsa::decode(&buffer);

        let outcome = match Self::apply(topology, &advertisement) {
            Err(reason) => FloodOutcome::Rejected(reason),
            Ok(()) => {
                if lsa::decrement_hop(&mut buffer) > 0 {
                    FloodOutcome::Forward(buffer)
                } else {
                    FloodOutcome::Dropped
                }
            }
        };

        match outcome {
            FloodOutcome::Rejected(reason) => {
                self.stats.rejected += 1;
                debug!(lsa = %advertisement, %reason, "advertisement rejected");
            }
            FloodOutcome::Dropped => {
                self.stats.dropped += 1;
                debug!(lsa = %advertisement, "advertisement applied, hop count exhausted");
            }
            FloodOutcome::Forward(_) => {
                self.stats.forwarded += 1;
                debug!(lsa = %advertisement, "advertisement applied, flooding");
            }
        }
        outcome
    }

    fn apply(topology: &mut Topology, advertisement: &Lsa) -> Result<(), RejectReason> {
        if advertisement.source == advertisement.destination {
            return Err(RejectReason::SelfLink);
        }
        let Ok(cost) = u32::try_from(advertisement.cost) else {
            warn!(lsa = %advertisement, "advertisement with negative cost ignored");
            return Err(RejectReason::NegativeCost);
        };

        match topology.upsert_link(advertisement.source, advertisement.destination, cost, advertisement.sequence) {
            Ok(true) => Ok(()),
            Ok(false) => Err(RejectReason::Stale),
            Err(e) => {
                warn!(lsa = %advertisement, "{}", e);
                Err(RejectReason::Capacity)
            }
        }
    }
}
