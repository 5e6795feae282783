pub mod algorithms;
pub mod config;
pub mod error;
pub mod network;
pub mod node;
pub mod protocol;
pub mod routing_table;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Single-character router label as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Label(pub u8);

impl Label {
    pub fn from_char(c: char) -> Option<Self> {
        if c.is_ascii() {
            Some(Self(c as u8))
        } else {
            None
        }
    }

    pub fn as_byte(self) -> u8 {
        self.0
    }
}

impl From<u8> for Label {
    fn from(byte: u8) -> Self {
        Self(byte)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&char::from(self.0), f)
    }
}

pub use config::NodeConfig;
pub use network::{Neighbor, Topology};
pub use node::{NodeContext, NodeHandle, RoutingSnapshot};
pub use protocol::{FloodController, FloodOutcome, Lsa};
pub use routing_table::{ForwardingTable, Route};
