//! Fixed-size link-state advertisement.
//!
//! ```text
//! offset  size  field
//!      0     1  hop count        (mod 256)
//!      1     1  sequence number  (mod 256)
//!      2     1  source label     (ASCII)
//!      3     1  destination label(ASCII)
//!      4     4  cost             (i32, big-endian)
//! ```

use crate::Label;
use std::fmt;

pub const LSA_SIZE: usize = 8;

pub type LsaBuffer = [u8; LSA_SIZE];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lsa {
    pub hop_count: u8,
    pub sequence: u8,
    pub source: Label,
    pub destination: Label,
    pub cost: i32,
}

impl Lsa {
    pub fn new(hop_count: u8, sequence: u8, source: Label, destination: Label, cost: i32) -> Self {
        Self {
            hop_count,
            sequence,
            source,
            destination,
            cost,
        }
    }

    pub fn encode(&self) -> LsaBuffer {
        let mut buf = [0u8; LSA_SIZE];
        buf[0] = self.hop_count;
        buf[1] = self.sequence;
        buf[2] = self.source.as_byte();
        buf[3] = self.destination.as_byte();
        buf[4..8].copy_from_slice(&self.cost.to_be_bytes());
        buf
    }

    pub fn decode(buf: &LsaBuffer) -> Self {
        Self {
            hop_count: buf[0],
            sequence: buf[1],
            source: Label(buf[2]),
            destination: Label(buf[3]),
            cost: i32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
        }
    }

    /// Accepts only datagrams of exactly [`LSA_SIZE`] bytes.
    pub fn from_datagram(datagram: &[u8]) -> Option<LsaBuffer> {
        <LsaBuffer>::try_from(datagram).ok()
    }
}

impl fmt::Display for Lsa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{} cost {} seq {} hops {}",
            self.source, self.destination, self.cost, self.sequence, self.hop_count
        )
    }
}

/// Builds a buffer, wrapping hop count and sequence number to 8 bits.
pub fn encode(hop_count: u32, sequence: u32, source: Label, destination: Label, cost: i32) -> LsaBuffer {
    Lsa::new((hop_count % 256) as u8, (sequence % 256) as u8, source, destination, cost).encode()
}

pub fn decode(buf: &LsaBuffer) -> Lsa {
    Lsa::decode(buf)
}

/// Decrements the hop count in place and returns the new value.
///
/// A buffer already at zero stays at zero, so it can never be re-flooded.
pub fn decrement_hop(buf: &mut LsaBuffer) -> u8 {
    buf[0] = buf[0].saturating_sub(1);
    buf[0]
}
