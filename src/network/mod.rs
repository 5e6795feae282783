pub mod discovery;
pub mod topology;
pub mod transport;

pub use discovery::{Neighbor, load_neighbors};
pub use topology::{LinkState, Topology};
pub use transport::flood_packet;
