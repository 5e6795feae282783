pub mod dijkstra;
pub mod heap;

pub use dijkstra::{UNREACHABLE, calculate_shortest_paths};
pub use heap::IndexedMinHeap;
