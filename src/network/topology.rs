use crate::Label;
use crate::error::TopologyError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Directed adjacency entry, owned by its source node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub to: usize,
    pub cost: u32,
    pub sequence: u8,
}

/// Label-keyed view of a link, for consumers outside the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkState {
    pub destination: Label,
    pub cost: u32,
    pub sequence: u8,
}

#[derive(Debug, Clone)]
struct RouterNode {
    label: Label,
    links: Vec<Link>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upsert {
    Created,
    Updated,
    Stale,
}

#[derive(Debug, Clone)]
pub struct Topology {
    capacity: usize,
    undirected: bool,
    nodes: Vec<RouterNode>,
    index: HashMap<Label, usize>,
    dirty: bool,
}

impl Topology {
    pub fn new(capacity: usize, undirected: bool) -> Self {
        Self {
            capacity,
            undirected,
            nodes: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
            dirty: false,
        }
    }

    pub fn index_of(&self, label: Label) -> Option<usize> {
        self.index.get(&label).copied()
    }

    /// First-come mapping; indices are dense and never reassigned.
    pub fn assign_index(&mut self, label: Label) -> Result<usize, TopologyError> {
        if let Some(index) = self.index_of(label) {
            return Ok(index);
        }
        if self.nodes.len() >= self.capacity {
            return Err(TopologyError::CapacityExhausted {
                label,
                capacity: self.capacity,
            });
        }

        let index = self.nodes.len();
        self.nodes.push(RouterNode {
            label,
            links: Vec::new(),
        });
        self.index.insert(label, index);
        Ok(index)
    }

    /// Creates or advances the link `source -> destination` (and its mirror
    /// when the store is undirected).
    ///
    /// An existing link only accepts `sequence == current + 1 (mod 256)`.
    /// The mirror is checked independently: a stale reverse entry is left as
    /// is while the forward entry still counts as applied.
    pub fn upsert_link(
        &mut self,
        source: Label,
        destination: Label,
        cost: u32,
        sequence: u8,
    ) -> Result<bool, TopologyError> {
        let mut missing = usize::from(self.index_of(source).is_none());
        if destination != source && self.index_of(destination).is_none() {
            missing += 1;
        }
        if self.nodes.len() + missing > self.capacity {
            let label = if self.index_of(source).is_none() { source } else { destination };
            return Err(TopologyError::CapacityExhausted {
                label,
                capacity: self.capacity,
            });
        }

        let from = self.assign_index(source)?;
        let to = self.assign_index(destination)?;

        match self.upsert_directed(from, to, cost, sequence) {
            Upsert::Stale => {
                debug!(%source, %destination, sequence, "stale link update discarded");
                return Ok(false);
            }
            Upsert::Created | Upsert::Updated => self.dirty = true,
        }

        if self.undirected && from != to && self.upsert_directed(to, from, cost, sequence) == Upsert::Stale {
            debug!(source = %destination, destination = %source, sequence, "reverse entry out of sequence, left unchanged");
        }

        Ok(true)
    }

    fn upsert_directed(&mut self, from: usize, to: usize, cost: u32, sequence: u8) -> Upsert {
        let links = &mut self.nodes[from].links;
        match links.iter_mut().find(|link| link.to == to) {
            None => {
                links.push(Link { to, cost, sequence });
                Upsert::Created
            }
            Some(link) if link.sequence.wrapping_add(1) == sequence => {
                link.cost = cost;
                link.sequence = sequence;
                Upsert::Updated
            }
            Some(_) => Upsert::Stale,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns the dirty flag and clears it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn get_neighbors(&self, index: usize) -> &[Link] {
        self.nodes.get(index).map(|node| node.links.as_slice()).unwrap_or(&[])
    }

    pub fn label_of(&self, index: usize) -> Option<Label> {
        self.nodes.get(index).map(|node| node.label)
    }

    pub fn link(&self, source: Label, destination: Label) -> Option<LinkState> {
        let from = self.index_of(source)?;
        let to = self.index_of(destination)?;
        self.nodes[from]
            .links
            .iter()
            .find(|link| link.to == to)
            .map(|link| self.link_state(link))
    }

    pub fn links_from(&self, source: Label) -> Vec<LinkState> {
        self.index_of(source)
            .map(|from| {
                self.nodes[from]
                    .links
                    .iter()
                    .map(|link| self.link_state(link))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn link_state(&self, link: &Link) -> LinkState {
        LinkState {
            destination: self.nodes[link.to].label,
            cost: link.cost,
            sequence: link.sequence,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.nodes.iter().map(|node| node.links.len()).sum()
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            writeln!(f, "Vertex '{}' connects to:", node.label)?;
            for link in &node.links {
                writeln!(f, "\t'{}' at a cost of {}", self.nodes[link.to].label, link.cost)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(c: char) -> Label {
        Label::from_char(c).unwrap()
    }

    #[test]
    fn test_index_assignment_is_first_come() {
        let mut topology = Topology::new(3, true);
        assert_eq!(topology.index_of(l('C')), None);
        assert_eq!(topology.assign_index(l('C')).unwrap(), 0);
        assert_eq!(topology.assign_index(l('A')).unwrap(), 1);
        assert_eq!(topology.assign_index(l('C')).unwrap(), 0);
        assert_eq!(topology.label_of(1), Some(l('A')));
    }

    #[test]
    fn test_capacity_exhausted_leaves_state_intact() {
        let mut topology = Topology::new(2, true);
        assert!(topology.upsert_link(l('A'), l('B'), 4, 0).unwrap());
        topology.take_dirty();

        let err = topology.upsert_link(l('A'), l('C'), 1, 0).unwrap_err();
        assert_eq!(err, TopologyError::CapacityExhausted { label: l('C'), capacity: 2 });
        assert_eq!(topology.node_count(), 2);
        assert_eq!(topology.link_count(), 2);
        assert!(!topology.is_dirty());

        // Neither endpoint is known: nothing may be admitted half way.
        let mut topology = Topology::new(3, true);
        topology.assign_index(l('A')).unwrap();
        topology.assign_index(l('B')).unwrap();
        assert!(topology.upsert_link(l('X'), l('Y'), 1, 0).is_err());
        assert_eq!(topology.index_of(l('X')), None);
        assert_eq!(topology.node_count(), 2);
    }

    #[test]
    fn test_new_link_is_mirrored_and_marks_dirty() {
        let mut topology = Topology::new(4, true);
        assert!(topology.upsert_link(l('A'), l('B'), 5, 0).unwrap());
        assert!(topology.is_dirty());
        assert_eq!(topology.link(l('A'), l('B')), Some(LinkState { destination: l('B'), cost: 5, sequence: 0 }));
        assert_eq!(topology.link(l('B'), l('A')), Some(LinkState { destination: l('A'), cost: 5, sequence: 0 }));
        assert!(topology.take_dirty());
        assert!(!topology.is_dirty());
    }

    #[test]
    fn test_directed_store_does_not_mirror() {
        let mut topology = Topology::new(4, false);
        assert!(topology.upsert_link(l('A'), l('B'), 5, 0).unwrap());
        assert!(topology.link(l('B'), l('A')).is_none());
        assert_eq!(topology.link_count(), 1);
    }

    #[test]
    fn test_sequence_gating() {
        let mut topology = Topology::new(4, true);
        topology.upsert_link(l('A'), l('B'), 5, 10).unwrap();
        topology.take_dirty();

        for stale in [10u8, 9, 12, 0, 255] {
            assert!(!topology.upsert_link(l('A'), l('B'), 99, stale).unwrap());
        }
        assert_eq!(topology.link(l('A'), l('B')).unwrap().cost, 5);
        assert!(!topology.is_dirty());

        assert!(topology.upsert_link(l('A'), l('B'), 7, 11).unwrap());
        assert!(topology.is_dirty());
        let link = topology.link(l('A'), l('B')).unwrap();
        assert_eq!((link.cost, link.sequence), (7, 11));
        assert_eq!(topology.link(l('B'), l('A')).unwrap().cost, 7);
    }

    #[test]
    fn test_sequence_wraps_at_256() {
        let mut topology = Topology::new(4, true);
        topology.upsert_link(l('A'), l('B'), 5, 255).unwrap();
        assert!(!topology.upsert_link(l('A'), l('B'), 6, 255).unwrap());
        assert!(topology.upsert_link(l('A'), l('B'), 6, 0).unwrap());
        assert_eq!(topology.link(l('A'), l('B')).unwrap().sequence, 0);
    }

    #[test]
    fn test_stale_reverse_entry_left_unchanged() {
        let mut topology = Topology::new(4, true);
        topology.upsert_link(l('A'), l('B'), 5, 0).unwrap();
        // Advance only the reverse direction's sequence by a directed view.
        topology.undirected = false;
        topology.upsert_link(l('B'), l('A'), 6, 1).unwrap();
        topology.undirected = true;

        assert!(topology.upsert_link(l('A'), l('B'), 8, 1).unwrap());
        assert_eq!(topology.link(l('A'), l('B')).unwrap().cost, 8);
        let reverse = topology.link(l('B'), l('A')).unwrap();
        assert_eq!((reverse.cost, reverse.sequence), (6, 1));
    }

    #[test]
    fn test_display_dump() {
        let mut topology = Topology::new(4, true);
        topology.upsert_link(l('A'), l('B'), 5, 0).unwrap();
        let dump = topology.to_string();
        assert!(dump.contains("Vertex 'A' connects to:\n\t'B' at a cost of 5\n"));
        assert!(dump.contains("Vertex 'B' connects to:\n\t'A' at a cost of 5\n"));
    }
}
