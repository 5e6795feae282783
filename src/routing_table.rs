use crate::Label;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub destination: Label,
    pub cost: u64,
    /// First hop on the best known path; `None` for the local router.
    pub next_hop: Option<Label>,
}

/// Best known cost and first hop per reachable destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Route>", into = "Vec<Route>")]
pub struct ForwardingTable {
    entries: BTreeMap<Label, Route>,
}

impl ForwardingTable {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn add_route(&mut self, route: Route) {
        self.entries.insert(route.destination, route);
    }

    pub fn get_route(&self, destination: Label) -> Option<&Route> {
        self.entries.get(&destination)
    }

    pub fn next_hop(&self, destination: Label) -> Option<Label> {
        self.get_route(destination).and_then(|route| route.next_hop)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Routes ordered by destination label.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.entries.values()
    }
}

impl From<Vec<Route>> for ForwardingTable {
    fn from(routes: Vec<Route>) -> Self {
        let mut table = Self::new();
        for route in routes {
            table.add_route(route);
        }
        table
    }
}

impl From<ForwardingTable> for Vec<Route> {
    fn from(table: ForwardingTable) -> Self {
        table.entries.into_values().collect()
    }
}

impl fmt::Display for ForwardingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<6} {:>6} {:<8}", "Dest", "Cost", "Next Hop")?;
        writeln!(f, "{}", "-".repeat(22))?;
        for route in self.iter() {
            let next_hop = route
                .next_hop
                .map(|hop| hop.to_string())
                .unwrap_or_else(|| "-".to_string());
            writeln!(f, "{:<6} {:>6} {:<8}", route.destination, route.cost, next_hop)?;
        }
        Ok(())
    }
}
