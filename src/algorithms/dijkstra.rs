use crate::Label;
use crate::algorithms::heap::IndexedMinHeap;
use crate::network::Topology;
use crate::routing_table::{ForwardingTable, Route};

/// Internal cost of a node no relaxation has reached yet.
pub const UNREACHABLE: u64 = u64::MAX;

/// Single-source Dijkstra over the topology, returning cost and first hop
/// for every node reachable from `source` (including `source` itself).
///
/// Extraction ties resolve to the lowest node index, and a node keeps the
/// first hop of the first relaxation that reached its final cost.
pub fn calculate_shortest_paths(topology: &Topology, source: Label) -> ForwardingTable {
    let mut table = ForwardingTable::new();
    let Some(src) = topology.index_of(source) else {
        table.add_route(Route {
            destination: source,
            cost: 0,
            next_hop: None,
        });
        return table;
    };

    let size = topology.node_count();
    let mut cost = vec![UNREACHABLE; size];
    let mut first_hop: Vec<Option<Label>> = vec![None; size];
    let mut heap = IndexedMinHeap::with_capacity(size);

    cost[src] = 0;
    for index in 0..size {
        heap.insert(index, cost[index]);
    }

    while let Some((u, cost_u)) = heap.extract_min() {
        // Everything still queued is unreachable as well.
        if cost_u == UNREACHABLE {
            break;
        }

        for link in topology.get_neighbors(u) {
            let v = link.to;
            if !heap.contains(v) {
                continue;
            }

            let candidate = cost_u + u64::from(link.cost);
            if candidate < cost[v] {
                cost[v] = candidate;
                first_hop[v] = if u == src {
                    topology.label_of(v)
                } else {
                    first_hop[u]
                };
                heap.decrease_or_increase(v, candidate);
            }
        }
    }

    for (index, &node_cost) in cost.iter().enumerate() {
        if node_cost == UNREACHABLE {
            continue;
        }
        if let Some(destination) = topology.label_of(index) {
            table.add_route(Route {
                destination,
                cost: node_cost,
                next_hop: first_hop[index],
            });
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(c: char) -> Label {
        Label::from_char(c).unwrap()
    }

    fn sample_topology() -> Topology {
        let mut topology = Topology::new(8, true);
        for (a, b, cost) in [('D', 'C', 2), ('D', 'B', 11), ('C', 'B', 3), ('A', 'B', 5), ('C', 'A', 10)] {
            topology.upsert_link(l(a), l(b), cost, 0).unwrap();
        }
        topology
    }

    fn row(table: &ForwardingTable, dest: char) -> (u64, Option<Label>) {
        let route = table.get_route(l(dest)).unwrap();
        (route.cost, route.next_hop)
    }

    #[test]
    fn test_routes_from_a() {
        let table = calculate_shortest_paths(&sample_topology(), l('A'));
        assert_eq!(table.len(), 4);
        assert_eq!(row(&table, 'A'), (0, None));
        assert_eq!(row(&table, 'B'), (5, Some(l('B'))));
        assert_eq!(row(&table, 'C'), (8, Some(l('B'))));
        assert_eq!(row(&table, 'D'), (10, Some(l('B'))));
    }

    #[test]
    fn test_routes_from_d() {
        let table = calculate_shortest_paths(&sample_topology(), l('D'));
        assert_eq!(row(&table, 'D'), (0, None));
        assert_eq!(row(&table, 'C'), (2, Some(l('C'))));
        assert_eq!(row(&table, 'B'), (5, Some(l('C'))));
        assert_eq!(row(&table, 'A'), (10, Some(l('C'))));
    }

    #[test]
    fn test_unreachable_nodes_are_omitted() {
        let mut topology = sample_topology();
        topology.upsert_link(l('X'), l('Y'), 1, 0).unwrap();
        let table = calculate_shortest_paths(&topology, l('A'));
        assert!(table.get_route(l('X')).is_none());
        assert!(table.get_route(l('Y')).is_none());
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_directed_links_respected() {
        let mut topology = Topology::new(4, false);
        topology.upsert_link(l('A'), l('B'), 1, 0).unwrap();
        topology.upsert_link(l('B'), l('C'), 1, 0).unwrap();
        topology.upsert_link(l('C'), l('A'), 1, 0).unwrap();

        let table = calculate_shortest_paths(&topology, l('B'));
        assert_eq!(row(&table, 'A'), (2, Some(l('C'))));
        assert_eq!(row(&table, 'C'), (1, Some(l('C'))));
    }

    #[test]
    fn test_equal_cost_tie_is_deterministic() {
        // A reaches D at cost 2 through both B and C; B has the lower index
        // and is extracted first, so it relaxes D first.
        let mut topology = Topology::new(4, true);
        topology.upsert_link(l('A'), l('B'), 1, 0).unwrap();
        topology.upsert_link(l('A'), l('C'), 1, 0).unwrap();
        topology.upsert_link(l('C'), l('D'), 1, 0).unwrap();
        topology.upsert_link(l('B'), l('D'), 1, 0).unwrap();

        for _ in 0..10 {
            let table = calculate_shortest_paths(&topology, l('A'));
            assert_eq!(row(&table, 'D'), (2, Some(l('B'))));
        }
    }

    #[test]
    fn test_unknown_source_yields_only_itself() {
        let table = calculate_shortest_paths(&sample_topology(), l('Z'));
        assert_eq!(table.len(), 1);
        assert_eq!(row(&table, 'Z'), (0, None));
    }

    #[test]
    fn test_large_costs_do_not_overflow() {
        let mut topology = Topology::new(3, true);
        topology.upsert_link(l('A'), l('B'), u32::MAX, 0).unwrap();
        topology.upsert_link(l('B'), l('C'), u32::MAX, 0).unwrap();
        let table = calculate_shortest_paths(&topology, l('A'));
        assert_eq!(row(&table, 'C').0, 2 * u64::from(u32::MAX));
    }
}
