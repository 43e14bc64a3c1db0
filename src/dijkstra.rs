//! Single-source shortest paths over the road network.
//!
//! Two cost models share one loop:
//! - The real one, where flooded edges need a kit and a kit slows you down.
//! - An optimistic one, where everything is passable at the cheaper of the two
//!   speeds. It lower-bounds the real one whatever the equipment.

use crate::cost::Time;
use crate::cost::UNREACHABLE;
use crate::data_structures::open_list::OpenList;
use crate::graph::Edge;
use crate::graph::Graph;
use crate::graph::VertexId;

/// The ranking tuple for Dijkstra
///
/// We prefer lower g-values, and tie break for lower vertex ids so the
/// expansion order is reproducible.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct DijkstraRank {
    g: Time,
    vertex: VertexId,
}

/// Result of `shortest_paths`.
///
/// Indexed by vertex id; unreachable vertices have `UNREACHABLE` distance and
/// an empty path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortestPaths {
    start: VertexId,
    distances: Vec<Time>,
    predecessors: Vec<Option<VertexId>>,
}

impl ShortestPaths {
    pub fn distance(&self, v: VertexId) -> Time {
        self.distances.get(v as usize).copied().unwrap_or(UNREACHABLE)
    }

    pub fn reachable(&self, v: VertexId) -> bool {
        self.distance(v) != UNREACHABLE
    }

    /// Vertices from `start` to `v`, both included.
    pub fn path(&self, v: VertexId) -> Vec<VertexId> {
        if !self.reachable(v) {
            return vec![];
        }
        let mut path = vec![v];
        let mut current = v;
        while let Some(p) = self.predecessors[current as usize] {
            debug_assert!(path.len() < self.distances.len(), "Predecessor cycle");
            path.push(p);
            current = p;
        }
        path.reverse();
        debug_assert_eq!(path.first(), Some(&self.start));
        path
    }

    /// `(distance, path)` for every vertex, by increasing vertex id.
    pub fn routes(&self) -> impl Iterator<Item = (VertexId, Time, Vec<VertexId>)> + '_ {
        (1..self.distances.len() as VertexId).map(|v| (v, self.distance(v), self.path(v)))
    }
}

/// Shortest paths under the real cost model.
///
/// Flooded edges are skipped unless `equipped`, and every edge costs
/// `weight * speed_factor` when `equipped`. Among equally short routes to a
/// vertex, the one arriving from the lower-numbered predecessor wins.
pub fn shortest_paths(
    graph: &Graph,
    start: VertexId,
    equipped: bool,
    speed_factor: Time,
) -> ShortestPaths {
    let (distances, predecessors) =
        run(graph, start, |e: &Edge| e.cost(equipped, speed_factor));
    ShortestPaths {
        start,
        distances,
        predecessors,
    }
}

/// Distances under the optimistic cost model, indexed by vertex id.
///
/// Every edge is passable and costs `min(weight, weight * speed_factor)`.
pub fn optimistic_distances(graph: &Graph, start: VertexId, speed_factor: Time) -> Vec<Time> {
    run(graph, start, |e: &Edge| Some(e.optimistic_cost(speed_factor))).0
}

fn run<F>(graph: &Graph, start: VertexId, edge_cost: F) -> (Vec<Time>, Vec<Option<VertexId>>)
where
    F: Fn(&Edge) -> Option<Time>,
{
    let len = graph.vertex_count() + 1;
    let mut distances = vec![UNREACHABLE; len];
    let mut predecessors: Vec<Option<VertexId>> = vec![None; len];
    if !graph.contains(start) {
        return (distances, predecessors);
    }

    let mut open = OpenList::<DijkstraRank>::with_capacity(len);
    distances[start as usize] = 0;
    open.push(DijkstraRank { g: 0, vertex: start });

    while let Some(DijkstraRank { g, vertex: u }) = open.pop() {
        if g != distances[u as usize] {
            // Stale entry; a better one was already expanded.
            continue;
        }
        for (v, e) in graph.neighbours(u) {
            let Some(c) = edge_cost(e) else {
                continue;
            };
            let new_g = g.saturating_add(c);
            let old_g = distances[v as usize];
            if new_g < old_g {
                distances[v as usize] = new_g;
                predecessors[v as usize] = Some(u);
                open.push(DijkstraRank { g: new_g, vertex: v });
            } else if new_g == old_g && v != start {
                if let Some(p) = predecessors[v as usize] {
                    if u < p {
                        predecessors[v as usize] = Some(u);
                    }
                }
            }
        }
    }

    (distances, predecessors)
}
