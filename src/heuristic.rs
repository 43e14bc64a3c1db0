//! The admissible rescue heuristic.
//!
//! `h = nearest + spread`, where `nearest` is the optimistic distance to the
//! closest remaining target and `spread` is the weight of a minimum spanning
//! tree over the remaining targets, using optimistic pairwise distances.
//!
//! Any route that rescues everyone first reaches some target, costing at least
//! `nearest`, and then visits the rest, which connects them all and costs at
//! least `spread`. Optimistic distances ignore floods and take the cheaper
//! speed on every edge, and equip/unequip times are left out entirely, so
//! neither term can overestimate.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::cost::Time;
use crate::cost::UNREACHABLE;
use crate::dijkstra::optimistic_distances;
use crate::dijkstra::shortest_paths;
use crate::graph::Graph;
use crate::graph::VertexId;

/// Memo key: `(vertex count, speed factor, start)`.
type CacheKey = (usize, Time, VertexId);

/// Distance lookups over one `Graph`, scoped to a planning session.
///
/// Optimistic distances are memoised. Call `reset` before reusing an oracle
/// for an unrelated problem instance.
pub struct DistanceOracle<'g> {
    graph: &'g Graph,
    cache: FxHashMap<CacheKey, Rc<[Time]>>,
    misses: usize,
}

impl<'g> DistanceOracle<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self {
            graph,
            cache: FxHashMap::default(),
            misses: 0,
        }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    /// Drops every memoised distance table.
    pub fn reset(&mut self) {
        log::debug!(
            "Resetting distance cache ({} tables, {} misses)",
            self.cache.len(),
            self.misses
        );
        self.cache.clear();
        self.misses = 0;
    }

    pub fn cached_tables(&self) -> usize {
        self.cache.len()
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    /// Optimistic distances from `start`, indexed by vertex id.
    pub fn optimistic_distances(&mut self, start: VertexId, speed_factor: Time) -> Rc<[Time]> {
        let key = (self.graph.vertex_count(), speed_factor, start);
        if let Some(table) = self.cache.get(&key) {
            return Rc::clone(table);
        }

        log::trace!("Distance cache miss for {key:?}");
        self.misses += 1;
        let table: Rc<[Time]> = optimistic_distances(self.graph, start, speed_factor).into();
        self.cache.insert(key, Rc::clone(&table));
        table
    }

    /// Whether some target can be reached at all, possibly after picking up a
    /// kit on the way.
    pub fn can_reach_any_target(
        &self,
        position: VertexId,
        equipped: bool,
        targets: &[VertexId],
        kits: &[VertexId],
        speed_factor: Time,
    ) -> bool {
        if targets.is_empty() {
            return false;
        }

        let as_is = shortest_paths(self.graph, position, equipped, speed_factor);
        if targets.iter().any(|&t| as_is.reachable(t)) {
            return true;
        }
        if equipped {
            return false;
        }

        kits.iter()
            .filter(|&&k| as_is.reachable(k))
            .any(|&k| {
                let from_kit = shortest_paths(self.graph, k, true, speed_factor);
                targets.iter().any(|&t| from_kit.reachable(t))
            })
    }
}

impl std::fmt::Debug for DistanceOracle<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "DistanceOracle{{({:?}, {} cached tables)}}",
            self.graph,
            self.cache.len()
        )
    }
}

/// Weight of a minimum spanning tree over `0..n`, given pairwise weights.
///
/// Dense Prim's. Returns `UNREACHABLE` if the nodes aren't all connected.
pub fn mst_cost<W>(n: usize, weight: W) -> Time
where
    W: Fn(usize, usize) -> Time,
{
    if n <= 1 {
        return 0;
    }

    let mut in_tree = vec![false; n];
    let mut best = vec![UNREACHABLE; n];
    in_tree[0] = true;
    for (j, b) in best.iter_mut().enumerate().skip(1) {
        *b = weight(0, j);
    }

    let mut total: Time = 0;
    for _ in 1..n {
        let mut next = None;
        for j in 0..n {
            if in_tree[j] {
                continue;
            }
            match next {
                Some(k) if best[k] <= best[j] => {}
                _ => next = Some(j),
            }
        }
        let Some(k) = next else {
            break;
        };
        if best[k] == UNREACHABLE {
            return UNREACHABLE;
        }
        in_tree[k] = true;
        total = total.saturating_add(best[k]);
        for j in 0..n {
            if !in_tree[j] {
                best[j] = std::cmp::min(best[j], weight(k, j));
            }
        }
    }
    total
}

/// Lower bound on the time needed to rescue everyone at `targets` from
/// `current`.
pub fn heuristic(
    oracle: &mut DistanceOracle,
    current: VertexId,
    targets: &[VertexId],
    speed_factor: Time,
) -> Time {
    if targets.is_empty() {
        return 0;
    }

    let from_current = oracle.optimistic_distances(current, speed_factor);
    let nearest = targets
        .iter()
        .map(|&t| from_current.get(t as usize).copied().unwrap_or(UNREACHABLE))
        .min()
        .unwrap_or(UNREACHABLE);
    if nearest == UNREACHABLE {
        return UNREACHABLE;
    }

    let rows: Vec<Rc<[Time]>> = targets
        .iter()
        .map(|&t| oracle.optimistic_distances(t, speed_factor))
        .collect();
    let spread = mst_cost(targets.len(), |i, j| {
        rows[i]
            .get(targets[j] as usize)
            .copied()
            .unwrap_or(UNREACHABLE)
    });

    nearest.saturating_add(spread)
}
