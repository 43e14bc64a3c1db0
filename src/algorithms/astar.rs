use crate::cost::Cost;
use crate::data_structures::open_list::OpenList;
use crate::search::SearchTree;
use crate::search::SearchTreeIndex;
use crate::space::Action;
use crate::space::Heuristic;
use crate::space::Outcome;
use crate::space::Plan;
use crate::space::Planner;
use crate::space::Space;
use crate::space::State;

/// The ranking tuple for A*
///
/// We prefer better f-values, and tie break on insertion order so runs are
/// reproducible regardless of how the heap shuffles equal entries.
///
/// ```
/// use rescue::algorithms::astar::AStarRank;
///
/// assert!(AStarRank::new(3u64, 4u64, 9) < AStarRank::new(2u64, 6u64, 0));
/// assert!(AStarRank::new(2u64, 5u64, 0) < AStarRank::new(4u64, 3u64, 1));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct AStarRank<C: Cost> {
    f: C,
    order: usize,
}

impl<C> AStarRank<C>
where
    C: Cost,
{
    pub fn new(g: C, h: C, order: usize) -> Self {
        Self {
            f: g.saturating_add(&h),
            order,
        }
    }

    #[inline(always)]
    pub fn f(&self) -> C {
        self.f
    }
}

#[derive(Debug)]
struct AStarHeapNode<C>
where
    C: Cost,
{
    /// The rank of this node that defines how good it is.
    rank: AStarRank<C>,
    /// g of the path this entry was pushed for. Stale once the node improves.
    g: C,
    /// The index of this node in the Search Tree.
    node_index: SearchTreeIndex,
}

impl<C: Cost> PartialEq for AStarHeapNode<C> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.rank.eq(&other.rank)
    }
}
impl<C: Cost> Eq for AStarHeapNode<C> {}

impl<C: Cost> PartialOrd for AStarHeapNode<C> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<C: Cost> Ord for AStarHeapNode<C> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank.cmp(&other.rank)
    }
}

/// A* that gives up after a fixed number of expansions.
///
/// With an admissible and consistent heuristic the plan it returns is optimal.
/// It returns the empty plan when the goal can't be reached or when the budget
/// runs out first, and the expansion count tells both apart from the cases
/// where the start is already a goal.
#[derive(Copy, Clone, Debug)]
pub struct BoundedAStar {
    pub expansion_limit: usize,
}

impl BoundedAStar {
    pub fn new(expansion_limit: usize) -> Self {
        Self { expansion_limit }
    }
}

impl<St, A, C> Planner<St, A, C> for BoundedAStar
where
    St: State,
    A: Action,
    C: Cost,
{
    fn plan<Sp, H>(&self, space: &Sp, heuristic: &mut H, start: &St) -> Outcome<A, C>
    where
        Sp: Space<St, A, C>,
        H: Heuristic<St, C>,
    {
        let mut search_tree = SearchTree::<St, A, C>::new();
        let mut open = OpenList::<AStarHeapNode<C>>::with_capacity(1024);
        let mut order = 0usize;
        let mut expansions = 0usize;

        let root = search_tree.push_root(start);
        open.push(AStarHeapNode {
            rank: AStarRank::new(C::zero(), heuristic.h(start), order),
            g: C::zero(),
            node_index: root,
        });

        while let Some(AStarHeapNode {
            rank,
            g,
            node_index,
        }) = open.pop()
        {
            let node = &search_tree[node_index];
            if node.is_closed() || g > node.g() {
                continue;
            }
            if expansions >= self.expansion_limit {
                log::warn!(
                    "A*: gave up after {expansions} expansions ({} open, {} nodes)",
                    open.len(),
                    search_tree.len()
                );
                let mut stats = Vec::new();
                if search_tree.write_memory_stats(&mut stats).is_ok() {
                    log::debug!("{}", String::from_utf8_lossy(&stats).trim_end());
                }
                return Outcome::nothing(expansions);
            }
            expansions += 1;
            search_tree.close(node_index);

            let state = search_tree[node_index].state().clone();
            log::trace!("A*: expanding {state:?} (g={g}, f={})", rank.f());

            if space.is_goal(&state) {
                let plan = search_tree
                    .path(node_index, search_tree.len())
                    .unwrap_or_else(Plan::empty);
                log::debug!(
                    "A*: {} actions, cost {} after {expansions} expansions",
                    plan.len(),
                    plan.cost
                );
                return Outcome::new(plan, expansions);
            }

            for succ in space.successors(&state) {
                let new_g = g.saturating_add(&succ.cost);
                let Some(succ_index) =
                    search_tree.reach(&succ.state, (node_index, succ.action), new_g)
                else {
                    continue;
                };
                let h = heuristic.h(&succ.state);
                if !h.valid() {
                    // Dead end, no sense queueing it.
                    continue;
                }
                order += 1;
                open.push(AStarHeapNode {
                    rank: AStarRank::new(new_g, h, order),
                    g: new_g,
                    node_index: succ_index,
                });
            }
        }

        log::debug!("A*: no plan, exhausted after {expansions} expansions");
        Outcome::nothing(expansions)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use rand::Rng;
    use rand_chacha::ChaCha8Rng;
    use rand_chacha::rand_core::SeedableRng;
    use rustc_hash::FxHashSet;

    use super::*;
    use crate::config::RescueConfig;
    use crate::cost::Time;
    use crate::graph::Graph;
    use crate::heuristic::DistanceOracle;
    use crate::problems::rescue::RescueAction;
    use crate::problems::rescue::RescueHeuristic;
    use crate::problems::rescue::RescueScenario;
    use crate::problems::rescue::RescueSpace;
    use crate::problems::rescue::SearchState;
    use crate::space::ZeroHeuristic;

    #[test]
    fn ranking() {
        let low = AStarRank::new(2u64, 3u64, 7);
        let high = AStarRank::new(4u64, 2u64, 0);
        assert!(low < high);
        assert_eq!(low.f(), 5);

        // Same f-value, the earlier entry wins.
        assert!(AStarRank::new(1u64, 4u64, 1) < AStarRank::new(4u64, 1u64, 2));
        // Infinity saturates.
        assert_eq!(AStarRank::new(3u64, Time::MAX, 0).f(), Time::MAX);
    }

    #[test]
    fn already_rescued() {
        // Scenario A: the people at 1 were picked up when the agent arrived.
        let g = Graph::builder(3)
            .edge(1, 1, 2, 1, false)
            .edge(2, 2, 3, 1, false)
            .build()
            .unwrap();
        let config = RescueConfig::new(1, 1, 2);
        let space = RescueSpace::new(&g, config);
        let mut h = RescueHeuristic::new(DistanceOracle::new(&g), config);
        let start = SearchState::observe(1, false, [(1, 3)], []);

        assert_eq!(h.h(&start), 0);
        let outcome = BoundedAStar::new(100).plan(&space, &mut h, &start);
        assert!(outcome.plan.is_empty());
        assert_eq!(outcome.plan.cost, 0);
        assert_eq!(outcome.expansions, 1);
    }

    #[test]
    fn equips_to_cross_floods() {
        // Scenario B.
        let g = Graph::builder(3)
            .edge(1, 1, 2, 1, true)
            .edge(2, 2, 3, 1, true)
            .build()
            .unwrap();
        let config = RescueConfig::new(2, 1, 3);
        let space = RescueSpace::new(&g, config);
        let mut h = RescueHeuristic::new(DistanceOracle::new(&g), config);
        let start = SearchState::new(1, false, [(3, 5)], [1]);

        let outcome = BoundedAStar::new(1_000).plan(&space, &mut h, &start);
        assert_eq!(
            outcome.plan.actions,
            vec![
                RescueAction::Equip,
                RescueAction::Traverse { to: 2, edge: 1 },
                RescueAction::Traverse { to: 3, edge: 2 },
            ]
        );
        assert_eq!(outcome.plan.cost, 8);
        assert!(outcome.expansions <= 1_000);

        let (end, cost) = space.replay(&start, &outcome.plan.actions).unwrap();
        assert!(end.is_rescued());
        assert_eq!(cost, 8);
    }

    #[test]
    fn unreachable_people() {
        let g = Graph::builder(3)
            .edge(1, 1, 2, 1, false)
            .edge(2, 2, 3, 1, true)
            .build()
            .unwrap();
        let config = RescueConfig::new(1, 1, 2);
        let space = RescueSpace::new(&g, config);
        let mut h = RescueHeuristic::new(DistanceOracle::new(&g), config);
        let start = SearchState::new(1, false, [(3, 1)], []);

        let outcome = BoundedAStar::new(1_000).plan(&space, &mut h, &start);
        assert!(outcome.plan.is_empty());
        assert!(outcome.expansions >= 1);
        assert!(outcome.expansions < 1_000);
    }

    #[test]
    fn respects_expansion_limit() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for limit in [1, 2, 5, 10] {
            let scenario = RescueScenario::randomize(&mut rng, 6, 4, 3, 2);
            let config = RescueConfig::new(1, 1, 2);
            let space = RescueSpace::new(&scenario.graph, config);
            let mut h = RescueHeuristic::new(DistanceOracle::new(&scenario.graph), config);
            let outcome = BoundedAStar::new(limit).plan(&space, &mut h, &scenario.start);
            assert!(outcome.expansions <= limit);
        }
    }

    #[test]
    fn gives_up_at_the_limit() {
        let g = Graph::builder(5)
            .edge(1, 1, 2, 1, false)
            .edge(2, 2, 3, 1, false)
            .edge(3, 3, 4, 1, false)
            .edge(4, 4, 5, 1, false)
            .build()
            .unwrap();
        let config = RescueConfig::default();
        let space = RescueSpace::new(&g, config);
        let mut h = RescueHeuristic::new(DistanceOracle::new(&g), config);
        let start = SearchState::new(1, false, [(5, 1)], []);

        let outcome = BoundedAStar::new(2).plan(&space, &mut h, &start);
        assert!(outcome.plan.is_empty());
        assert_eq!(outcome.expansions, 2);

        let outcome = BoundedAStar::new(5).plan(&space, &mut h, &start);
        assert_eq!(outcome.plan.cost, 4);
        assert_eq!(outcome.expansions, 5);
    }

    /// Every State reachable from `start`.
    fn reachable_states(space: &RescueSpace, start: &SearchState) -> Vec<SearchState> {
        let mut seen = FxHashSet::default();
        let mut queue = VecDeque::from([start.clone()]);
        seen.insert(start.clone());
        let mut states = vec![];
        while let Some(s) = queue.pop_front() {
            for succ in space.successors(&s) {
                if seen.insert(succ.state.clone()) {
                    queue.push_back(succ.state);
                }
            }
            states.push(s);
        }
        states
    }

    #[test]
    fn heuristic_is_admissible_on_small_graphs() {
        let mut rng = ChaCha8Rng::seed_from_u64(0xF100D);
        for _ in 0..5 {
            let vertices = rng.random_range(3..=5);
            let scenario = RescueScenario::randomize(&mut rng, vertices, 2, 2, 1);
            let config = RescueConfig::new(rng.random_range(0..=2), rng.random_range(0..=2), 2);
            let space = RescueSpace::new(&scenario.graph, config);
            let mut h = RescueHeuristic::new(DistanceOracle::new(&scenario.graph), config);
            let ucs = BoundedAStar::new(usize::MAX);

            for s in reachable_states(&space, &scenario.start) {
                let estimate = h.h(&s);
                let optimal = ucs.plan(&space, &mut ZeroHeuristic, &s);
                if space.is_goal(&s) {
                    assert_eq!(estimate, 0, "{s}");
                } else if !optimal.plan.is_empty() {
                    assert!(
                        estimate <= optimal.plan.cost,
                        "h({s})={estimate} > {}",
                        optimal.plan.cost
                    );
                }
            }
        }
    }

    #[test]
    fn optimal_on_small_graphs() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..10 {
            let vertices = rng.random_range(2..=6);
            let scenario = RescueScenario::randomize(&mut rng, vertices, 3, 3, 2);
            let config = RescueConfig::new(rng.random_range(0..=3), rng.random_range(0..=3), 3);
            let space = RescueSpace::new(&scenario.graph, config);
            let mut h = RescueHeuristic::new(DistanceOracle::new(&scenario.graph), config);

            let informed = BoundedAStar::new(usize::MAX).plan(&space, &mut h, &scenario.start);
            let blind =
                BoundedAStar::new(usize::MAX).plan(&space, &mut ZeroHeuristic, &scenario.start);

            assert_eq!(informed.plan.cost, blind.plan.cost, "{}", scenario.graph);
            assert_eq!(informed.plan.is_empty(), blind.plan.is_empty());

            if !informed.plan.is_empty() {
                let (end, cost) = space
                    .replay(&scenario.start, &informed.plan.actions)
                    .unwrap();
                assert!(end.is_rescued());
                assert_eq!(cost, informed.plan.cost);
            }
        }
    }
}
