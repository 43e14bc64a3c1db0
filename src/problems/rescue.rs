//! Rescuing people stranded on a partially flooded road network.
//!
//! An agent moves along edges, picking up everyone waiting at the vertices it
//! visits. Flooded edges can only be crossed while carrying a kit, which slows
//! every crossing down by the speed factor and takes time to put on and take
//! off.

use derive_more::Display;
use smallvec::SmallVec;

use crate::algorithms::astar::BoundedAStar;
use crate::algorithms::greedy::GreedyOneStep;
use crate::algorithms::rtastar::RealTimeAStar;
use crate::config::RescueConfig;
use crate::cost::Time;
use crate::graph::EdgeId;
use crate::graph::Graph;
use crate::graph::VertexId;
use crate::heuristic::DistanceOracle;
use crate::heuristic::heuristic;
use crate::space::Action;
use crate::space::Heuristic;
use crate::space::Outcome;
use crate::space::Planner;
use crate::space::Space;
use crate::space::State;
use crate::space::Successor;

const MAX_ELEMENTS_DISPLAYED: usize = 20;

const RANDOM_MAX_WEIGHT: Time = 5;
const RANDOM_FLOOD_PROBABILITY: f64 = 0.3;
const RANDOM_MAX_PEOPLE: u32 = 5;

/// Number of people waiting at a vertex.
pub type Headcount = u32;

/// What the agent knows when it has to decide.
///
/// People and kits are kept sorted by vertex without duplicates, so two
/// States describing the same situation are equal and hash the same.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SearchState {
    position: VertexId,
    equipped: bool,
    /// `(vertex, count)` with `count > 0`, sorted by vertex.
    people: SmallVec<[(VertexId, Headcount); 4]>,
    /// Sorted vertices holding a kit.
    kits: SmallVec<[VertexId; 4]>,
}

impl SearchState {
    /// Builds a State, merging repeated vertices and dropping empty ones.
    pub fn new<P, K>(position: VertexId, equipped: bool, people: P, kits: K) -> Self
    where
        P: IntoIterator<Item = (VertexId, Headcount)>,
        K: IntoIterator<Item = VertexId>,
    {
        let mut sorted: SmallVec<[(VertexId, Headcount); 4]> = people.into_iter().collect();
        sorted.sort_unstable_by_key(|&(v, _)| v);

        let mut merged: SmallVec<[(VertexId, Headcount); 4]> = SmallVec::new();
        for (v, n) in sorted {
            match merged.last_mut() {
                Some((last, count)) if *last == v => *count = count.saturating_add(n),
                _ => merged.push((v, n)),
            }
        }
        merged.retain(|(_, n)| *n > 0);

        let mut kits: SmallVec<[VertexId; 4]> = kits.into_iter().collect();
        kits.sort_unstable();
        kits.dedup();

        Self {
            position,
            equipped,
            people: merged,
            kits,
        }
    }

    /// Builds a State from what's out there right now.
    ///
    /// Whoever waits at the agent's own vertex counts as rescued already.
    pub fn observe<P, K>(position: VertexId, equipped: bool, people: P, kits: K) -> Self
    where
        P: IntoIterator<Item = (VertexId, Headcount)>,
        K: IntoIterator<Item = VertexId>,
    {
        let mut s = Self::new(position, equipped, people, kits);
        s.pick_up(position);
        s
    }

    #[inline(always)]
    pub fn position(&self) -> VertexId {
        self.position
    }

    #[inline(always)]
    pub fn equipped(&self) -> bool {
        self.equipped
    }

    pub fn people(&self) -> &[(VertexId, Headcount)] {
        &self.people
    }

    pub fn kits(&self) -> &[VertexId] {
        &self.kits
    }

    /// Vertices where someone is still waiting.
    pub fn targets(&self) -> SmallVec<[VertexId; 8]> {
        self.people.iter().map(|&(v, _)| v).collect()
    }

    pub fn count_at(&self, v: VertexId) -> Headcount {
        match self.people.binary_search_by_key(&v, |&(u, _)| u) {
            Ok(i) => self.people[i].1,
            Err(_) => 0,
        }
    }

    pub fn people_left(&self) -> Headcount {
        self.people.iter().map(|&(_, n)| n).sum()
    }

    #[inline(always)]
    pub fn is_rescued(&self) -> bool {
        self.people.is_empty()
    }

    #[inline(always)]
    pub fn has_kit(&self, v: VertexId) -> bool {
        self.kits.binary_search(&v).is_ok()
    }

    fn pick_up(&mut self, v: VertexId) {
        if let Ok(i) = self.people.binary_search_by_key(&v, |&(u, _)| u) {
            self.people.remove(i);
        }
    }

    fn take_kit(&mut self, v: VertexId) {
        if let Ok(i) = self.kits.binary_search(&v) {
            self.kits.remove(i);
        }
    }

    fn drop_kit(&mut self, v: VertexId) {
        if let Err(i) = self.kits.binary_search(&v) {
            self.kits.insert(i, v);
        }
    }
}
impl State for SearchState {}

impl std::fmt::Display for SearchState {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "@{}", self.position)?;
        if self.equipped {
            write!(f, "+kit")?;
        }
        write!(f, " people[")?;
        for (i, (v, n)) in self.people.iter().take(MAX_ELEMENTS_DISPLAYED).enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{v}:{n}")?;
        }
        if self.people.len() > MAX_ELEMENTS_DISPLAYED {
            write!(f, " ...")?;
        }
        write!(f, "] kits[")?;
        for (i, v) in self.kits.iter().take(MAX_ELEMENTS_DISPLAYED).enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{v}")?;
        }
        if self.kits.len() > MAX_ELEMENTS_DISPLAYED {
            write!(f, " ...")?;
        }
        write!(f, "]")
    }
}

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum RescueAction {
    #[display("equip")]
    Equip,
    #[display("unequip")]
    Unequip,
    #[display("wait")]
    Wait,
    #[display("traverse({to} via #{edge})")]
    Traverse { to: VertexId, edge: EdgeId },
}

impl Action for RescueAction {
    #[inline(always)]
    fn is_stall(&self) -> bool {
        matches!(self, RescueAction::Wait)
    }

    #[inline(always)]
    fn tie_break(&self) -> u64 {
        match self {
            RescueAction::Traverse { to, .. } => *to as u64,
            _ => u64::MAX,
        }
    }
}

/// The Successor Generator over a road network.
#[derive(Clone, Debug)]
pub struct RescueSpace<'g> {
    graph: &'g Graph,
    config: RescueConfig,
}

impl<'g> RescueSpace<'g> {
    pub fn new(graph: &'g Graph, config: RescueConfig) -> Self {
        Self { graph, config }
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn config(&self) -> &RescueConfig {
        &self.config
    }
}

impl Space<SearchState, RescueAction, Time> for RescueSpace<'_> {
    /// Equip, Unequip, every passable edge by id, and finally Wait.
    fn successors(&self, s: &SearchState) -> Vec<Successor<SearchState, RescueAction, Time>> {
        let mut successors = Vec::with_capacity(4);
        let here = s.position;

        if !s.equipped && s.has_kit(here) {
            let mut next = s.clone();
            next.equipped = true;
            next.take_kit(here);
            successors.push(Successor::new(
                self.config.equip_time,
                RescueAction::Equip,
                next,
            ));
        }

        if s.equipped {
            // The kit stays behind wherever it's taken off.
            let mut next = s.clone();
            next.equipped = false;
            next.drop_kit(here);
            successors.push(Successor::new(
                self.config.unequip_time,
                RescueAction::Unequip,
                next,
            ));
        }

        for (to, e) in self.graph.neighbours(here) {
            let Some(cost) = e.cost(s.equipped, self.config.speed_factor) else {
                continue;
            };
            let mut next = s.clone();
            next.position = to;
            next.pick_up(to);
            successors.push(Successor::new(
                cost,
                RescueAction::Traverse { to, edge: e.id },
                next,
            ));
        }

        successors.push(Successor::new(1, RescueAction::Wait, s.clone()));
        successors
    }

    #[inline(always)]
    fn is_goal(&self, s: &SearchState) -> bool {
        s.is_rescued()
    }
}

/// Nearest target plus a spanning tree over the rest, see `crate::heuristic`.
#[derive(Debug)]
pub struct RescueHeuristic<'g> {
    oracle: DistanceOracle<'g>,
    speed_factor: Time,
}

impl<'g> RescueHeuristic<'g> {
    pub fn new(oracle: DistanceOracle<'g>, config: RescueConfig) -> Self {
        Self {
            oracle,
            speed_factor: config.speed_factor,
        }
    }

    pub fn oracle(&self) -> &DistanceOracle<'g> {
        &self.oracle
    }

    /// Forgets memoised distances, for reuse on an unrelated instance.
    pub fn reset(&mut self) {
        self.oracle.reset();
    }

    /// Whether anyone left in `s` can be reached at all.
    pub fn can_reach_any_target(&self, s: &SearchState) -> bool {
        self.oracle.can_reach_any_target(
            s.position,
            s.equipped,
            &s.targets(),
            &s.kits,
            self.speed_factor,
        )
    }
}

impl Heuristic<SearchState, Time> for RescueHeuristic<'_> {
    #[inline(always)]
    fn h(&mut self, s: &SearchState) -> Time {
        heuristic(&mut self.oracle, s.position, &s.targets(), self.speed_factor)
    }
}

/// Which planner drives the agent.
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
pub enum RescuePlanner {
    #[display("greedy")]
    Greedy,
    #[display("a*")]
    AStar,
    #[display("rta*")]
    RealTime,
}

impl RescuePlanner {
    pub const ALL: [RescuePlanner; 3] = [
        RescuePlanner::Greedy,
        RescuePlanner::AStar,
        RescuePlanner::RealTime,
    ];

    /// Plans from `start` using the limits in the space's configuration.
    pub fn plan(
        &self,
        space: &RescueSpace,
        heuristic: &mut RescueHeuristic,
        start: &SearchState,
    ) -> Outcome<RescueAction, Time> {
        let config = space.config();
        match self {
            RescuePlanner::Greedy => GreedyOneStep.plan(space, heuristic, start),
            RescuePlanner::AStar => {
                BoundedAStar::new(config.expansion_limit).plan(space, heuristic, start)
            }
            RescuePlanner::RealTime => {
                RealTimeAStar::new(config.lookahead).plan(space, heuristic, start)
            }
        }
    }
}

/// A road network together with where the agent starts.
#[derive(Clone, Debug)]
pub struct RescueScenario {
    pub graph: Graph,
    pub start: SearchState,
}

impl RescueScenario {
    /// A random instance with people at `targets` random vertices and kits at
    /// `kits` random vertices. Repeated picks pile up at the same vertex.
    pub fn randomize<R: rand::Rng>(
        r: &mut R,
        vertex_count: usize,
        extra_edges: usize,
        targets: usize,
        kits: usize,
    ) -> RescueScenario {
        let vertex_count = std::cmp::max(vertex_count, 1);
        let graph = Graph::random(
            r,
            vertex_count,
            extra_edges,
            RANDOM_MAX_WEIGHT,
            RANDOM_FLOOD_PROBABILITY,
        );

        let last = vertex_count as VertexId;
        let people: Vec<(VertexId, Headcount)> = (0..targets)
            .map(|_| (r.random_range(1..=last), r.random_range(1..=RANDOM_MAX_PEOPLE)))
            .collect();
        let kit_vertices: Vec<VertexId> = (0..kits).map(|_| r.random_range(1..=last)).collect();
        let position = r.random_range(1..=last);

        RescueScenario {
            graph,
            start: SearchState::observe(position, false, people, kit_vertices),
        }
    }
}

/// Turns a vertex path into `Traverse` actions, using the lowest-id edge of
/// every hop.
///
/// Returns `None` when two consecutive vertices aren't adjacent.
pub fn traverse_actions(graph: &Graph, path: &[VertexId]) -> Option<Vec<RescueAction>> {
    path.windows(2)
        .map(|hop| {
            graph.edge_between(hop[0], hop[1]).map(|e| RescueAction::Traverse {
                to: hop[1],
                edge: e.id,
            })
        })
        .collect()
}
