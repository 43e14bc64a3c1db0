use crate::algorithms::astar::AStarRank;
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

/// Longest plan Real-Time A* will reconstruct after stumbling upon a goal.
pub const MAX_RECONSTRUCTED_STEPS: usize = 1_000;

#[derive(Debug)]
struct RtaHeapNode<C>
where
    C: Cost,
{
    rank: AStarRank<C>,
    g: C,
    node_index: SearchTreeIndex,
    /// Which of the root's successors this entry descends from.
    first_step: usize,
}

impl<C: Cost> PartialEq for RtaHeapNode<C> {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.rank.eq(&other.rank)
    }
}
impl<C: Cost> Eq for RtaHeapNode<C> {}

impl<C: Cost> PartialOrd for RtaHeapNode<C> {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}
impl<C: Cost> Ord for RtaHeapNode<C> {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank.cmp(&other.rank)
    }
}

/// One of the root's successors, with the best f found below it so far.
#[derive(Copy, Clone, Debug)]
struct FirstStep<A, C> {
    action: A,
    cost: C,
    best_f: C,
    /// Leads straight back into the root, like waiting.
    loops: bool,
}

/// A* with a fixed lookahead, deciding a single move at a time.
///
/// Searches at most `lookahead` expansions from the current State. Every
/// entry remembers which of the root's successors it descends from, and the
/// move whose subtree reached the lowest f wins. Finding a goal within the
/// lookahead returns the whole plan to it instead.
///
/// Moves that lead back into the root (waiting) aren't searched, and unlike
/// every other move they don't keep the f they were seeded with. They are
/// worth their own cost plus the best of the other moves, so they only get
/// picked when they are all that's left. Valued by their seed f alone,
/// waiting (`1 + h(root)`) would beat equipping whenever equipping takes
/// longer than a time step, and the agent would wait forever.
#[derive(Copy, Clone, Debug)]
pub struct RealTimeAStar {
    pub lookahead: usize,
}

impl RealTimeAStar {
    pub fn new(lookahead: usize) -> Self {
        Self { lookahead }
    }
}

impl<St, A, C> Planner<St, A, C> for RealTimeAStar
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
        if space.is_goal(start) {
            log::debug!("RTA*: {start:?} is already a goal");
            return Outcome::nothing(0);
        }

        let mut search_tree = SearchTree::<St, A, C>::new();
        let mut open = OpenList::<RtaHeapNode<C>>::new();
        let mut order = 0usize;
        let mut expansions = 0usize;

        let root = search_tree.push_root(start);
        // Stalling back into the root is never worth an expansion.
        search_tree.close(root);

        let mut first_steps: Vec<FirstStep<A, C>> = vec![];
        for succ in space.successors(start) {
            let h = heuristic.h(&succ.state);
            let rank = AStarRank::new(succ.cost, h, order);
            first_steps.push(FirstStep {
                action: succ.action,
                cost: succ.cost,
                best_f: rank.f(),
                loops: succ.state == *start,
            });
            if search_tree.is_closed(&succ.state) {
                continue;
            }
            search_tree.reach(&succ.state, (root, succ.action), succ.cost);
            if let Some(node_index) = search_tree.index_of(&succ.state) {
                open.push(RtaHeapNode {
                    rank,
                    g: succ.cost,
                    node_index,
                    first_step: first_steps.len() - 1,
                });
                order += 1;
            }
        }

        while expansions < self.lookahead {
            let Some(RtaHeapNode {
                rank,
                g,
                node_index,
                first_step,
            }) = open.pop()
            else {
                break;
            };
            if search_tree[node_index].is_closed() {
                continue;
            }
            search_tree.close(node_index);
            expansions += 1;

            let step = &mut first_steps[first_step];
            step.best_f = std::cmp::min(step.best_f, rank.f());

            let state = search_tree[node_index].state().clone();
            log::trace!("RTA*: expanding {state:?} (g={g}, f={})", rank.f());

            if space.is_goal(&state) {
                return match search_tree.path(node_index, MAX_RECONSTRUCTED_STEPS) {
                    Some(plan) => {
                        log::debug!(
                            "RTA*: goal within lookahead, {} actions, cost {}",
                            plan.len(),
                            plan.cost
                        );
                        Outcome::new(plan, expansions)
                    }
                    None => Outcome::nothing(expansions),
                };
            }

            for succ in space.successors(&state) {
                if search_tree.is_closed(&succ.state) {
                    continue;
                }
                let new_g = g.saturating_add(&succ.cost);
                search_tree.reach(&succ.state, (node_index, succ.action), new_g);
                let Some(succ_index) = search_tree.index_of(&succ.state) else {
                    continue;
                };
                let h = heuristic.h(&succ.state);
                open.push(RtaHeapNode {
                    rank: AStarRank::new(new_g, h, order),
                    g: new_g,
                    node_index: succ_index,
                    first_step,
                });
                order += 1;
            }
        }

        // Looping back costs its own time and then continues like any other
        // first step would.
        let onward = first_steps
            .iter()
            .filter(|step| !step.loops)
            .map(|step| step.best_f)
            .min()
            .unwrap_or_else(C::infinity);
        for step in first_steps.iter_mut().filter(|step| step.loops) {
            step.best_f = step.cost.saturating_add(&onward);
        }

        let mut chosen: Option<FirstStep<A, C>> = None;
        for step in &first_steps {
            match chosen {
                Some(best)
                    if (best.best_f, best.action.tie_break())
                        <= (step.best_f, step.action.tie_break()) => {}
                _ => chosen = Some(*step),
            }
        }

        match chosen {
            Some(step) if !step.best_f.valid() => {
                log::debug!("RTA*: dead end at {start:?}");
                Outcome::nothing(expansions)
            }
            Some(step) if first_steps.len() == 1 && step.action.is_stall() => {
                log::debug!("RTA*: nothing to do but wait at {start:?}");
                Outcome::nothing(expansions)
            }
            Some(step) => {
                log::debug!(
                    "RTA*: chose {:?} (f={}) after {expansions} expansions",
                    step.action,
                    step.best_f
                );
                Outcome::new(Plan::single(step.action, step.cost), expansions)
            }
            None => Outcome::nothing(expansions),
        }
    }
}
