use crate::cost::Cost;
use crate::space::Action;
use crate::space::Heuristic;
use crate::space::Outcome;
use crate::space::Plan;
use crate::space::Planner;
use crate::space::Space;
use crate::space::State;

/// Picks the single move that looks closest to the goal.
///
/// Scores every non-stalling successor by its heuristic alone, ignoring the
/// cost of getting there. Ties go to the lower `Action::tie_break`, and then to
/// the successor generated first.
#[derive(Copy, Clone, Debug, Default)]
pub struct GreedyOneStep;

impl<St, A, C> Planner<St, A, C> for GreedyOneStep
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
            log::debug!("Greedy: {start:?} is already a goal");
            return Outcome::nothing(0);
        }

        let mut best: Option<(C, u64, A, C)> = None;
        for succ in space.successors(start) {
            if succ.action.is_stall() {
                continue;
            }
            let h = heuristic.h(&succ.state);
            let tie = succ.action.tie_break();
            log::trace!("Greedy: {:?} -> {:?} (h={h})", succ.action, succ.state);
            match best {
                Some((best_h, best_tie, _, _)) if (best_h, best_tie) <= (h, tie) => {}
                _ => best = Some((h, tie, succ.action, succ.cost)),
            }
        }

        match best {
            Some((h, _, action, cost)) if h.valid() => {
                log::debug!("Greedy: chose {action:?} (h={h})");
                Outcome::new(Plan::single(action, cost), 1)
            }
            _ => {
                log::debug!("Greedy: stuck at {start:?}");
                Outcome::nothing(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RescueConfig;
    use crate::graph::Graph;
    use crate::heuristic::DistanceOracle;
    use crate::problems::rescue::RescueAction;
    use crate::problems::rescue::RescueHeuristic;
    use crate::problems::rescue::RescueSpace;
    use crate::problems::rescue::SearchState;
    use crate::space::ZeroHeuristic;

    /// 1 - 2 - 3 and 1 - 4, every edge of weight 1.
    fn fork() -> Graph {
        Graph::builder(4)
            .edge(1, 1, 2, 1, false)
            .edge(2, 2, 3, 1, false)
            .edge(3, 1, 4, 1, false)
            .build()
            .unwrap()
    }

    #[test]
    fn goal_needs_no_work() {
        let g = fork();
        let config = RescueConfig::new(1, 1, 2);
        let space = RescueSpace::new(&g, config);
        let mut h = RescueHeuristic::new(DistanceOracle::new(&g), config);
        let start = SearchState::new(1, false, [], []);

        let outcome = GreedyOneStep.plan(&space, &mut h, &start);
        assert!(outcome.plan.is_empty());
        assert_eq!(outcome.expansions, 0);
    }

    #[test]
    fn heads_for_the_nearest_people() {
        let g = fork();
        let config = RescueConfig::new(1, 1, 2);
        let space = RescueSpace::new(&g, config);
        let mut h = RescueHeuristic::new(DistanceOracle::new(&g), config);
        let start = SearchState::new(1, false, [(3, 2)], []);

        let outcome = GreedyOneStep.plan(&space, &mut h, &start);
        assert_eq!(outcome.expansions, 1);
        assert_eq!(
            outcome.plan.actions,
            vec![RescueAction::Traverse { to: 2, edge: 1 }]
        );
        assert_eq!(outcome.plan.cost, 1);
    }

    #[test]
    fn ties_prefer_lower_destination() {
        // Targets at both 2 and 4 are one hop away, h is the same either way.
        let g = Graph::builder(4)
            .edge(1, 1, 4, 1, false)
            .edge(2, 1, 2, 1, false)
            .edge(3, 2, 4, 5, false)
            .build()
            .unwrap();
        let config = RescueConfig::default();
        let space = RescueSpace::new(&g, config);
        let mut h = RescueHeuristic::new(DistanceOracle::new(&g), config);
        let start = SearchState::new(1, false, [(2, 1), (4, 1)], []);

        let outcome = GreedyOneStep.plan(&space, &mut h, &start);
        assert_eq!(
            outcome.plan.first(),
            Some(RescueAction::Traverse { to: 2, edge: 2 })
        );
    }

    #[test]
    fn traversing_beats_equipping_on_ties() {
        // Every move scores h=0, and equipping is generated first.
        let g = fork();
        let config = RescueConfig::new(1, 1, 2);
        let space = RescueSpace::new(&g, config);
        let start = SearchState::new(1, false, [(3, 1)], [1]);

        let outcome = GreedyOneStep.plan(&space, &mut ZeroHeuristic, &start);
        assert_eq!(
            outcome.plan.actions,
            vec![RescueAction::Traverse { to: 2, edge: 1 }]
        );
    }

    #[test]
    fn stuck_without_finite_estimate() {
        // Vertex 1 is isolated, so the only move left is waiting.
        let g = Graph::builder(3).edge(1, 2, 3, 1, false).build().unwrap();
        let config = RescueConfig::default();
        let space = RescueSpace::new(&g, config);
        let mut h = RescueHeuristic::new(DistanceOracle::new(&g), config);
        let start = SearchState::new(1, false, [(3, 1)], []);

        let outcome = GreedyOneStep.plan(&space, &mut h, &start);
        assert!(outcome.plan.is_empty());
        assert_eq!(outcome.expansions, 1);
    }
}
