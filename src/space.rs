use std::fmt::Debug;
use std::hash::Hash;

use crate::cost::Cost;

/// Upper bound on how many actions `Plan`'s `Display` prints.
const MAX_ACTIONS_DISPLAYED: usize = 20;

pub trait State: Clone + Debug + PartialEq + Eq + Hash {}

pub trait Action: Copy + Clone + Debug + PartialEq + Eq {
    /// Whether this action only lets time pass.
    ///
    /// Planners that must make progress filter these out.
    fn is_stall(&self) -> bool;

    /// Secondary ranking used when two actions score the same.
    ///
    /// Lower wins. Actions without a natural key should return `u64::MAX` so
    /// they only win on a strictly better score.
    fn tie_break(&self) -> u64;
}

/// A legal transition out of a state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Successor<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    pub cost: C,
    pub action: A,
    pub state: St,
}

impl<St, A, C> Successor<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    #[inline(always)]
    pub fn new(cost: C, action: A, state: St) -> Self {
        Self {
            cost,
            action,
            state,
        }
    }
}

/// A sequence of actions together with the time it takes to carry them out.
///
/// The empty plan is how every planner says "nothing to do", whether the goal
/// is already satisfied or it can't be reached.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan<A, C>
where
    A: Action,
    C: Cost,
{
    pub actions: Vec<A>,
    pub cost: C,
}

impl<A, C> Plan<A, C>
where
    A: Action,
    C: Cost,
{
    #[inline(always)]
    pub fn empty() -> Self {
        Self {
            actions: vec![],
            cost: C::zero(),
        }
    }

    #[inline(always)]
    pub fn single(action: A, cost: C) -> Self {
        Self {
            actions: vec![action],
            cost,
        }
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[inline(always)]
    pub fn first(&self) -> Option<A> {
        self.actions.first().copied()
    }

    /// Appends an action while building a plan backwards.
    #[inline(always)]
    pub(crate) fn append(&mut self, a: A) {
        self.actions.push(a);
    }

    /// Reverses the actions.
    ///
    /// Useful when naturally reconstructing plans in reverse.
    pub(crate) fn reverse(&mut self) {
        self.actions.reverse();
    }
}

impl<A, C> std::fmt::Display for Plan<A, C>
where
    A: Action + std::fmt::Display,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "Plan()");
        }
        write!(f, "Plan({}, [", self.cost)?;
        for (i, a) in self.actions.iter().take(MAX_ACTIONS_DISPLAYED).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{a}")?;
        }
        if self.actions.len() > MAX_ACTIONS_DISPLAYED {
            write!(f, ", ...")?;
        }
        write!(f, "])")
    }
}

/// What a planner hands back: a plan and how much it searched for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome<A, C>
where
    A: Action,
    C: Cost,
{
    pub plan: Plan<A, C>,
    pub expansions: usize,
}

impl<A, C> Outcome<A, C>
where
    A: Action,
    C: Cost,
{
    #[inline(always)]
    pub fn new(plan: Plan<A, C>, expansions: usize) -> Self {
        Self { plan, expansions }
    }

    #[inline(always)]
    pub fn nothing(expansions: usize) -> Self {
        Self {
            plan: Plan::empty(),
            expansions,
        }
    }

    /// Time charged for deliberating, given the time a single expansion takes.
    pub fn search_time(&self, expansion_time: f64) -> f64 {
        self.expansions as f64 * expansion_time
    }
}

pub trait Space<St, A, C>: Debug
where
    St: State,
    A: Action,
    C: Cost,
{
    /// Expands a State, listing every legal transition in a stable order.
    fn successors(&self, s: &St) -> Vec<Successor<St, A, C>>;

    fn is_goal(&self, s: &St) -> bool;

    fn apply(&self, s: &St, a: &A) -> Option<(St, C)> {
        self.successors(s)
            .into_iter()
            .find(|succ| succ.action == *a)
            .map(|succ| (succ.state, succ.cost))
    }

    /// Re-applies a sequence of actions.
    ///
    /// Returns the final State and the total cost, or `None` if some action
    /// isn't legal when its turn comes.
    fn replay(&self, start: &St, actions: &[A]) -> Option<(St, C)> {
        let mut state = start.clone();
        let mut cost = C::zero();
        for a in actions {
            let (next, c) = self.apply(&state, a)?;
            state = next;
            cost = cost.saturating_add(&c);
        }
        Some((state, cost))
    }
}

/// An estimate of the remaining cost to a goal.
///
/// Takes `&mut self` so implementations can memoise expensive lookups.
pub trait Heuristic<St, C>: Debug
where
    St: State,
    C: Cost,
{
    fn h(&mut self, s: &St) -> C;
}

/// The heuristic that knows nothing.
///
/// Turns A* into uniform-cost search, which makes it a handy oracle for the
/// true optimal cost on small problems.
#[derive(Debug, Default, Clone, Copy)]
pub struct ZeroHeuristic;

impl<St, C> Heuristic<St, C> for ZeroHeuristic
where
    St: State,
    C: Cost,
{
    #[inline(always)]
    fn h(&mut self, _s: &St) -> C {
        C::zero()
    }
}

/// A planner turns a single State into an `Outcome`.
///
/// Planners hold configuration only; nothing survives between calls.
pub trait Planner<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    fn plan<Sp, H>(&self, space: &Sp, heuristic: &mut H, start: &St) -> Outcome<A, C>
    where
        Sp: Space<St, A, C>,
        H: Heuristic<St, C>;
}
