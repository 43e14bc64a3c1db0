use nonmax::NonMaxUsize;
use rustc_hash::FxHashMap;

use crate::cost::Cost;
use crate::space::Action;
use crate::space::Plan;
use crate::space::State;

/// A reference to a `SearchTreeNode<St, A, C>`.
pub type SearchTreeIndex = NonMaxUsize;

#[inline(always)]
fn tree_index(i: usize) -> SearchTreeIndex {
    match NonMaxUsize::new(i) {
        Some(i) => i,
        None => unreachable!("The search tree can't hold usize::MAX nodes"),
    }
}

#[derive(Debug, Clone)]
pub struct SearchTreeNode<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    pub(crate) state: St,
    /// The best known way of reaching this node, `None` for roots.
    pub(crate) parent: Option<(SearchTreeIndex, A)>,
    /// Cost of the best known path from the root.
    pub(crate) g: C,
    pub(crate) closed: bool,
}

impl<St, A, C> SearchTreeNode<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    pub fn new(s: St, parent: Option<(SearchTreeIndex, A)>, g: C) -> Self {
        Self {
            state: s,
            parent,
            g,
            closed: false,
        }
    }

    /// Gives this Node a better path through a new parent.
    pub fn reach(&mut self, new_parent: (SearchTreeIndex, A), g: C) {
        debug_assert!(g < self.g);
        debug_assert!(!self.closed);
        self.parent = Some(new_parent);
        self.g = g;
    }

    pub fn state(&self) -> &St {
        &self.state
    }
    pub fn g(&self) -> C {
        self.g
    }
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Every State a search has generated, with how it got there.
///
/// Nodes live in an arena and point at their parent through its index. The
/// `node_map` is the State -> node lookup, so it doubles as the best-known-g
/// map and (through `SearchTreeNode::closed`) as the Closed Set.
pub struct SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    nodes: Vec<SearchTreeNode<St, A, C>>,
    node_map: FxHashMap<St, SearchTreeIndex>,
}

impl<St, A, C> SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::with_capacity(1024),
            node_map: FxHashMap::default(),
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a parentless node.
    pub fn push_root(&mut self, s: &St) -> SearchTreeIndex {
        debug_assert!(!self.node_map.contains_key(s), "Root already in the tree");
        self.push(SearchTreeNode::new(s.clone(), None, C::zero()))
    }

    fn push(&mut self, node: SearchTreeNode<St, A, C>) -> SearchTreeIndex {
        let i = tree_index(self.nodes.len());
        self.node_map.insert(node.state.clone(), i);
        self.nodes.push(node);
        i
    }

    /// Records that `s` can be reached from `parent` with cost `g`.
    ///
    /// Returns the node's index when that's new or strictly better than what
    /// we knew, and `None` when the State is closed or no better off.
    pub fn reach(
        &mut self,
        s: &St,
        parent: (SearchTreeIndex, A),
        g: C,
    ) -> Option<SearchTreeIndex> {
        match self.node_map.get(s) {
            Some(&i) => {
                let node = &mut self[i];
                if node.closed || g >= node.g {
                    return None;
                }
                node.reach(parent, g);
                Some(i)
            }
            None => Some(self.push(SearchTreeNode::new(s.clone(), Some(parent), g))),
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn index_of(&self, s: &St) -> Option<SearchTreeIndex> {
        self.node_map.get(s).copied()
    }

    #[inline(always)]
    #[must_use]
    pub fn is_closed(&self, s: &St) -> bool {
        match self.node_map.get(s) {
            Some(&i) => self[i].closed,
            None => false,
        }
    }

    #[inline(always)]
    pub fn close(&mut self, i: SearchTreeIndex) {
        debug_assert!(!self[i].closed, "Closing {:?} twice", self[i].state);
        self[i].closed = true;
    }

    /// Follows parent links from `node_index` back to its root.
    ///
    /// Gives up with `None` after `max_steps` links, which can only happen on a
    /// malformed (cyclic) parent chain or a cap that's too tight.
    #[must_use]
    pub fn path(&self, mut node_index: SearchTreeIndex, max_steps: usize) -> Option<Plan<A, C>> {
        let mut plan = Plan::<A, C>::empty();
        plan.cost = self[node_index].g;

        let mut steps = 0usize;
        while let Some((parent_index, a)) = self[node_index].parent {
            steps += 1;
            if steps > max_steps {
                log::warn!("Plan reconstruction gave up after {max_steps} steps");
                return None;
            }
            plan.append(a);
            debug_assert!(node_index != parent_index);
            node_index = parent_index;
        }

        plan.reverse();
        Some(plan)
    }

    pub fn write_memory_stats<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        use size::Size;
        use std::mem::size_of;
        use thousands::Separable;

        writeln!(out, "SearchTree Stats:")?;
        let s = size_of::<SearchTreeNode<St, A, C>>();
        let l = self.nodes.len();
        writeln!(
            out,
            "  - |Nodes|:   {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;

        let s = size_of::<(St, SearchTreeIndex)>();
        let l = self.node_map.len();
        let c = self.node_map.capacity();
        writeln!(
            out,
            "  - |Index|:  {} ({})",
            l.separate_with_commas(),
            Size::from_bytes(l * s)
        )?;
        writeln!(
            out,
            "  - |Index|*: {} ({})",
            c.separate_with_commas(),
            Size::from_bytes(c * s)
        )?;

        let closed = self.nodes.iter().filter(|n| n.closed).count();
        writeln!(out, "  - Closed nodes: {}", closed.separate_with_commas())?;

        Ok(())
    }
}

impl<St, A, C> Default for SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<St, A, C> std::ops::Index<SearchTreeIndex> for SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    type Output = SearchTreeNode<St, A, C>;

    #[inline(always)]
    fn index(&self, index: SearchTreeIndex) -> &Self::Output {
        &self.nodes[index.get()]
    }
}

impl<St, A, C> std::ops::IndexMut<SearchTreeIndex> for SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    #[inline(always)]
    fn index_mut(&mut self, index: SearchTreeIndex) -> &mut SearchTreeNode<St, A, C> {
        &mut self.nodes[index.get()]
    }
}

impl<St, A, C> std::fmt::Debug for SearchTree<St, A, C>
where
    St: State,
    A: Action,
    C: Cost,
{
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SearchTree{{({} nodes)}}", self.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    struct Cell(u8);
    impl State for Cell {}

    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    struct Step(u8);
    impl Action for Step {
        fn is_stall(&self) -> bool {
            false
        }
        fn tie_break(&self) -> u64 {
            self.0 as u64
        }
    }

    #[test]
    fn reach_keeps_the_best_parent() {
        let mut tree = SearchTree::<Cell, Step, u64>::new();
        let root = tree.push_root(&Cell(0));
        let a = tree.reach(&Cell(1), (root, Step(1)), 5).unwrap();
        let b = tree.reach(&Cell(2), (root, Step(2)), 1).unwrap();

        // Worse or equal paths are ignored.
        assert_eq!(tree.reach(&Cell(1), (b, Step(3)), 5), None);
        // Better ones take over.
        assert_eq!(tree.reach(&Cell(1), (b, Step(3)), 2), Some(a));
        assert_eq!(tree[a].g(), 2);

        let plan = tree.path(a, 10).unwrap();
        assert_eq!(plan.actions, vec![Step(2), Step(3)]);
        assert_eq!(plan.cost, 2);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn closed_nodes_are_final() {
        let mut tree = SearchTree::<Cell, Step, u64>::new();
        let root = tree.push_root(&Cell(0));
        let a = tree.reach(&Cell(1), (root, Step(1)), 5).unwrap();
        tree.close(a);
        assert!(tree.is_closed(&Cell(1)));
        assert!(!tree.is_closed(&Cell(7)));
        assert_eq!(tree.reach(&Cell(1), (root, Step(9)), 1), None);
        assert_eq!(tree.index_of(&Cell(1)), Some(a));
    }

    #[test]
    fn path_respects_step_cap() {
        let mut tree = SearchTree::<Cell, Step, u64>::new();
        let mut i = tree.push_root(&Cell(0));
        for c in 1..=5u8 {
            i = tree.reach(&Cell(c), (i, Step(c)), c as u64).unwrap();
        }
        assert_eq!(tree.path(i, 5).map(|p| p.len()), Some(5));
        assert_eq!(tree.path(i, 4), None);

        let root_plan = tree.path(tree.index_of(&Cell(0)).unwrap(), 0).unwrap();
        assert!(root_plan.is_empty());
    }

    #[test]
    fn memory_stats() {
        let mut tree = SearchTree::<Cell, Step, u64>::new();
        let root = tree.push_root(&Cell(0));
        tree.close(root);
        for c in 1..=3u8 {
            tree.reach(&Cell(c), (root, Step(c)), 1);
        }

        let mut out = Vec::new();
        tree.write_memory_stats(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("SearchTree Stats:"));
        assert!(out.contains("|Nodes|:   4 ("));
        assert!(out.contains("Closed nodes: 1"));
    }
}
