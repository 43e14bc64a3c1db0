use std::cmp::min;
use std::fmt::Debug;

use crate::derank::derank;

const HEAP_ARITY: usize = 8usize;
#[inline(always)]
#[must_use]
fn up(i: usize) -> usize {
    crate::heap_primitives::index_parent::<HEAP_ARITY>(i)
}
#[inline(always)]
#[must_use]
fn down_left(i: usize) -> usize {
    crate::heap_primitives::index_first_children::<HEAP_ARITY>(i)
}
#[cfg_attr(not(debug_assertions), allow(dead_code))]
#[inline(always)]
#[must_use]
fn down_right(i: usize) -> usize {
    crate::heap_primitives::index_last_children::<HEAP_ARITY>(i)
}

/// The Open List of a search.
///
/// A d-ary min-heap over whatever ranking the nodes carry. Entries are never
/// re-ranked in place; searches push a fresh entry when they find a better
/// path and skip stale ones when they pop a State that's already closed.
#[derive(Debug)]
pub struct OpenList<N>
where
    N: Debug + Ord,
{
    heap: Vec<N>,
}

impl<N> OpenList<N>
where
    N: Debug + Ord,
{
    pub fn new() -> Self {
        Self { heap: vec![] }
    }
    pub fn with_capacity(s: usize) -> Self {
        Self {
            heap: Vec::with_capacity(s),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn peek(&self) -> Option<&N> {
        self.heap.first()
    }

    pub fn push(&mut self, n: N) {
        self.verify_heap();
        let heap_index = self.heap.len(); // Future heap_index

        self.heap.push(n);
        self.sift_up(heap_index);

        self.verify_heap();
    }

    pub fn pop(&mut self) -> Option<N> {
        self.verify_heap();

        if self.heap.len() <= 1 {
            return self.heap.pop();
        }

        let top = self.pop_non_trivial_heap();
        self.verify_heap();
        Some(top)
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }

    #[inline(always)]
    #[cfg(not(feature = "verify"))]
    pub(crate) fn verify_heap(&self) {
        // All good... (hopefully)
    }

    #[inline(always)]
    #[cfg(feature = "verify")]
    pub(crate) fn verify_heap(&self) {
        // Every node goes after its parent node, if any.
        for i in 1..self.heap.len() {
            let p = up(i);
            debug_assert!(
                self.heap[p] <= self.heap[i],
                "Node[{p}]={:?} !<= child [{i}]={:?}. Out of heap of len={}",
                self.heap[p],
                self.heap[i],
                self.heap.len(),
            );
        }
    }

    // Implementation details

    /// Pops the top node from a Heap with at least 2 elements.
    ///
    /// Works by unfairly sifting down the top-node to the last level, where it
    /// can be swapped with the very last element of the array and popped.
    /// Temporarily breaks invariants around the node sifting down unfairly.
    fn pop_non_trivial_heap(&mut self) -> N {
        debug_assert!(
            self.heap.len() > 1,
            "It doesn't get easier. Why are you calling this?"
        );

        // 1. We pretend there's a hole at the root, and bubble the best child
        //    up till the hole reaches the bottom.
        // 2. If the hole is not the last element, we swap it for the last one.
        // 3. Now the last element is the one that was at the top, we pop it.
        let len = self.heap.len();
        let last = len - 1;

        let mut hole = 0;
        loop {
            let mut child = down_left(hole);
            if child >= len {
                break;
            }
            debug_assert_eq!(child + HEAP_ARITY, down_right(hole) + 1);
            child += derank(&self.heap[child..min(child + HEAP_ARITY, len)]);

            self.heap.swap(hole, child);
            hole = child;
        }
        // NOTE: The hole made it to the last level, but it may not be at the
        // end of the array.
        debug_assert!(hole <= last, "The hole={hole} is past last={last}");
        if hole != last {
            self.heap.swap(hole, last);
            self.sift_up(hole);
        }

        match self.heap.pop() {
            Some(top) => top,
            None => unreachable!("The heap had at least 2 nodes"),
        }
    }

    /// Raises a node.
    /// Returns its new index.
    #[inline(always)]
    fn sift_up(&mut self, index: usize) -> usize {
        debug_assert!(index < self.heap.len(), "Index out of bounds...");

        let mut pos = index;
        while pos != 0 {
            let parent = up(pos);
            if self.heap[parent] <= self.heap[pos] {
                break;
            }
            self.heap.swap(parent, pos);
            pos = parent;
        }
        pos
    }
}

impl<N> Default for OpenList<N>
where
    N: Debug + Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_list_works() {
        let mut open = OpenList::<String>::new();

        let n = "aoeu".to_string();
        open.push(n.clone());
        assert_eq!(open.len(), 1);
        assert_eq!(open.pop(), Some(n));
        assert!(open.is_empty());
        assert_eq!(open.pop(), None);
    }

    #[test]
    fn open_list_sorts() {
        let mut open = OpenList::<&str>::new();
        for name in ["c", "e", "f", "a", "d", "b"] {
            open.push(name);
        }
        assert_eq!(open.peek(), Some(&"a"));

        let popped: Vec<&str> = std::iter::from_fn(|| open.pop()).collect();
        assert_eq!(popped, vec!["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn open_list_sorts_past_one_level() {
        // 8-ary heaps need more than 9 elements to grow a third level.
        let mut open = OpenList::<(u32, u32)>::with_capacity(128);
        let mut expected = vec![];
        for i in 0..100u32 {
            let key = (i * 37) % 101;
            open.push((key, i));
            expected.push((key, i));
        }
        expected.sort();

        let popped: Vec<(u32, u32)> = std::iter::from_fn(|| open.pop()).collect();
        assert_eq!(popped, expected);
    }

    #[test]
    fn interleaved_push_pop() {
        let mut open = OpenList::<u32>::new();
        open.push(5);
        open.push(3);
        assert_eq!(open.pop(), Some(3));
        open.push(1);
        open.push(4);
        assert_eq!(open.pop(), Some(1));
        assert_eq!(open.pop(), Some(4));
        assert_eq!(open.pop(), Some(5));
        open.clear();
        assert!(open.is_empty());
    }
}
