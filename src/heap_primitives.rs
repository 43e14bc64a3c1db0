// Heap intrinsic operations implemented externally.
//
// A heap is a tree-like structure where every subtree's root has a better score
// than all the other nodes in the subtree.
//
// This is often implemented with an array that's traversed in a non-linear way.
// With arity `A` every node has `A` children laid out contiguously, which keeps
// the siblings we compare on a single cache line.
//
// ```text
// A = 2:
//                           0
//              1                         2
//       3            4            5             6
//   7      8      9     10    11     12     13     14
// ```
//
// You can go up, to the first child, and to the last child with,
//   - Up:          `(i-1)/A`
//   - First child: `(A*i) + 1`
//   - Last child:  `A*(i+1)`

/// The parent node
///
/// ```
/// use rescue::heap_primitives::index_parent;
/// assert_eq!(index_parent::<2>(1), 0);
/// assert_eq!(index_parent::<2>(2), 0);
/// assert_eq!(index_parent::<2>(6), 2);
/// assert_eq!(index_parent::<8>(8), 0);
/// assert_eq!(index_parent::<8>(9), 1);
/// assert_eq!(index_parent::<8>(72), 8);
/// ```
#[inline(always)]
#[must_use]
pub fn index_parent<const A: usize>(i: usize) -> usize {
    (i - 1) / A
}

/// The first children
///
/// ```
/// use rescue::heap_primitives::index_first_children;
/// assert_eq!(index_first_children::<2usize>(0), 1);
/// assert_eq!(index_first_children::<2usize>(3), 7);
/// assert_eq!(index_first_children::<8usize>(0), 1);
/// assert_eq!(index_first_children::<8usize>(1), 9);
/// ```
#[inline(always)]
#[must_use]
pub fn index_first_children<const A: usize>(i: usize) -> usize {
    (A * i) + 1
}

/// The last children
///
/// ```
/// use rescue::heap_primitives::index_last_children;
/// assert_eq!(index_last_children::<2usize>(0), 2);
/// assert_eq!(index_last_children::<2usize>(6), 14);
/// assert_eq!(index_last_children::<8usize>(0), 8);
/// assert_eq!(index_last_children::<8usize>(1), 16);
/// ```
#[inline(always)]
#[must_use]
pub fn index_last_children<const A: usize>(i: usize) -> usize {
    A * (i + 1)
}
