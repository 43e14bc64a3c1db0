// Arg-min over the siblings of a heap node.
//
// Siblings are compared as a tournament instead of a left-to-right scan. The
// two halves of each round don't depend on each other, which keeps more
// comparisons in flight than a fold over the best-so-far.
//
// 0   1 2   3 4   5 6   7
// *   * *   * *   * *   *
//  \ /   \ /   \ /   \ /
//   *     *     *     *
//    \   /       \   /
//      *           *
//        \        /
//            *

/// Core comparison and index selection. Ties go left.
#[inline(always)]
#[must_use]
fn fight<T: PartialOrd>(a: &[T], l: usize, r: usize) -> usize {
    if a[l] <= a[r] { l } else { r }
}

/// Index of the smallest element in `a[lo..hi]`.
#[inline(always)]
#[must_use]
fn tournament<T: PartialOrd>(a: &[T], lo: usize, hi: usize) -> usize {
    debug_assert!(lo < hi);
    match hi - lo {
        1 => lo,
        2 => fight(a, lo, lo + 1),
        len => {
            let mid = lo + len.next_power_of_two() / 2;
            fight(a, tournament(a, lo, mid), tournament(a, mid, hi))
        }
    }
}

/// Index of the smallest element of a non-empty slice.
///
/// ```
/// use rescue::derank::derank;
/// assert_eq!(derank(&[3u8]), 0);
/// assert_eq!(derank(&[3u8, 1u8, 2u8]), 1);
/// assert_eq!(derank(&[1u8, 5u8, 0u8, 4u8, 6u8, 3u8, 7u8, 2u8]), 2);
/// ```
#[inline(always)]
#[must_use]
pub fn derank<T: PartialOrd>(a: &[T]) -> usize {
    debug_assert!(!a.is_empty(), "derank needs at least one contender");
    tournament(a, 0, a.len())
}
