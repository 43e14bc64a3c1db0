pub trait Cost:
    Copy
    + std::fmt::Debug
    + std::fmt::Display
    + PartialEq
    + core::cmp::Eq
    + PartialOrd
    + Ord
    + num_traits::SaturatingAdd
    + num_traits::bounds::UpperBounded
    + num_traits::Zero
    + num_traits::One
    + std::ops::Add<Self, Output = Self>
{
    /// Whether this cost is finite.
    #[inline(always)]
    fn valid(&self) -> bool {
        *self != num_traits::bounds::UpperBounded::max_value()
    }

    /// The absorbing "unreachable" cost.
    #[inline(always)]
    fn infinity() -> Self {
        num_traits::bounds::UpperBounded::max_value()
    }
}

/// Time units spent by an agent. `Time::MAX` stands for "never".
pub type Time = u64;
impl Cost for Time {}

pub const UNREACHABLE: Time = Time::MAX;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinity_absorbs() {
        use num_traits::SaturatingAdd;

        let inf = <Time as Cost>::infinity();
        assert_eq!(inf, UNREACHABLE);
        assert!(!inf.valid());
        assert_eq!(SaturatingAdd::saturating_add(&inf, &3), UNREACHABLE);
        assert_eq!(SaturatingAdd::saturating_add(&3u64, &inf), UNREACHABLE);
    }

    #[test]
    fn finite_costs_are_valid() {
        assert!(0u64.valid());
        assert!((UNREACHABLE - 1).valid());
    }
}
