//! Pair enumeration.

use itertools::Itertools;

/// Every unordered index pair `(i, j)` with `i < j < n`, ascending in `i`
/// then `j`. Empty for `n <= 1`.
#[must_use]
pub fn enumerate_pairs(n: usize) -> Vec<(usize, usize)> {
    (0..n).tuple_combinations().collect()
}

/// Number of pairs [`enumerate_pairs`] yields for `n` inputs.
#[must_use]
pub const fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_inputs_have_no_pairs() {
        assert!(enumerate_pairs(0).is_empty());
        assert!(enumerate_pairs(1).is_empty());
    }

    #[test]
    fn test_order_is_ascending() {
        assert_eq!(
            enumerate_pairs(4),
            vec![(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]
        );
    }
}

#[cfg(test)]
mod property_tests {
    use std::collections::HashSet;

    use quickcheck::quickcheck;

    use super::*;

    quickcheck! {
        fn prop_pair_count(n: u8) -> bool {
            let n = usize::from(n % 64);
            enumerate_pairs(n).len() == pair_count(n)
        }

        fn prop_pairs_are_unique_and_ordered(n: u8) -> bool {
            let n = usize::from(n % 64);
            let pairs = enumerate_pairs(n);
            let unique: HashSet<_> = pairs.iter().copied().collect();
            unique.len() == pairs.len()
                && pairs.iter().all(|&(i, j)| i < j && j < n)
                && pairs.windows(2).all(|w| w[0] < w[1])
        }
    }
}
