use super::{Strategy, pool_exhausted};
use crate::error::AppResult;
use crate::models::FrequencyTable;
use crate::utils::{TICKET_SIZE, candidate_pool, weighted_pick};
use rand::Rng;
use std::collections::BTreeSet;

/// 候选号码权重 = 出现次数 + 1，保证从未出现的号码也有机会
pub fn selection_weights(
    history: &FrequencyTable,
    fixed: &BTreeSet<u8>,
    exclude: &BTreeSet<u8>,
) -> Vec<(u8, u32)> {
    candidate_pool(fixed, exclude)
        .into_iter()
        .map(|n| (n, history.count(n) + 1))
        .collect()
}

pub(super) fn generate<R: Rng + ?Sized>(
    fixed: &BTreeSet<u8>,
    exclude: &BTreeSet<u8>,
    history: &FrequencyTable,
    rng: &mut R,
) -> AppResult<Vec<u8>> {
    let need = TICKET_SIZE - fixed.len();
    let weights = selection_weights(history, fixed, exclude);
    let picked = weighted_pick(&weights, need, rng)
        .ok_or_else(|| pool_exhausted(Strategy::Frequency, need, weights.len()))?;
    Ok(fixed.iter().copied().chain(picked).collect())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    /// 7 在最近 50 期每期都出现，40 从未出现
    fn skewed_history() -> FrequencyTable {
        let draws = (0..50).flat_map(|i| {
            let others = [1 + i % 5, 8 + i % 6, 15 + i % 7, 23 + i % 8, 32 + i % 7];
            std::iter::once(7u8).chain(others)
        });
        FrequencyTable::from_numbers(draws)
    }

    #[test]
    fn test_hot_number_outweighs_unseen_number() {
        let history = skewed_history();
        assert_eq!(history.count(7), 50);
        assert_eq!(history.count(40), 0);

        let weights = selection_weights(&history, &BTreeSet::new(), &BTreeSet::new());
        let weight = |n: u8| weights.iter().find(|(num, _)| *num == n).map(|(_, w)| *w).unwrap();
        assert!(weight(7) > weight(40));
        assert_eq!(weight(40), 1);
    }

    #[test]
    fn test_weights_skip_fixed_and_excluded() {
        let weights = selection_weights(&FrequencyTable::empty(), &BTreeSet::from([1]), &BTreeSet::from([2]));
        assert_eq!(weights.len(), 43);
        assert!(weights.iter().all(|(n, w)| *n > 2 && *w == 1));
    }

    #[test]
    fn test_hot_number_is_picked_more_often() {
        let history = skewed_history();
        let mut rng = rng(23);
        let (mut with_7, mut with_40) = (0, 0);
        for _ in 0..500 {
            let nums = generate(&BTreeSet::new(), &BTreeSet::new(), &history, &mut rng).unwrap();
            with_7 += nums.contains(&7) as usize;
            with_40 += nums.contains(&40) as usize;
        }
        assert!(with_7 > with_40, "7: {with_7}, 40: {with_40}");
    }
}
