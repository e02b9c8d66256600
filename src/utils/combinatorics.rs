use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::{BTreeSet, HashSet};
use std::hash::Hash;

pub const LOTTO_MIN: u8 = 1;
pub const LOTTO_MAX: u8 = 45;
/// 一注号码个数
pub const TICKET_SIZE: usize = 6;

/// 去重并保持首次出现的顺序
pub fn uniq<T: Copy + Eq + Hash>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items.into_iter().filter(|v| seen.insert(*v)).collect()
}

pub fn in_range(n: i64) -> bool {
    (LOTTO_MIN as i64..=LOTTO_MAX as i64).contains(&n)
}

/// 1..=45 中去掉固定号与排除号后的候选池（升序）
pub fn candidate_pool(fixed: &BTreeSet<u8>, exclude: &BTreeSet<u8>) -> Vec<u8> {
    (LOTTO_MIN..=LOTTO_MAX)
        .filter(|n| !fixed.contains(n) && !exclude.contains(n))
        .collect()
}

/// 从候选池中等概率无放回抽取 n 个；候选不足时返回 None
pub fn pick_random<R: Rng + ?Sized>(pool: &[u8], n: usize, rng: &mut R) -> Option<Vec<u8>> {
    if pool.len() < n {
        return None;
    }
    let mut shuffled = pool.to_vec();
    shuffled.shuffle(rng);
    shuffled.truncate(n);
    Some(shuffled)
}

/// 按权重无放回抽取 n 个
///
/// 每抽一个都重新对剩余权重求和，O(n) per draw，45 个号码可以接受。
/// 候选不足或剩余权重和为 0 时返回 None。
pub fn weighted_pick<R: Rng + ?Sized>(
    candidates: &[(u8, u32)],
    n: usize,
    rng: &mut R,
) -> Option<Vec<u8>> {
    if candidates.len() < n {
        return None;
    }
    let mut remaining = candidates.to_vec();
    let mut picked = Vec::with_capacity(n);
    for _ in 0..n {
        let total: u64 = remaining.iter().map(|(_, w)| *w as u64).sum();
        if total == 0 {
            return None;
        }
        let mut target = rng.gen_range(0..total);
        let mut idx = remaining.len() - 1;
        for (i, (_, w)) in remaining.iter().enumerate() {
            let w = *w as u64;
            if target < w {
                idx = i;
                break;
            }
            target -= w;
        }
        picked.push(remaining.swap_remove(idx).0);
    }
    Some(picked)
}

pub fn match_count(ticket: &[u8], winning: &[u8]) -> u8 {
    ticket.iter().filter(|n| winning.contains(n)).count() as u8
}

/// 奖级：6 中 → 1；5 中 + 奖励号 → 2；5 中 → 3；4 中 → 4；3 中 → 5；其余 0
pub fn classify_rank(match_count: u8, bonus_match: bool) -> u8 {
    match (match_count, bonus_match) {
        (6, _) => 1,
        (5, true) => 2,
        (5, false) => 3,
        (4, _) => 4,
        (3, _) => 5,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_uniq_keeps_first_occurrence() {
        assert_eq!(uniq([5, 3, 5, 1, 3]), vec![5, 3, 1]);
    }

    #[test]
    fn test_candidate_pool_skips_fixed_and_excluded() {
        let fixed = BTreeSet::from([1, 2]);
        let exclude = BTreeSet::from([45]);
        let pool = candidate_pool(&fixed, &exclude);
        assert_eq!(pool.len(), 42);
        assert_eq!(pool.first(), Some(&3));
        assert_eq!(pool.last(), Some(&44));
    }

    #[test]
    fn test_pick_random_returns_distinct_members() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool: Vec<u8> = (10..20).collect();
        let picked = pick_random(&pool, 4, &mut rng).unwrap();
        assert_eq!(picked.len(), 4);
        assert_eq!(uniq(picked.iter().copied()).len(), 4);
        assert!(picked.iter().all(|n| pool.contains(n)));
        assert!(pick_random(&pool, 11, &mut rng).is_none());
    }

    #[test]
    fn test_weighted_pick_never_picks_zero_weight() {
        let mut rng = StdRng::seed_from_u64(11);
        let candidates = [(1, 0), (2, 5), (3, 0), (4, 1)];
        for _ in 0..200 {
            let picked = weighted_pick(&candidates, 2, &mut rng).unwrap();
            assert!(picked.contains(&2) && picked.contains(&4));
        }
        assert!(weighted_pick(&candidates, 3, &mut rng).is_none());
    }

    #[test]
    fn test_weighted_pick_prefers_heavier_numbers() {
        let mut rng = StdRng::seed_from_u64(3);
        let candidates = [(7, 51), (40, 1)];
        let heavy = (0..1000)
            .filter(|_| weighted_pick(&candidates, 1, &mut rng).unwrap() == vec![7])
            .count();
        assert!(heavy > 900, "heavy picked {heavy} times");
    }

    #[test]
    fn test_classify_rank_table() {
        assert_eq!(classify_rank(6, false), 1);
        assert_eq!(classify_rank(6, true), 1);
        assert_eq!(classify_rank(5, true), 2);
        assert_eq!(classify_rank(5, false), 3);
        assert_eq!(classify_rank(4, true), 4);
        assert_eq!(classify_rank(3, false), 5);
        for m in 0..=2 {
            assert_eq!(classify_rank(m, true), 0);
            assert_eq!(classify_rank(m, false), 0);
        }
    }

    #[test]
    fn test_match_count() {
        assert_eq!(match_count(&[1, 2, 3, 4, 5, 6], &[3, 11, 18, 25, 33, 42]), 1);
        assert_eq!(match_count(&[3, 11, 18, 25, 33, 42], &[3, 11, 18, 25, 33, 42]), 6);
    }
}
