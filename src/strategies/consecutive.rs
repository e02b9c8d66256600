use super::{Strategy, pool_exhausted, random};
use crate::error::{AppError, AppResult};
use crate::utils::{TICKET_SIZE, candidate_pool, pick_random};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::BTreeSet;

fn has_pair(nums: &BTreeSet<u8>) -> bool {
    nums.iter().any(|n| nums.contains(&(n + 1)))
}

pub(super) fn generate<R: Rng + ?Sized>(
    fixed: &BTreeSet<u8>,
    exclude: &BTreeSet<u8>,
    rng: &mut R,
) -> AppResult<Vec<u8>> {
    if has_pair(fixed) {
        return random::generate(fixed, exclude, rng);
    }

    let need = TICKET_SIZE - fixed.len();
    let pool = candidate_pool(fixed, exclude);
    let anchor: Vec<u8> = match need {
        0 => {
            return Err(AppError::GenerationFailed(
                "consecutive: fixed numbers fill the ticket without a consecutive pair".to_string(),
            ));
        }
        // 只剩一个空位：必须与某个固定号相邻
        1 => {
            let neighbours: Vec<u8> = pool
                .iter()
                .copied()
                .filter(|n| fixed.contains(&(n + 1)) || (*n > 1 && fixed.contains(&(n - 1))))
                .collect();
            let pick = neighbours.choose(rng).copied().ok_or_else(|| {
                AppError::GenerationFailed(
                    "consecutive: no candidate adjacent to the fixed numbers".to_string(),
                )
            })?;
            vec![pick]
        }
        _ => {
            let pairs: Vec<(u8, u8)> = pool
                .windows(2)
                .filter(|w| w[1] == w[0] + 1)
                .map(|w| (w[0], w[1]))
                .collect();
            let (a, b) = pairs.choose(rng).copied().ok_or_else(|| {
                AppError::GenerationFailed("consecutive: no adjacent pair left in the pool".to_string())
            })?;
            vec![a, b]
        }
    };

    let rest_pool: Vec<u8> = pool.into_iter().filter(|n| !anchor.contains(n)).collect();
    let rest_need = need - anchor.len();
    let rest = pick_random(&rest_pool, rest_need, rng)
        .ok_or_else(|| pool_exhausted(Strategy::Consecutive, rest_need, rest_pool.len()))?;

    Ok(fixed
        .iter()
        .copied()
        .chain(anchor)
        .chain(rest)
        .collect())
}
