use super::{Strategy, pool_exhausted};
use crate::error::AppResult;
use crate::models::FrequencyTable;
use crate::utils::{TICKET_SIZE, candidate_pool, pick_random};
use rand::Rng;
use std::collections::BTreeSet;

pub const BUCKET_SIZE: usize = 15;
const HOT_TARGET: usize = 4;
const COLD_TARGET: usize = 2;

/// (热号, 冷号)：按次数降序的前 15 与后 15
pub fn buckets(history: &FrequencyTable) -> (Vec<u8>, Vec<u8>) {
    let ranked = history.ranked_desc();
    let hot = ranked[..BUCKET_SIZE].to_vec();
    let cold = ranked[ranked.len() - BUCKET_SIZE..].to_vec();
    (hot, cold)
}

pub(super) fn generate<R: Rng + ?Sized>(
    fixed: &BTreeSet<u8>,
    exclude: &BTreeSet<u8>,
    history: &FrequencyTable,
    rng: &mut R,
) -> AppResult<Vec<u8>> {
    let (hot, cold) = buckets(history);
    let available = |bucket: &[u8]| -> Vec<u8> {
        bucket
            .iter()
            .copied()
            .filter(|n| !fixed.contains(n) && !exclude.contains(n))
            .collect()
    };
    let hot_pool = available(&hot);
    let cold_pool = available(&cold);

    let mut slots = TICKET_SIZE - fixed.len();
    let fixed_hot = fixed.iter().filter(|n| hot.contains(n)).count();
    let fixed_cold = fixed.iter().filter(|n| cold.contains(n)).count();

    let hot_need = HOT_TARGET.saturating_sub(fixed_hot).min(slots).min(hot_pool.len());
    let mut chosen: BTreeSet<u8> = fixed.clone();
    if let Some(picked) = pick_random(&hot_pool, hot_need, rng) {
        chosen.extend(picked);
    }
    slots -= hot_need;

    let cold_need = COLD_TARGET.saturating_sub(fixed_cold).min(slots).min(cold_pool.len());
    if let Some(picked) = pick_random(&cold_pool, cold_need, rng) {
        chosen.extend(picked);
    }

    // 不足 6 个时从全部候选中补齐
    let short = TICKET_SIZE - chosen.len();
    if short > 0 {
        let pool = candidate_pool(&chosen, exclude);
        let filler =
            pick_random(&pool, short, rng).ok_or_else(|| pool_exhausted(Strategy::HotCold, short, pool.len()))?;
        chosen.extend(filler);
    }
    Ok(chosen.into_iter().collect())
}
