use super::{Strategy, pool_exhausted};
use crate::error::AppResult;
use crate::utils::{TICKET_SIZE, candidate_pool, pick_random};
use rand::Rng;
use std::collections::BTreeSet;

pub(super) fn generate<R: Rng + ?Sized>(
    fixed: &BTreeSet<u8>,
    exclude: &BTreeSet<u8>,
    rng: &mut R,
) -> AppResult<Vec<u8>> {
    let need = TICKET_SIZE - fixed.len();
    let pool = candidate_pool(fixed, exclude);
    let picked =
        pick_random(&pool, need, rng).ok_or_else(|| pool_exhausted(Strategy::Random, need, pool.len()))?;
    Ok(fixed.iter().copied().chain(picked).collect())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::error::AppError;

    #[test]
    fn test_fails_when_pool_too_small() {
        let exclude: BTreeSet<u8> = (1..=41).collect();
        let err = generate(&BTreeSet::new(), &exclude, &mut rng(3)).unwrap_err();
        assert!(matches!(err, AppError::GenerationFailed(msg) if msg.contains("only 4 candidates")));
    }

    #[test]
    fn test_exact_pool_is_used_entirely() {
        let exclude: BTreeSet<u8> = (1..=39).collect();
        let mut nums = generate(&BTreeSet::new(), &exclude, &mut rng(3)).unwrap();
        nums.sort_unstable();
        assert_eq!(nums, vec![40, 41, 42, 43, 44, 45]);
    }
}
