use super::{Strategy, pool_exhausted};
use crate::error::{AppError, AppResult};
use crate::utils::{candidate_pool, pick_random};
use rand::Rng;
use std::collections::BTreeSet;

const PER_PARITY: usize = 3;

pub(super) fn generate<R: Rng + ?Sized>(
    fixed: &BTreeSet<u8>,
    exclude: &BTreeSet<u8>,
    rng: &mut R,
) -> AppResult<Vec<u8>> {
    let fixed_odd = fixed.iter().filter(|&&n| n % 2 == 1).count();
    let fixed_even = fixed.len() - fixed_odd;
    if fixed_odd > PER_PARITY || fixed_even > PER_PARITY {
        return Err(AppError::GenerationFailed(format!(
            "evenOdd: fixed numbers hold {fixed_odd} odd and {fixed_even} even, at most {PER_PARITY} of each allowed"
        )));
    }

    let (odd_pool, even_pool): (Vec<u8>, Vec<u8>) =
        candidate_pool(fixed, exclude).into_iter().partition(|n| n % 2 == 1);

    let need_odd = PER_PARITY - fixed_odd;
    let need_even = PER_PARITY - fixed_even;
    let odd = pick_random(&odd_pool, need_odd, rng)
        .ok_or_else(|| pool_exhausted(Strategy::EvenOdd, need_odd, odd_pool.len()))?;
    let even = pick_random(&even_pool, need_even, rng)
        .ok_or_else(|| pool_exhausted(Strategy::EvenOdd, need_even, even_pool.len()))?;

    Ok(fixed.iter().copied().chain(odd).chain(even).collect())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::models::TicketSet;

    #[test]
    fn test_always_three_odd_three_even() {
        let mut rng = rng(9);
        for (fixed, exclude) in constraint_cases() {
            for _ in 0..100 {
                let ticket = TicketSet::new(generate(&fixed, &exclude, &mut rng).unwrap()).unwrap();
                assert_eq!(ticket.odd_count(), 3, "{ticket}");
                assert_contract(&ticket, &fixed, &exclude);
            }
        }
    }

    #[test]
    fn test_four_fixed_of_one_parity_fails() {
        let fixed = BTreeSet::from([1, 3, 5, 7]);
        assert!(generate(&fixed, &BTreeSet::new(), &mut rng(1)).is_err());
        let fixed = BTreeSet::from([2, 4, 6, 8]);
        assert!(generate(&fixed, &BTreeSet::new(), &mut rng(1)).is_err());
    }

    #[test]
    fn test_short_parity_pool_fails() {
        // 只剩 2 个奇数
        let exclude: BTreeSet<u8> = (1..=41).step_by(2).collect();
        let err = generate(&BTreeSet::new(), &exclude, &mut rng(1)).unwrap_err();
        assert!(matches!(err, AppError::GenerationFailed(_)));
    }
}
