use super::random;
use crate::error::{AppError, AppResult};
use rand::Rng;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

pub const SUM_RANGE: RangeInclusive<u32> = 100..=200;
pub const MAX_ATTEMPTS: usize = 500;

pub(super) fn generate<R: Rng + ?Sized>(
    fixed: &BTreeSet<u8>,
    exclude: &BTreeSet<u8>,
    rng: &mut R,
) -> AppResult<Vec<u8>> {
    for _ in 0..MAX_ATTEMPTS {
        let nums = random::generate(fixed, exclude, rng)?;
        let sum: u32 = nums.iter().map(|&n| n as u32).sum();
        if SUM_RANGE.contains(&sum) {
            return Ok(nums);
        }
    }
    Err(AppError::GenerationFailed(format!(
        "sumRange: no ticket with sum in {}..={} after {MAX_ATTEMPTS} attempts",
        SUM_RANGE.start(),
        SUM_RANGE.end()
    )))
}
