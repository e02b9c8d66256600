use crate::utils::{LOTTO_MAX, LOTTO_MIN, TICKET_SIZE};
use serde::Serialize;
use std::fmt;

/// 一注号码：6 个互不相同的 1..=45，升序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TicketSet([u8; TICKET_SIZE]);

impl TicketSet {
    /// 不满足 6 个不重复且在范围内时返回 None
    pub fn new(numbers: impl IntoIterator<Item = u8>) -> Option<Self> {
        let mut nums: Vec<u8> = numbers.into_iter().collect();
        if nums.len() != TICKET_SIZE {
            return None;
        }
        nums.sort_unstable();
        if nums.windows(2).any(|w| w[0] == w[1]) {
            return None;
        }
        if nums.iter().any(|n| !(LOTTO_MIN..=LOTTO_MAX).contains(n)) {
            return None;
        }
        let mut arr = [0u8; TICKET_SIZE];
        arr.copy_from_slice(&nums);
        Some(Self(arr))
    }

    /// 从数据库行 (pos 顺序) 还原
    pub fn from_stored(numbers: impl IntoIterator<Item = i16>) -> Option<Self> {
        let nums: Option<Vec<u8>> = numbers.into_iter().map(|n| u8::try_from(n).ok()).collect();
        Self::new(nums?)
    }

    pub fn numbers(&self) -> &[u8; TICKET_SIZE] {
        &self.0
    }

    pub fn contains(&self, n: u8) -> bool {
        self.0.binary_search(&n).is_ok()
    }

    pub fn sum(&self) -> u32 {
        self.0.iter().map(|&n| n as u32).sum()
    }

    pub fn odd_count(&self) -> usize {
        self.0.iter().filter(|&&n| n % 2 == 1).count()
    }

    pub fn has_consecutive_pair(&self) -> bool {
        self.0.windows(2).any(|w| w[1] == w[0] + 1)
    }
}

impl fmt::Display for TicketSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|n| n.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}
