use crate::utils::{LOTTO_MAX, LOTTO_MIN};

/// 号码出现次数统计（下标即号码，0 不使用）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: [u32; LOTTO_MAX as usize + 1],
}

impl Default for FrequencyTable {
    fn default() -> Self {
        Self {
            counts: [0; LOTTO_MAX as usize + 1],
        }
    }
}

impl FrequencyTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// 范围外的号码忽略
    pub fn from_numbers(numbers: impl IntoIterator<Item = u8>) -> Self {
        let mut table = Self::default();
        for n in numbers {
            if (LOTTO_MIN..=LOTTO_MAX).contains(&n) {
                table.counts[n as usize] += 1;
            }
        }
        table
    }

    pub fn from_counts(counts: impl IntoIterator<Item = (u8, u32)>) -> Self {
        let mut table = Self::default();
        for (n, c) in counts {
            if (LOTTO_MIN..=LOTTO_MAX).contains(&n) {
                table.counts[n as usize] += c;
            }
        }
        table
    }

    pub fn count(&self, n: u8) -> u32 {
        self.counts.get(n as usize).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// 全部 45 个号码按次数降序，次数相同时号码小的在前
    pub fn ranked_desc(&self) -> Vec<u8> {
        let mut nums: Vec<u8> = (LOTTO_MIN..=LOTTO_MAX).collect();
        nums.sort_by(|a, b| self.count(*b).cmp(&self.count(*a)).then(a.cmp(b)));
        nums
    }

    /// 次数最多的 n 个号码（只含出现过的）
    pub fn top(&self, n: usize) -> Vec<(u8, u32)> {
        self.ranked_desc()
            .into_iter()
            .map(|num| (num, self.count(num)))
            .filter(|(_, c)| *c > 0)
            .take(n)
            .collect()
    }

    /// 窗口内从未出现的号码
    pub fn dormant(&self) -> Vec<u8> {
        (LOTTO_MIN..=LOTTO_MAX).filter(|&n| self.count(n) == 0).collect()
    }
}
