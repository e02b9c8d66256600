use serde::Serialize;

/// 单类评估结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationSummary {
    pub draw_no: i32,
    /// 本次新写入的结果条数
    pub evaluated: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateAllSummary {
    pub draw_no: i32,
    pub recommend: u64,
    pub purchase: u64,
    pub total: u64,
}

impl EvaluateAllSummary {
    pub fn new(draw_no: i32, recommend: EvaluationSummary, purchase: EvaluationSummary) -> Self {
        Self {
            draw_no,
            recommend: recommend.evaluated,
            purchase: purchase.evaluated,
            total: recommend.evaluated + purchase.evaluated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RankCount {
    pub rank: i16,
    pub count: i64,
}

/// 0..=5 each present, missing ranks filled with zero
pub fn fill_rank_counts(rows: impl IntoIterator<Item = (i16, i64)>) -> Vec<RankCount> {
    let mut counts = [0i64; 6];
    for (rank, count) in rows {
        if let Some(slot) = usize::try_from(rank).ok().and_then(|r| counts.get_mut(r)) {
            *slot += count;
        }
    }
    counts
        .iter()
        .enumerate()
        .map(|(rank, &count)| RankCount {
            rank: rank as i16,
            count,
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRankCounts {
    pub draw_no: i32,
    pub recommend: Vec<RankCount>,
    pub purchase: Vec<RankCount>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rank_counts() {
        let filled = fill_rank_counts([(0, 10), (5, 2), (5, 1), (9, 4), (-1, 3)]);
        assert_eq!(filled.len(), 6);
        assert_eq!(filled[0].count, 10);
        assert_eq!(filled[3].count, 0);
        assert_eq!(filled[5].count, 3);
    }
}
