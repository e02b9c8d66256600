use crate::error::AppError;
use crate::models::RankCount;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// 看板聚合类型，与期号一起构成缓存键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardKind {
    Summary,
    Ratio,
    Distribution,
}

impl DashboardKind {
    pub const ALL: [DashboardKind; 3] = [
        DashboardKind::Summary,
        DashboardKind::Ratio,
        DashboardKind::Distribution,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DashboardKind::Summary => "summary",
            DashboardKind::Ratio => "ratio",
            DashboardKind::Distribution => "distribution",
        }
    }
}

impl fmt::Display for DashboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DashboardKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| AppError::invalid(format!("unknown dashboard kind: {s}")))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub draw_no: i32,
    pub purchase_count: u64,
    pub recommend_count: u64,
    pub purchase_wins: u64,
    pub recommend_wins: u64,
    /// 百分比，保留两位小数
    pub purchase_win_rate: f64,
    pub recommend_win_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRatio {
    pub draw_no: i32,
    pub purchase_by_source: Vec<LabelCount>,
    pub recommend_by_algorithm: Vec<LabelCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NumberCount {
    pub number: u8,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardDistribution {
    pub draw_no: i32,
    pub top_numbers: Vec<NumberCount>,
    /// 截至本期（含）所有购买与推荐的奖级累计
    pub rank_distribution: Vec<RankCount>,
}

pub fn win_rate(wins: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (wins as f64 * 10_000.0 / total as f64).round() / 100.0
}
