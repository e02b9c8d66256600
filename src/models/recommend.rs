use crate::error::{AppError, AppResult};
use crate::models::TicketSet;
use crate::strategies::{Strategy, StrategySelection};
use crate::utils::{LOTTO_MAX, LOTTO_MIN, TICKET_SIZE, in_range, uniq};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const MAX_RECOMMEND_COUNT: i64 = 5;

/// 推荐请求
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub strategy: Option<String>,
    /// 缺省为 1；strategy 为 all 时忽略
    pub count: Option<i64>,
    #[serde(default)]
    pub fixed_numbers: Vec<i64>,
    #[serde(default)]
    pub exclude_numbers: Vec<i64>,
}

/// 校验通过后的推荐参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendParams {
    pub selection: StrategySelection,
    pub count: usize,
    pub fixed: BTreeSet<u8>,
    pub exclude: BTreeSet<u8>,
}

impl RecommendRequest {
    /// 收集全部违规项后一次性返回
    pub fn validate(&self) -> AppResult<RecommendParams> {
        let mut errors = Vec::new();

        let selection = match self.strategy.as_deref().map(str::trim) {
            None | Some("") => {
                errors.push("strategy is required".to_string());
                None
            }
            Some(name) => match name.parse::<StrategySelection>() {
                Ok(sel) => Some(sel),
                Err(_) => {
                    errors.push(format!("unknown strategy: {name}"));
                    None
                }
            },
        };

        let count = self.count.unwrap_or(1);
        if !(1..=MAX_RECOMMEND_COUNT).contains(&count) {
            errors.push(format!("count must be between 1 and {MAX_RECOMMEND_COUNT}"));
        }

        let fixed = uniq(self.fixed_numbers.iter().copied());
        let exclude = uniq(self.exclude_numbers.iter().copied());
        if fixed.len() > TICKET_SIZE {
            errors.push(format!("fixedNumbers may contain at most {TICKET_SIZE} numbers"));
        }
        if fixed.iter().any(|&n| !in_range(n)) {
            errors.push(format!(
                "fixedNumbers must be between {LOTTO_MIN} and {LOTTO_MAX}"
            ));
        }
        if exclude.iter().any(|&n| !in_range(n)) {
            errors.push(format!(
                "excludeNumbers must be between {LOTTO_MIN} and {LOTTO_MAX}"
            ));
        }
        let overlap: Vec<i64> = fixed.iter().filter(|n| exclude.contains(n)).copied().collect();
        if !overlap.is_empty() {
            errors.push(format!(
                "fixedNumbers and excludeNumbers overlap: {overlap:?}"
            ));
        }

        match selection {
            Some(selection) if errors.is_empty() => Ok(RecommendParams {
                selection,
                count: count as usize,
                fixed: fixed.into_iter().map(|n| n as u8).collect(),
                exclude: exclude.into_iter().map(|n| n as u8).collect(),
            }),
            _ => Err(AppError::InvalidParam(errors)),
        }
    }
}

/// 一次推荐的结果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub recommend_id: String,
    pub target_draw_no: i32,
    pub algorithm: Strategy,
    pub tickets: Vec<TicketSet>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendSet {
    pub set_no: i16,
    pub numbers: TicketSet,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendDetail {
    pub recommend_id: String,
    pub target_draw_no: i32,
    pub algorithm: String,
    pub params: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub sets: Vec<RecommendSet>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StrategyInfo {
    pub name: &'static str,
    pub description: &'static str,
}

impl From<Strategy> for StrategyInfo {
    fn from(s: Strategy) -> Self {
        Self {
            name: s.name(),
            description: s.description(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(strategy: &str, count: Option<i64>, fixed: &[i64], exclude: &[i64]) -> RecommendRequest {
        RecommendRequest {
            strategy: Some(strategy.to_string()),
            count,
            fixed_numbers: fixed.to_vec(),
            exclude_numbers: exclude.to_vec(),
        }
    }

    #[test]
    fn test_valid_request_collapses_duplicates() {
        let params = request("evenOdd", Some(3), &[5, 5, 12], &[40, 40])
            .validate()
            .unwrap();
        assert_eq!(params.selection, StrategySelection::One(Strategy::EvenOdd));
        assert_eq!(params.count, 3);
        assert_eq!(params.fixed, BTreeSet::from([5, 12]));
        assert_eq!(params.exclude, BTreeSet::from([40]));
    }

    #[test]
    fn test_all_is_accepted_and_count_defaults() {
        let params = request("all", None, &[], &[]).validate().unwrap();
        assert_eq!(params.selection, StrategySelection::All);
        assert_eq!(params.count, 1);
    }

    #[test]
    fn test_collects_every_violation() {
        let err = request("magic", Some(9), &[1, 2, 3, 4, 5, 6, 7], &[7, 99])
            .validate()
            .unwrap_err();
        match err {
            AppError::InvalidParam(errors) => {
                assert_eq!(errors.len(), 5, "{errors:?}");
                assert!(errors[0].contains("unknown strategy"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_strategy() {
        let err = RecommendRequest::default().validate().unwrap_err();
        assert!(matches!(err, AppError::InvalidParam(ref e) if e == &vec!["strategy is required".to_string()]));
    }
}
