use crate::error::{AppError, AppResult};
use crate::models::{Score, TicketSet};
use crate::strategies::Strategy;
use crate::utils::{TICKET_SIZE, in_range};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_PURCHASE_TICKETS: usize = 5;

/// 手动录入的来源类型；自动购买使用策略名
pub const MANUAL_SOURCE_TYPES: [&str; 3] = ["MANUAL", "RANDOM", "RECOMMEND"];

pub fn is_valid_source_type(source_type: &str) -> bool {
    MANUAL_SOURCE_TYPES.contains(&source_type) || source_type.parse::<Strategy>().is_ok()
}

/// 购买请求
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[serde(alias = "targetRound")]
    pub target_draw_no: Option<i64>,
    /// RFC 3339
    pub purchase_at: Option<String>,
    pub source_type: Option<String>,
    #[serde(default)]
    pub tickets: Vec<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseParams {
    pub target_draw_no: Option<i32>,
    pub purchase_at: Option<DateTime<Utc>>,
    pub source_type: String,
    pub tickets: Vec<TicketSet>,
}

impl PurchaseRequest {
    pub fn validate(&self) -> AppResult<PurchaseParams> {
        let mut errors = Vec::new();

        let source_type = self.source_type.as_deref().map(str::trim).unwrap_or("");
        if source_type.is_empty() {
            errors.push("sourceType is required".to_string());
        } else if !is_valid_source_type(source_type) {
            errors.push(format!("unknown sourceType: {source_type}"));
        }

        let target_draw_no = match self.target_draw_no {
            Some(n) if n >= 1 && n <= i32::MAX as i64 => Some(n as i32),
            Some(_) => {
                errors.push("targetDrawNo must be a positive integer".to_string());
                None
            }
            None => None,
        };

        let purchase_at = match self.purchase_at.as_deref() {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(_) => {
                    errors.push(format!("purchaseAt is not a valid RFC 3339 timestamp: {raw}"));
                    None
                }
            },
            None => None,
        };

        if self.tickets.is_empty() || self.tickets.len() > MAX_PURCHASE_TICKETS {
            errors.push(format!(
                "tickets must contain between 1 and {MAX_PURCHASE_TICKETS} sets"
            ));
        }
        let mut tickets = Vec::with_capacity(self.tickets.len());
        for (i, nums) in self.tickets.iter().enumerate() {
            let ticket = if nums.len() == TICKET_SIZE && nums.iter().all(|&n| in_range(n)) {
                TicketSet::new(nums.iter().map(|&n| n as u8))
            } else {
                None
            };
            match ticket {
                Some(t) => tickets.push(t),
                None => errors.push(format!(
                    "tickets[{i}] must be {TICKET_SIZE} distinct numbers between 1 and 45"
                )),
            }
        }

        if !errors.is_empty() {
            return Err(AppError::InvalidParam(errors));
        }
        Ok(PurchaseParams {
            target_draw_no,
            purchase_at,
            source_type: source_type.to_string(),
            tickets,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub purchase_ids: Vec<String>,
    pub target_draw_no: i32,
    pub purchase_at: DateTime<Utc>,
    pub source_type: String,
    pub tickets: Vec<TicketSet>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDetail {
    pub purchase_id: String,
    pub target_draw_no: i32,
    pub purchase_at: DateTime<Utc>,
    pub source_type: String,
    pub numbers: TicketSet,
    /// 未开奖或未评估时为空
    pub result: Option<Score>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_purchase() {
        let req = PurchaseRequest {
            target_draw_no: Some(1201),
            purchase_at: Some("2026-01-05T10:00:00+09:00".to_string()),
            source_type: Some("MANUAL".to_string()),
            tickets: vec![vec![6, 5, 4, 3, 2, 1], vec![40, 41, 42, 43, 44, 45]],
        };
        let params = req.validate().unwrap();
        assert_eq!(params.target_draw_no, Some(1201));
        assert_eq!(params.tickets[0].numbers(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(
            params.purchase_at.unwrap().to_rfc3339(),
            "2026-01-05T01:00:00+00:00"
        );
    }

    #[test]
    fn test_strategy_name_is_a_source_type() {
        assert!(is_valid_source_type("hotCold"));
        assert!(is_valid_source_type("RECOMMEND"));
        assert!(!is_valid_source_type("manual"));
    }

    #[test]
    fn test_invalid_purchase_collects_errors() {
        let req = PurchaseRequest {
            target_draw_no: Some(0),
            purchase_at: Some("yesterday".to_string()),
            source_type: None,
            tickets: vec![vec![1, 1, 2, 3, 4, 5], vec![1, 2, 3], vec![1, 2, 3, 4, 5, 46]],
        };
        match req.validate().unwrap_err() {
            AppError::InvalidParam(errors) => assert_eq!(errors.len(), 6, "{errors:?}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ticket_count_bounds() {
        let req = PurchaseRequest {
            source_type: Some("RANDOM".to_string()),
            tickets: vec![vec![1, 2, 3, 4, 5, 6]; 6],
            ..Default::default()
        };
        assert!(req.validate().is_err());
        let req = PurchaseRequest {
            source_type: Some("RANDOM".to_string()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }
}
