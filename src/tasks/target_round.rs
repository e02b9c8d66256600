use crate::error::AppResult;
use crate::services::DrawService;
use crate::utils::week_start;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CachedRound {
    week_start: DateTime<Utc>,
    draw_no: i32,
}

/// 按周缓存当前投注期号（周日 06:00 换周）
#[derive(Debug, Default)]
pub struct TargetRoundCache {
    slot: Mutex<Option<CachedRound>>,
}

impl TargetRoundCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 本周首次调用时计算并插入占位期，之后直接返回缓存
    pub async fn get_or_prepare(&self, draws: &DrawService, now: DateTime<Utc>) -> AppResult<i32> {
        let week = week_start(now);
        let mut slot = self.slot.lock().await;
        if let Some(cached) = *slot
            && cached.week_start == week
        {
            return Ok(cached.draw_no);
        }
        let draw_no = draws.prepare_target_round().await?;
        log::info!("Target draw for week starting {week}: {draw_no}");
        *slot = Some(CachedRound {
            week_start: week,
            draw_no,
        });
        Ok(draw_no)
    }

    pub async fn cached(&self) -> Option<i32> {
        let slot = *self.slot.lock().await;
        slot.map(|c| c.draw_no)
    }
}
