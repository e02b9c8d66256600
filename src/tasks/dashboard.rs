use super::guard::{SingleFlight, TickOutcome};
use crate::cache::DashboardCache;
use crate::error::AppResult;
use crate::models::DashboardKind;
use crate::services::{DashboardService, DrawService};

/// 看板缓存预热：启动时全量回填，之后定时刷新最新一期
pub struct DashboardWarmer {
    draws: DrawService,
    dashboard: DashboardService,
    cache: DashboardCache,
    flight: SingleFlight,
}

impl DashboardWarmer {
    pub fn new(draws: DrawService, dashboard: DashboardService, cache: DashboardCache) -> Self {
        Self {
            draws,
            dashboard,
            cache,
            flight: SingleFlight::new(),
        }
    }

    async fn refresh(&self, draw_no: i32) -> AppResult<()> {
        for kind in DashboardKind::ALL {
            let value = self.dashboard.compute(kind, draw_no).await?;
            self.cache.set(kind, draw_no, value);
        }
        Ok(())
    }

    /// 从最新一期往回逐期计算；单期失败只记录日志
    pub async fn warm_all(&self) -> TickOutcome {
        let Some(_flight) = self.flight.try_enter() else {
            return TickOutcome::Busy;
        };
        let draw_nos = match self.draws.all_draw_nos().await {
            Ok(v) => v,
            Err(e) => {
                log::error!("Dashboard backfill failed to list draws: {e:?}");
                return TickOutcome::Failed;
            }
        };
        let mut warmed = 0;
        for draw_no in draw_nos.into_iter().rev() {
            match self.refresh(draw_no).await {
                Ok(()) => warmed += 1,
                Err(e) => log::error!("Dashboard backfill failed for draw {draw_no}: {e:?}"),
            }
        }
        log::info!("Dashboard cache warmed for {warmed} draws");
        TickOutcome::Completed(warmed)
    }

    pub async fn tick(&self) -> TickOutcome {
        let Some(_flight) = self.flight.try_enter() else {
            log::debug!("Dashboard refresh still running, tick skipped");
            return TickOutcome::Busy;
        };
        let latest = match self.draws.latest_draw().await {
            Ok(Some(draw)) => draw.draw_no,
            Ok(None) => return TickOutcome::Completed(0),
            Err(e) => {
                log::error!("Dashboard refresh failed: {e:?}");
                return TickOutcome::Failed;
            }
        };
        match self.refresh(latest).await {
            Ok(()) => TickOutcome::Completed(1),
            Err(e) => {
                log::error!("Dashboard refresh failed for draw {latest}: {e:?}");
                TickOutcome::Failed
            }
        }
    }
}
