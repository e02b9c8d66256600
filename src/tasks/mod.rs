//! 后台定时任务
//!
//! 四个循环：自动购买、自动推荐、看板缓存刷新、每周开奖同步。
//! 启动时调用 `spawn_all`，关闭时调用 `SchedulerHandle::shutdown`。

pub mod dashboard;
pub mod draw_sync;
pub mod guard;
pub mod purchase;
pub mod recommend;
pub mod target_round;

pub use dashboard::DashboardWarmer;
pub use draw_sync::DrawSyncJob;
pub use guard::{FlightGuard, SingleFlight, TickOutcome};
pub use purchase::PurchaseSimulator;
pub use recommend::{ConstraintMode, Constraints, RecommendSimulator};
pub use target_round::TargetRoundCache;

use crate::cache::DashboardCache;
use crate::config::SchedulerConfig;
use crate::services::{
    DashboardService, DrawService, EvaluationService, PurchaseService, RecommendService,
};
use crate::strategies::StrategyEngine;
use crate::utils::next_weekly_fire;
use chrono::Utc;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub struct SchedulerContext {
    pub draws: DrawService,
    pub engine: StrategyEngine,
    pub recommends: RecommendService,
    pub purchases: PurchaseService,
    pub evaluations: EvaluationService,
    pub dashboard: DashboardService,
    pub cache: DashboardCache,
    pub config: SchedulerConfig,
}

pub struct SchedulerHandle {
    token: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// 取消所有循环并等待进行中的任务结束
    pub async fn shutdown(self) {
        self.token.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                log::error!("Scheduler task panicked: {e:?}");
            }
        }
        log::info!("Scheduler stopped");
    }
}

/// 启动全部后台任务，不阻塞
pub fn spawn_all(ctx: SchedulerContext, token: CancellationToken) -> SchedulerHandle {
    let cfg = ctx.config.clone();
    let mut handles = Vec::with_capacity(4);

    // 自动购买
    {
        let job = Arc::new(PurchaseSimulator::new(
            ctx.draws.clone(),
            ctx.engine.clone(),
            ctx.purchases.clone(),
        ));
        handles.push(tokio::spawn(run_interval(
            "purchase",
            Duration::from_secs(cfg.purchase_interval_secs),
            token.clone(),
            move || {
                let job = job.clone();
                async move { job.tick(Utc::now()).await }
            },
        )));
    }

    // 自动推荐
    {
        let job = Arc::new(RecommendSimulator::new(
            ctx.draws.clone(),
            ctx.engine.clone(),
            ctx.recommends.clone(),
            cfg.frequency_window,
        ));
        handles.push(tokio::spawn(run_interval(
            "recommend",
            Duration::from_secs(cfg.recommend_interval_secs),
            token.clone(),
            move || {
                let job = job.clone();
                async move { job.tick(Utc::now()).await }
            },
        )));
    }

    // 看板：先全量回填，再定时刷新最新一期
    {
        let job = Arc::new(DashboardWarmer::new(
            ctx.draws.clone(),
            ctx.dashboard.clone(),
            ctx.cache.clone(),
        ));
        let period = Duration::from_secs(cfg.dashboard_interval_secs);
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = job.warm_all() => {}
            }
            run_interval("dashboard", period, token, move || {
                let job = job.clone();
                async move { job.tick().await }
            })
            .await;
        }));
    }

    // 每周开奖同步
    {
        let job = DrawSyncJob::new(ctx.draws.clone(), ctx.evaluations.clone());
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let fire = next_weekly_fire(
                    now,
                    cfg.draw_sync_weekday,
                    cfg.draw_sync_hour,
                    cfg.draw_sync_minute,
                );
                let wait = (fire - now).to_std().unwrap_or(Duration::ZERO);
                log::info!("Next draw sync at {fire}");
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(wait) => {}
                }
                let outcome = job.tick().await;
                log::info!("Draw sync finished: {outcome:?}");
            }
        }));
    }

    log::info!("Scheduler started with {} loops", handles.len());
    SchedulerHandle { token, handles }
}

/// 固定周期触发；每次 tick 单独 spawn，重叠由任务自身的 SingleFlight 拒绝
async fn run_interval<F, Fut>(name: &'static str, period: Duration, token: CancellationToken, tick: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = TickOutcome> + Send + 'static,
{
    let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut running = JoinSet::new();

    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            _ = interval.tick() => {
                running.spawn(tick());
            }
            Some(done) = running.join_next(), if !running.is_empty() => match done {
                Ok(TickOutcome::Completed(n)) if n > 0 => log::debug!("{name} tick completed: {n}"),
                Ok(TickOutcome::Failed) => log::warn!("{name} tick failed"),
                Ok(_) => {}
                Err(e) => log::error!("{name} tick panicked: {e:?}"),
            },
        }
    }

    while let Some(done) = running.join_next().await {
        if let Err(e) = done {
            log::error!("{name} tick panicked during shutdown: {e:?}");
        }
    }
    log::info!("{name} loop stopped");
}
