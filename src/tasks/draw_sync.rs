use super::guard::{SingleFlight, TickOutcome};
use crate::error::{AppError, AppResult};
use crate::models::DrawResponse;
use crate::services::{DrawService, EvaluationService};

/// 每周开奖同步：拉取下一期开奖号码后评估该期
pub struct DrawSyncJob {
    draws: DrawService,
    evaluations: EvaluationService,
    flight: SingleFlight,
}

impl DrawSyncJob {
    pub fn new(draws: DrawService, evaluations: EvaluationService) -> Self {
        Self {
            draws,
            evaluations,
            flight: SingleFlight::new(),
        }
    }

    async fn sync_next(&self) -> AppResult<DrawResponse> {
        match self.draws.next_sync_round().await? {
            Some(draw_no) => self.draws.sync_from_external_source(draw_no).await,
            // 首次同步取上游最新一期
            None => self.draws.sync_latest().await,
        }
    }

    pub async fn tick(&self) -> TickOutcome {
        let Some(_flight) = self.flight.try_enter() else {
            log::warn!("Draw sync still running, tick skipped");
            return TickOutcome::Busy;
        };

        let synced = match self.sync_next().await {
            Ok(d) => d,
            Err(AppError::DrawNotFound(msg)) => {
                log::warn!("Draw not published yet: {msg}");
                return TickOutcome::Failed;
            }
            Err(e) => {
                log::error!("Draw sync failed: {e:?}");
                return TickOutcome::Failed;
            }
        };

        match self.evaluations.evaluate_all(synced.draw_no).await {
            Ok(summary) => {
                log::info!(
                    "Draw {} evaluated: {} recommend sets, {} purchases",
                    summary.draw_no,
                    summary.recommend,
                    summary.purchase
                );
                TickOutcome::Completed(summary.total as usize)
            }
            Err(e) => {
                log::error!("Evaluation for draw {} failed: {e:?}", synced.draw_no);
                TickOutcome::Failed
            }
        }
    }
}
