pub mod dashboard_service;
pub mod draw_service;
pub mod evaluation_service;
pub mod purchase_service;
pub mod recommend_service;

pub use dashboard_service::*;
pub use draw_service::*;
pub use evaluation_service::*;
pub use purchase_service::*;
pub use recommend_service::*;

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::database::memory_pool;
    use crate::external::stub::StaticDrawSource;
    use crate::models::{FetchedDraw, TicketSet};
    use crate::strategies::StrategyEngine;
    use chrono::{Duration, NaiveDate};
    use sea_orm::DatabaseConnection;
    use std::sync::Arc;

    pub fn ticket(nums: [u8; 6]) -> TicketSet {
        TicketSet::new(nums).expect("valid ticket")
    }

    pub fn fetched(draw_no: i32, y: i32, m: u32, d: u32, numbers: [u8; 6], bonus: u8) -> FetchedDraw {
        FetchedDraw {
            draw_no,
            draw_date: NaiveDate::from_ymd_opt(y, m, d).expect("valid date"),
            numbers,
            bonus,
        }
    }

    /// 内存库 + 内存数据源上的全套服务
    pub struct TestContext {
        pub pool: DatabaseConnection,
        pub source: Arc<StaticDrawSource>,
        pub draws: DrawService,
        pub engine: StrategyEngine,
        pub recommends: RecommendService,
        pub purchases: PurchaseService,
        pub evaluations: EvaluationService,
        pub dashboard: DashboardService,
    }

    impl TestContext {
        pub async fn new() -> Self {
            let pool = memory_pool().await;
            let source = Arc::new(StaticDrawSource::default());
            let draws = DrawService::new(pool.clone(), source.clone());
            let engine = StrategyEngine::new(draws.clone());
            Self {
                recommends: RecommendService::new(pool.clone(), draws.clone(), engine.clone()),
                purchases: PurchaseService::new(pool.clone(), draws.clone()),
                evaluations: EvaluationService::new(pool.clone(), draws.clone()),
                dashboard: DashboardService::new(pool.clone()),
                pool,
                source,
                draws,
                engine,
            }
        }

        /// 第 n 期写入开奖号码，日期从 2020-01-04（周六）起每周一期
        pub async fn seed_draw(&self, draw_no: i32, numbers: [u8; 6], bonus: u8) {
            let base = NaiveDate::from_ymd_opt(2020, 1, 4).expect("valid date");
            let draw = FetchedDraw {
                draw_no,
                draw_date: base + Duration::days(7 * (draw_no as i64 - 1)),
                numbers,
                bonus,
            };
            self.draws.store_draw(&draw).await.expect("store draw");
        }
    }
}
