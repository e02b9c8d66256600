pub mod lotto_api;

pub use lotto_api::*;

use crate::error::AppResult;
use crate::models::FetchedDraw;
use async_trait::async_trait;

/// 开奖数据来源
#[async_trait]
pub trait DrawSource: Send + Sync {
    /// 指定期号；尚未公布时返回 DrawNotFound
    async fn fetch_draw(&self, draw_no: i32) -> AppResult<FetchedDraw>;

    /// 上游当前公布的最新一期
    async fn fetch_latest(&self) -> AppResult<FetchedDraw>;
}
