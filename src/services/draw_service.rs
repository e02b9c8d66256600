use crate::entities::{draw_entity as draws, draw_number_entity as draw_numbers};
use crate::error::{AppError, AppResult};
use crate::external::DrawSource;
use crate::models::{BONUS_POS, DrawResponse, FetchedDraw, FrequencyTable, WinningNumbers};
use chrono::{Duration, NaiveDate, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;

/// 期次与开奖号码
#[derive(Clone)]
pub struct DrawService {
    pool: DatabaseConnection,
    source: Arc<dyn DrawSource>,
}

impl DrawService {
    pub fn new(pool: DatabaseConnection, source: Arc<dyn DrawSource>) -> Self {
        Self { pool, source }
    }

    /// 已有开奖号码的最新期号（不含占位期）
    pub async fn latest_synced_draw_no(&self) -> AppResult<Option<i32>> {
        let row = draw_numbers::Entity::find()
            .filter(draw_numbers::Column::Pos.eq(BONUS_POS))
            .order_by_desc(draw_numbers::Column::DrawNo)
            .one(&self.pool)
            .await?;
        Ok(row.map(|r| r.draw_no))
    }

    /// 最新期次（含占位期）
    pub async fn latest_draw(&self) -> AppResult<Option<draws::Model>> {
        Ok(draws::Entity::find()
            .order_by_desc(draws::Column::DrawNo)
            .one(&self.pool)
            .await?)
    }

    pub async fn draw_by_no(&self, draw_no: i32) -> AppResult<DrawResponse> {
        let draw = draws::Entity::find_by_id(draw_no)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Draw {draw_no} not found")))?;
        let winning = self.winning_numbers(draw_no).await?;
        Ok(DrawResponse::new(draw.draw_no, draw.draw_date, winning.as_ref()))
    }

    pub async fn latest_synced_draw(&self) -> AppResult<DrawResponse> {
        let draw_no = self
            .latest_synced_draw_no()
            .await?
            .ok_or(AppError::NoSyncedDraw)?;
        self.draw_by_no(draw_no).await
    }

    /// 全部期号，升序
    pub async fn all_draw_nos(&self) -> AppResult<Vec<i32>> {
        Ok(draws::Entity::find()
            .select_only()
            .column(draws::Column::DrawNo)
            .order_by_asc(draws::Column::DrawNo)
            .into_tuple::<i32>()
            .all(&self.pool)
            .await?)
    }

    /// pos 1..=7 不全时返回 None
    pub async fn winning_numbers(&self, draw_no: i32) -> AppResult<Option<WinningNumbers>> {
        let rows = draw_numbers::Entity::find()
            .filter(draw_numbers::Column::DrawNo.eq(draw_no))
            .order_by_asc(draw_numbers::Column::Pos)
            .all(&self.pool)
            .await?;
        Ok(WinningNumbers::from_rows(draw_no, &rows))
    }

    pub async fn last_draw_numbers(&self) -> AppResult<Option<WinningNumbers>> {
        match self.latest_synced_draw_no().await? {
            Some(draw_no) => self.winning_numbers(draw_no).await,
            None => Ok(None),
        }
    }

    /// 最近 window 期基本号出现次数；window 为 0 时统计全部历史
    pub async fn frequency_over_window(&self, window: u64) -> AppResult<FrequencyTable> {
        let mut query = draw_numbers::Entity::find()
            .select_only()
            .column(draw_numbers::Column::Number)
            .filter(draw_numbers::Column::Pos.between(1, 6));

        if window > 0 {
            // 每个已同步期次恰好有一行 pos 7
            let rounds: Vec<i32> = draw_numbers::Entity::find()
                .select_only()
                .column(draw_numbers::Column::DrawNo)
                .filter(draw_numbers::Column::Pos.eq(BONUS_POS))
                .order_by_desc(draw_numbers::Column::DrawNo)
                .limit(window)
                .into_tuple()
                .all(&self.pool)
                .await?;
            if rounds.is_empty() {
                return Ok(FrequencyTable::empty());
            }
            query = query.filter(draw_numbers::Column::DrawNo.is_in(rounds));
        }

        let numbers: Vec<i16> = query.into_tuple().all(&self.pool).await?;
        Ok(FrequencyTable::from_numbers(
            numbers.into_iter().filter_map(|n| u8::try_from(n).ok()),
        ))
    }

    /// 下一个待同步的期号；尚无任何已同步期次时为 None
    pub async fn next_sync_round(&self) -> AppResult<Option<i32>> {
        Ok(self.latest_synced_draw_no().await?.map(|n| n + 1))
    }

    pub async fn sync_from_external_source(&self, draw_no: i32) -> AppResult<DrawResponse> {
        let fetched = self.source.fetch_draw(draw_no).await?;
        if fetched.draw_no != draw_no {
            return Err(AppError::DrawNotFound(format!(
                "draw {draw_no} (upstream answered {})",
                fetched.draw_no
            )));
        }
        self.store_draw(&fetched).await
    }

    pub async fn sync_latest(&self) -> AppResult<DrawResponse> {
        let fetched = self.source.fetch_latest().await?;
        self.store_draw(&fetched).await
    }

    /// 写入期次与 7 个号码：先删后插，可重复同步
    pub async fn store_draw(&self, draw: &FetchedDraw) -> AppResult<DrawResponse> {
        let txn = self.pool.begin().await?;
        upsert_draw(&txn, draw.draw_no, draw.draw_date).await?;

        draw_numbers::Entity::delete_many()
            .filter(draw_numbers::Column::DrawNo.eq(draw.draw_no))
            .exec(&txn)
            .await?;

        let rows = draw
            .numbers
            .iter()
            .chain(std::iter::once(&draw.bonus))
            .enumerate()
            .map(|(i, &number)| draw_numbers::ActiveModel {
                draw_no: Set(draw.draw_no),
                pos: Set(i as i16 + 1),
                number: Set(number as i16),
            });
        draw_numbers::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;

        log::info!(
            "Draw {} synced: {:?} + {}",
            draw.draw_no,
            draw.numbers,
            draw.bonus
        );
        let winning = WinningNumbers {
            draw_no: draw.draw_no,
            numbers: draw.numbers,
            bonus: draw.bonus,
        };
        Ok(DrawResponse::new(draw.draw_no, draw.draw_date, Some(&winning)))
    }

    pub async fn upsert_draw(&self, draw_no: i32, draw_date: NaiveDate) -> AppResult<()> {
        upsert_draw(&self.pool, draw_no, draw_date).await
    }

    /// 当前接受投注的期号 = 最新已同步期 + 1
    ///
    /// 同时插入该期的占位行（日期 = 上期 + 7 天），已存在时不改动。
    pub async fn prepare_target_round(&self) -> AppResult<i32> {
        let latest = self
            .latest_synced_draw_no()
            .await?
            .ok_or(AppError::NoSyncedDraw)?;
        let base = draws::Entity::find_by_id(latest)
            .one(&self.pool)
            .await?
            .ok_or(AppError::NoSyncedDraw)?;
        let target = latest + 1;

        let inserted = draws::Entity::insert(draws::ActiveModel {
            draw_no: Set(target),
            draw_date: Set(base.draw_date + Duration::days(7)),
            created_at: Set(Utc::now()),
        })
        .on_conflict(
            OnConflict::column(draws::Column::DrawNo)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(&self.pool)
        .await?;
        if inserted > 0 {
            log::info!("Placeholder draw {target} inserted");
        }
        Ok(target)
    }
}

async fn upsert_draw<C: ConnectionTrait>(db: &C, draw_no: i32, draw_date: NaiveDate) -> AppResult<()> {
    draws::Entity::insert(draws::ActiveModel {
        draw_no: Set(draw_no),
        draw_date: Set(draw_date),
        created_at: Set(Utc::now()),
    })
    .on_conflict(
        OnConflict::column(draws::Column::DrawNo)
            .update_column(draws::Column::DrawDate)
            .to_owned(),
    )
    .exec_without_returning(db)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;

    #[tokio::test]
    async fn test_sync_and_read_back() {
        let ctx = TestContext::new().await;
        ctx.source.publish(fetched(1, 2026, 1, 3, [3, 11, 18, 25, 33, 42], 7));

        let synced = ctx.draws.sync_from_external_source(1).await.unwrap();
        assert!(synced.synced);
        assert_eq!(ctx.draws.latest_synced_draw_no().await.unwrap(), Some(1));

        let winning = ctx.draws.winning_numbers(1).await.unwrap().unwrap();
        assert_eq!(winning.numbers, [3, 11, 18, 25, 33, 42]);
        assert_eq!(winning.bonus, 7);

        // 重复同步不会产生多余行
        ctx.source.publish(fetched(1, 2026, 1, 3, [1, 2, 3, 4, 5, 6], 45));
        ctx.draws.sync_from_external_source(1).await.unwrap();
        let winning = ctx.draws.winning_numbers(1).await.unwrap().unwrap();
        assert_eq!(winning.numbers, [1, 2, 3, 4, 5, 6]);
        assert_eq!(ctx.draws.frequency_over_window(0).await.unwrap().total(), 6);
    }

    #[tokio::test]
    async fn test_unpublished_draw_is_not_found() {
        let ctx = TestContext::new().await;
        let err = ctx.draws.sync_from_external_source(5).await.unwrap_err();
        assert!(matches!(err, AppError::DrawNotFound(_)));
        assert_eq!(ctx.draws.next_sync_round().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_placeholder_is_not_synced() {
        let ctx = TestContext::new().await;
        assert!(matches!(
            ctx.draws.prepare_target_round().await,
            Err(AppError::NoSyncedDraw)
        ));

        ctx.seed_draw(10, [1, 2, 3, 4, 5, 6], 7).await;
        let target = ctx.draws.prepare_target_round().await.unwrap();
        assert_eq!(target, 11);
        // 第二次调用不重复插入
        assert_eq!(ctx.draws.prepare_target_round().await.unwrap(), 11);

        let placeholder = ctx.draws.draw_by_no(11).await.unwrap();
        assert!(!placeholder.synced);
        let base = ctx.draws.draw_by_no(10).await.unwrap();
        assert_eq!(placeholder.draw_date, base.draw_date + Duration::days(7));

        assert_eq!(ctx.draws.latest_synced_draw_no().await.unwrap(), Some(10));
        assert_eq!(ctx.draws.latest_draw().await.unwrap().unwrap().draw_no, 11);
        assert_eq!(ctx.draws.all_draw_nos().await.unwrap(), vec![10, 11]);
        assert_eq!(ctx.draws.next_sync_round().await.unwrap(), Some(11));
    }

    #[tokio::test]
    async fn test_frequency_window_uses_latest_rounds() {
        let ctx = TestContext::new().await;
        ctx.seed_draw(1, [40, 41, 42, 43, 44, 45], 1).await;
        ctx.seed_draw(2, [1, 2, 3, 4, 5, 7], 8).await;
        ctx.seed_draw(3, [7, 8, 9, 10, 11, 12], 13).await;

        let recent = ctx.draws.frequency_over_window(2).await.unwrap();
        assert_eq!(recent.count(7), 2);
        assert_eq!(recent.count(40), 0);
        // 奖励号不计入
        assert_eq!(recent.count(13), 0);
        assert_eq!(recent.total(), 12);

        let all = ctx.draws.frequency_over_window(0).await.unwrap();
        assert_eq!(all.count(40), 1);
        assert_eq!(all.total(), 18);
    }

    #[tokio::test]
    async fn test_sync_latest_when_nothing_synced() {
        let ctx = TestContext::new().await;
        ctx.source.publish(fetched(1203, 2025, 12, 27, [1, 2, 3, 4, 5, 6], 45));
        ctx.source.publish(fetched(1204, 2026, 1, 3, [3, 11, 18, 25, 33, 42], 7));
        let synced = ctx.draws.sync_latest().await.unwrap();
        assert_eq!(synced.draw_no, 1204);
        assert_eq!(ctx.draws.latest_synced_draw().await.unwrap().draw_no, 1204);
    }

    #[tokio::test]
    async fn test_upsert_draw_backfills_placeholder_date() {
        let ctx = TestContext::new().await;
        ctx.seed_draw(1, [1, 2, 3, 4, 5, 6], 7).await;
        let target = ctx.draws.prepare_target_round().await.unwrap();

        let actual = NaiveDate::from_ymd_opt(2020, 1, 13).unwrap();
        ctx.draws.upsert_draw(target, actual).await.unwrap();
        let draw = ctx.draws.draw_by_no(target).await.unwrap();
        assert_eq!(draw.draw_date, actual);
        assert!(!draw.synced);

        // 新期号直接插入
        ctx.draws.upsert_draw(5, actual).await.unwrap();
        assert_eq!(ctx.draws.all_draw_nos().await.unwrap(), vec![1, 2, 5]);
    }
}
