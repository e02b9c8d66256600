use crate::entities::{
    purchase_entity as purchases, purchase_number_entity as purchase_numbers,
    purchase_result_entity as purchase_results, recommend_number_entity as recommend_numbers,
    recommend_result_entity as recommend_results, recommend_run_entity as runs,
};
use crate::error::{AppError, AppResult};
use crate::models::{
    EvaluateAllSummary, EvaluationSummary, RankCount, RoundRankCounts, TicketSet, WinningNumbers,
    fill_rank_counts,
};
use crate::services::DrawService;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use std::collections::{BTreeMap, HashSet};

/// 单条 INSERT 的行数上限（SQLite 绑定参数限制）
const INSERT_CHUNK: usize = 100;

#[derive(Debug, FromQueryResult)]
struct RankRow {
    result_rank: i16,
    count: i64,
}

/// 开奖后按期评估推荐与购买号码
///
/// 只挑选结果表中尚不存在的号码组，结果表主键冲突时 DO NOTHING，
/// 因此同一期重复或并发评估都不会重复写入。
#[derive(Clone)]
pub struct EvaluationService {
    pool: DatabaseConnection,
    draws: DrawService,
}

impl EvaluationService {
    pub fn new(pool: DatabaseConnection, draws: DrawService) -> Self {
        Self { pool, draws }
    }

    async fn require_winning(&self, draw_no: i32) -> AppResult<WinningNumbers> {
        self.draws
            .winning_numbers(draw_no)
            .await?
            .ok_or(AppError::EvaluationSourceMissing(draw_no))
    }

    pub async fn evaluate_recommends(&self, draw_no: i32) -> AppResult<EvaluationSummary> {
        let winning = self.require_winning(draw_no).await?;

        let done: HashSet<(String, i16)> = recommend_results::Entity::find()
            .select_only()
            .column(recommend_results::Column::RecommendId)
            .column(recommend_results::Column::SetNo)
            .filter(recommend_results::Column::DrawNo.eq(draw_no))
            .into_tuple::<(String, i16)>()
            .all(&self.pool)
            .await?
            .into_iter()
            .collect();

        let rows = recommend_numbers::Entity::find()
            .filter(
                recommend_numbers::Column::RecommendId.in_subquery(
                    Query::select()
                        .column(runs::Column::RecommendId)
                        .from(runs::Entity)
                        .and_where(runs::Column::TargetDrawNo.eq(draw_no))
                        .to_owned(),
                ),
            )
            .order_by_asc(recommend_numbers::Column::RecommendId)
            .order_by_asc(recommend_numbers::Column::SetNo)
            .order_by_asc(recommend_numbers::Column::Pos)
            .all(&self.pool)
            .await?;

        let mut sets: BTreeMap<(String, i16), Vec<i16>> = BTreeMap::new();
        for row in rows {
            let key = (row.recommend_id, row.set_no);
            if !done.contains(&key) {
                sets.entry(key).or_default().push(row.number);
            }
        }

        let now = Utc::now();
        let mut models = Vec::with_capacity(sets.len());
        for ((recommend_id, set_no), nums) in sets {
            let Some(ticket) = TicketSet::from_stored(nums) else {
                log::warn!("Skipping malformed recommend set {recommend_id}#{set_no}");
                continue;
            };
            let score = winning.score(&ticket);
            models.push(recommend_results::ActiveModel {
                recommend_id: Set(recommend_id),
                set_no: Set(set_no),
                draw_no: Set(draw_no),
                match_count: Set(score.match_count as i16),
                bonus_match: Set(score.bonus_match),
                result_rank: Set(score.rank as i16),
                created_at: Set(now),
            });
        }

        let mut evaluated = 0;
        for chunk in models.chunks(INSERT_CHUNK) {
            evaluated += recommend_results::Entity::insert_many(chunk.to_vec())
                .on_conflict(
                    OnConflict::columns([
                        recommend_results::Column::RecommendId,
                        recommend_results::Column::SetNo,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(&self.pool)
                .await?;
        }
        log::info!("Draw {draw_no}: evaluated {evaluated} recommend sets");
        Ok(EvaluationSummary { draw_no, evaluated })
    }

    pub async fn evaluate_purchases(&self, draw_no: i32) -> AppResult<EvaluationSummary> {
        let winning = self.require_winning(draw_no).await?;

        let rows = purchase_numbers::Entity::find()
            .filter(
                purchase_numbers::Column::PurchaseId.in_subquery(
                    Query::select()
                        .column(purchases::Column::PurchaseId)
                        .from(purchases::Entity)
                        .and_where(purchases::Column::TargetDrawNo.eq(draw_no))
                        .to_owned(),
                ),
            )
            .filter(
                purchase_numbers::Column::PurchaseId.not_in_subquery(
                    Query::select()
                        .column(purchase_results::Column::PurchaseId)
                        .from(purchase_results::Entity)
                        .and_where(purchase_results::Column::DrawNo.eq(draw_no))
                        .to_owned(),
                ),
            )
            .order_by_asc(purchase_numbers::Column::PurchaseId)
            .order_by_asc(purchase_numbers::Column::Pos)
            .all(&self.pool)
            .await?;

        let mut tickets: BTreeMap<String, Vec<i16>> = BTreeMap::new();
        for row in rows {
            tickets.entry(row.purchase_id).or_default().push(row.number);
        }

        let now = Utc::now();
        let mut models = Vec::with_capacity(tickets.len());
        for (purchase_id, nums) in tickets {
            let Some(ticket) = TicketSet::from_stored(nums) else {
                log::warn!("Skipping malformed purchase {purchase_id}");
                continue;
            };
            let score = winning.score(&ticket);
            models.push(purchase_results::ActiveModel {
                purchase_id: Set(purchase_id),
                draw_no: Set(draw_no),
                match_count: Set(score.match_count as i16),
                bonus_match: Set(score.bonus_match),
                result_rank: Set(score.rank as i16),
                created_at: Set(now),
            });
        }

        let mut evaluated = 0;
        for chunk in models.chunks(INSERT_CHUNK) {
            evaluated += purchase_results::Entity::insert_many(chunk.to_vec())
                .on_conflict(
                    OnConflict::column(purchase_results::Column::PurchaseId)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&self.pool)
                .await?;
        }
        log::info!("Draw {draw_no}: evaluated {evaluated} purchases");
        Ok(EvaluationSummary { draw_no, evaluated })
    }

    /// 推荐与购买并行评估，任一失败即返回错误
    pub async fn evaluate_all(&self, draw_no: i32) -> AppResult<EvaluateAllSummary> {
        let (recommend, purchase) = futures_util::future::try_join(
            self.evaluate_recommends(draw_no),
            self.evaluate_purchases(draw_no),
        )
        .await?;
        Ok(EvaluateAllSummary::new(draw_no, recommend, purchase))
    }

    /// 某期各奖级的结果条数
    pub async fn rank_counts(&self, draw_no: i32) -> AppResult<RoundRankCounts> {
        let recommend = recommend_results::Entity::find()
            .select_only()
            .column(recommend_results::Column::ResultRank)
            .column_as(Expr::val(1).count(), "count")
            .filter(recommend_results::Column::DrawNo.eq(draw_no))
            .group_by(recommend_results::Column::ResultRank)
            .into_model::<RankRow>()
            .all(&self.pool)
            .await?;
        let purchase = purchase_results::Entity::find()
            .select_only()
            .column(purchase_results::Column::ResultRank)
            .column_as(Expr::val(1).count(), "count")
            .filter(purchase_results::Column::DrawNo.eq(draw_no))
            .group_by(purchase_results::Column::ResultRank)
            .into_model::<RankRow>()
            .all(&self.pool)
            .await?;
        Ok(RoundRankCounts {
            draw_no,
            recommend: to_rank_counts(recommend),
            purchase: to_rank_counts(purchase),
        })
    }
}

fn to_rank_counts(rows: Vec<RankRow>) -> Vec<RankCount> {
    fill_rank_counts(rows.into_iter().map(|r| (r.result_rank, r.count)))
}
