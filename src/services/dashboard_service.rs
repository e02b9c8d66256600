use crate::entities::{
    purchase_entity as purchases, purchase_number_entity as purchase_numbers,
    purchase_result_entity as purchase_results, recommend_number_entity as recommend_numbers,
    recommend_result_entity as recommend_results, recommend_run_entity as runs,
};
use crate::error::AppResult;
use crate::models::{
    DashboardDistribution, DashboardKind, DashboardRatio, DashboardSummary, FrequencyTable,
    LabelCount, NumberCount, fill_rank_counts, win_rate,
};
use sea_orm::sea_query::{Expr, Query};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// 看板展示的热门号码个数
const TOP_NUMBERS: usize = 7;

#[derive(Debug, FromQueryResult)]
struct LabelRow {
    label: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct NumberRow {
    number: i16,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct RankRow {
    result_rank: i16,
    count: i64,
}

/// 看板统计
#[derive(Clone)]
pub struct DashboardService {
    pool: DatabaseConnection,
}

impl DashboardService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn compute(&self, kind: DashboardKind, draw_no: i32) -> AppResult<serde_json::Value> {
        let value = match kind {
            DashboardKind::Summary => serde_json::to_value(self.summary(draw_no).await?)?,
            DashboardKind::Ratio => serde_json::to_value(self.ratio(draw_no).await?)?,
            DashboardKind::Distribution => serde_json::to_value(self.distribution(draw_no).await?)?,
        };
        Ok(value)
    }

    pub async fn summary(&self, draw_no: i32) -> AppResult<DashboardSummary> {
        let purchase_count = purchases::Entity::find()
            .filter(purchases::Column::TargetDrawNo.eq(draw_no))
            .count(&self.pool)
            .await?;
        // 每组推荐号码恰好有一行 pos 1
        let recommend_count = recommend_numbers::Entity::find()
            .filter(recommend_numbers::Column::Pos.eq(1))
            .filter(
                recommend_numbers::Column::RecommendId.in_subquery(
                    Query::select()
                        .column(runs::Column::RecommendId)
                        .from(runs::Entity)
                        .and_where(runs::Column::TargetDrawNo.eq(draw_no))
                        .to_owned(),
                ),
            )
            .count(&self.pool)
            .await?;
        let purchase_wins = purchase_results::Entity::find()
            .filter(purchase_results::Column::DrawNo.eq(draw_no))
            .filter(purchase_results::Column::ResultRank.gt(0))
            .count(&self.pool)
            .await?;
        let recommend_wins = recommend_results::Entity::find()
            .filter(recommend_results::Column::DrawNo.eq(draw_no))
            .filter(recommend_results::Column::ResultRank.gt(0))
            .count(&self.pool)
            .await?;

        Ok(DashboardSummary {
            draw_no,
            purchase_count,
            recommend_count,
            purchase_wins,
            recommend_wins,
            purchase_win_rate: win_rate(purchase_wins, purchase_count),
            recommend_win_rate: win_rate(recommend_wins, recommend_count),
        })
    }

    pub async fn ratio(&self, draw_no: i32) -> AppResult<DashboardRatio> {
        let by_source = purchases::Entity::find()
            .select_only()
            .column_as(purchases::Column::SourceType, "label")
            .column_as(Expr::val(1).count(), "count")
            .filter(purchases::Column::TargetDrawNo.eq(draw_no))
            .group_by(purchases::Column::SourceType)
            .order_by_asc(purchases::Column::SourceType)
            .into_model::<LabelRow>()
            .all(&self.pool)
            .await?;
        let by_algorithm = runs::Entity::find()
            .select_only()
            .column_as(runs::Column::Algorithm, "label")
            .column_as(Expr::val(1).count(), "count")
            .filter(runs::Column::TargetDrawNo.eq(draw_no))
            .group_by(runs::Column::Algorithm)
            .order_by_asc(runs::Column::Algorithm)
            .into_model::<LabelRow>()
            .all(&self.pool)
            .await?;

        let to_counts = |rows: Vec<LabelRow>| -> Vec<LabelCount> {
            rows.into_iter()
                .map(|r| LabelCount {
                    label: r.label,
                    count: r.count,
                })
                .collect()
        };
        Ok(DashboardRatio {
            draw_no,
            purchase_by_source: to_counts(by_source),
            recommend_by_algorithm: to_counts(by_algorithm),
        })
    }

    pub async fn distribution(&self, draw_no: i32) -> AppResult<DashboardDistribution> {
        let numbers = purchase_numbers::Entity::find()
            .select_only()
            .column(purchase_numbers::Column::Number)
            .column_as(Expr::val(1).count(), "count")
            .filter(
                purchase_numbers::Column::PurchaseId.in_subquery(
                    Query::select()
                        .column(purchases::Column::PurchaseId)
                        .from(purchases::Entity)
                        .and_where(purchases::Column::TargetDrawNo.eq(draw_no))
                        .to_owned(),
                ),
            )
            .group_by(purchase_numbers::Column::Number)
            .into_model::<NumberRow>()
            .all(&self.pool)
            .await?;
        let table = FrequencyTable::from_counts(numbers.into_iter().filter_map(|r| {
            Some((u8::try_from(r.number).ok()?, u32::try_from(r.count).ok()?))
        }));
        let top_numbers = table
            .top(TOP_NUMBERS)
            .into_iter()
            .map(|(number, count)| NumberCount { number, count })
            .collect();

        // 截至本期的累计奖级分布
        let recommend = recommend_results::Entity::find()
            .select_only()
            .column(recommend_results::Column::ResultRank)
            .column_as(Expr::val(1).count(), "count")
            .filter(recommend_results::Column::DrawNo.lte(draw_no))
            .group_by(recommend_results::Column::ResultRank)
            .into_model::<RankRow>()
            .all(&self.pool)
            .await?;
        let purchase = purchase_results::Entity::find()
            .select_only()
            .column(purchase_results::Column::ResultRank)
            .column_as(Expr::val(1).count(), "count")
            .filter(purchase_results::Column::DrawNo.lte(draw_no))
            .group_by(purchase_results::Column::ResultRank)
            .into_model::<RankRow>()
            .all(&self.pool)
            .await?;
        let rank_distribution = fill_rank_counts(
            recommend
                .into_iter()
                .chain(purchase)
                .map(|r| (r.result_rank, r.count)),
        );

        Ok(DashboardDistribution {
            draw_no,
            top_numbers,
            rank_distribution,
        })
    }
}
