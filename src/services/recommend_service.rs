use crate::entities::{recommend_number_entity as numbers, recommend_run_entity as runs};
use crate::error::{AppError, AppResult};
use crate::models::{RecommendDetail, RecommendParams, RecommendResponse, RecommendSet, TicketSet};
use crate::services::DrawService;
use crate::strategies::{Strategy, StrategyEngine, StrategySelection};
use chrono::Utc;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

#[derive(Clone)]
pub struct RecommendService {
    pool: DatabaseConnection,
    draws: DrawService,
    engine: StrategyEngine,
}

impl RecommendService {
    pub fn new(pool: DatabaseConnection, draws: DrawService, engine: StrategyEngine) -> Self {
        Self { pool, draws, engine }
    }

    /// 按请求参数推荐；all 时每个策略各一注、各一条批次
    pub async fn recommend(&self, params: &RecommendParams) -> AppResult<Vec<RecommendResponse>> {
        let count = match params.selection {
            StrategySelection::All => 1,
            StrategySelection::One(_) => params.count,
        };
        let mut out = Vec::new();
        for strategy in params.selection.strategies() {
            out.push(
                self.create_recommend(strategy, count, &params.fixed, &params.exclude, None)
                    .await?,
            );
        }
        Ok(out)
    }

    pub async fn create_recommend(
        &self,
        strategy: Strategy,
        count: usize,
        fixed: &BTreeSet<u8>,
        exclude: &BTreeSet<u8>,
        target_draw_no: Option<i32>,
    ) -> AppResult<RecommendResponse> {
        let tickets = self
            .engine
            .generate_many(strategy, count, fixed, exclude)
            .await?;
        let target = match target_draw_no {
            Some(n) => n,
            None => self.draws.prepare_target_round().await?,
        };
        let params = json!({
            "count": count,
            "fixedNumbers": fixed,
            "excludeNumbers": exclude,
        });
        let recommend_id = self.save_run(strategy, target, &tickets, params).await?;
        Ok(RecommendResponse {
            recommend_id,
            target_draw_no: target,
            algorithm: strategy,
            tickets,
        })
    }

    /// 写入一条推荐批次及其号码，set_no 从 1 开始
    pub async fn save_run(
        &self,
        strategy: Strategy,
        target_draw_no: i32,
        tickets: &[TicketSet],
        params: serde_json::Value,
    ) -> AppResult<String> {
        if tickets.is_empty() {
            return Err(AppError::GenerationFailed(format!(
                "{strategy}: no tickets to store"
            )));
        }
        let recommend_id = Uuid::new_v4().to_string();
        let txn = self.pool.begin().await?;

        runs::Entity::insert(runs::ActiveModel {
            recommend_id: Set(recommend_id.clone()),
            target_draw_no: Set(target_draw_no),
            algorithm: Set(strategy.name().to_string()),
            params_json: Set(Some(params.to_string())),
            created_at: Set(Utc::now()),
        })
        .exec_without_returning(&txn)
        .await?;

        let rows = tickets.iter().enumerate().flat_map(|(set_idx, ticket)| {
            let recommend_id = recommend_id.clone();
            ticket
                .numbers()
                .iter()
                .enumerate()
                .map(move |(pos, &n)| numbers::ActiveModel {
                    recommend_id: Set(recommend_id.clone()),
                    set_no: Set(set_idx as i16 + 1),
                    pos: Set(pos as i16 + 1),
                    number: Set(n as i16),
                })
        });
        numbers::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;

        log::debug!(
            "Recommend {recommend_id} stored: {strategy} x{} for draw {target_draw_no}",
            tickets.len()
        );
        Ok(recommend_id)
    }

    pub async fn get_by_id(&self, recommend_id: &str) -> AppResult<RecommendDetail> {
        let run = runs::Entity::find_by_id(recommend_id.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Recommend {recommend_id} not found")))?;

        let rows = numbers::Entity::find()
            .filter(numbers::Column::RecommendId.eq(recommend_id))
            .order_by_asc(numbers::Column::SetNo)
            .order_by_asc(numbers::Column::Pos)
            .all(&self.pool)
            .await?;
        let mut grouped: BTreeMap<i16, Vec<i16>> = BTreeMap::new();
        for row in rows {
            grouped.entry(row.set_no).or_default().push(row.number);
        }
        let sets = grouped
            .into_iter()
            .map(|(set_no, nums)| {
                TicketSet::from_stored(nums)
                    .map(|numbers| RecommendSet { set_no, numbers })
                    .ok_or_else(|| {
                        AppError::InternalError(format!(
                            "Recommend {recommend_id} set {set_no} is corrupted"
                        ))
                    })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let params = run
            .params_json
            .as_deref()
            .map(serde_json::from_str::<serde_json::Value>)
            .transpose()?;
        Ok(RecommendDetail {
            recommend_id: run.recommend_id,
            target_draw_no: run.target_draw_no,
            algorithm: run.algorithm,
            params,
            created_at: run.created_at,
            sets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;

    #[tokio::test]
    async fn test_create_and_fetch_recommend() {
        let ctx = TestContext::new().await;
        ctx.seed_draw(1, [3, 11, 18, 25, 33, 42], 7).await;

        let fixed = BTreeSet::from([5]);
        let exclude = BTreeSet::from([6]);
        let created = ctx
            .recommends
            .create_recommend(Strategy::EvenOdd, 3, &fixed, &exclude, None)
            .await
            .unwrap();
        assert_eq!(created.target_draw_no, 2);
        assert_eq!(created.tickets.len(), 3);

        let detail = ctx.recommends.get_by_id(&created.recommend_id).await.unwrap();
        assert_eq!(detail.algorithm, "evenOdd");
        assert_eq!(detail.sets.len(), 3);
        assert_eq!(
            detail.sets.iter().map(|s| s.set_no).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        for (set, ticket) in detail.sets.iter().zip(&created.tickets) {
            assert_eq!(&set.numbers, ticket);
            assert!(set.numbers.contains(5) && !set.numbers.contains(6));
        }
        let params = detail.params.unwrap();
        assert_eq!(params["count"], 3);
        assert_eq!(params["fixedNumbers"], json!([5]));
        assert_eq!(params["excludeNumbers"], json!([6]));
    }

    #[tokio::test]
    async fn test_all_runs_every_strategy_once() {
        let ctx = TestContext::new().await;
        ctx.seed_draw(1, [3, 11, 18, 25, 33, 42], 7).await;
        let params = RecommendParams {
            selection: StrategySelection::All,
            count: 4,
            fixed: BTreeSet::new(),
            exclude: BTreeSet::new(),
        };
        let runs = ctx.recommends.recommend(&params).await.unwrap();
        assert_eq!(runs.len(), Strategy::ALL.len());
        assert!(runs.iter().all(|r| r.tickets.len() == 1));
        let algorithms: Vec<Strategy> = runs.iter().map(|r| r.algorithm).collect();
        assert_eq!(algorithms, Strategy::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_unknown_recommend_is_not_found() {
        let ctx = TestContext::new().await;
        assert!(matches!(
            ctx.recommends.get_by_id("missing").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_generation_failure_stores_nothing() {
        let ctx = TestContext::new().await;
        ctx.seed_draw(1, [3, 11, 18, 25, 33, 42], 7).await;
        let fixed = BTreeSet::from([1, 3, 5, 7]);
        let err = ctx
            .recommends
            .create_recommend(Strategy::EvenOdd, 1, &fixed, &BTreeSet::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GenerationFailed(_)));
        assert_eq!(ctx.draws.all_draw_nos().await.unwrap(), vec![1]);
    }
}
