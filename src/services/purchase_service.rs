use crate::entities::{
    draw_entity as draws, purchase_entity as purchases, purchase_number_entity as numbers,
    purchase_result_entity as results,
};
use crate::error::{AppError, AppResult};
use crate::models::{PurchaseDetail, PurchaseParams, PurchaseResponse, Score, TicketSet};
use crate::services::DrawService;
use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

#[derive(Clone)]
pub struct PurchaseService {
    pool: DatabaseConnection,
    draws: DrawService,
}

impl PurchaseService {
    pub fn new(pool: DatabaseConnection, draws: DrawService) -> Self {
        Self { pool, draws }
    }

    /// 目标期号缺省为当前投注期，购买时间缺省为当前时间
    pub async fn create_purchase(&self, params: PurchaseParams) -> AppResult<PurchaseResponse> {
        let target = match params.target_draw_no {
            Some(n) => {
                draws::Entity::find_by_id(n)
                    .one(&self.pool)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Draw {n} not found")))?;
                n
            }
            None => self.draws.prepare_target_round().await?,
        };
        let purchase_at = params.purchase_at.unwrap_or_else(Utc::now);
        let purchase_ids = self
            .save_purchases(target, purchase_at, &params.source_type, &params.tickets)
            .await?;
        Ok(PurchaseResponse {
            purchase_ids,
            target_draw_no: target,
            purchase_at,
            source_type: params.source_type,
            tickets: params.tickets,
        })
    }

    /// 每注号码一条购买记录，同一事务提交
    pub async fn save_purchases(
        &self,
        target_draw_no: i32,
        purchase_at: DateTime<Utc>,
        source_type: &str,
        tickets: &[TicketSet],
    ) -> AppResult<Vec<String>> {
        if tickets.is_empty() {
            return Err(AppError::invalid("tickets must not be empty"));
        }
        let now = Utc::now();
        let ids: Vec<String> = tickets.iter().map(|_| Uuid::new_v4().to_string()).collect();

        let txn = self.pool.begin().await?;
        purchases::Entity::insert_many(ids.iter().map(|id| purchases::ActiveModel {
            purchase_id: Set(id.clone()),
            target_draw_no: Set(target_draw_no),
            purchase_at: Set(purchase_at),
            source_type: Set(source_type.to_string()),
            created_at: Set(now),
        }))
        .exec_without_returning(&txn)
        .await?;

        let rows = ids.iter().zip(tickets).flat_map(|(id, ticket)| {
            ticket
                .numbers()
                .iter()
                .enumerate()
                .map(move |(pos, &n)| numbers::ActiveModel {
                    purchase_id: Set(id.clone()),
                    pos: Set(pos as i16 + 1),
                    number: Set(n as i16),
                })
        });
        numbers::Entity::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;

        log::debug!(
            "Stored {} purchases ({source_type}) for draw {target_draw_no}",
            ids.len()
        );
        Ok(ids)
    }

    pub async fn get_by_id(&self, purchase_id: &str) -> AppResult<PurchaseDetail> {
        let purchase = purchases::Entity::find_by_id(purchase_id.to_string())
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Purchase {purchase_id} not found")))?;

        let nums: Vec<i16> = numbers::Entity::find()
            .filter(numbers::Column::PurchaseId.eq(purchase_id))
            .order_by_asc(numbers::Column::Pos)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|r| r.number)
            .collect();
        let ticket = TicketSet::from_stored(nums).ok_or_else(|| {
            AppError::InternalError(format!("Purchase {purchase_id} numbers are corrupted"))
        })?;

        let result = results::Entity::find_by_id(purchase_id.to_string())
            .one(&self.pool)
            .await?
            .map(|r| Score {
                match_count: r.match_count as u8,
                bonus_match: r.bonus_match,
                rank: r.result_rank as u8,
            });

        Ok(PurchaseDetail {
            purchase_id: purchase.purchase_id,
            target_draw_no: purchase.target_draw_no,
            purchase_at: purchase.purchase_at,
            source_type: purchase.source_type,
            numbers: ticket,
            result,
        })
    }
}
