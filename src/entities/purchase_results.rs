use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 购买号码评估结果
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub purchase_id: String,
    pub draw_no: i32,
    pub match_count: i16,
    pub bonus_match: bool,
    pub result_rank: i16,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
