use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 推荐号码评估结果，每组号码 (recommend_id, set_no) 最多一条
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "recommend_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub recommend_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub set_no: i16,
    pub draw_no: i32,
    pub match_count: i16,
    pub bonus_match: bool,
    /// 0 = 未中奖，1..=5 = 奖级
    pub result_rank: i16,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
