use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 推荐批次
/// - algorithm 为策略名
/// - params_json 记录生成参数 {count, fixedNumbers, excludeNumbers}
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "recommend_runs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub recommend_id: String,
    pub target_draw_no: i32,
    pub algorithm: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub params_json: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recommend_numbers::Entity")]
    Numbers,
}

impl Related<super::recommend_numbers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Numbers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
