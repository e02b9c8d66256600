use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 模拟购买记录，每条记录对应一组号码
/// - source_type: MANUAL / RANDOM / RECOMMEND 或策略名（自动购买）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "purchases")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub purchase_id: String,
    pub target_draw_no: i32,
    pub purchase_at: DateTime<Utc>,
    pub source_type: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_numbers::Entity")]
    Numbers,
}

impl Related<super::purchase_numbers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Numbers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
