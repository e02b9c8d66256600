use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 开奖期次
/// - 同步时写入；占位期（尚未开奖）只有日期，没有号码
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "draws")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub draw_no: i32,
    pub draw_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::draw_numbers::Entity")]
    DrawNumbers,
}

impl Related<super::draw_numbers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DrawNumbers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
