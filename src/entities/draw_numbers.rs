use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 开奖号码，pos 1..=6 为基本号，pos 7 为奖励号
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "draw_numbers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub draw_no: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub pos: i16,
    pub number: i16,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::draws::Entity",
        from = "Column::DrawNo",
        to = "super::draws::Column::DrawNo",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Draw,
}

impl Related<super::draws::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Draw.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
