use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "purchase_numbers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub purchase_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub pos: i16,
    pub number: i16,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchases::Entity",
        from = "Column::PurchaseId",
        to = "super::purchases::Column::PurchaseId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Purchase,
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchase.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
