use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "recommend_numbers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub recommend_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub set_no: i16,
    #[sea_orm(primary_key, auto_increment = false)]
    pub pos: i16,
    pub number: i16,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::recommend_runs::Entity",
        from = "Column::RecommendId",
        to = "super::recommend_runs::Column::RecommendId",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Run,
}

impl Related<super::recommend_runs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Run.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
