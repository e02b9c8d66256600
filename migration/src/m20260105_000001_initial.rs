use sea_orm_migration::prelude::*;

/// 开奖期次（含占位期）
#[derive(DeriveIden)]
enum Draws {
    Table,
    DrawNo,
    DrawDate,
    CreatedAt,
}

/// 开奖号码：pos 1..=6 为基本号，pos 7 为奖励号
#[derive(DeriveIden)]
enum DrawNumbers {
    Table,
    DrawNo,
    Pos,
    Number,
}

#[derive(DeriveIden)]
enum RecommendRuns {
    Table,
    RecommendId,
    TargetDrawNo,
    Algorithm,
    ParamsJson,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RecommendNumbers {
    Table,
    RecommendId,
    SetNo,
    Pos,
    Number,
}

#[derive(DeriveIden)]
enum RecommendResults {
    Table,
    RecommendId,
    SetNo,
    DrawNo,
    MatchCount,
    BonusMatch,
    ResultRank,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Purchases {
    Table,
    PurchaseId,
    TargetDrawNo,
    PurchaseAt,
    SourceType,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PurchaseNumbers {
    Table,
    PurchaseId,
    Pos,
    Number,
}

#[derive(DeriveIden)]
enum PurchaseResults {
    Table,
    PurchaseId,
    DrawNo,
    MatchCount,
    BonusMatch,
    ResultRank,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 外键随建表声明；结果表以所属号码组为主键
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Draws::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Draws::DrawNo)
                            .integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Draws::DrawDate).date().not_null())
                    .col(
                        ColumnDef::new(Draws::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DrawNumbers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DrawNumbers::DrawNo).integer().not_null())
                    .col(ColumnDef::new(DrawNumbers::Pos).small_integer().not_null())
                    .col(
                        ColumnDef::new(DrawNumbers::Number)
                            .small_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(DrawNumbers::DrawNo)
                            .col(DrawNumbers::Pos),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_draw_numbers_draw")
                            .from(DrawNumbers::Table, DrawNumbers::DrawNo)
                            .to(Draws::Table, Draws::DrawNo),
                    )
                    .to_owned(),
            )
            .await?;

        // 频率统计按号码查询
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_draw_numbers_number")
                    .table(DrawNumbers::Table)
                    .col(DrawNumbers::Number)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecommendRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecommendRuns::RecommendId)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecommendRuns::TargetDrawNo)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendRuns::Algorithm)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RecommendRuns::ParamsJson).text().null())
                    .col(
                        ColumnDef::new(RecommendRuns::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recommend_runs_draw")
                            .from(RecommendRuns::Table, RecommendRuns::TargetDrawNo)
                            .to(Draws::Table, Draws::DrawNo),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_recommend_runs_target")
                    .table(RecommendRuns::Table)
                    .col(RecommendRuns::TargetDrawNo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecommendNumbers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecommendNumbers::RecommendId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendNumbers::SetNo)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendNumbers::Pos)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendNumbers::Number)
                            .small_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(RecommendNumbers::RecommendId)
                            .col(RecommendNumbers::SetNo)
                            .col(RecommendNumbers::Pos),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recommend_numbers_run")
                            .from(RecommendNumbers::Table, RecommendNumbers::RecommendId)
                            .to(RecommendRuns::Table, RecommendRuns::RecommendId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RecommendResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecommendResults::RecommendId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendResults::SetNo)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendResults::DrawNo)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendResults::MatchCount)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendResults::BonusMatch)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendResults::ResultRank)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecommendResults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(RecommendResults::RecommendId)
                            .col(RecommendResults::SetNo),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_recommend_results_run")
                            .from(RecommendResults::Table, RecommendResults::RecommendId)
                            .to(RecommendRuns::Table, RecommendRuns::RecommendId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_recommend_results_draw")
                    .table(RecommendResults::Table)
                    .col(RecommendResults::DrawNo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Purchases::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Purchases::PurchaseId)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Purchases::TargetDrawNo).integer().not_null())
                    .col(
                        ColumnDef::new(Purchases::PurchaseAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Purchases::SourceType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Purchases::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchases_draw")
                            .from(Purchases::Table, Purchases::TargetDrawNo)
                            .to(Draws::Table, Draws::DrawNo),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_purchases_target")
                    .table(Purchases::Table)
                    .col(Purchases::TargetDrawNo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PurchaseNumbers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PurchaseNumbers::PurchaseId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseNumbers::Pos)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseNumbers::Number)
                            .small_integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(PurchaseNumbers::PurchaseId)
                            .col(PurchaseNumbers::Pos),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_numbers_purchase")
                            .from(PurchaseNumbers::Table, PurchaseNumbers::PurchaseId)
                            .to(Purchases::Table, Purchases::PurchaseId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PurchaseResults::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PurchaseResults::PurchaseId)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PurchaseResults::DrawNo).integer().not_null())
                    .col(
                        ColumnDef::new(PurchaseResults::MatchCount)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseResults::BonusMatch)
                            .boolean()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseResults::ResultRank)
                            .small_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PurchaseResults::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_purchase_results_purchase")
                            .from(PurchaseResults::Table, PurchaseResults::PurchaseId)
                            .to(Purchases::Table, Purchases::PurchaseId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_purchase_results_draw")
                    .table(PurchaseResults::Table)
                    .col(PurchaseResults::DrawNo)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PurchaseResults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PurchaseNumbers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Purchases::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecommendResults::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecommendNumbers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecommendRuns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DrawNumbers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Draws::Table).to_owned())
            .await?;
        Ok(())
    }
}
