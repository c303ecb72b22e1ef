use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ImportLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ImportLogs::Id).big_integer().auto_increment().primary_key())
                    .col(ColumnDef::new(ImportLogs::ImportType).text().not_null()) // "<asset>_daily"
                    .col(ColumnDef::new(ImportLogs::StartDate).date().not_null())
                    .col(ColumnDef::new(ImportLogs::EndDate).date().not_null())
                    .col(ColumnDef::new(ImportLogs::Batches).integer().not_null().default(0))
                    .col(ColumnDef::new(ImportLogs::CandlesFetched).big_integer().not_null().default(0))
                    .col(ColumnDef::new(ImportLogs::CandlesInserted).big_integer().not_null().default(0))
                    .col(ColumnDef::new(ImportLogs::CandlesSkipped).big_integer().not_null().default(0))
                    .col(ColumnDef::new(ImportLogs::CreatedAt).timestamp_with_time_zone().default(Expr::cust("CURRENT_TIMESTAMP")))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_import_logs_type_created")
                    .table(ImportLogs::Table)
                    .col(ImportLogs::ImportType)
                    .col(ImportLogs::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ImportLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ImportLogs {
    Table,
    Id,
    ImportType,
    StartDate,
    EndDate,
    Batches,
    CandlesFetched,
    CandlesInserted,
    CandlesSkipped,
    CreatedAt,
}
