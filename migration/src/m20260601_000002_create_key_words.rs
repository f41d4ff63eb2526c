use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(KeyWords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(KeyWords::Keyword)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(KeyWords::IsBenchmark)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(KeyWords::IsBlacklist)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(KeyWords::LastCrawlDate).date())
                    .col(
                        ColumnDef::new(KeyWords::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_key_words_claim")
                    .table(KeyWords::Table)
                    .col(KeyWords::IsBlacklist)
                    .col(KeyWords::IsBenchmark)
                    .col(KeyWords::LastCrawlDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(KeyWords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum KeyWords {
    Table,
    Keyword,
    IsBenchmark,
    IsBlacklist,
    LastCrawlDate,
    CreatedAt,
}
