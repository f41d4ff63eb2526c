use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SearchUrls::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SearchUrls::Url)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SearchUrls::KeyWords).string())
                    .col(
                        ColumnDef::new(SearchUrls::IsBenchmark)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(SearchUrls::IsBlacklist)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(SearchUrls::LastCrawlDate).date())
                    .col(
                        ColumnDef::new(SearchUrls::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SearchUrls::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SearchUrls {
    Table,
    Url,
    KeyWords,
    IsBenchmark,
    IsBlacklist,
    LastCrawlDate,
    CreatedAt,
}
