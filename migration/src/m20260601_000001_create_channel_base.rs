use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create channel_base table (registry + channel backlog)
        manager
            .create_table(
                Table::create()
                    .table(ChannelBase::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChannelBase::ChannelId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChannelBase::ChannelName).string())
                    .col(ColumnDef::new(ChannelBase::AvatarUrl).string())
                    .col(ColumnDef::new(ChannelBase::Description).text())
                    .col(
                        ColumnDef::new(ChannelBase::IsBenchmark)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ChannelBase::IsBlacklist)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(ChannelBase::LastCrawlDate).date())
                    .col(
                        ColumnDef::new(ChannelBase::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(ChannelBase::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Claim scans by eligibility then ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_channel_base_claim")
                    .table(ChannelBase::Table)
                    .col(ChannelBase::IsBlacklist)
                    .col(ChannelBase::IsBenchmark)
                    .col(ChannelBase::LastCrawlDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChannelBase::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ChannelBase {
    Table,
    ChannelId,
    ChannelName,
    AvatarUrl,
    Description,
    IsBenchmark,
    IsBlacklist,
    LastCrawlDate,
    CreatedAt,
    UpdatedAt,
}
