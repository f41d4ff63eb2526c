use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Channel snapshot log, one row per (channel_id, crawl_date)
        manager
            .create_table(
                Table::create()
                    .table(ChannelCrawl::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ChannelCrawl::ChannelId).string().not_null())
                    .col(ColumnDef::new(ChannelCrawl::CrawlDate).date().not_null())
                    .col(
                        ColumnDef::new(ChannelCrawl::ChannelName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChannelCrawl::Description).text().not_null())
                    .col(
                        ColumnDef::new(ChannelCrawl::SubscriberCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ChannelCrawl::VideoCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ChannelCrawl::ViewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ChannelCrawl::JoinedDate).date())
                    .col(ColumnDef::new(ChannelCrawl::Country).string().not_null())
                    .col(
                        ColumnDef::new(ChannelCrawl::CanonicalBaseUrl)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChannelCrawl::AvatarUrl).string())
                    .primary_key(
                        Index::create()
                            .col(ChannelCrawl::ChannelId)
                            .col(ChannelCrawl::CrawlDate),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_channel_crawl_crawl_date")
                    .table(ChannelCrawl::Table)
                    .col(ChannelCrawl::CrawlDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChannelCrawl::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ChannelCrawl {
    Table,
    ChannelId,
    CrawlDate,
    ChannelName,
    Description,
    SubscriberCount,
    VideoCount,
    ViewCount,
    JoinedDate,
    Country,
    CanonicalBaseUrl,
    AvatarUrl,
}
