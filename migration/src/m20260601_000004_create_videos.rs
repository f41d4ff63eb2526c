use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Video time series, one row per (video_id, crawl_date)
        manager
            .create_table(
                Table::create()
                    .table(Videos::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Videos::VideoId).string().not_null())
                    .col(ColumnDef::new(Videos::CrawlDate).date().not_null())
                    .col(ColumnDef::new(Videos::Title).string().not_null())
                    .col(
                        ColumnDef::new(Videos::ViewCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Videos::PublishedDate).date().not_null())
                    .col(ColumnDef::new(Videos::ChannelId).string().not_null())
                    .col(ColumnDef::new(Videos::ChannelName).string().not_null())
                    .col(ColumnDef::new(Videos::CanonicalBaseUrl).string().not_null())
                    .primary_key(
                        Index::create()
                            .col(Videos::VideoId)
                            .col(Videos::CrawlDate),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_videos_channel_id")
                    .table(Videos::Table)
                    .col(Videos::ChannelId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_videos_crawl_date")
                    .table(Videos::Table)
                    .col(Videos::CrawlDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Videos::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Videos {
    Table,
    VideoId,
    CrawlDate,
    Title,
    ViewCount,
    PublishedDate,
    ChannelId,
    ChannelName,
    CanonicalBaseUrl,
}
