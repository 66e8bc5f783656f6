//! Initial migration creating the favorites table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FavoriteRepositories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FavoriteRepositories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FavoriteRepositories::SourceId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FavoriteRepositories::Name)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FavoriteRepositories::Description)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FavoriteRepositories::OwnerLogin)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FavoriteRepositories::OwnerAvatarUrl)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(FavoriteRepositories::StarCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(FavoriteRepositories::SortOrder)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FavoriteRepositories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(FavoriteRepositories::SourceUrl)
                            .text()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Not unique: reorders rewrite positions row by row inside a transaction.
        manager
            .create_index(
                Index::create()
                    .name("idx_favorite_repositories_sort_order")
                    .table(FavoriteRepositories::Table)
                    .col(FavoriteRepositories::SortOrder)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_favorite_repositories_source_id")
                    .table(FavoriteRepositories::Table)
                    .col(FavoriteRepositories::SourceId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FavoriteRepositories::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum FavoriteRepositories {
    Table,
    Id,
    SourceId,
    Name,
    Description,
    OwnerLogin,
    OwnerAvatarUrl,
    StarCount,
    SortOrder,
    CreatedAt,
    SourceUrl,
}
