//! Create followers table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Followers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Followers::FollowerId).integer().not_null())
                    .col(ColumnDef::new(Followers::FollowedId).integer().not_null())
                    // (follower_id, followed_id) - prevent duplicate follows
                    .primary_key(
                        Index::create()
                            .name("pk_followers")
                            .col(Followers::FollowerId)
                            .col(Followers::FollowedId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_followers_follower")
                            .from(Followers::Table, Followers::FollowerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_followers_followed")
                            .from(Followers::Table, Followers::FollowedId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: followed_id (for listing followers)
        manager
            .create_index(
                Index::create()
                    .name("idx_followers_followed_id")
                    .table(Followers::Table)
                    .col(Followers::FollowedId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Followers::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Followers {
    Table,
    FollowerId,
    FollowedId,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
