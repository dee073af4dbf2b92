use sea_orm_migration::{prelude::*, schema::*};

use super::m20261019_000001_create_user_table::User;
use super::m20261019_000002_create_post_table::Post;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Reply::Table)
                    .col(pk_uuid(Reply::Id))
                    .col(text(Reply::Content))
                    .col(uuid(Reply::AuthorId))
                    .col(uuid(Reply::PostId))
                    .col(uuid_null(Reply::ParentId)) // For nested replies
                    .col(boolean(Reply::IsDeleted).default(false))
                    .col(timestamp_with_time_zone(Reply::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reply-author_id")
                            .from(Reply::Table, Reply::AuthorId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reply-post_id")
                            .from(Reply::Table, Reply::PostId)
                            .to(Post::Table, Post::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reply-parent_id")
                            .from(Reply::Table, Reply::ParentId)
                            .to(Reply::Table, Reply::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reply_post_id")
                    .table(Reply::Table)
                    .col(Reply::PostId)
                    .to_owned(),
            )
            .await?;

        // Cascade deletes walk the tree through parent_id
        manager
            .create_index(
                Index::create()
                    .name("idx_reply_parent_id")
                    .table(Reply::Table)
                    .col(Reply::ParentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reply_author_id_created_at")
                    .table(Reply::Table)
                    .col(Reply::AuthorId)
                    .col(Reply::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reply::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Reply {
    Table,
    Id,
    Content,
    AuthorId,
    PostId,
    ParentId,
    IsDeleted,
    CreatedAt,
}
