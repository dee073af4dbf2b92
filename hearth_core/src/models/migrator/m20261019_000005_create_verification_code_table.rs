use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VerificationCode::Table)
                    .col(pk_uuid(VerificationCode::Id))
                    .col(string(VerificationCode::Phone))
                    .col(string(VerificationCode::Code))
                    .col(string(VerificationCode::Type))
                    .col(timestamp_with_time_zone(VerificationCode::ExpiresAt))
                    .col(timestamp_with_time_zone(VerificationCode::CreatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_verification_code_phone_type")
                    .table(VerificationCode::Table)
                    .col(VerificationCode::Phone)
                    .col(VerificationCode::Type)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VerificationCode::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum VerificationCode {
    Table,
    Id,
    Phone,
    Code,
    Type,
    ExpiresAt,
    CreatedAt,
}
