use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChronicleUser::Table)
                    .if_not_exists()
                    .col(pk_auto(ChronicleUser::Id))
                    .col(string_uniq(ChronicleUser::Username))
                    .col(string(ChronicleUser::Email))
                    .col(string_null(ChronicleUser::Avatar))
                    .col(timestamp(ChronicleUser::CreatedAt))
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChronicleUser::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub enum ChronicleUser {
    Table,
    Id,
    Username,
    Email,
    Avatar,
    CreatedAt,
}
