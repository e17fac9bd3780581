//! Create `student` table.
//!
//! `id` is store-assigned; optional demographic columns carry no constraints.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Student::Table)
                    .if_not_exists()
                    .col(pk_auto(Student::Id))
                    .col(string_len(Student::Name, 128))
                    .col(string_len(Student::Email, 255))
                    .col(integer_null(Student::Age))
                    .col(string_len_null(Student::Address, 255))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Student::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Student { Table, Id, Name, Email, Age, Address }
