use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // closes the gap between the existence check and the insert
        manager
            .create_index(
                Index::create()
                    .name("uniq_student_email")
                    .table(Student::Table)
                    .col(Student::Email)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("uniq_student_email").table(Student::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Student { Table, Email }
