//! Migrator for the student records schema.
//! The email index is applied after the table exists.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_student;
mod m20240301_000002_add_student_email_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_student::Migration),
            Box::new(m20240301_000002_add_student_email_index::Migration),
        ]
    }
}
