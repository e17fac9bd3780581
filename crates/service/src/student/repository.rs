use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use tracing::debug;

use models::student::{self, Student};

use crate::errors::ServiceError;

/// Persistence gateway for students. The only writer of the `student` table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRepository: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Student>, ServiceError>;
    /// Inserts when `id` is `None`, otherwise overwrites the row with that id.
    async fn save(&self, student: Student) -> Result<Student, ServiceError>;
    async fn get(&self, id: i32) -> Result<Student, ServiceError>;
    /// `NotFound` when no row had that id.
    async fn delete(&self, id: i32) -> Result<(), ServiceError>;
    /// Exact, case-sensitive match.
    async fn exists_by_email(&self, email: &str) -> Result<bool, ServiceError>;
    /// Case-insensitive substring match on `name`.
    async fn find_by_name_containing(&self, fragment: &str) -> Result<Vec<Student>, ServiceError>;
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmStudentRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmStudentRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl StudentRepository for SeaOrmStudentRepository {
    async fn list_all(&self) -> Result<Vec<Student>, ServiceError> {
        let rows = student::Entity::find()
            .order_by_asc(student::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(Student::from).collect())
    }

    async fn save(&self, student: Student) -> Result<Student, ServiceError> {
        let am = student.clone().into_active_model();
        let saved = if student.is_new() {
            am.insert(&self.db).await?
        } else {
            am.update(&self.db).await?
        };
        debug!(id = saved.id, "student saved");
        Ok(saved.into())
    }

    async fn get(&self, id: i32) -> Result<Student, ServiceError> {
        student::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(Student::from)
            .ok_or_else(|| ServiceError::not_found("student"))
    }

    async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let res = student::Entity::delete_by_id(id).exec(&self.db).await?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("student"));
        }
        Ok(())
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, ServiceError> {
        let n = student::Entity::find()
            .filter(student::Column::Email.eq(email))
            .count(&self.db)
            .await?;
        Ok(n > 0)
    }

    async fn find_by_name_containing(&self, fragment: &str) -> Result<Vec<Student>, ServiceError> {
        let needle = fragment.to_lowercase();
        let query = student::Entity::find().order_by_asc(student::Column::Id);
        // SQLite's LOWER() only folds ASCII; fold both sides in Rust there
        let rows: Vec<student::Model> = match self.db.get_database_backend() {
            DbBackend::Sqlite => query
                .all(&self.db)
                .await?
                .into_iter()
                .filter(|m| m.name.to_lowercase().contains(&needle))
                .collect(),
            _ => {
                let pattern = format!("%{}%", escape_like(&needle));
                query
                    .filter(Expr::expr(Func::lower(Expr::col(student::Column::Name))).like(LikeExpr::new(pattern).escape('\\')))
                    .all(&self.db)
                    .await?
            }
        };
        Ok(rows.into_iter().map(Student::from).collect())
    }
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
