use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = e.sql_err() {
            if detail.contains("email") {
                return Self::Validation(crate::student::service::EMAIL_USED.to_string());
            }
        }
        match e {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => Self::StoreUnavailable(e.to_string()),
            DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => Self::not_found("student"),
            other => Self::Db(other.to_string()),
        }
    }
}
