use std::sync::Arc;
use tracing::{info, instrument};

use models::student::Student;

use crate::errors::ServiceError;
use crate::student::repository::StudentRepository;

pub const NAME_REQUIRED: &str = "Student must have a name";
pub const EMAIL_REQUIRED: &str = "Student must have an email address";
pub const EMAIL_USED: &str = "This email address has been used";
pub const ID_REQUIRED: &str = "Student id is required for edit";

/// Application service for students: validation policy on top of the gateway.
///
/// Validation stops at the first failed rule and reports only that message.
pub struct StudentService<R: StudentRepository> {
    repo: Arc<R>,
}

impl<R: StudentRepository> Clone for StudentService<R> {
    fn clone(&self) -> Self { Self { repo: Arc::clone(&self.repo) } }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Rules shared by create and edit.
fn check_required_fields(student: &Student) -> Option<&'static str> {
    if is_blank(&student.name) {
        return Some(NAME_REQUIRED);
    }
    if is_blank(&student.email) {
        return Some(EMAIL_REQUIRED);
    }
    None
}

impl<R: StudentRepository> StudentService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    pub async fn list_all(&self) -> Result<Vec<Student>, ServiceError> {
        self.repo.list_all().await
    }

    pub async fn search_by_name(&self, fragment: &str) -> Result<Vec<Student>, ServiceError> {
        self.repo.find_by_name_containing(fragment).await
    }

    pub async fn get(&self, id: i32) -> Result<Student, ServiceError> { self.repo.get(id).await }

    pub async fn save(&self, student: Student) -> Result<Student, ServiceError> { self.repo.save(student).await }

    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> { self.repo.delete(id).await }

    /// Name, then email, then email uniqueness. `Ok(None)` means valid; a
    /// store failure during the uniqueness lookup is returned as `Err`.
    #[instrument(skip(self, student), fields(email = %student.email))]
    pub async fn validate_for_create(&self, student: &Student) -> Result<Option<String>, ServiceError> {
        if let Some(msg) = check_required_fields(student) {
            info!(reason = msg, "student_create_rejected");
            return Ok(Some(msg.to_string()));
        }
        if self.repo.exists_by_email(&student.email).await? {
            info!(reason = EMAIL_USED, "student_create_rejected");
            return Ok(Some(EMAIL_USED.to_string()));
        }
        Ok(None)
    }

    /// Name, then email. Uniqueness is not re-checked so an edit may keep its own email.
    #[instrument(skip(self, student), fields(id = ?student.id))]
    pub fn validate_for_edit(&self, student: &Student) -> Option<String> {
        let msg = check_required_fields(student)?;
        info!(reason = msg, "student_edit_rejected");
        Some(msg.to_string())
    }

    /// Validate as new and insert. Any `id` on the input is discarded.
    pub async fn create(&self, mut student: Student) -> Result<Student, ServiceError> {
        student.id = None;
        if let Some(msg) = self.validate_for_create(&student).await? {
            return Err(ServiceError::Validation(msg));
        }
        let saved = self.repo.save(student).await?;
        info!(id = ?saved.id, "student_created");
        Ok(saved)
    }

    /// Validate as edit and overwrite the stored record.
    pub async fn update(&self, student: Student) -> Result<Student, ServiceError> {
        if student.id.is_none() {
            return Err(ServiceError::Validation(ID_REQUIRED.into()));
        }
        if let Some(msg) = self.validate_for_edit(&student) {
            return Err(ServiceError::Validation(msg));
        }
        let saved = self.repo.save(student).await?;
        info!(id = ?saved.id, "student_updated");
        Ok(saved)
    }
}
