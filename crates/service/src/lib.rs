//! Service layer for student records.
//! - `student::repository` is the persistence gateway over SeaORM.
//! - `student::service` owns validation policy and delegates storage to the gateway.

pub mod errors;
pub mod student;
#[cfg(test)]
pub mod test_support;
