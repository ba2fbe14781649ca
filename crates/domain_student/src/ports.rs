//! Student Domain Ports
//!
//! The `StudentDirectory` trait is what billing sees of the enrollment
//! system: enough to resolve a student id before recording money against it.
//! Adapters: `infra_db::PgStudentDirectory` and the in-memory directory in
//! `test_utils`.

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError, StudentId};

use crate::student::{Student, StudentStatus};

/// Query parameters for listing students
#[derive(Debug, Clone, Default)]
pub struct StudentQuery {
    /// Filter by enrollment status
    pub status: Option<StudentStatus>,
    /// Limit results
    pub limit: Option<u32>,
    /// Offset for pagination
    pub offset: Option<u32>,
}

impl StudentQuery {
    /// Creates a query filtered to one status
    pub fn by_status(status: StudentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// Port for resolving and listing students
#[async_trait]
pub trait StudentDirectory: DomainPort {
    /// Fetches a student by id
    ///
    /// # Errors
    ///
    /// Returns `PortError::NotFound` if no such student exists.
    async fn get_student(&self, id: StudentId) -> Result<Student, PortError>;

    /// Lists students matching the query
    async fn list_students(&self, query: StudentQuery) -> Result<Vec<Student>, PortError>;

    /// Returns true if the student exists
    async fn student_exists(&self, id: StudentId) -> Result<bool, PortError> {
        match self.get_student(id).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
