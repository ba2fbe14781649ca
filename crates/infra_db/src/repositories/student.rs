//! Student directory implementation
//!
//! Read-side access to enrollment records. The billing engine only needs
//! lookups and listings here; enrollment writes happen elsewhere.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use core_kernel::{ClassId, DomainPort, PortError, StudentId, UserId};
use domain_student::{Student, StudentDirectory, StudentQuery, StudentStatus};

use crate::error::DatabaseError;

/// `StudentDirectory` implementation over PostgreSQL
#[derive(Debug, Clone)]
pub struct PgStudentDirectory {
    pool: PgPool,
}

impl PgStudentDirectory {
    /// Creates a new directory over the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgStudentDirectory {}

fn map_sqlx(error: sqlx::Error) -> PortError {
    PortError::from(DatabaseError::from(&error))
}

fn student_from_row(row: &PgRow) -> Result<Student, PortError> {
    let status: String = row.try_get("status").map_err(map_sqlx)?;
    let classes: Vec<Uuid> = row.try_get("enrolled_classes").map_err(map_sqlx)?;

    Ok(Student {
        id: StudentId::from_uuid(row.try_get("id").map_err(map_sqlx)?),
        user_id: UserId::from_uuid(row.try_get("user_id").map_err(map_sqlx)?),
        status: StudentStatus::from_str(&status)
            .map_err(|e| PortError::from(DatabaseError::DecodeError(e)))?,
        enrolled_classes: classes.into_iter().map(ClassId::from_uuid).collect(),
        enrollment_date: row.try_get("enrollment_date").map_err(map_sqlx)?,
        created_at: row.try_get("created_at").map_err(map_sqlx)?,
        updated_at: row.try_get("updated_at").map_err(map_sqlx)?,
    })
}

const SELECT_STUDENT: &str = "SELECT id, user_id, status, enrolled_classes, enrollment_date, \
     created_at, updated_at \
     FROM students";

#[async_trait]
impl StudentDirectory for PgStudentDirectory {
    async fn get_student(&self, id: StudentId) -> Result<Student, PortError> {
        let row = sqlx::query(&format!("{SELECT_STUDENT} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?
            .ok_or_else(|| PortError::not_found("student", id))?;
        student_from_row(&row)
    }

    async fn list_students(&self, query: StudentQuery) -> Result<Vec<Student>, PortError> {
        let rows = sqlx::query(&format!(
            "{SELECT_STUDENT} \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY enrollment_date DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.limit.map(i64::from))
        .bind(query.offset.map(i64::from).unwrap_or(0))
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx)?;

        rows.iter().map(student_from_row).collect()
    }
}
