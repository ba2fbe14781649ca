//! Student enrollment records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ClassId, StudentId, UserId};

/// Enrollment status of a student
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudentStatus {
    /// Currently taking lessons
    Active,
    /// Paused or lapsed
    Inactive,
    /// Finished the course
    Completed,
    /// Barred pending review
    Suspended,
}

impl StudentStatus {
    /// Returns the wire representation used in the database and the API
    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Active => "active",
            StudentStatus::Inactive => "inactive",
            StudentStatus::Completed => "completed",
            StudentStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for StudentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StudentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(StudentStatus::Active),
            "inactive" => Ok(StudentStatus::Inactive),
            "completed" => Ok(StudentStatus::Completed),
            "suspended" => Ok(StudentStatus::Suspended),
            other => Err(format!("unknown student status: {}", other)),
        }
    }
}

/// A student enrolled at the school
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Unique identifier
    pub id: StudentId,
    /// Identity record this enrollment belongs to (1:1)
    pub user_id: UserId,
    /// Enrollment status
    pub status: StudentStatus,
    /// Classes the student is enrolled in
    pub enrolled_classes: Vec<ClassId>,
    /// When the student enrolled
    pub enrollment_date: DateTime<Utc>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Student {
    /// Creates a new active enrollment for an identity record
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: StudentId::new_v7(),
            user_id,
            status: StudentStatus::Active,
            enrolled_classes: Vec::new(),
            enrollment_date: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Enrolls the student in a class, ignoring duplicates
    pub fn enroll_in(&mut self, class_id: ClassId) {
        if !self.enrolled_classes.contains(&class_id) {
            self.enrolled_classes.push(class_id);
            self.updated_at = Utc::now();
        }
    }

    /// Updates the enrollment status
    pub fn set_status(&mut self, status: StudentStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Returns true if the student can be billed
    pub fn is_active(&self) -> bool {
        self.status == StudentStatus::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_student_is_active() {
        let student = Student::new(UserId::new());
        assert_eq!(student.status, StudentStatus::Active);
        assert!(student.enrolled_classes.is_empty());
    }

    #[test]
    fn test_enroll_in_is_idempotent() {
        let mut student = Student::new(UserId::new());
        let class = ClassId::new();

        student.enroll_in(class);
        student.enroll_in(class);

        assert_eq!(student.enrolled_classes.len(), 1);
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            StudentStatus::Active,
            StudentStatus::Inactive,
            StudentStatus::Completed,
            StudentStatus::Suspended,
        ] {
            let parsed: StudentStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        assert!("graduated".parse::<StudentStatus>().is_err());
    }
}
