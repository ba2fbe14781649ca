//! Student Domain - Enrollment records
//!
//! This crate holds the student entity and the directory port the billing
//! domain uses to check that a student exists before touching its ledger.
//! Enrollment mechanics (classes, instructors, document uploads) live with
//! their own collaborators and are not modelled here.

pub mod student;
pub mod ports;

pub use student::{Student, StudentStatus};
pub use ports::{StudentDirectory, StudentQuery};
