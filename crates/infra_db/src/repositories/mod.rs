//! Repository implementations for domain ports
//!
//! Each repository implements one domain port over the shared connection
//! pool, encapsulating SQL and the mapping between database rows and domain
//! types. Queries are bound at runtime; optional filters are pushed into the
//! SQL as `($n IS NULL OR column = $n)` guards so one statement covers every
//! filter combination.

pub mod billing;
pub mod student;

pub use billing::PgBillingStore;
pub use student::PgStudentDirectory;
