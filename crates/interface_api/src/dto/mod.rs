//! Request/Response data transfer objects

pub mod payments;
pub mod invoices;
pub mod students;
pub mod reports;
