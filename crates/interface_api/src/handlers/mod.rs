//! Request handlers

pub mod health;
pub mod payments;
pub mod invoices;
pub mod students;
pub mod reports;
