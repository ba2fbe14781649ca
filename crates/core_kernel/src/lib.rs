//! Core Kernel - Foundational types and utilities for the driving school system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers
//! - Port abstractions shared by the domain crates and their adapters

pub mod money;
pub mod identifiers;
pub mod ports;

pub use money::{Money, Currency, MoneyError};
pub use identifiers::{
    StudentId, UserId, ClassId,
    InvoiceId, PaymentId,
};
pub use ports::{PortError, DomainPort};
