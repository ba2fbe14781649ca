//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities. Fixtures are consistent and
//! predictable so assertions can use literal expected values.

use core_kernel::{Currency, Money, StudentId, UserId};
use domain_student::Student;
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A standard lesson fee
    pub fn lesson_fee() -> Money {
        Money::new(dec!(500.00), Currency::INR)
    }

    /// A typical full-course invoice total
    pub fn course_total() -> Money {
        Money::new(dec!(1000.00), Currency::INR)
    }

    /// Zero rupees
    pub fn zero() -> Money {
        Money::zero(Currency::INR)
    }
}

/// Fixture for student test data
pub struct StudentFixtures;

impl StudentFixtures {
    /// An active student with a fresh identity record
    pub fn active() -> Student {
        Student::new(UserId::new())
    }

    /// A student id guaranteed not to be in any in-memory directory
    pub fn unknown_id() -> StudentId {
        StudentId::new()
    }
}
