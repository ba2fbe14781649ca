//! Per-student financial summaries
//!
//! The outstanding balance is derived on read from the ledger sums and is
//! never stored. Overpayment produces a negative outstanding balance; no
//! clamping happens at this level.

use serde::{Deserialize, Serialize};

use core_kernel::{Money, MoneyError};

use crate::ports::StudentTotals;

/// On-demand financial summary for a student
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StudentFinancials {
    /// Σ payment amount across the student's payments
    pub total_paid: Money,
    /// Σ invoice total_amount across the student's invoices
    pub total_invoiced: Money,
    /// `total_invoiced − total_paid`, sign preserved
    pub outstanding: Money,
}

impl StudentFinancials {
    /// Derives the summary from the ledger sums
    pub fn from_totals(totals: StudentTotals) -> Result<Self, MoneyError> {
        let outstanding = totals.total_invoiced.checked_sub(&totals.total_paid)?;
        Ok(Self {
            total_paid: totals.total_paid,
            total_invoiced: totals.total_invoiced,
            outstanding,
        })
    }
}
