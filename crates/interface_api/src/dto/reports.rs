//! Financial report DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use domain_billing::FinancialReport;

use super::payments::PaymentResponse;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct MethodTotalResponse {
    pub method: String,
    pub total: Decimal,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct StatusTotalResponse {
    pub status: String,
    pub total: Decimal,
    pub count: u64,
}

#[derive(Debug, Serialize)]
pub struct FinancialReportResponse {
    pub total_revenue: Decimal,
    pub total_invoiced: Decimal,
    pub outstanding: Decimal,
    pub currency: String,
    pub payments_by_method: Vec<MethodTotalResponse>,
    pub invoices_by_status: Vec<StatusTotalResponse>,
    pub recent_payments: Vec<PaymentResponse>,
}

impl From<&FinancialReport> for FinancialReportResponse {
    fn from(report: &FinancialReport) -> Self {
        Self {
            total_revenue: report.total_revenue.amount(),
            total_invoiced: report.total_invoiced.amount(),
            outstanding: report.outstanding.amount(),
            currency: report.total_revenue.currency().code().to_string(),
            payments_by_method: report
                .payments_by_method
                .iter()
                .map(|m| MethodTotalResponse {
                    method: m.method.as_str().to_string(),
                    total: m.total.amount(),
                    count: m.count,
                })
                .collect(),
            invoices_by_status: report
                .invoices_by_status
                .iter()
                .map(|s| StatusTotalResponse {
                    status: s.status.as_str().to_string(),
                    total: s.total.amount(),
                    count: s.count,
                })
                .collect(),
            recent_payments: report.recent_payments.iter().map(PaymentResponse::from).collect(),
        }
    }
}
