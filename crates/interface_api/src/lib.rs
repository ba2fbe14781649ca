//! HTTP API Layer
//!
//! This crate provides the REST API for the school billing system using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for payments, invoices, students, reports
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod dto;

use axum::{
    routing::{get, post, put},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_billing::BillingService;

use crate::config::ApiConfig;
use crate::handlers::{health, invoices, payments, reports, students};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: BillingService,
    pub pool: PgPool,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Shared application state (billing service, pool, config)
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // Payment routes
    let payment_routes = Router::new()
        .route("/", post(payments::record_payment))
        .route("/", get(payments::list_payments))
        .route("/:id", get(payments::get_payment));

    // Invoice routes
    let invoice_routes = Router::new()
        .route("/", post(invoices::create_invoice))
        .route("/", get(invoices::list_invoices))
        .route("/:id", get(invoices::get_invoice))
        .route("/:id/status", put(invoices::update_status));

    // Student billing routes
    let student_routes = Router::new()
        .route("/:id/financials", get(students::get_financials));

    // Report routes
    let report_routes = Router::new().route("/financial", get(reports::financial_report));

    let api_routes = Router::new()
        .nest("/payments", payment_routes)
        .nest("/invoices", invoice_routes)
        .nest("/students", student_routes)
        .nest("/reports", report_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
