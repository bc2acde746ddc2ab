//! HTTP API Layer
//!
//! REST API for the commission back office using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: One module per area (ANP, commissions, reports,
//!   adjustments, agents and customers, invoices)
//! - **Middleware**: JWT authentication and audit logging
//! - **DTOs**: Query and request types that are not domain records
//! - **Error Handling**: Domain errors mapped to JSON error responses
//!
//! The router only sees domain services. They are built from [`Ports`], so
//! the same router runs against PostgreSQL in the server binary and against
//! in-memory mocks in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState, Ports};
//!
//! let state = AppState::new(Ports::postgres(pool), schedules, config);
//! axum::serve(listener, create_router(state)).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware as axum_middleware,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::HealthCheckResult;
use domain_billing::{BillingService, InvoicePort};
use domain_commission::{
    AnpAggregator, CommissionCalculator, CommissionPort, CommissionService,
    MonthlyReportGenerator, ScheduleBook,
};
use domain_party::{AgentPort, CustomerPort, PartyService};
use infra_db::{DatabasePool, PostgresCommissionAdapter, PostgresInvoiceAdapter, PostgresPartyAdapter};

use crate::config::ApiConfig;
use crate::handlers::{adjustments, anp, commissions, health, invoices, party, reports};
use crate::middleware::{audit_middleware, auth_middleware};

/// The storage ports every service is built from
#[derive(Clone)]
pub struct Ports {
    pub invoices: Arc<dyn InvoicePort>,
    pub agents: Arc<dyn AgentPort>,
    pub customers: Arc<dyn CustomerPort>,
    pub commissions: Arc<dyn CommissionPort>,
}

impl Ports {
    /// PostgreSQL adapters sharing one pool
    pub fn postgres(pool: DatabasePool) -> Self {
        let party = Arc::new(PostgresPartyAdapter::new(pool.clone()));
        Self {
            invoices: Arc::new(PostgresInvoiceAdapter::new(pool.clone())),
            agents: party.clone(),
            customers: party,
            commissions: Arc::new(PostgresCommissionAdapter::new(pool)),
        }
    }

    /// Health of every adapter, in a fixed order
    pub async fn health_checks(&self) -> Vec<HealthCheckResult> {
        vec![
            self.invoices.health_check().await,
            self.agents.health_check().await,
            self.customers.health_check().await,
            self.commissions.health_check().await,
        ]
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub ports: Ports,
    pub party: PartyService,
    pub billing: BillingService,
    pub anp: AnpAggregator,
    pub monthly: MonthlyReportGenerator,
    pub commissions: CommissionService,
}

impl AppState {
    pub fn new(ports: Ports, schedules: Arc<ScheduleBook>, config: ApiConfig) -> Self {
        let tz = config.business_timezone;
        let calculator = CommissionCalculator::new(ports.invoices.clone(), schedules, tz);
        Self {
            party: PartyService::new(ports.agents.clone(), ports.customers.clone()),
            billing: BillingService::new(ports.invoices.clone(), tz),
            anp: AnpAggregator::new(ports.invoices.clone(), tz),
            monthly: MonthlyReportGenerator::new(ports.invoices.clone(), ports.agents.clone(), tz),
            commissions: CommissionService::new(
                calculator,
                ports.commissions.clone(),
                ports.agents.clone(),
            ),
            ports,
            config,
        }
    }
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let anp_routes = Router::new()
        .route("/recompute", post(anp::recompute))
        .route("/verify", get(anp::verify));

    let report_routes = Router::new()
        .route("/", get(reports::list_reports))
        .route("/monthly", get(commissions::monthly_report))
        .route("/generate", post(reports::generate_reports))
        .route("/:id", get(reports::get_report))
        .route("/:id/pay", post(reports::mark_paid));

    let adjustment_routes = Router::new()
        .route("/", get(adjustments::list_adjustments).post(adjustments::create_adjustment))
        .route(
            "/:id",
            put(adjustments::update_adjustment).delete(adjustments::delete_adjustment),
        );

    let agent_routes = Router::new()
        .route("/", get(party::list_agents))
        .route("/:id", get(party::get_agent))
        .route("/:id/classification", put(party::update_classification))
        .route("/:id/contact", put(party::update_contact));

    let invoice_routes = Router::new()
        .route("/", get(invoices::list_invoices))
        .route("/refresh-payment-dates", post(invoices::refresh_payment_dates))
        .route("/:id", get(invoices::get_invoice));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/anp", anp_routes)
        .route("/commissions/:agent_id", get(commissions::compute))
        .nest("/reports", report_routes)
        .nest("/adjustments", adjustment_routes)
        .nest("/agents", agent_routes)
        .route("/customers", get(party::search_customers))
        .nest("/invoices", invoice_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}
