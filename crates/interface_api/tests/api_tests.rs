//! HTTP API tests
//!
//! The router runs against the in-memory ports, so these tests cover routing,
//! authentication, role checks, and error mapping without a database.

use std::str::FromStr;
use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use domain_billing::MockInvoicePort;
use domain_commission::MockCommissionPort;
use domain_party::{AgentClassification, MockAgentPort, MockCustomerPort};
use interface_api::auth::{create_token, permissions};
use interface_api::config::ApiConfig;
use interface_api::{create_router, AppState, Ports};
use test_utils::{
    customer, AgentBuilder, IdFixtures, InvoiceBuilder, PaymentBuilder, ScheduleFixtures,
    TemporalFixtures,
};

struct Harness {
    server: TestServer,
    config: ApiConfig,
    invoices: MockInvoicePort,
}

impl Harness {
    fn token(&self, roles: &[&str]) -> HeaderValue {
        let token = create_token(
            "finance@hq",
            roles.iter().map(|r| r.to_string()).collect(),
            &self.config.jwt_secret,
            300,
        )
        .unwrap();
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
    }

    fn as_admin(&self, request: TestRequest) -> TestRequest {
        request.add_header(header::AUTHORIZATION, self.token(&[permissions::ADMIN]))
    }

    fn with_roles(&self, request: TestRequest, roles: &[&str]) -> TestRequest {
        request.add_header(header::AUTHORIZATION, self.token(roles))
    }
}

/// One internal agent with a March invoice of 15,000 and its ANP already set
async fn harness() -> Harness {
    let march_10 = TemporalFixtures::business_day(3, 10);

    let invoices = MockInvoicePort::with_invoices(vec![
        InvoiceBuilder::new("inv-paid")
            .amount(dec!(15000))
            .eligible(dec!(15000))
            .paid(march_10)
            .achieved_anp(dec!(15000))
            .build(),
        InvoiceBuilder::new("inv-stale").amount(dec!(1000)).build(),
    ])
    .await;
    invoices
        .insert_payment(PaymentBuilder::new("pay-1", "inv-paid", dec!(15000)).on(march_10).build())
        .await;
    invoices
        .insert_payment(PaymentBuilder::new("pay-2", "inv-stale", dec!(1000)).on(march_10).build())
        .await;

    let agents = MockAgentPort::with_agents(vec![
        AgentBuilder::new(IdFixtures::agent().as_str(), "Budi Santoso").build(),
        AgentBuilder::new(IdFixtures::other_agent().as_str(), "Sari Wulandari")
            .classification(AgentClassification::Outsource)
            .build(),
    ])
    .await;
    let customers = MockCustomerPort::with_customers(vec![
        customer("cust-001", "Sari Dewi", Some("+6281234567"), None),
        customer("cust-002", "Andi Wijaya", None, Some("andi@example.com")),
    ])
    .await;

    let ports = Ports {
        invoices: Arc::new(invoices.clone()),
        agents: Arc::new(agents),
        customers: Arc::new(customers),
        commissions: Arc::new(MockCommissionPort::new()),
    };
    let config = ApiConfig {
        jwt_secret: "api-test-secret".to_string(),
        ..ApiConfig::default()
    };
    let state = AppState::new(ports, ScheduleFixtures::standard(), config.clone());
    let server = TestServer::new(create_router(state)).unwrap();

    Harness {
        server,
        config,
        invoices,
    }
}

fn decimal(value: &Value) -> Decimal {
    Decimal::from_str(value.as_str().expect("decimal serialized as string")).unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let h = harness().await;

    let response = h.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");

    let ready = h.server.get("/health/ready").await;
    ready.assert_status_ok();
    assert_eq!(ready.json::<Value>()["adapters"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_api_requires_bearer_token() {
    let h = harness().await;

    let response = h.server.get("/api/v1/agents").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = h
        .server
        .get("/api/v1/agents")
        .add_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer not-a-jwt"))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_role_is_forbidden() {
    let h = harness().await;

    let response = h
        .with_roles(h.server.post("/api/v1/anp/recompute"), &[permissions::COMMISSION_READ])
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(response.json::<Value>()["error"], "forbidden");
}

#[tokio::test]
async fn test_compute_commission_for_march() {
    let h = harness().await;

    let response = h
        .with_roles(
            h.server.get("/api/v1/commissions/agent-budi"),
            &[permissions::COMMISSION_READ],
        )
        .add_query_param("month", "2024-03")
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["month"], "2024-03");
    assert_eq!(body["invoices"].as_array().unwrap().len(), 1);
    assert_eq!(decimal(&body["total_basic_commission"]), dec!(450));
    assert_eq!(decimal(&body["total_bonus_commission"]), dec!(150));
    assert_eq!(decimal(&body["total_commission"]), dec!(600));
}

#[tokio::test]
async fn test_malformed_month_is_bad_request() {
    let h = harness().await;

    let response = h
        .as_admin(h.server.get("/api/v1/commissions/agent-budi"))
        .add_query_param("month", "2024-13")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_monthly_report_totals_eligible_amounts() {
    let h = harness().await;

    let response = h
        .as_admin(h.server.get("/api/v1/reports/monthly"))
        .add_query_param("month", "2024-03")
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["total_invoices"], 1);
    assert_eq!(body["agents"][0]["agent_id"], "agent-budi");
    assert_eq!(body["agents"][0]["agent_name"], "Budi Santoso");
    assert_eq!(decimal(&body["total_eligible_amount"]), dec!(15000));
}

#[tokio::test]
async fn test_generate_pay_and_pay_again() {
    let h = harness().await;

    let adjustment = h
        .as_admin(h.server.post("/api/v1/adjustments"))
        .json(&json!({
            "agent_id": "agent-budi",
            "month": "2024-03",
            "amount": "-100",
            "description": "Clawback for cancelled policy"
        }))
        .await;
    adjustment.assert_status(StatusCode::CREATED);

    let generated = h
        .as_admin(h.server.post("/api/v1/reports/generate"))
        .json(&json!({ "month": "2024-03", "agent_id": "agent-budi" }))
        .await;
    generated.assert_status(StatusCode::CREATED);

    let body = generated.json::<Value>();
    let report = &body["reports"][0];
    assert_eq!(decimal(&report["total_adjustments"]), dec!(-100));
    assert_eq!(decimal(&report["final_total_commission"]), dec!(500));
    assert_eq!(report["generated_by"], "finance@hq");
    let report_id = report["id"].as_str().unwrap().to_string();

    let path = format!("/api/v1/reports/{report_id}/pay");
    let paid = h
        .with_roles(h.server.post(&path), &[permissions::COMMISSION_PAY])
        .await;
    paid.assert_status_ok();
    assert_eq!(paid.json::<Value>()["is_paid"], true);

    let again = h
        .with_roles(h.server.post(&path), &[permissions::COMMISSION_PAY])
        .await;
    again.assert_status(StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_paying_requires_pay_role() {
    let h = harness().await;

    let response = h
        .with_roles(
            h.server.post("/api/v1/reports/any-report/pay"),
            &[permissions::COMMISSION_WRITE],
        )
        .await;
    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_batch_generation_covers_commissionable_agents() {
    let h = harness().await;

    let response = h
        .as_admin(h.server.post("/api/v1/reports/generate"))
        .json(&json!({ "month": "2024-03" }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body = response.json::<Value>();
    assert_eq!(body["reports"].as_array().unwrap().len(), 2);
    assert!(body["errors"].as_array().unwrap().is_empty());

    let listed = h
        .as_admin(h.server.get("/api/v1/reports"))
        .add_query_param("month", "2024-03")
        .await;
    listed.assert_status_ok();
    assert_eq!(listed.json::<Value>().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_single_generation_rejects_classification() {
    let h = harness().await;

    let response = h
        .as_admin(h.server.post("/api/v1/reports/generate"))
        .json(&json!({
            "month": "2024-03",
            "agent_id": "agent-budi",
            "classification": "internal"
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_zero_adjustment_is_rejected() {
    let h = harness().await;

    let response = h
        .as_admin(h.server.post("/api/v1/adjustments"))
        .json(&json!({
            "agent_id": "agent-budi",
            "month": "2024-03",
            "amount": "0",
            "description": "Nothing"
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["error"], "validation_error");
}

#[tokio::test]
async fn test_adjustment_update_and_delete() {
    let h = harness().await;

    let created = h
        .as_admin(h.server.post("/api/v1/adjustments"))
        .json(&json!({
            "agent_id": "agent-sari",
            "month": "2024-03",
            "amount": "250",
            "description": "Campaign bonus"
        }))
        .await;
    created.assert_status(StatusCode::CREATED);
    let id = created.json::<Value>()["id"].as_str().unwrap().to_string();
    let path = format!("/api/v1/adjustments/{id}");

    let updated = h
        .as_admin(h.server.put(&path))
        .json(&json!({ "amount": "300" }))
        .await;
    updated.assert_status_ok();
    assert_eq!(decimal(&updated.json::<Value>()["amount"]), dec!(300));

    h.as_admin(h.server.delete(&path))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let listed = h
        .as_admin(h.server.get("/api/v1/adjustments"))
        .add_query_param("agent_id", "agent-sari")
        .await;
    assert!(listed.json::<Value>().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_reclassify_agent() {
    let h = harness().await;

    let response = h
        .with_roles(
            h.server.put("/api/v1/agents/agent-budi/classification"),
            &[permissions::AGENT_WRITE],
        )
        .json(&json!({ "classification": "blocked" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["classification"], "blocked");

    let blocked = h
        .as_admin(h.server.get("/api/v1/agents"))
        .add_query_param("classification", "blocked")
        .await;
    let agents = blocked.json::<Value>();
    assert_eq!(agents.as_array().unwrap().len(), 1);
    assert_eq!(agents[0]["id"], "agent-budi");
}

#[tokio::test]
async fn test_unknown_agent_is_not_found() {
    let h = harness().await;

    let response = h.as_admin(h.server.get("/api/v1/agents/agent-nobody")).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_customer_search() {
    let h = harness().await;

    let response = h
        .as_admin(h.server.get("/api/v1/customers"))
        .add_query_param("q", "SARI")
        .await;
    response.assert_status_ok();
    let customers = response.json::<Value>();
    assert_eq!(customers.as_array().unwrap().len(), 1);
    assert_eq!(customers[0]["id"], "cust-001");

    let too_short = h
        .as_admin(h.server.get("/api/v1/customers"))
        .add_query_param("q", "a")
        .await;
    too_short.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_refresh_payment_dates() {
    let h = harness().await;

    let response = h
        .as_admin(h.server.post("/api/v1/invoices/refresh-payment-dates"))
        .await;
    response.assert_status_ok();

    let body = response.json::<Value>();
    assert_eq!(body["checked"], 2);
    assert_eq!(body["updated"], 1);

    let stale = h
        .invoices
        .invoice(&core_kernel::InvoiceId::new("inv-stale"))
        .await
        .unwrap();
    assert_eq!(stale.full_payment_date, Some(TemporalFixtures::business_day(3, 10)));
}

#[tokio::test]
async fn test_invoice_detail_includes_payments() {
    let h = harness().await;

    let response = h.as_admin(h.server.get("/api/v1/invoices/inv-paid")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["payments"].as_array().unwrap().len(), 1);

    h.as_admin(h.server.get("/api/v1/invoices/inv-missing"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}
