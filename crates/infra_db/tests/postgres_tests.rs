//! PostgreSQL adapter tests
//!
//! These start a PostgreSQL container and are ignored by default. Run with
//! `cargo test -p infra_db -- --ignored` on a host with Docker.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal_macros::dec;

use core_kernel::{AgentId, InvoiceId, PortError};
use domain_billing::{BillingService, InvoicePort, InvoiceQuery, PaymentMethod};
use domain_commission::{
    AnpAggregator, CommissionCalculator, CommissionPort, CommissionService, NewAdjustment,
    ReportQuery,
};
use domain_party::{AgentClassification, AgentPort, AgentQuery, CustomerPort, CustomerQuery};
use infra_db::{PostgresCommissionAdapter, PostgresInvoiceAdapter, PostgresPartyAdapter};
use test_utils::{
    create_isolated_test_database, customer, seed_agent, seed_customer, seed_invoice,
    seed_payment, AgentBuilder, IdFixtures, InvoiceBuilder, PaymentBuilder, ScheduleFixtures,
    TemporalFixtures, TestDatabase, TEST_ACTOR,
};

async fn seeded() -> TestDatabase {
    let db = create_isolated_test_database()
        .await
        .expect("Failed to create test database");
    let pool = db.pool();

    seed_agent(
        pool,
        &AgentBuilder::new(IdFixtures::agent().as_str(), "Budi")
            .contact(Some("+62811000111"), Some("budi@example.com"))
            .build(),
    )
    .await
    .unwrap();
    seed_agent(
        pool,
        &AgentBuilder::new(IdFixtures::other_agent().as_str(), "Sari")
            .classification(AgentClassification::Blocked)
            .build(),
    )
    .await
    .unwrap();
    seed_customer(pool, &customer("cust-001", "Dewi 50%", Some("+62811"), None))
        .await
        .unwrap();

    let march = TemporalFixtures::business_day(3, 10);
    for (id, amount) in [("inv-1", dec!(5000)), ("inv-2", dec!(10000))] {
        let invoice = InvoiceBuilder::new(id)
            .amount(amount)
            .eligible(amount)
            .customer(IdFixtures::customer())
            .build();
        seed_invoice(pool, &invoice).await.unwrap();
        let payment = PaymentBuilder::new(format!("pay-{id}"), id, amount)
            .on(march)
            .method(PaymentMethod::VirtualAccount)
            .verified_by(TEST_ACTOR)
            .build();
        seed_payment(pool, &payment).await.unwrap();
    }
    db
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_refresh_then_anp_then_commission() {
    let db = seeded().await;
    let invoices = Arc::new(PostgresInvoiceAdapter::new(db.pool().clone()));
    let tz = TemporalFixtures::timezone();

    let refresh = BillingService::new(invoices.clone(), tz)
        .refresh_payment_dates()
        .await
        .unwrap();
    assert_eq!(refresh.updated, 2);

    let anp = AnpAggregator::new(invoices.clone(), tz).recompute_anp().await.unwrap();
    assert_eq!(anp.updated_invoices, 2);
    let stored = invoices.get_invoice(&InvoiceId::new("inv-1")).await.unwrap();
    assert_eq!(stored.achieved_monthly_anp, Some(dec!(15000)));
    assert_eq!(stored.customer_id, Some(IdFixtures::customer()));
    let payments = invoices.list_payments(&InvoiceId::new("inv-1")).await.unwrap();
    assert_eq!(payments[0].method, PaymentMethod::VirtualAccount);
    assert_eq!(payments[0].verified_by.as_deref(), Some(TEST_ACTOR));

    let calculator = CommissionCalculator::new(invoices, ScheduleFixtures::standard(), tz);
    let report = calculator
        .compute_commission(&IdFixtures::agent(), TemporalFixtures::march())
        .await
        .unwrap();
    assert_eq!(report.total_basic_commission, dec!(450));
    assert_eq!(report.total_bonus_commission, dec!(150));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_refund_clears_stale_anp() {
    let db = seeded().await;
    let invoices = Arc::new(PostgresInvoiceAdapter::new(db.pool().clone()));
    let tz = TemporalFixtures::timezone();
    let billing = BillingService::new(invoices.clone(), tz);
    let aggregator = AnpAggregator::new(invoices.clone(), tz);
    billing.refresh_payment_dates().await.unwrap();
    aggregator.recompute_anp().await.unwrap();

    let refund = PaymentBuilder::new("refund-inv-2", "inv-2", dec!(-10000))
        .on(TemporalFixtures::business_day(3, 20))
        .build();
    seed_payment(db.pool(), &refund).await.unwrap();

    let result = aggregator.recompute_anp().await.unwrap();
    assert_eq!(result.cleared_invoices, 1);

    let refunded = invoices.get_invoice(&InvoiceId::new("inv-2")).await.unwrap();
    assert!(refunded.achieved_monthly_anp.is_none());
    let kept = invoices.get_invoice(&InvoiceId::new("inv-1")).await.unwrap();
    assert_eq!(kept.achieved_monthly_anp, Some(dec!(5000)));
    assert!(invoices.stored_anp().await.unwrap().iter().all(|s| s.invoice_id != InvoiceId::new("inv-2")));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_invoices_filters_by_paid_month() {
    let db = seeded().await;
    let invoices = PostgresInvoiceAdapter::new(db.pool().clone());
    let tz = TemporalFixtures::timezone();
    BillingService::new(Arc::new(invoices.clone()), tz)
        .refresh_payment_dates()
        .await
        .unwrap();

    let march = tz.month_range(TemporalFixtures::march()).unwrap();
    let april = tz.month_range(TemporalFixtures::april()).unwrap();

    let paid = invoices.list_invoices(InvoiceQuery::default().paid_in(march)).await.unwrap();
    assert_eq!(paid.len(), 2);
    let none = invoices.list_invoices(InvoiceQuery::default().paid_in(april)).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_agent_admin_and_customer_search() {
    let db = seeded().await;
    let party = PostgresPartyAdapter::new(db.pool().clone());

    let blocked = party
        .list_agents(AgentQuery::by_classification(AgentClassification::Blocked))
        .await
        .unwrap();
    assert_eq!(blocked.len(), 1);

    let agent = party
        .update_classification(&IdFixtures::other_agent(), AgentClassification::Outsource)
        .await
        .unwrap();
    assert_eq!(agent.classification, AgentClassification::Outsource);

    // The literal % must not act as a wildcard
    let found = party
        .search_customers(CustomerQuery {
            text: "50%".to_string(),
            limit: 10,
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);

    let missing = party.get_agent(&AgentId::new("nobody")).await;
    assert!(matches!(missing, Err(PortError::NotFound { .. })));
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_report_upsert_keeps_payment_status() {
    let db = seeded().await;
    let pool = db.pool().clone();
    let invoices = Arc::new(PostgresInvoiceAdapter::new(pool.clone()));
    let commissions = Arc::new(PostgresCommissionAdapter::new(pool.clone()));
    let agents = Arc::new(PostgresPartyAdapter::new(pool));
    let tz = TemporalFixtures::timezone();

    BillingService::new(invoices.clone(), tz)
        .refresh_payment_dates()
        .await
        .unwrap();
    let service = CommissionService::new(
        CommissionCalculator::new(invoices, ScheduleFixtures::standard(), tz),
        commissions.clone(),
        agents,
    );
    let agent = IdFixtures::agent();
    let month = TemporalFixtures::march();

    let first = service.generate_commission_report(&agent, month, TEST_ACTOR).await.unwrap();
    service.mark_report_paid(&first.id, TEST_ACTOR).await.unwrap();

    service
        .create_adjustment(
            NewAdjustment {
                agent_id: agent.clone(),
                month,
                amount: dec!(-25),
                description: "clawback".to_string(),
            },
            TEST_ACTOR,
        )
        .await
        .unwrap();
    let second = service.generate_commission_report(&agent, month, TEST_ACTOR).await.unwrap();

    assert_eq!(second.id, first.id);
    assert!(second.is_paid);
    assert_eq!(second.total_adjustments, dec!(-25));
    assert_eq!(second.final_total_commission, first.final_total_commission - dec!(25));

    let again = commissions.mark_report_paid(&first.id, TEST_ACTOR, Utc::now()).await;
    assert!(matches!(again, Err(PortError::Conflict { .. })));

    let listed = commissions
        .list_reports(ReportQuery {
            is_paid: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
}
