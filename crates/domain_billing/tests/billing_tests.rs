//! Tests for invoice tracking and payment settlement

use std::sync::Arc;

use chrono::{DateTime, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AgentId, InvoiceId};
use domain_billing::{
    BillingError, BillingService, InvoiceFilter, MockInvoicePort, Payment, PaymentSettlement,
};
use test_utils::{
    amount_strategy, payment_sequence_strategy, InvoiceBuilder, PaymentBuilder, TemporalFixtures,
};

fn at(month: u32, day: u32) -> DateTime<Utc> {
    TemporalFixtures::business_day(month, day)
}

fn payment(id: &str, invoice: &str, amount: Decimal, month: u32, day: u32) -> Payment {
    PaymentBuilder::new(id, invoice, amount).on(at(month, day)).build()
}

fn service(port: &MockInvoicePort) -> BillingService {
    BillingService::new(Arc::new(port.clone()), TemporalFixtures::timezone())
}

// ============================================================================
// Invoice Detail Tests
// ============================================================================

mod detail_tests {
    use super::*;

    #[tokio::test]
    async fn test_detail_includes_settlement() {
        let port = MockInvoicePort::with_invoices(vec![InvoiceBuilder::new("inv-1").build()]).await;
        port.insert_payment(payment("p-1", "inv-1", dec!(250), 3, 1)).await;

        let detail = service(&port).get_invoice_detail(&InvoiceId::new("inv-1")).await.unwrap();

        assert_eq!(detail.payments.len(), 1);
        assert_eq!(detail.settlement.paid_total, dec!(250));
        assert_eq!(detail.settlement.outstanding, dec!(750));
        assert!(!detail.settlement.is_fully_paid());
    }

    #[tokio::test]
    async fn test_detail_unknown_invoice() {
        let port = MockInvoicePort::new();
        let result = service(&port).get_invoice_detail(&InvoiceId::new("nope")).await;
        assert!(matches!(result, Err(BillingError::InvoiceNotFound(id)) if id == "nope"));
    }
}

// ============================================================================
// Listing Tests
// ============================================================================

mod listing_tests {
    use super::*;

    #[tokio::test]
    async fn test_list_filters_by_agent_and_paid_month() {
        let march = InvoiceBuilder::new("inv-1").agent("a-1").paid(at(3, 15)).build();
        let april = InvoiceBuilder::new("inv-2").agent("a-1").paid(at(4, 2)).build();
        let other = InvoiceBuilder::new("inv-3").agent("a-2").build();

        let port = MockInvoicePort::with_invoices(vec![march, april, other]).await;
        let invoices = service(&port)
            .list_invoices(InvoiceFilter {
                agent_id: Some(AgentId::new("a-1")),
                paid_in: Some(TemporalFixtures::march()),
                ..Default::default()
            })
            .await
            .unwrap();

        let ids: Vec<_> = invoices.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["inv-1"]);
    }

    #[tokio::test]
    async fn test_paid_month_uses_business_timezone() {
        let invoice = InvoiceBuilder::new("inv-1")
            .paid(TemporalFixtures::utc_march_jakarta_april())
            .build();

        let port = MockInvoicePort::with_invoices(vec![invoice]).await;
        let service = service(&port);

        let march = service
            .list_invoices(InvoiceFilter {
                paid_in: Some(TemporalFixtures::march()),
                ..Default::default()
            })
            .await
            .unwrap();
        let april = service
            .list_invoices(InvoiceFilter {
                paid_in: Some(TemporalFixtures::april()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(march.is_empty());
        assert_eq!(april.len(), 1);
    }
}

// ============================================================================
// Payment Date Refresh Tests
// ============================================================================

mod refresh_tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_updates_stale_invoices_only() {
        let current = InvoiceBuilder::new("inv-1").amount(dec!(100)).paid(at(3, 1)).build();
        let stale = InvoiceBuilder::new("inv-2").amount(dec!(300)).build();

        let port = MockInvoicePort::with_invoices(vec![current, stale]).await;
        port.insert_payment(payment("p-1", "inv-1", dec!(100), 3, 1)).await;
        port.insert_payment(payment("p-2", "inv-2", dec!(100), 3, 2)).await;
        port.insert_payment(payment("p-3", "inv-2", dec!(200), 3, 9)).await;

        let result = service(&port).refresh_payment_dates().await.unwrap();

        assert_eq!(result.checked, 2);
        assert_eq!(result.updated, 1);
        assert!(result.errors.is_empty());

        let refreshed = port.invoice(&InvoiceId::new("inv-2")).await.unwrap();
        assert_eq!(refreshed.first_payment_date, Some(at(3, 2)));
        assert_eq!(refreshed.full_payment_date, Some(at(3, 9)));
    }

    #[tokio::test]
    async fn test_refresh_continues_after_failed_write() {
        let port = MockInvoicePort::with_invoices(vec![
            InvoiceBuilder::new("inv-1").amount(dec!(100)).build(),
            InvoiceBuilder::new("inv-2").amount(dec!(100)).build(),
        ])
        .await;
        port.insert_payment(payment("p-1", "inv-1", dec!(100), 3, 1)).await;
        port.insert_payment(payment("p-2", "inv-2", dec!(100), 3, 1)).await;
        port.fail_writes_for(InvoiceId::new("inv-1")).await;

        let result = service(&port).refresh_payment_dates().await.unwrap();

        assert_eq!(result.updated, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].identifier, "inv-1");
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let port = MockInvoicePort::with_invoices(vec![InvoiceBuilder::new("inv-1").amount(dec!(100)).build()]).await;
        port.insert_payment(payment("p-1", "inv-1", dec!(100), 3, 1)).await;
        let service = service(&port);

        service.refresh_payment_dates().await.unwrap();
        let second = service.refresh_payment_dates().await.unwrap();

        assert_eq!(second.updated, 0);
    }
}

// ============================================================================
// Settlement Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_full_payment_date_is_last_threshold_crossing(
        amount in amount_strategy(),
        sequence in payment_sequence_strategy(),
    ) {
        let payments: Vec<Payment> = sequence
            .iter()
            .enumerate()
            .map(|(i, (value, date))| PaymentBuilder::new(format!("p-{i}"), "inv-1", *value).on(*date).build())
            .collect();

        let mut replay: Vec<&Payment> = payments.iter().collect();
        replay.sort_by_key(|p| (p.payment_date, p.id.clone()));
        let mut running = Decimal::ZERO;
        let mut last_crossing = None;
        for p in &replay {
            let before = running;
            running += p.amount;
            if before < amount && running >= amount {
                last_crossing = Some(p.payment_date);
            }
        }

        let settlement = PaymentSettlement::evaluate(amount, &payments);

        prop_assert_eq!(settlement.paid_total, running);
        prop_assert_eq!(settlement.is_fully_paid(), running >= amount);
        if running >= amount {
            prop_assert_eq!(settlement.full_payment_date, last_crossing);
            prop_assert_eq!(settlement.outstanding, Decimal::ZERO);
        } else {
            prop_assert_eq!(settlement.outstanding, amount - running);
        }
        prop_assert_eq!(
            settlement.first_payment_date,
            replay.iter().find(|p| p.amount > Decimal::ZERO).map(|p| p.payment_date)
        );
    }
}
