//! Custom Test Assertions
//!
//! Assertion helpers for commission results that print the offending record
//! instead of a bare `left != right`.

use rust_decimal::Decimal;

use core_kernel::InvoiceId;
use domain_commission::{CommissionReport, GeneratedCommissionReport};

/// Asserts that a monetary amount has at most two decimal places
pub fn assert_two_decimals(amount: Decimal) {
    assert_eq!(
        amount.round_dp(2),
        amount,
        "Expected an amount rounded to 2 decimal places, got {}",
        amount
    );
}

/// Asserts basic, bonus and total commission of one report
pub fn assert_commission_totals(
    report: &CommissionReport,
    basic: Decimal,
    bonus: Decimal,
    total: Decimal,
) {
    assert_eq!(
        (report.total_basic_commission, report.total_bonus_commission, report.total_commission),
        (basic, bonus, total),
        "Commission totals mismatch for agent {} in {}",
        report.agent_id,
        report.month
    );
}

/// Asserts that every invoice line and report total is internally consistent
pub fn assert_commission_consistent(report: &CommissionReport) {
    for line in &report.invoices {
        assert_eq!(
            line.total_commission,
            line.basic_commission + line.bonus_commission,
            "Invoice {} total is not basic + bonus",
            line.invoice_id
        );
        assert_two_decimals(line.basic_commission);
        assert_two_decimals(line.bonus_commission);
    }

    let basic: Decimal = report.invoices.iter().map(|l| l.basic_commission).sum();
    let bonus: Decimal = report.invoices.iter().map(|l| l.bonus_commission).sum();
    assert_eq!(report.total_basic_commission, basic, "Basic total is not the sum of lines");
    assert_eq!(report.total_bonus_commission, bonus, "Bonus total is not the sum of lines");
    assert_eq!(
        report.total_commission,
        basic + bonus,
        "Report total is not basic + bonus"
    );
}

/// Asserts that a generated report's final total adds up
pub fn assert_final_total(report: &GeneratedCommissionReport) {
    assert_eq!(
        report.final_total_commission,
        report.total_basic_commission + report.total_bonus_commission + report.total_adjustments,
        "Report {} final total does not add up",
        report.id
    );
}

/// Asserts that a report covers exactly the given invoices
pub fn assert_covers_invoices(report: &CommissionReport, expected: &[&str]) {
    let mut actual: Vec<InvoiceId> = report.invoice_ids();
    actual.sort();
    let mut expected: Vec<InvoiceId> = expected.iter().map(|id| InvoiceId::new(*id)).collect();
    expected.sort();
    assert_eq!(
        actual, expected,
        "Report for agent {} covers unexpected invoices",
        report.agent_id
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_two_decimals_accepts_rounded() {
        assert_two_decimals(dec!(450.25));
    }

    #[test]
    #[should_panic(expected = "rounded to 2 decimal places")]
    fn test_two_decimals_rejects_unrounded() {
        assert_two_decimals(dec!(1.005));
    }
}
