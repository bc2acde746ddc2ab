//! ANP aggregation
//!
//! Achieved monthly ANP is the sum of invoice amounts over all invoices of one
//! agent whose first payment falls in the same business month. Every invoice
//! in the group carries the same value, so the stored field is only correct
//! once the whole group has been summed and written together. An invoice that
//! no longer belongs to any group (fully refunded, agent removed) holds no ANP.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use core_kernel::{AgentId, BusinessTimezone, InvoiceId, Month, RecordError};
use domain_billing::{AnpCandidate, InvoicePort, StoredAnp};

use crate::error::CommissionError;

/// Agent and first-payment month shared by a group of invoices
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnpGroupKey {
    pub agent_id: AgentId,
    pub month: Month,
}

impl std::fmt::Display for AnpGroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.agent_id, self.month)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnpGroup {
    pub key: AnpGroupKey,
    /// Sorted invoice ids
    pub invoice_ids: Vec<InvoiceId>,
    pub anp: Decimal,
}

/// Candidates partitioned into groups plus those that could not be grouped
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnpGrouping {
    /// Ordered by agent, then month
    pub groups: Vec<AnpGroup>,
    pub rejected: Vec<RecordError>,
}

/// Groups ANP candidates by agent and business month of first payment
///
/// Invoices without an agent or with a negative amount are rejected. The
/// result depends only on the candidate set, not on its order.
pub fn group_candidates(candidates: &[AnpCandidate], timezone: BusinessTimezone) -> AnpGrouping {
    let mut buckets: BTreeMap<AnpGroupKey, (BTreeSet<InvoiceId>, Decimal)> = BTreeMap::new();
    let mut rejected = Vec::new();

    for candidate in candidates {
        let Some(agent_id) = candidate.agent_id.clone() else {
            rejected.push(RecordError::new(&candidate.invoice_id, "invoice has no agent"));
            continue;
        };
        if candidate.amount < Decimal::ZERO {
            rejected.push(RecordError::new(
                &candidate.invoice_id,
                format!("invoice amount {} is negative", candidate.amount),
            ));
            continue;
        }

        let key = AnpGroupKey {
            agent_id,
            month: timezone.month_of(candidate.first_payment_date),
        };
        let bucket = buckets.entry(key).or_default();
        if bucket.0.insert(candidate.invoice_id.clone()) {
            bucket.1 += candidate.amount;
        }
    }

    rejected.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    AnpGrouping {
        groups: buckets
            .into_iter()
            .map(|(key, (ids, anp))| AnpGroup {
                key,
                invoice_ids: ids.into_iter().collect(),
                anp,
            })
            .collect(),
        rejected,
    }
}

/// Outcome of an ANP recomputation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnpRecomputeResult {
    pub updated_invoices: u64,
    /// Invoices outside every group whose stale ANP was reset to null
    pub cleared_invoices: u64,
    pub total_checked: usize,
    pub processed_agents: usize,
    pub agent_month_combinations: usize,
    pub errors: Vec<RecordError>,
}

/// An invoice whose stored ANP disagrees with its group sum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnpMismatch {
    pub invoice_id: InvoiceId,
    pub agent_id: AgentId,
    pub month: Month,
    pub stored: Option<Decimal>,
    pub expected: Decimal,
}

/// Outcome of an ANP cross-check
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnpVerification {
    pub checked_invoices: usize,
    pub mismatches: Vec<AnpMismatch>,
    /// Invoices outside every group that still store an ANP value
    pub stale: Vec<StoredAnp>,
    pub errors: Vec<RecordError>,
}

/// Recomputes and verifies achieved monthly ANP
#[derive(Clone)]
pub struct AnpAggregator {
    invoices: Arc<dyn InvoicePort>,
    timezone: BusinessTimezone,
}

impl AnpAggregator {
    pub fn new(invoices: Arc<dyn InvoicePort>, timezone: BusinessTimezone) -> Self {
        Self { invoices, timezone }
    }

    /// Recomputes `achieved_monthly_anp` for every paid invoice
    ///
    /// Each group is written in its own transaction. A failed group is
    /// reported and the remaining groups are still written. Afterwards, stored
    /// ANP on invoices that belong to no group is cleared.
    #[instrument(skip(self))]
    pub async fn recompute_anp(&self) -> Result<AnpRecomputeResult, CommissionError> {
        let candidates = self.invoices.anp_candidates().await?;
        let grouping = group_candidates(&candidates, self.timezone);

        let mut result = AnpRecomputeResult {
            total_checked: candidates.len(),
            agent_month_combinations: grouping.groups.len(),
            processed_agents: grouping
                .groups
                .iter()
                .map(|g| &g.key.agent_id)
                .collect::<BTreeSet<_>>()
                .len(),
            errors: grouping.rejected,
            ..Default::default()
        };
        for error in &result.errors {
            warn!(invoice_id = %error.identifier, reason = %error.message, "Invoice skipped");
        }

        for group in &grouping.groups {
            match self.invoices.write_group_anp(&group.invoice_ids, group.anp).await {
                Ok(written) => {
                    debug!(group = %group.key, anp = %group.anp, written, "ANP group written");
                    result.updated_invoices += written;
                }
                Err(e) => {
                    warn!(group = %group.key, error = %e, "Failed to write ANP group");
                    result.errors.push(RecordError::new(&group.key, e.to_string()));
                }
            }
        }

        let stale = self.stale_anp(&grouping.groups).await?;
        if !stale.is_empty() {
            let ids: Vec<InvoiceId> = stale.into_iter().map(|s| s.invoice_id).collect();
            match self.invoices.clear_anp(&ids).await {
                Ok(cleared) => result.cleared_invoices = cleared,
                Err(e) => {
                    warn!(count = ids.len(), error = %e, "Failed to clear stale ANP");
                    result.errors.push(RecordError::new("stale-anp", e.to_string()));
                }
            }
        }

        info!(
            updated = result.updated_invoices,
            cleared = result.cleared_invoices,
            checked = result.total_checked,
            groups = result.agent_month_combinations,
            errors = result.errors.len(),
            "ANP recomputed"
        );
        Ok(result)
    }

    /// Compares stored ANP against freshly computed group sums without writing
    #[instrument(skip(self))]
    pub async fn verify_anp(&self, month: Option<Month>) -> Result<AnpVerification, CommissionError> {
        let candidates = self.invoices.anp_candidates().await?;
        let grouping = group_candidates(&candidates, self.timezone);
        let stored: BTreeMap<&InvoiceId, Option<Decimal>> = candidates
            .iter()
            .map(|c| (&c.invoice_id, c.stored_anp))
            .collect();

        let mut verification = AnpVerification::default();
        for group in grouping
            .groups
            .iter()
            .filter(|g| month.map_or(true, |m| g.key.month == m))
        {
            for invoice_id in &group.invoice_ids {
                verification.checked_invoices += 1;
                let stored = stored.get(invoice_id).copied().flatten();
                if stored != Some(group.anp) {
                    verification.mismatches.push(AnpMismatch {
                        invoice_id: invoice_id.clone(),
                        agent_id: group.key.agent_id.clone(),
                        month: group.key.month,
                        stored,
                        expected: group.anp,
                    });
                }
            }
        }
        if month.is_none() {
            verification.stale = self.stale_anp(&grouping.groups).await?;
            verification.errors = grouping.rejected;
        }

        info!(
            checked = verification.checked_invoices,
            mismatches = verification.mismatches.len(),
            stale = verification.stale.len(),
            "ANP verified"
        );
        Ok(verification)
    }

    async fn stale_anp(&self, groups: &[AnpGroup]) -> Result<Vec<StoredAnp>, CommissionError> {
        let grouped: BTreeSet<&InvoiceId> =
            groups.iter().flat_map(|g| g.invoice_ids.iter()).collect();
        let stored = self.invoices.stored_anp().await?;
        Ok(stored
            .into_iter()
            .filter(|s| !grouped.contains(&s.invoice_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn candidate(id: &str, agent: Option<&str>, amount: Decimal, day: (u32, u32)) -> AnpCandidate {
        AnpCandidate {
            invoice_id: InvoiceId::new(id),
            agent_id: agent.map(AgentId::new),
            amount,
            first_payment_date: Utc.with_ymd_and_hms(2024, day.0, day.1, 5, 0, 0).unwrap(),
            paid_total: amount,
            stored_anp: None,
        }
    }

    #[test]
    fn test_groups_by_agent_and_month() {
        let grouping = group_candidates(
            &[
                candidate("inv-1", Some("a-1"), dec!(100), (3, 1)),
                candidate("inv-2", Some("a-1"), dec!(250), (3, 20)),
                candidate("inv-3", Some("a-1"), dec!(40), (4, 2)),
                candidate("inv-4", Some("a-2"), dec!(70), (3, 5)),
            ],
            BusinessTimezone::default(),
        );

        let sums: Vec<_> = grouping
            .groups
            .iter()
            .map(|g| (g.key.to_string(), g.anp))
            .collect();
        assert_eq!(
            sums,
            vec![
                ("a-1/2024-03".to_string(), dec!(350)),
                ("a-1/2024-04".to_string(), dec!(40)),
                ("a-2/2024-03".to_string(), dec!(70)),
            ]
        );
        assert!(grouping.rejected.is_empty());
    }

    #[test]
    fn test_rejects_missing_agent_and_negative_amount() {
        let grouping = group_candidates(
            &[
                candidate("inv-1", None, dec!(100), (3, 1)),
                candidate("inv-2", Some("a-1"), dec!(-5), (3, 1)),
                candidate("inv-3", Some("a-1"), dec!(10), (3, 1)),
            ],
            BusinessTimezone::default(),
        );

        assert_eq!(grouping.groups.len(), 1);
        assert_eq!(grouping.groups[0].anp, dec!(10));
        let rejected: Vec<_> = grouping.rejected.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(rejected, vec!["inv-1", "inv-2"]);
    }

    #[test]
    fn test_month_boundary_follows_business_timezone() {
        // 2024-02-29 20:00 UTC is 2024-03-01 03:00 in Jakarta
        let mut late = candidate("inv-1", Some("a-1"), dec!(100), (2, 29));
        late.first_payment_date = Utc.with_ymd_and_hms(2024, 2, 29, 20, 0, 0).unwrap();

        let grouping = group_candidates(&[late], BusinessTimezone::default());
        assert_eq!(grouping.groups[0].key.month.to_string(), "2024-03");
    }
}
