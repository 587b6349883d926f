//! Summaries of settle-up payments that were actually made

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Totals of recorded settlements within one group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementSummary {
    pub group_id: String,
    pub settlement_count: usize,
    pub total_settled: BigDecimal,
}

/// What one member has paid and received through recorded settlements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSettlementTotals {
    pub member_id: String,
    /// Paid to others as debtor
    pub total_paid: BigDecimal,
    /// Received from others as creditor
    pub total_received: BigDecimal,
}

impl MemberSettlementTotals {
    /// Received minus paid
    pub fn net_received(&self) -> BigDecimal {
        &self.total_received - &self.total_paid
    }
}

/// Summarize the settlements recorded for a group
pub fn summarize_group(group_id: &str, settlements: &[RecordedSettlement]) -> SettlementSummary {
    let in_group: Vec<&RecordedSettlement> = settlements
        .iter()
        .filter(|s| s.group_id == group_id)
        .collect();

    SettlementSummary {
        group_id: group_id.to_string(),
        settlement_count: in_group.len(),
        total_settled: in_group.iter().map(|s| &s.amount).sum(),
    }
}

/// Total paid and received by a member across the given settlements
pub fn member_totals(member_id: &str, settlements: &[RecordedSettlement]) -> MemberSettlementTotals {
    MemberSettlementTotals {
        member_id: member_id.to_string(),
        total_paid: settlements
            .iter()
            .filter(|s| s.debtor_id == member_id)
            .map(|s| &s.amount)
            .sum(),
        total_received: settlements
            .iter()
            .filter(|s| s.creditor_id == member_id)
            .map(|s| &s.amount)
            .sum(),
    }
}

/// Recorded settlements, most recent first
pub fn most_recent_first(settlements: &[RecordedSettlement]) -> Vec<RecordedSettlement> {
    let mut sorted = settlements.to_vec();
    sorted.sort_by(|a, b| b.settled_at.cmp(&a.settled_at));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn settlement(group: &str, debtor: &str, creditor: &str, amount: i64, day: u32) -> RecordedSettlement {
        let mut s = RecordedSettlement::new(group, debtor, creditor, BigDecimal::from(amount));
        s.settled_at = NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        s
    }

    #[test]
    fn test_group_summary() {
        let settlements = vec![
            settlement("trip", "b", "a", 30, 1),
            settlement("trip", "c", "a", 20, 2),
            settlement("flat", "a", "b", 99, 3),
        ];

        let summary = summarize_group("trip", &settlements);

        assert_eq!(summary.settlement_count, 2);
        assert_eq!(summary.total_settled, BigDecimal::from(50));
    }

    #[test]
    fn test_member_totals() {
        let settlements = vec![
            settlement("trip", "b", "a", 30, 1),
            settlement("flat", "a", "b", 10, 2),
        ];

        let totals = member_totals("a", &settlements);

        assert_eq!(totals.total_received, BigDecimal::from(30));
        assert_eq!(totals.total_paid, BigDecimal::from(10));
        assert_eq!(totals.net_received(), BigDecimal::from(20));
    }

    #[test]
    fn test_most_recent_first() {
        let settlements = vec![
            settlement("trip", "b", "a", 1, 1),
            settlement("trip", "b", "a", 3, 3),
            settlement("trip", "b", "a", 2, 2),
        ];

        let sorted = most_recent_first(&settlements);
        let amounts: Vec<BigDecimal> = sorted.iter().map(|s| s.amount.clone()).collect();

        assert_eq!(
            amounts,
            vec![BigDecimal::from(3), BigDecimal::from(2), BigDecimal::from(1)]
        );
    }
}
