//! Net balance calculation

use bigdecimal::BigDecimal;
use std::collections::HashSet;

use crate::ledger::aggregator::{LedgerAggregation, LedgerTotals};
use crate::types::*;
use crate::utils::money;

/// Build one [`MemberLedger`] per roster member, in roster order.
///
/// A member id listed more than once gets a single entry at its first position.
///
/// Net balances are taken from the exact totals and only then rounded half-up
/// to `scale`, so a member's net is never the difference of two rounded values.
pub fn calculate_net_balances(
    members: &[Member],
    aggregation: &LedgerAggregation,
    scale: i64,
) -> Vec<MemberLedger> {
    let idle = LedgerTotals::default();
    let mut seen = HashSet::new();

    members
        .iter()
        .filter(|member| seen.insert(member.id.as_str()))
        .map(|member| {
            let totals = aggregation.totals_for(&member.id).unwrap_or(&idle);
            member_ledger(member, totals, scale)
        })
        .collect()
}

/// Present exact totals as a rounded ledger entry
pub fn member_ledger(member: &Member, totals: &LedgerTotals, scale: i64) -> MemberLedger {
    MemberLedger {
        member_id: member.id.clone(),
        member_name: member.name.clone(),
        total_paid: money::round_money(&totals.total_paid, scale),
        total_owed: money::round_money(&totals.total_owed, scale),
        net_balance: money::round_money(&totals.net(), scale),
    }
}

/// Sum of every net balance; zero for a consistent closed member set
pub fn net_balance_total(ledgers: &[MemberLedger]) -> BigDecimal {
    ledgers.iter().map(|l| &l.net_balance).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::aggregator::aggregate;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn expense(id: &str, payer: &str, amount: &str) -> ExpenseRecord {
        ExpenseRecord {
            id: id.to_string(),
            group_id: "g".to_string(),
            payer_id: payer.to_string(),
            amount: dec(amount),
            description: String::new(),
            split_type: SplitType::ExactAmount,
            expense_date: chrono::Utc::now().naive_utc(),
        }
    }

    #[test]
    fn test_net_balances_follow_roster_order() {
        let members = vec![Member::new("b", "Bob"), Member::new("a", "Alice")];
        let expenses = vec![expense("e1", "a", "50.00")];
        let splits = vec![
            SplitEntry::new("e1", "a", dec("25.00")),
            SplitEntry::new("e1", "b", dec("25.00")),
        ];

        let aggregation = aggregate(&members, &expenses, &splits, 2);
        let ledgers = calculate_net_balances(&members, &aggregation, 2);

        assert_eq!(ledgers[0].member_id, "b");
        assert_eq!(ledgers[0].net_balance, dec("-25.00"));
        assert_eq!(ledgers[1].member_id, "a");
        assert_eq!(ledgers[1].member_name, "Alice");
        assert_eq!(ledgers[1].total_paid, dec("50.00"));
        assert_eq!(ledgers[1].total_owed, dec("25.00"));
        assert_eq!(ledgers[1].net_balance, dec("25.00"));
        assert_eq!(net_balance_total(&ledgers), dec("0"));
    }

    #[test]
    fn test_net_uses_exact_totals_before_rounding() {
        let member = Member::new("a", "Alice");
        let totals = LedgerTotals {
            total_paid: dec("10.004"),
            total_owed: dec("5.005"),
        };

        let ledger = member_ledger(&member, &totals, 2);

        assert_eq!(ledger.total_paid, dec("10.00"));
        assert_eq!(ledger.total_owed, dec("5.01"));
        // 4.999 rounds to 5.00, not 10.00 - 5.01 = 4.99
        assert_eq!(ledger.net_balance, dec("5.00"));
    }

    #[test]
    fn test_repeated_roster_id_gets_one_ledger() {
        let members = vec![
            Member::new("a", "Alice"),
            Member::new("b", "Bob"),
            Member::new("a", "Alice"),
        ];
        let expenses = vec![expense("e1", "a", "20.00")];
        let splits = vec![
            SplitEntry::new("e1", "a", dec("10.00")),
            SplitEntry::new("e1", "b", dec("10.00")),
        ];

        let aggregation = aggregate(&members, &expenses, &splits, 2);
        let ledgers = calculate_net_balances(&members, &aggregation, 2);

        let ids: Vec<&str> = ledgers.iter().map(|l| l.member_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(net_balance_total(&ledgers), dec("0"));
    }

    #[test]
    fn test_member_missing_from_aggregation_is_zero() {
        let members = vec![Member::new("a", "Alice")];
        let ledgers = calculate_net_balances(&members, &LedgerAggregation::default(), 2);

        assert_eq!(ledgers.len(), 1);
        assert_eq!(ledgers[0].total_paid, dec("0"));
        assert_eq!(ledgers[0].net_balance, dec("0"));
    }
}
