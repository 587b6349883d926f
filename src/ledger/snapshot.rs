//! Pure balance computations over materialized group data

use bigdecimal::BigDecimal;

use crate::config::{BalanceConfig, ZeroSumPolicy};
use crate::ledger::aggregator::{aggregate_group, screen_expenses, LedgerAggregation};
use crate::ledger::balance::{calculate_net_balances, net_balance_total};
use crate::settlement::{plan_settlements, settles_all};
use crate::types::*;
use crate::utils::money;

/// Compute the full balance snapshot of a group
///
/// Net balances may miss zero by the split drift the aggregator accepted plus
/// one minor unit of rounding per member; both the zero-sum check and the
/// plan verification allow that much.
pub fn compute_snapshot(data: &GroupData, config: &BalanceConfig) -> BalanceResult<BalanceSnapshot> {
    config.validate()?;
    let aggregation = aggregate_group(data, config.scale);
    let member_ledgers = calculate_net_balances(&data.members, &aggregation, config.scale);

    let tolerance = balance_tolerance(&aggregation, member_ledgers.len(), config.scale);
    check_zero_sum(&data.group.id, &member_ledgers, &tolerance, config)?;

    let transfers = plan_settlements(&member_ledgers, config.scale);
    if !settles_all(&member_ledgers, &transfers, &tolerance) {
        tracing::warn!(
            group_id = %data.group.id,
            "settlement plan leaves balances outstanding"
        );
    }

    tracing::debug!(
        group_id = %data.group.id,
        members = member_ledgers.len(),
        transfers = transfers.len(),
        inconsistencies = aggregation.inconsistencies.len(),
        "computed group snapshot"
    );

    Ok(BalanceSnapshot {
        group_id: data.group.id.clone(),
        group_name: data.group.name.clone(),
        total_expenses: money::round_money(&data.total_expenses(), config.scale),
        member_ledgers,
        transfers,
        inconsistencies: aggregation.inconsistencies,
    })
}

/// Net balance of one roster member, computed straight from the group's expenses.
///
/// Applies the same exclusions as the aggregator, so the result always equals
/// the member's entry in [`compute_snapshot`].
pub fn member_net_balance(
    data: &GroupData,
    member_id: &str,
    config: &BalanceConfig,
) -> BalanceResult<BigDecimal> {
    config.validate()?;
    let member = data
        .member(member_id)
        .ok_or_else(|| BalanceError::MemberNotFound(member_id.to_string()))?;
    let screen = screen_expenses(&data.expenses, &data.splits, config.scale);

    let paid: BigDecimal = data
        .expenses
        .iter()
        .filter(|e| e.payer_id == member.id && screen.includes(&e.id))
        .map(|e| &e.amount)
        .sum();
    let owed: BigDecimal = data
        .splits
        .iter()
        .filter(|s| s.member_id == member.id && screen.includes(&s.expense_id))
        .map(|s| &s.amount_owed)
        .sum();

    Ok(money::round_money(&(paid - owed), config.scale))
}

fn balance_tolerance(aggregation: &LedgerAggregation, member_count: usize, scale: i64) -> BigDecimal {
    aggregation.drift_tolerance() + money::rounding_tolerance(scale, member_count)
}

fn check_zero_sum(
    group_id: &str,
    ledgers: &[MemberLedger],
    tolerance: &BigDecimal,
    config: &BalanceConfig,
) -> BalanceResult<()> {
    let residual = net_balance_total(ledgers);
    if residual.abs() <= *tolerance {
        return Ok(());
    }

    match config.zero_sum_policy {
        ZeroSumPolicy::Tolerate => {
            tracing::warn!(
                group_id,
                residual = %residual,
                "net balances do not sum to zero, planning best-effort settlements"
            );
            Ok(())
        }
        ZeroSumPolicy::Reject => Err(BalanceError::UnbalancedLedger { residual }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::{ExpenseBuilder, RemainderPolicy};
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn trip() -> GroupData {
        let mut data = GroupData::new(Group::new("trip", "Weekend trip"));
        data.members = vec![
            Member::new("a", "Alice"),
            Member::new("b", "Bob"),
            Member::new("c", "Carol"),
        ];
        data
    }

    fn add_equal(data: &mut GroupData, id: &str, payer: &str, amount: &str, config: &BalanceConfig) {
        let participants: Vec<String> = data.members.iter().map(|m| m.id.clone()).collect();
        let (expense, splits) = ExpenseBuilder::new(data.group.id.clone(), payer, dec(amount))
            .id(id)
            .split_equally(participants)
            .build(&config.allocator())
            .unwrap();
        data.expenses.push(expense);
        data.splits.extend(splits);
    }

    #[test]
    fn test_worked_example() {
        let config = BalanceConfig::default();
        let mut data = trip();
        add_equal(&mut data, "e1", "a", "90.00", &config);

        let snapshot = compute_snapshot(&data, &config).unwrap();

        assert_eq!(snapshot.group_name, "Weekend trip");
        assert_eq!(snapshot.total_expenses, dec("90.00"));
        let alice = snapshot.ledger_for("a").unwrap();
        assert_eq!(
            (alice.total_paid.clone(), alice.total_owed.clone(), alice.net_balance.clone()),
            (dec("90.00"), dec("30.00"), dec("60.00"))
        );
        assert_eq!(snapshot.ledger_for("b").unwrap().net_balance, dec("-30.00"));
        assert_eq!(snapshot.ledger_for("c").unwrap().net_balance, dec("-30.00"));

        assert_eq!(snapshot.transfers.len(), 2);
        assert_eq!(snapshot.transfers[0].debtor_id, "b");
        assert_eq!(snapshot.transfers[0].creditor_id, "a");
        assert_eq!(snapshot.transfers[0].amount, dec("30.00"));
        assert_eq!(snapshot.transfers[1].debtor_id, "c");
        assert_eq!(snapshot.transfers[1].amount, dec("30.00"));
    }

    #[test]
    fn test_empty_group() {
        let snapshot = compute_snapshot(&trip(), &BalanceConfig::default()).unwrap();

        assert_eq!(snapshot.total_expenses, dec("0"));
        assert_eq!(snapshot.member_ledgers.len(), 3);
        for ledger in &snapshot.member_ledgers {
            assert_eq!(ledger.total_paid, dec("0"));
            assert_eq!(ledger.total_owed, dec("0"));
            assert_eq!(ledger.net_balance, dec("0"));
        }
        assert!(snapshot.transfers.is_empty());
        assert!(snapshot.inconsistencies.is_empty());
    }

    #[test]
    fn test_member_net_balance_matches_snapshot() {
        let config = BalanceConfig::default();
        let mut data = trip();
        add_equal(&mut data, "e1", "a", "100.00", &config);
        add_equal(&mut data, "e2", "b", "45.50", &config);
        add_equal(&mut data, "e3", "c", "0.10", &config);

        let snapshot = compute_snapshot(&data, &config).unwrap();
        for ledger in &snapshot.member_ledgers {
            let direct = member_net_balance(&data, &ledger.member_id, &config).unwrap();
            assert_eq!(direct, ledger.net_balance);
        }
    }

    #[test]
    fn test_member_net_balance_unknown_member() {
        let result = member_net_balance(&trip(), "zed", &BalanceConfig::default());
        assert!(matches!(result, Err(BalanceError::MemberNotFound(id)) if id == "zed"));
    }

    #[test]
    fn test_unreconciled_remainder_is_tolerated() {
        let config = BalanceConfig {
            remainder_policy: RemainderPolicy::Unreconciled,
            zero_sum_policy: ZeroSumPolicy::Reject,
            ..BalanceConfig::default()
        };
        let mut data = trip();
        add_equal(&mut data, "e1", "a", "100.00", &config);

        let snapshot = compute_snapshot(&data, &config).unwrap();

        // 3 x 33.33 owed against 100.00 paid leaves 0.01 unmatched
        assert_eq!(snapshot.ledger_for("a").unwrap().net_balance, dec("66.67"));
        let transferred: BigDecimal = snapshot.transfers.iter().map(|t| &t.amount).sum();
        assert_eq!(transferred, dec("66.66"));
    }

    #[test]
    fn test_reject_policy_fails_unbalanced_group() {
        let config = BalanceConfig {
            zero_sum_policy: ZeroSumPolicy::Reject,
            ..BalanceConfig::default()
        };
        let mut data = trip();
        add_equal(&mut data, "e1", "a", "90.00", &config);
        // Carol left the group; her split can no longer be attributed
        data.members.retain(|m| m.id != "c");

        let result = compute_snapshot(&data, &config);
        assert!(matches!(result, Err(BalanceError::UnbalancedLedger { .. })));

        let tolerated = compute_snapshot(&data, &BalanceConfig::default()).unwrap();
        assert_eq!(tolerated.inconsistencies.len(), 1);
        assert_eq!(tolerated.transfers.len(), 1);
    }

    #[test]
    fn test_split_drift_accumulates_across_expenses() {
        let config = BalanceConfig {
            remainder_policy: RemainderPolicy::Unreconciled,
            zero_sum_policy: ZeroSumPolicy::Reject,
            ..BalanceConfig::default()
        };
        let mut data = trip();
        for id in ["e1", "e2", "e3", "e4"] {
            add_equal(&mut data, id, "a", "100.00", &config);
        }

        let snapshot = compute_snapshot(&data, &config).unwrap();

        // each expense leaves 0.01 behind, 0.04 in total
        assert_eq!(snapshot.ledger_for("a").unwrap().net_balance, dec("266.68"));
        assert_eq!(snapshot.ledger_for("b").unwrap().net_balance, dec("-133.32"));
        assert_eq!(snapshot.transfers.len(), 2);
        assert!(snapshot.transfers.iter().all(|t| t.amount == dec("133.32")));
        assert!(snapshot.inconsistencies.is_empty());
    }

    #[test]
    fn test_invalid_scale_is_rejected() {
        let config = BalanceConfig {
            scale: -1,
            ..BalanceConfig::default()
        };

        assert!(matches!(
            compute_snapshot(&trip(), &config),
            Err(BalanceError::Config(_))
        ));
        assert!(matches!(
            member_net_balance(&trip(), "a", &config),
            Err(BalanceError::Config(_))
        ));
    }
}
