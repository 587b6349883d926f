//! Group settlement example

use bigdecimal::BigDecimal;
use shared_expense_core::{
    BalanceConfig, BalanceService, ExpenseBuilder, Group, Member, MemoryExpenseSource,
    RecordedSettlement,
};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("Shared Expense Core - Group Settlement Example\n");

    let config = BalanceConfig::from_json(r#"{"scale": 2, "remainder_policy": "first_participants"}"#)?;
    let allocator = config.allocator();

    // 1. Members and a group
    let source = MemoryExpenseSource::new();
    for (id, name) in [("alice", "Alice"), ("bob", "Bob"), ("carol", "Carol"), ("dan", "Dan")] {
        source.add_member(Member::new(id, name))?;
    }
    source.create_group(
        Group::new("lisbon", "Lisbon trip"),
        ["alice", "bob", "carol", "dan"],
    )?;

    // 2. Expenses
    let (expense, splits) = ExpenseBuilder::new("lisbon", "alice", BigDecimal::from_str("240.00")?)
        .description("Apartment")
        .split_equally(["alice", "bob", "carol", "dan"])
        .build(&allocator)?;
    source.record_expense(expense, splits)?;

    let (expense, splits) = ExpenseBuilder::new("lisbon", "bob", BigDecimal::from_str("100.00")?)
        .description("Dinner")
        .split_equally(["alice", "bob", "carol"])
        .build(&allocator)?;
    source.record_expense(expense, splits)?;

    let (expense, splits) = ExpenseBuilder::new("lisbon", "carol", BigDecimal::from_str("60.00")?)
        .description("Museum tickets")
        .split_by_percentage(vec![
            ("carol".to_string(), BigDecimal::from(50)),
            ("dan".to_string(), BigDecimal::from(50)),
        ])
        .build(&allocator)?;
    source.record_expense(expense, splits)?;

    let service = BalanceService::with_config(source.clone(), config)?;

    // 3. Balances
    let snapshot = service.group_snapshot("lisbon").await?;
    println!("{} (total spent: {})", snapshot.group_name, snapshot.total_expenses);
    for ledger in &snapshot.member_ledgers {
        println!(
            "  {:<6} paid {:>7}  owes {:>7}  net {:>7}",
            ledger.member_name, ledger.total_paid, ledger.total_owed, ledger.net_balance
        );
    }

    // 4. Suggested settlements
    println!("\nSuggested transfers:");
    for transfer in &snapshot.transfers {
        println!(
            "  {} pays {} {}",
            transfer.debtor_name, transfer.creditor_name, transfer.amount
        );
    }

    // 5. Member views
    let debts = service.member_debts("dan").await?;
    for debt in &debts {
        println!("\nDan's share in {}: {}", debt.group_name, debt.amount);
    }

    let overview = service.member_overview("bob").await?;
    println!(
        "Bob: {} group(s), share {}, net {}",
        overview.active_groups, overview.total_share, overview.net_balance
    );

    // 6. Record a payment
    if let Some(first) = snapshot.transfers.first() {
        source.record_settlement(RecordedSettlement::new(
            "lisbon",
            first.debtor_id.clone(),
            first.creditor_id.clone(),
            first.amount.clone(),
        ))?;
    }
    let summary = service.settlement_summary("lisbon").await?;
    println!(
        "\nRecorded {} settlement(s) totalling {}",
        summary.settlement_count, summary.total_settled
    );

    println!("\n{}", serde_json::to_string_pretty(&snapshot)?);

    Ok(())
}
