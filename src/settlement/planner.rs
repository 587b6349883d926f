//! Settlement planning: greedy largest-first debtor/creditor matching

use bigdecimal::BigDecimal;

use crate::types::*;
use crate::utils::money;

/// A member's outstanding amount while the plan is being built
struct Position<'a> {
    ledger: &'a MemberLedger,
    remaining: BigDecimal,
}

/// Compute transfers that bring every net balance to zero.
///
/// Debtors are taken most-negative first and matched against creditors
/// largest-positive first; ties keep the input order. Each step moves
/// `min(remaining debt, remaining credit)`, so the plan has at most `k - 1`
/// transfers for `k` members with a nonzero balance. It is not guaranteed to be
/// the minimum number of transfers.
///
/// Remaining amounts are tracked exactly. If debts and credits do not add up
/// (an upstream invariant violation) the residual is simply left unmatched.
pub fn plan_settlements(ledgers: &[MemberLedger], scale: i64) -> Vec<Transfer> {
    let zero = BigDecimal::from(0);

    let mut debtors: Vec<Position> = ledgers
        .iter()
        .filter(|l| l.net_balance < zero)
        .map(|ledger| Position {
            ledger,
            remaining: ledger.net_balance.abs(),
        })
        .collect();
    let mut creditors: Vec<Position> = ledgers
        .iter()
        .filter(|l| l.net_balance > zero)
        .map(|ledger| Position {
            ledger,
            remaining: ledger.net_balance.clone(),
        })
        .collect();

    // sort_by is stable
    debtors.sort_by(|a, b| b.remaining.cmp(&a.remaining));
    creditors.sort_by(|a, b| b.remaining.cmp(&a.remaining));

    let mut transfers = Vec::new();

    for debtor in debtors.iter_mut() {
        for creditor in creditors.iter_mut() {
            if debtor.remaining <= zero {
                break;
            }
            if creditor.remaining <= zero {
                continue;
            }

            let amount = debtor.remaining.clone().min(creditor.remaining.clone());
            if amount > zero {
                debtor.remaining -= &amount;
                creditor.remaining -= &amount;
                transfers.push(Transfer {
                    debtor_id: debtor.ledger.member_id.clone(),
                    debtor_name: debtor.ledger.member_name.clone(),
                    creditor_id: creditor.ledger.member_id.clone(),
                    creditor_name: creditor.ledger.member_name.clone(),
                    amount: money::round_money(&amount, scale),
                });
            }
        }
    }

    tracing::debug!(
        members = ledgers.len(),
        transfers = transfers.len(),
        "planned settlements"
    );

    transfers
}

/// Apply transfers to the ledgers' net balances and return what is left per member.
///
/// The debtor's balance rises by the amount, the creditor's falls by it. Members
/// keep their input order; transfers naming unknown members are ignored.
pub fn apply_transfers(ledgers: &[MemberLedger], transfers: &[Transfer]) -> Vec<(String, BigDecimal)> {
    let mut balances: Vec<(String, BigDecimal)> = ledgers
        .iter()
        .map(|l| (l.member_id.clone(), l.net_balance.clone()))
        .collect();

    for transfer in transfers {
        if let Some((_, balance)) = balances.iter_mut().find(|(id, _)| *id == transfer.debtor_id) {
            *balance += &transfer.amount;
        }
        if let Some((_, balance)) = balances
            .iter_mut()
            .find(|(id, _)| *id == transfer.creditor_id)
        {
            *balance -= &transfer.amount;
        }
    }

    balances
}

/// Whether a plan leaves every balance within `tolerance` of zero
pub fn settles_all(ledgers: &[MemberLedger], transfers: &[Transfer], tolerance: &BigDecimal) -> bool {
    apply_transfers(ledgers, transfers)
        .iter()
        .all(|(_, balance)| balance.abs() <= *tolerance)
}
