//! Balance query service that coordinates the data source and the pure calculators

use bigdecimal::BigDecimal;

use crate::config::BalanceConfig;
use crate::ledger::snapshot::{compute_snapshot, member_net_balance};
use crate::settlement::{self, MemberSettlementTotals, SettlementSummary};
use crate::traits::*;
use crate::types::*;
use crate::utils::money;

/// Read-only entry point for group and member balance queries
///
/// Every query reads what it needs from the [`ExpenseSource`] and derives the
/// result from scratch; nothing is cached between calls.
pub struct BalanceService<S: ExpenseSource> {
    source: S,
    config: BalanceConfig,
}

impl<S: ExpenseSource> BalanceService<S> {
    /// Create a service with the default configuration
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: BalanceConfig::default(),
        }
    }

    /// Create a service with a custom configuration, rejecting unusable settings
    pub fn with_config(source: S, config: BalanceConfig) -> BalanceResult<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    /// The underlying data source
    pub fn source(&self) -> &S {
        &self.source
    }

    async fn require_group(&self, group_id: &str) -> BalanceResult<GroupData> {
        self.source
            .load_group(group_id)
            .await?
            .ok_or_else(|| BalanceError::GroupNotFound(group_id.to_string()))
    }

    async fn require_member(&self, member_id: &str) -> BalanceResult<Member> {
        self.source
            .get_member(member_id)
            .await?
            .ok_or_else(|| BalanceError::MemberNotFound(member_id.to_string()))
    }

    /// Full balance snapshot of a group: per-member ledgers plus a settlement plan
    pub async fn group_snapshot(&self, group_id: &str) -> BalanceResult<BalanceSnapshot> {
        let data = self.require_group(group_id).await?;
        tracing::debug!(
            group_id,
            members = data.members.len(),
            expenses = data.expenses.len(),
            "computing group snapshot"
        );
        compute_snapshot(&data, &self.config)
    }

    /// What a member owes in each group, from their splits alone.
    ///
    /// Payments the member made are not subtracted. Groups appear in the order
    /// their first split is seen; groups with no splits are absent.
    pub async fn member_debts(&self, member_id: &str) -> BalanceResult<Vec<MemberDebt>> {
        self.require_member(member_id).await?;
        let splits = self.source.member_splits(member_id).await?;

        let mut debts: Vec<MemberDebt> = Vec::new();
        for record in splits {
            match debts.iter().position(|d| d.group_id == record.group_id) {
                Some(index) => debts[index].amount += &record.split.amount_owed,
                None => debts.push(MemberDebt {
                    member_id: member_id.to_string(),
                    group_id: record.group_id,
                    group_name: record.group_name,
                    amount: record.split.amount_owed,
                }),
            }
        }

        for debt in &mut debts {
            debt.amount = money::round_money(&debt.amount, self.config.scale);
        }
        Ok(debts)
    }

    /// Net balance of one member in one group, consistent with [`Self::group_snapshot`]
    pub async fn member_net_balance_in_group(
        &self,
        member_id: &str,
        group_id: &str,
    ) -> BalanceResult<BigDecimal> {
        let data = self.require_group(group_id).await?;
        member_net_balance(&data, member_id, &self.config)
    }

    /// Net balance of a member in every group they belong to.
    ///
    /// A group whose snapshot fails counts as zero and is listed in
    /// [`MemberGroupBalances::failures`]; the batch itself does not fail.
    pub async fn member_group_balances(&self, member_id: &str) -> BalanceResult<MemberGroupBalances> {
        self.require_member(member_id).await?;
        let groups = self.source.groups_for_member(member_id).await?;

        let mut balances = Vec::with_capacity(groups.len());
        let mut failures = Vec::new();

        for group in groups {
            let net_balance = match self.group_snapshot(&group.id).await {
                Ok(snapshot) => snapshot
                    .ledger_for(member_id)
                    .map(|ledger| ledger.net_balance.clone())
                    .unwrap_or_else(|| BigDecimal::from(0)),
                Err(err) => {
                    tracing::warn!(
                        group_id = %group.id,
                        member_id,
                        error = %err,
                        "group balance failed, counting it as zero"
                    );
                    failures.push(GroupBalanceFailure {
                        group_id: group.id.clone(),
                        group_name: group.name.clone(),
                        reason: err.to_string(),
                    });
                    BigDecimal::from(0)
                }
            };

            balances.push(GroupNetBalance {
                group_id: group.id,
                group_name: group.name,
                net_balance,
            });
        }

        Ok(MemberGroupBalances {
            member_id: member_id.to_string(),
            balances,
            failures,
        })
    }

    /// Dashboard summary of a member across all of their groups
    pub async fn member_overview(&self, member_id: &str) -> BalanceResult<MemberOverview> {
        let member = self.require_member(member_id).await?;
        let group_balances = self.member_group_balances(member_id).await?;
        let splits = self.source.member_splits(member_id).await?;

        let total_share: BigDecimal = splits.iter().map(|s| &s.split.amount_owed).sum();

        Ok(MemberOverview {
            member_id: member.id,
            member_name: member.name,
            active_groups: group_balances.balances.len(),
            total_share: money::round_money(&total_share, self.config.scale),
            net_balance: money::round_money(&group_balances.total_net_balance(), self.config.scale),
            failures: group_balances.failures,
        })
    }

    /// Settle-up payments recorded in a group, most recent first
    pub async fn group_settlements(&self, group_id: &str) -> BalanceResult<Vec<RecordedSettlement>> {
        self.require_group(group_id).await?;
        let recorded = self.source.recorded_settlements(group_id).await?;
        Ok(settlement::most_recent_first(&recorded))
    }

    /// Count and total of settle-up payments recorded in a group
    pub async fn settlement_summary(&self, group_id: &str) -> BalanceResult<SettlementSummary> {
        self.require_group(group_id).await?;
        let recorded = self.source.recorded_settlements(group_id).await?;
        Ok(settlement::summarize_group(group_id, &recorded))
    }

    /// What a member has paid and received through recorded settlements in their groups
    pub async fn member_settlement_totals(
        &self,
        member_id: &str,
    ) -> BalanceResult<MemberSettlementTotals> {
        self.require_member(member_id).await?;

        let mut recorded = Vec::new();
        for group in self.source.groups_for_member(member_id).await? {
            recorded.extend(self.source.recorded_settlements(&group.id).await?);
        }

        Ok(settlement::member_totals(member_id, &recorded))
    }
}
