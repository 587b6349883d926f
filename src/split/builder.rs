//! Builder for expenses together with their split entries

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;

use crate::split::SplitAllocator;
use crate::types::*;
use crate::utils::validation;

#[derive(Debug, Clone)]
enum Allocation {
    Unspecified,
    Equal(Vec<String>),
    Percentage(Vec<(String, BigDecimal)>),
    Exact(Vec<(String, BigDecimal)>),
}

/// Expense builder for creating an expense and its splits in one step
#[derive(Debug)]
pub struct ExpenseBuilder {
    expense: ExpenseRecord,
    allocation: Allocation,
}

impl ExpenseBuilder {
    /// Create a new expense builder with a generated id, dated now
    pub fn new(
        group_id: impl Into<String>,
        payer_id: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self {
            expense: ExpenseRecord {
                id: uuid::Uuid::new_v4().to_string(),
                group_id: group_id.into(),
                payer_id: payer_id.into(),
                amount,
                description: String::new(),
                split_type: SplitType::Equal,
                expense_date: chrono::Utc::now().naive_utc(),
            },
            allocation: Allocation::Unspecified,
        }
    }

    /// Use a caller-supplied id
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.expense.id = id.into();
        self
    }

    /// Set the description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.expense.description = description.into();
        self
    }

    /// Set when the expense happened
    pub fn expense_date(mut self, expense_date: NaiveDateTime) -> Self {
        self.expense.expense_date = expense_date;
        self
    }

    /// Split the amount equally between participants
    pub fn split_equally<I, M>(mut self, participants: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.expense.split_type = SplitType::Equal;
        self.allocation = Allocation::Equal(participants.into_iter().map(Into::into).collect());
        self
    }

    /// Split the amount equally between every member of a group roster
    pub fn split_equally_among_roster(self, roster: &[Member]) -> Self {
        self.split_equally(roster.iter().map(|member| member.id.clone()))
    }

    /// Split the amount by percentage
    pub fn split_by_percentage(mut self, shares: Vec<(String, BigDecimal)>) -> Self {
        self.expense.split_type = SplitType::Percentage;
        self.allocation = Allocation::Percentage(shares);
        self
    }

    /// Split the amount with explicit per-participant amounts
    pub fn split_exact(mut self, shares: Vec<(String, BigDecimal)>) -> Self {
        self.expense.split_type = SplitType::ExactAmount;
        self.allocation = Allocation::Exact(shares);
        self
    }

    /// Build the expense and its split entries
    pub fn build(self, allocator: &SplitAllocator) -> BalanceResult<(ExpenseRecord, Vec<SplitEntry>)> {
        let expense = self.expense;
        validation::validate_id("Expense", &expense.id)?;
        validation::validate_id("Group", &expense.group_id)?;
        validation::validate_id("Payer", &expense.payer_id)?;

        let splits = match &self.allocation {
            Allocation::Unspecified => {
                return Err(BalanceError::Validation(
                    "An expense needs at least one participant".to_string(),
                ))
            }
            Allocation::Equal(participants) => {
                allocator.equal(&expense.id, &expense.amount, participants)?
            }
            Allocation::Percentage(shares) => {
                allocator.by_percentage(&expense.id, &expense.amount, shares)?
            }
            Allocation::Exact(shares) => allocator.exact(&expense.id, &expense.amount, shares)?,
        };

        Ok((expense, splits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_build_equal_expense() {
        let (expense, splits) = ExpenseBuilder::new("trip", "alice", BigDecimal::from(90))
            .id("dinner")
            .description("Dinner")
            .split_equally(["alice", "bob", "carol"])
            .build(&SplitAllocator::default())
            .unwrap();

        assert_eq!(expense.id, "dinner");
        assert_eq!(expense.description, "Dinner");
        assert_eq!(expense.split_type, SplitType::Equal);
        assert_eq!(splits.len(), 3);
        assert!(splits.iter().all(|s| s.expense_id == "dinner"));
        assert!(splits.iter().all(|s| s.amount_owed == BigDecimal::from(30)));
    }

    #[test]
    fn test_split_among_whole_roster() {
        let roster = vec![
            Member::new("alice", "Alice"),
            Member::new("bob", "Bob"),
            Member::new("carol", "Carol"),
            Member::new("dan", "Dan"),
        ];

        let (expense, splits) = ExpenseBuilder::new("trip", "bob", BigDecimal::from(100))
            .split_equally_among_roster(&roster)
            .build(&SplitAllocator::default())
            .unwrap();

        assert_eq!(expense.split_type, SplitType::Equal);
        let members: Vec<&str> = splits.iter().map(|s| s.member_id.as_str()).collect();
        assert_eq!(members, vec!["alice", "bob", "carol", "dan"]);
        assert!(splits.iter().all(|s| s.amount_owed == BigDecimal::from(25)));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let first = ExpenseBuilder::new("g", "a", BigDecimal::from(1))
            .split_equally(["a"])
            .build(&SplitAllocator::default())
            .unwrap();
        let second = ExpenseBuilder::new("g", "a", BigDecimal::from(1))
            .split_equally(["a"])
            .build(&SplitAllocator::default())
            .unwrap();

        assert_ne!(first.0.id, second.0.id);
    }

    #[test]
    fn test_build_percentage_expense() {
        let (expense, splits) = ExpenseBuilder::new("g", "a", BigDecimal::from(200))
            .split_by_percentage(vec![
                ("a".to_string(), BigDecimal::from(75)),
                ("b".to_string(), BigDecimal::from(25)),
            ])
            .build(&SplitAllocator::default())
            .unwrap();

        assert_eq!(expense.split_type, SplitType::Percentage);
        assert_eq!(splits[0].amount_owed, BigDecimal::from(150));
        assert_eq!(splits[1].amount_owed, BigDecimal::from(50));
    }

    #[test]
    fn test_build_exact_expense() {
        let (expense, splits) = ExpenseBuilder::new("g", "a", BigDecimal::from_str("10.50").unwrap())
            .split_exact(vec![
                ("a".to_string(), BigDecimal::from_str("3.50").unwrap()),
                ("b".to_string(), BigDecimal::from(7)),
            ])
            .build(&SplitAllocator::default())
            .unwrap();

        assert_eq!(expense.split_type, SplitType::ExactAmount);
        assert_eq!(splits.len(), 2);
    }

    #[test]
    fn test_build_without_participants_fails() {
        let result = ExpenseBuilder::new("g", "a", BigDecimal::from(10)).build(&SplitAllocator::default());
        assert!(matches!(result, Err(BalanceError::Validation(_))));
    }
}
