//! Expense business logic - logging shared expenses and reading them back for the ledger.
//!
//! An expense row and its share rows are always written and deleted together inside one
//! database transaction, so the ledger never sees an expense without its split.

use crate::{
    core::{
        ledger::{self, ExpenseShare as LedgerShare},
        member::ensure_members_exist,
        split,
    },
    entities::{Expense, ExpenseShare, expense, expense_share},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use std::collections::HashMap;
use tracing::info;

/// How a new expense is divided.
#[derive(Debug, Clone)]
pub enum Split {
    /// Equal shares, in whole cents, between these member ids
    Equal(Vec<String>),
    /// Explicit per-member amounts
    Custom(Vec<LedgerShare>),
}

/// Input for [`create_expense`].
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// What was bought
    pub description: String,
    /// Total paid
    pub amount: f64,
    /// Member who paid
    pub payer_id: String,
    /// Optional grouping
    pub category: Option<String>,
    /// When the expense happened
    pub date: DateTime<Utc>,
    /// How the total is divided
    pub split: Split,
}

/// An expense together with its share rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseWithShares {
    /// The expense row
    pub expense: expense::Model,
    /// One row per participant
    pub shares: Vec<expense_share::Model>,
}

impl ExpenseWithShares {
    /// Converts the stored rows into the engine's plain expense value.
    #[must_use]
    pub fn to_ledger_expense(&self) -> ledger::Expense {
        ledger::Expense {
            id: self.expense.id.to_string(),
            payer_id: self.expense.payer_id.clone(),
            amount: self.expense.amount,
            shares: self
                .shares
                .iter()
                .map(|share| LedgerShare::new(share.member_id.clone(), share.share))
                .collect(),
        }
    }
}

/// Logs a new shared expense.
///
/// The total is stored rounded to cents. The split is computed (equal) or checked (custom)
/// so the shares add up to exactly that total, every referenced member must exist, and the
/// expense plus its shares are inserted atomically.
///
/// # Errors
/// * [`Error::Config`] for an empty description
/// * [`Error::InvalidAmount`], [`Error::NoParticipants`] or [`Error::InvalidShareSum`] for a
///   bad split
/// * [`Error::UnknownMember`] if the payer or a participant is not a household member
pub async fn create_expense(
    db: &DatabaseConnection,
    new_expense: NewExpense,
) -> Result<ExpenseWithShares> {
    let NewExpense {
        description,
        amount,
        payer_id,
        category,
        date,
        split: division,
    } = new_expense;

    if description.trim().is_empty() {
        return Err(Error::Config {
            message: "Expense description cannot be empty".to_string(),
        });
    }

    let is_equal_split = matches!(division, Split::Equal(_));
    let shares = match division {
        Split::Equal(participants) => split::equal_split(amount, &participants)?,
        Split::Custom(shares) => split::custom_split(amount, shares)?,
    };

    // Stored rows must conserve money exactly, or every later settlement is unbalanced
    let amount = ledger::round_to_cents(amount);
    let share_total: f64 = shares.iter().map(|share| share.amount).sum();
    if (share_total - amount).abs() > ledger::TOLERANCE {
        return Err(Error::InvalidShareSum {
            expense_id: "new".to_string(),
            expected: amount,
            actual: share_total,
        });
    }

    // Use a transaction so the membership check and both inserts see one snapshot
    let txn = db.begin().await?;

    let mut referenced: Vec<&str> = vec![payer_id.as_str()];
    referenced.extend(shares.iter().map(|share| share.member_id.as_str()));
    ensure_members_exist(&txn, &referenced).await?;

    let expense = expense::ActiveModel {
        description: Set(description.trim().to_string()),
        amount: Set(amount),
        payer_id: Set(payer_id.clone()),
        category: Set(category),
        is_equal_split: Set(is_equal_split),
        date: Set(date),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut share_rows = Vec::with_capacity(shares.len());
    for share in shares {
        let row = expense_share::ActiveModel {
            expense_id: Set(expense.id),
            member_id: Set(share.member_id),
            share: Set(share.amount),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        share_rows.push(row);
    }

    txn.commit().await?;

    info!(
        expense_id = expense.id,
        payer = %payer_id,
        amount,
        participants = share_rows.len(),
        "Logged expense"
    );
    Ok(ExpenseWithShares {
        expense,
        shares: share_rows,
    })
}

/// Retrieves one expense with its shares, or None if it does not exist.
pub async fn get_expense_by_id<C>(db: &C, expense_id: i64) -> Result<Option<ExpenseWithShares>>
where
    C: ConnectionTrait,
{
    let Some(expense) = Expense::find_by_id(expense_id).one(db).await? else {
        return Ok(None);
    };
    let shares = ExpenseShare::find()
        .filter(expense_share::Column::ExpenseId.eq(expense_id))
        .order_by_asc(expense_share::Column::Id)
        .all(db)
        .await?;
    Ok(Some(ExpenseWithShares { expense, shares }))
}

/// Retrieves every expense with its shares, newest first.
pub async fn get_all_expenses<C>(db: &C) -> Result<Vec<ExpenseWithShares>>
where
    C: ConnectionTrait,
{
    let expenses = Expense::find()
        .order_by_desc(expense::Column::Date)
        .order_by_desc(expense::Column::Id)
        .all(db)
        .await?;

    let mut shares_by_expense: HashMap<i64, Vec<expense_share::Model>> = HashMap::new();
    for share in ExpenseShare::find()
        .order_by_asc(expense_share::Column::Id)
        .all(db)
        .await?
    {
        shares_by_expense
            .entry(share.expense_id)
            .or_default()
            .push(share);
    }

    Ok(expenses
        .into_iter()
        .map(|expense| {
            let shares = shares_by_expense.remove(&expense.id).unwrap_or_default();
            ExpenseWithShares { expense, shares }
        })
        .collect())
}

/// Loads every stored expense as engine input.
pub async fn load_ledger_expenses<C>(db: &C) -> Result<Vec<ledger::Expense>>
where
    C: ConnectionTrait,
{
    Ok(get_all_expenses(db)
        .await?
        .iter()
        .map(ExpenseWithShares::to_ledger_expense)
        .collect())
}

/// Deletes an expense and its shares.
///
/// # Errors
/// [`Error::ExpenseNotFound`] if no expense has this id.
pub async fn delete_expense(db: &DatabaseConnection, expense_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let expense = Expense::find_by_id(expense_id)
        .one(&txn)
        .await?
        .ok_or(Error::ExpenseNotFound { expense_id })?;

    ExpenseShare::delete_many()
        .filter(expense_share::Column::ExpenseId.eq(expense_id))
        .exec(&txn)
        .await?;
    expense.delete(&txn).await?;

    txn.commit().await?;
    info!(expense_id, "Deleted expense");
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;

    fn equal(participants: &[&str]) -> Split {
        Split::Equal(participants.iter().map(ToString::to_string).collect())
    }

    #[tokio::test]
    async fn test_create_equal_split_expense() -> Result<()> {
        let (db, _members) = setup_household().await?;

        let created = create_expense(
            &db,
            NewExpense {
                description: "Groceries Q1".to_string(),
                amount: 150.75,
                payer_id: "user1".to_string(),
                category: Some("Food".to_string()),
                date: Utc::now(),
                split: equal(&["user1", "user2", "user3"]),
            },
        )
        .await?;

        assert!(created.expense.is_equal_split);
        assert_eq!(created.expense.category.as_deref(), Some("Food"));
        assert_eq!(created.shares.len(), 3);
        assert!(created.shares.iter().all(|share| share.share == 50.25));
        assert!(
            created
                .shares
                .iter()
                .all(|share| share.expense_id == created.expense.id)
        );

        let found = get_expense_by_id(&db, created.expense.id).await?.unwrap();
        assert_eq!(found, created);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_custom_split_expense() -> Result<()> {
        let (db, _members) = setup_household().await?;

        let created = create_expense(
            &db,
            NewExpense {
                description: "Movie Night Tickets".to_string(),
                amount: 45.0,
                payer_id: "user3".to_string(),
                category: None,
                date: Utc::now(),
                split: Split::Custom(vec![
                    LedgerShare::new("user1", 15.0),
                    LedgerShare::new("user2", 0.0),
                    LedgerShare::new("user3", 30.0),
                ]),
            },
        )
        .await?;

        assert!(!created.expense.is_equal_split);
        let members: Vec<&str> = created
            .shares
            .iter()
            .map(|share| share.member_id.as_str())
            .collect();
        assert_eq!(members, vec!["user1", "user3"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_unknown_member_writes_nothing() -> Result<()> {
        let (db, _members) = setup_household().await?;

        let result = create_expense(
            &db,
            NewExpense {
                description: "Pizza".to_string(),
                amount: 20.0,
                payer_id: "user1".to_string(),
                category: None,
                date: Utc::now(),
                split: equal(&["user1", "ghost"]),
            },
        )
        .await;

        assert!(matches!(
            result.unwrap_err(),
            Error::UnknownMember { member_id } if member_id == "ghost"
        ));
        assert!(get_all_expenses(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_validation() -> Result<()> {
        let (db, _members) = setup_household().await?;

        let base = NewExpense {
            description: "Internet Bill".to_string(),
            amount: 60.0,
            payer_id: "user2".to_string(),
            category: None,
            date: Utc::now(),
            split: equal(&["user1", "user2"]),
        };

        let result = create_expense(
            &db,
            NewExpense {
                description: "   ".to_string(),
                ..base.clone()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::Config { .. }));

        let result = create_expense(
            &db,
            NewExpense {
                amount: -5.0,
                ..base.clone()
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { .. }));

        let result = create_expense(
            &db,
            NewExpense {
                split: Split::Custom(vec![LedgerShare::new("user1", 10.0)]),
                ..base
            },
        )
        .await;
        assert!(matches!(result.unwrap_err(), Error::InvalidShareSum { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_all_expenses_newest_first() -> Result<()> {
        let (db, _members) = setup_household().await?;
        let now = Utc::now();

        for (description, days_ago) in [("Old", 10), ("Newest", 1), ("Middle", 5)] {
            create_expense(
                &db,
                NewExpense {
                    description: description.to_string(),
                    amount: 10.0,
                    payer_id: "user1".to_string(),
                    category: None,
                    date: now - Duration::days(days_ago),
                    split: equal(&["user1", "user2"]),
                },
            )
            .await?;
        }

        let descriptions: Vec<String> = get_all_expenses(&db)
            .await?
            .into_iter()
            .map(|e| e.expense.description)
            .collect();
        assert_eq!(descriptions, vec!["Newest", "Middle", "Old"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_ledger_expenses() -> Result<()> {
        let (db, _members) = setup_household().await?;
        let created = create_test_expense(&db, "user2", 60.0, &["user1", "user2", "user3"]).await?;

        let ledger_expenses = load_ledger_expenses(&db).await?;
        assert_eq!(ledger_expenses.len(), 1);
        let expense = &ledger_expenses[0];
        assert_eq!(expense.id, created.expense.id.to_string());
        assert_eq!(expense.payer_id, "user2");
        assert_eq!(expense.shares.len(), 3);
        assert!(ledger::validate_expense(expense).is_ok());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_expense_removes_shares() -> Result<()> {
        let (db, _members) = setup_household().await?;
        let created = create_test_expense(&db, "user1", 30.0, &["user1", "user2"]).await?;

        delete_expense(&db, created.expense.id).await?;
        assert!(get_expense_by_id(&db, created.expense.id).await?.is_none());
        assert!(
            ExpenseShare::find()
                .filter(expense_share::Column::ExpenseId.eq(created.expense.id))
                .all(&db)
                .await?
                .is_empty()
        );

        let result = delete_expense(&db, created.expense.id).await;
        assert!(matches!(result.unwrap_err(), Error::ExpenseNotFound { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_rounded_custom_shares_keep_ledger_balanced() -> Result<()> {
        use crate::core::report::{ReportOptions, generate_settlement_report};

        let (db, _members) = setup_household().await?;

        let created = create_expense(
            &db,
            NewExpense {
                description: "Cleaning Supplies".to_string(),
                amount: 100.0,
                payer_id: "user1".to_string(),
                category: None,
                date: Utc::now(),
                split: Split::Custom(vec![
                    LedgerShare::new("user1", 33.33),
                    LedgerShare::new("user2", 33.33),
                    LedgerShare::new("user3", 33.33),
                ]),
            },
        )
        .await?;
        let shares: Vec<f64> = created.shares.iter().map(|share| share.share).collect();
        assert_eq!(shares, vec![33.34, 33.33, 33.33]);

        let report = generate_settlement_report(&db, ReportOptions::default()).await?;
        let owed: Vec<(&str, f64)> = report
            .suggestions
            .iter()
            .map(|s| (s.from_member_id.as_str(), s.amount))
            .collect();
        assert_eq!(owed, vec![("user2", 33.33), ("user3", 33.33)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_amount_stored_rounded_to_cents() -> Result<()> {
        let (db, _members) = setup_household().await?;

        let created = create_test_expense(&db, "user2", 10.004, &["user1", "user2"]).await?;
        assert_eq!(created.expense.amount, 10.0);
        let share_total: f64 = created.shares.iter().map(|share| share.share).sum();
        assert_eq!(share_total, created.expense.amount);

        let ledger_expenses = load_ledger_expenses(&db).await?;
        let balances = ledger::compute_balances(&["user1", "user2", "user3"], &ledger_expenses)?;
        assert!(balances.total().abs() < ledger::TOLERANCE);
        Ok(())
    }
}
