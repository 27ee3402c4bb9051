//! Ledger engine - net balances and settlement minimization.
//!
//! Everything in this module is a pure function of its input: no database, no clock, no
//! shared state. Callers load a snapshot of members and expenses, hand it in, and get plain
//! values back. Amounts are `f64` dollars; every comparison against zero goes through
//! [`TOLERANCE`] rather than exact equality.

use crate::errors::{Error, Result};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BinaryHeap},
};
use tracing::{debug, trace};

/// Anything smaller than this in magnitude counts as settled.
pub const TOLERANCE: f64 = 1e-6;

/// Allowed share-sum drift per share, absorbing per-line rounding to cents.
pub const SHARE_SUM_TOLERANCE_PER_SHARE: f64 = 0.01;

/// One participant's portion of one expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseShare {
    /// Member this share is charged to
    pub member_id: String,
    /// Amount charged, never negative
    pub amount: f64,
}

impl ExpenseShare {
    /// Creates a share for `member_id`.
    #[must_use]
    pub fn new(member_id: impl Into<String>, amount: f64) -> Self {
        Self {
            member_id: member_id.into(),
            amount,
        }
    }
}

/// A shared expense as the engine sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    /// Identifier, only used for error reporting
    pub id: String,
    /// Member who paid the full amount
    pub payer_id: String,
    /// Total amount paid
    pub amount: f64,
    /// How the total is divided between participants
    pub shares: Vec<ExpenseShare>,
}

/// A single suggested (or replayed) payment between two members.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementTransfer {
    /// Member who pays
    pub from_member_id: String,
    /// Member who receives
    pub to_member_id: String,
    /// Amount, rounded to cents
    pub amount: f64,
}

/// Net balance per member. Positive means the household owes this member.
///
/// Backed by a `BTreeMap` so iteration order is always by member id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Balances(BTreeMap<String, f64>);

impl Balances {
    /// Balance of `member_id`, if the member is part of this ledger.
    #[must_use]
    pub fn get(&self, member_id: &str) -> Option<f64> {
        self.0.get(member_id).copied()
    }

    /// Iterates `(member_id, balance)` pairs ordered by member id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(id, amount)| (id.as_str(), *amount))
    }

    /// Number of members in the ledger, settled or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the ledger has no members at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all balances. Zero (within tolerance) for a closed ledger.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// True when every balance is within tolerance of zero.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.0.values().all(|amount| amount.abs() <= TOLERANCE)
    }

    fn adjust(&mut self, member_id: &str, delta: f64) -> Result<()> {
        let balance = self
            .0
            .get_mut(member_id)
            .ok_or_else(|| Error::UnknownMember {
                member_id: member_id.to_string(),
            })?;
        *balance += delta;
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Balances {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(id, amount)| (id.into(), amount)).collect())
    }
}

/// Rounds a dollar amount to whole cents.
#[must_use]
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Converts a dollar amount to whole cents, rounding half away from zero.
// Household-sized amounts are far inside i64 range once scaled to cents.
#[allow(clippy::cast_possible_truncation)]
#[must_use]
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Converts whole cents back to a dollar amount.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Checks an expense for internally consistent amounts.
///
/// # Errors
/// * [`Error::InvalidAmount`] if the total is not a positive finite number or a share is
///   negative or non-finite
/// * [`Error::InvalidShareSum`] if the shares drift from the total by more than one cent
///   per share
pub fn validate_expense(expense: &Expense) -> Result<()> {
    if !expense.amount.is_finite() || expense.amount <= 0.0 {
        return Err(Error::InvalidAmount {
            amount: expense.amount,
        });
    }

    if let Some(share) = expense
        .shares
        .iter()
        .find(|share| !share.amount.is_finite() || share.amount < 0.0)
    {
        return Err(Error::InvalidAmount {
            amount: share.amount,
        });
    }

    let actual: f64 = expense.shares.iter().map(|share| share.amount).sum();
    #[allow(clippy::cast_precision_loss)]
    let allowed = SHARE_SUM_TOLERANCE_PER_SHARE * expense.shares.len() as f64;
    if (actual - expense.amount).abs() > allowed + TOLERANCE {
        return Err(Error::InvalidShareSum {
            expense_id: expense.id.clone(),
            expected: expense.amount,
            actual,
        });
    }

    Ok(())
}

/// Validates every expense, stopping at the first invalid one.
pub fn validate_expenses(expenses: &[Expense]) -> Result<()> {
    expenses.iter().try_for_each(validate_expense)
}

/// Computes the net balance of every member across `expenses`.
///
/// The payer is credited with the full amount and each participant debited their share; a
/// payer who also participates nets to total minus their own share. Processing order does
/// not matter.
///
/// # Errors
/// [`Error::UnknownMember`] naming the first payer or participant not in `members`.
pub fn compute_balances<S: AsRef<str>>(members: &[S], expenses: &[Expense]) -> Result<Balances> {
    let mut balances: Balances = members.iter().map(|id| (id.as_ref(), 0.0)).collect();

    for expense in expenses {
        trace!(
            expense_id = %expense.id,
            payer = %expense.payer_id,
            amount = expense.amount,
            "applying expense"
        );
        balances.adjust(&expense.payer_id, expense.amount)?;
        for share in &expense.shares {
            balances.adjust(&share.member_id, -share.amount)?;
        }
    }

    debug!(
        members = balances.len(),
        expenses = expenses.len(),
        total = balances.total(),
        "computed balances"
    );
    Ok(balances)
}

/// Folds already-made payments into `balances`.
///
/// Paying `x` from A to B moves A's balance up by `x` and B's down by `x`, so a payment that
/// matches a suggested settlement removes that debt.
///
/// # Errors
/// [`Error::UnknownMember`] if a payment names a member without a balance entry.
pub fn apply_payments(mut balances: Balances, payments: &[SettlementTransfer]) -> Result<Balances> {
    for payment in payments {
        balances.adjust(&payment.from_member_id, payment.amount)?;
        balances.adjust(&payment.to_member_id, -payment.amount)?;
    }
    Ok(balances)
}

/// Applies `transfers` to a zero-initialized ledger.
///
/// Replaying the output of [`compute_settlements`] reproduces the balances it was computed
/// from, to the cent.
#[must_use]
pub fn replay_transfers(transfers: &[SettlementTransfer]) -> Balances {
    let mut ledger = BTreeMap::new();
    for transfer in transfers {
        *ledger.entry(transfer.from_member_id.clone()).or_insert(0.0) -= transfer.amount;
        *ledger.entry(transfer.to_member_id.clone()).or_insert(0.0) += transfer.amount;
    }
    Balances(ledger)
}

/// Heap entry for one side of the settlement. Ordered by cents owed or owing, then by the
/// smaller member id, so `BinaryHeap::pop` yields the party the greedy step must pick next.
#[derive(Debug, PartialEq, Eq)]
struct Party {
    member_id: String,
    cents: i64,
}

impl Ord for Party {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cents
            .cmp(&other.cents)
            .then_with(|| other.member_id.cmp(&self.member_id))
    }
}

impl PartialOrd for Party {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Converts balances to whole cents that sum to exactly zero.
///
/// Every balance is floored to cents, then the cents still missing are handed out one at a
/// time by largest fractional remainder (ties to the smaller id). Each member ends up within
/// one cent of their exact balance.
#[allow(clippy::cast_possible_truncation)]
fn allocate_cents(balances: &Balances) -> Vec<(String, i64)> {
    let mut allocated: Vec<(String, i64, f64)> = balances
        .iter()
        .map(|(member_id, amount)| {
            let scaled = amount * 100.0;
            let floor = scaled.floor();
            (member_id.to_string(), floor as i64, scaled - floor)
        })
        .collect();

    // The floors undershoot by the sum of the remainders, which is a whole number of cents
    let missing: i64 = -allocated.iter().map(|(_, cents, _)| cents).sum::<i64>();
    let missing = usize::try_from(missing)
        .unwrap_or(0)
        .min(allocated.len());

    let mut order: Vec<usize> = (0..allocated.len()).collect();
    order.sort_by(|&a, &b| {
        allocated[b]
            .2
            .total_cmp(&allocated[a].2)
            .then_with(|| allocated[a].0.cmp(&allocated[b].0))
    });
    for &index in order.iter().take(missing) {
        allocated[index].1 += 1;
    }

    allocated
        .into_iter()
        .map(|(member_id, cents, _)| (member_id, cents))
        .collect()
}

/// Computes the shortest list of transfers that brings every balance to zero.
///
/// Balances are first allocated to whole cents summing to zero. Then greedy extremal
/// matching repeatedly pairs the largest creditor with the largest debtor (ties go to the
/// lexicographically smaller id) and moves `min(credit, |debt|)` between them. Each step
/// zeroes at least one party, so `n` non-zero balances settle in at most `n - 1` transfers,
/// and replaying the transfers lands every member within one cent of their balance.
///
/// # Errors
/// [`Error::UnbalancedLedger`] if a balance is not finite or the balances do not sum to
/// zero within tolerance.
pub fn compute_settlements(balances: &Balances) -> Result<Vec<SettlementTransfer>> {
    let total = balances.total();
    if !total.is_finite() || total.abs() > TOLERANCE {
        return Err(Error::UnbalancedLedger { residual: total });
    }
    if balances.iter().any(|(_, amount)| !amount.is_finite()) {
        return Err(Error::UnbalancedLedger { residual: total });
    }

    let mut creditors = BinaryHeap::new();
    let mut debtors = BinaryHeap::new();
    for (member_id, cents) in allocate_cents(balances) {
        match cents.cmp(&0) {
            Ordering::Greater => creditors.push(Party { member_id, cents }),
            Ordering::Less => debtors.push(Party {
                member_id,
                cents: -cents,
            }),
            Ordering::Equal => {}
        }
    }

    let mut transfers = Vec::new();
    while let (Some(mut creditor), Some(mut debtor)) = (creditors.pop(), debtors.pop()) {
        let cents = creditor.cents.min(debtor.cents);
        trace!(
            from = %debtor.member_id,
            to = %creditor.member_id,
            cents,
            "settlement step"
        );
        transfers.push(SettlementTransfer {
            from_member_id: debtor.member_id.clone(),
            to_member_id: creditor.member_id.clone(),
            amount: from_cents(cents),
        });

        creditor.cents -= cents;
        debtor.cents -= cents;
        if creditor.cents > 0 {
            creditors.push(creditor);
        }
        if debtor.cents > 0 {
            debtors.push(debtor);
        }
    }

    debug!(transfers = transfers.len(), "computed settlements");
    Ok(transfers)
}
