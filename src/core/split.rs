//! Expense splitting - builds the share list for a new expense.
//!
//! Both splits work in whole cents against the total rounded to cents, so the shares a new
//! expense is stored with always add back up to its stored total. Equal splits give the
//! leftover cents to the first participants in the order given.

use crate::{
    core::ledger::{ExpenseShare, from_cents, to_cents},
    errors::{Error, Result},
};
use std::collections::HashSet;

/// Total in whole cents, rejecting anything that is not a positive amount of money.
fn total_in_cents(total: f64) -> Result<i64> {
    if !total.is_finite() || total <= 0.0 {
        return Err(Error::InvalidAmount { amount: total });
    }
    let cents = to_cents(total);
    if cents <= 0 {
        return Err(Error::InvalidAmount { amount: total });
    }
    Ok(cents)
}

/// Splits `total`, rounded to cents, equally between `participants`.
///
/// Duplicate participant ids are collapsed to their first occurrence.
///
/// # Errors
/// * [`Error::InvalidAmount`] if `total` is not at least one cent
/// * [`Error::NoParticipants`] if `participants` is empty
pub fn equal_split<S: AsRef<str>>(total: f64, participants: &[S]) -> Result<Vec<ExpenseShare>> {
    let total_cents = total_in_cents(total)?;

    let mut seen = HashSet::new();
    let unique: Vec<&str> = participants
        .iter()
        .map(|id| id.as_ref())
        .filter(|id| seen.insert(*id))
        .collect();
    if unique.is_empty() {
        return Err(Error::NoParticipants);
    }

    // Cast safety: the participant count is tiny.
    #[allow(clippy::cast_possible_wrap)]
    let count = unique.len() as i64;
    let base = total_cents / count;
    let remainder = total_cents % count;

    Ok(unique
        .into_iter()
        .zip(0_i64..)
        .map(|(member_id, index)| {
            ExpenseShare::new(member_id, from_cents(base + i64::from(index < remainder)))
        })
        .collect())
}

/// Builds a custom split from per-member amounts.
///
/// Shares are rounded to cents and participants left with a zero share are dropped,
/// mirroring an unfilled split field. The rest may miss the rounded total by at most one
/// cent per share (e.g., three shares of 33.33 for 100.00); that difference goes to the
/// largest share, the first one on a tie, so the result adds up exactly.
///
/// # Errors
/// * [`Error::InvalidAmount`] for a total under one cent or a negative share
/// * [`Error::NoParticipants`] if no share is left after dropping zeros
/// * [`Error::InvalidShareSum`] if the shares do not add up
pub fn custom_split(total: f64, shares: Vec<ExpenseShare>) -> Result<Vec<ExpenseShare>> {
    let total_cents = total_in_cents(total)?;
    if let Some(bad) = shares
        .iter()
        .find(|share| !share.amount.is_finite() || share.amount < 0.0)
    {
        return Err(Error::InvalidAmount { amount: bad.amount });
    }

    let actual: f64 = shares.iter().map(|share| share.amount).sum();
    let mut in_cents: Vec<(String, i64)> = shares
        .into_iter()
        .map(|share| {
            let cents = to_cents(share.amount);
            (share.member_id, cents)
        })
        .filter(|(_, cents)| *cents > 0)
        .collect();
    if in_cents.is_empty() {
        return Err(Error::NoParticipants);
    }

    let mismatch = || Error::InvalidShareSum {
        expense_id: "new".to_string(),
        expected: total,
        actual,
    };

    let difference = total_cents - in_cents.iter().map(|(_, cents)| cents).sum::<i64>();
    let allowed = i64::try_from(in_cents.len()).map_err(|_| mismatch())?;
    if difference.abs() > allowed {
        return Err(mismatch());
    }

    if difference != 0 {
        let largest = in_cents
            .iter()
            .enumerate()
            .max_by(|(i, (_, a)), (j, (_, b))| a.cmp(b).then_with(|| j.cmp(i)))
            .map(|(index, _)| index)
            .ok_or_else(mismatch)?;
        in_cents[largest].1 += difference;
        if in_cents[largest].1 <= 0 {
            return Err(mismatch());
        }
    }

    Ok(in_cents
        .into_iter()
        .map(|(member_id, cents)| ExpenseShare::new(member_id, from_cents(cents)))
        .collect())
}
