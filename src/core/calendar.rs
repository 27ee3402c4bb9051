//! Unified household calendar.
//!
//! Chores, expenses and payments are merged into one date-ordered list. Each event carries
//! its source record in a tagged [`CalendarEventKind`], so consumers match on the variant
//! instead of guessing which fields are present.

use crate::{
    core::{expense::ExpenseWithShares, report::format_amount},
    entities::{chore, member, payment},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// What a calendar entry refers to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "details", rename_all = "snake_case")]
pub enum CalendarEventKind {
    /// A chore falling due (or created, when it has no due date)
    Chore(chore::Model),
    /// A shared expense
    ExpenseDue(ExpenseWithShares),
    /// A settlement payment between two members
    Payment(payment::Model),
}

/// One entry on the household calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarEvent {
    /// Stable id, prefixed by source (`chore-`, `expense-`, `payment-`)
    pub id: String,
    /// Short human-readable title
    pub title: String,
    /// When the event happens
    pub date: DateTime<Utc>,
    /// Source record
    #[serde(flatten)]
    pub kind: CalendarEventKind,
}

/// Builds the calendar from current household data, ordered by date then id.
#[must_use]
pub fn build_calendar(
    chores: &[chore::Model],
    expenses: &[ExpenseWithShares],
    payments: &[payment::Model],
    members: &[member::Model],
) -> Vec<CalendarEvent> {
    let first_names: HashMap<&str, &str> = members
        .iter()
        .map(|m| (m.id.as_str(), m.first_name()))
        .collect();
    let first_name = |member_id: &str| -> String {
        first_names
            .get(member_id)
            .copied()
            .unwrap_or(member_id)
            .to_string()
    };

    let chore_events = chores.iter().map(|chore| CalendarEvent {
        id: format!("chore-{}", chore.id),
        title: chore.name.clone(),
        date: chore.due_date.unwrap_or(chore.created_at),
        kind: CalendarEventKind::Chore(chore.clone()),
    });

    let expense_events = expenses.iter().map(|entry| CalendarEvent {
        id: format!("expense-{}", entry.expense.id),
        title: format!(
            "{} (Paid by {})",
            entry.expense.description,
            first_name(&entry.expense.payer_id)
        ),
        date: entry.expense.date,
        kind: CalendarEventKind::ExpenseDue(entry.clone()),
    });

    let payment_events = payments.iter().map(|payment| CalendarEvent {
        id: format!("payment-{}", payment.id),
        title: format!(
            "{} paid {} {}",
            first_name(&payment.from_member_id),
            first_name(&payment.to_member_id),
            format_amount(payment.amount)
        ),
        date: payment.timestamp,
        kind: CalendarEventKind::Payment(payment.clone()),
    });

    let mut events: Vec<CalendarEvent> = chore_events
        .chain(expense_events)
        .chain(payment_events)
        .collect();
    events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    events
}

/// Events falling on `day` (UTC).
pub fn events_on(events: &[CalendarEvent], day: NaiveDate) -> impl Iterator<Item = &CalendarEvent> {
    events
        .iter()
        .filter(move |event| event.date.date_naive() == day)
}
