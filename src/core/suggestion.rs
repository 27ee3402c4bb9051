//! Suggestion providers - chore schedules and expense splits proposed to the household.
//!
//! Suggestions are advisory and may come from a non-deterministic source, so they sit
//! behind [`SuggestionProvider`]. Nothing in the ledger depends on this module; a caller
//! turns an accepted suggestion into an ordinary expense or chore assignment.

use crate::{
    core::{ledger::ExpenseShare, split},
    errors::Result,
};
use std::collections::BTreeMap;

/// Placeholder assignee when a household has no roommates to suggest.
pub const UNASSIGNED: &str = "unassigned";

/// One roommate's stated preferences.
#[derive(Debug, Clone, Default)]
pub struct RoommatePreference {
    /// Member id
    pub roommate_id: String,
    /// Chores this roommate would rather do
    pub preferred_chores: Vec<String>,
    /// Weekdays the roommate is available (e.g., "Monday")
    pub available_days: Vec<String>,
}

/// Input for a chore schedule suggestion.
#[derive(Debug, Clone, Default)]
pub struct ChoreSuggestionInput {
    /// Roommates, in the order they should be considered
    pub roommates: Vec<RoommatePreference>,
    /// Names of chores nobody is assigned to
    pub unassigned_chores: Vec<String>,
}

/// A suggested chore schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoreSchedule {
    /// Chore name to suggested member id
    pub assignments: BTreeMap<String, String>,
    /// Why this schedule was suggested
    pub reasoning: String,
}

/// Input for an expense split suggestion.
#[derive(Debug, Clone, Default)]
pub struct ExpenseSplitInput {
    /// Total to split
    pub amount: f64,
    /// What the expense was for
    pub description: String,
    /// Member who paid
    pub payer_id: String,
    /// Members sharing the cost
    pub participants: Vec<String>,
    /// Optional usage figure per participant (e.g., utility consumption)
    pub usage_patterns: BTreeMap<String, f64>,
    /// Optional free-form notes per participant
    pub individual_circumstances: BTreeMap<String, String>,
}

/// Source of household suggestions.
pub trait SuggestionProvider {
    /// Proposes who should take each unassigned chore.
    fn suggest_chore_schedule(&self, input: &ChoreSuggestionInput) -> Result<ChoreSchedule>;

    /// Proposes how an expense should be divided. The shares must add up to the amount.
    fn suggest_expense_split(&self, input: &ExpenseSplitInput) -> Result<Vec<ExpenseShare>>;
}

/// Deterministic provider: chores go round-robin, expenses split equally.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoundRobinSuggester;

impl SuggestionProvider for RoundRobinSuggester {
    fn suggest_chore_schedule(&self, input: &ChoreSuggestionInput) -> Result<ChoreSchedule> {
        let assignments = input
            .unassigned_chores
            .iter()
            .enumerate()
            .map(|(index, chore)| {
                let assignee = if input.roommates.is_empty() {
                    UNASSIGNED.to_string()
                } else {
                    input.roommates[index % input.roommates.len()]
                        .roommate_id
                        .clone()
                };
                (chore.clone(), assignee)
            })
            .collect();

        Ok(ChoreSchedule {
            assignments,
            reasoning: "Chores are assigned to roommates in turn (round-robin).".to_string(),
        })
    }

    fn suggest_expense_split(&self, input: &ExpenseSplitInput) -> Result<Vec<ExpenseShare>> {
        split::equal_split(input.amount, &input.participants)
    }
}
