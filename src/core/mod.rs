/// Unified household calendar built from chores, expenses and payments
pub mod calendar;

/// Chore creation, assignment and completion
pub mod chore;

/// Shared expenses and their per-member shares
pub mod expense;

/// Pure ledger engine: balances and minimal settlements
pub mod ledger;

/// Household membership
pub mod member;

/// Recorded settlement payments
pub mod payment;

/// Settlement reports and their text formatting
pub mod report;

/// Equal and custom expense splits
pub mod split;

/// Chore schedule and expense split suggestions
pub mod suggestion;
