//! Unified error types and result handling.
//!
//! Ledger errors (`UnknownMember`, `InvalidShareSum`, `UnbalancedLedger`) are fatal to the
//! computation that raised them and are surfaced to the caller untouched.

use thiserror::Error;

/// Every failure the crate can report.
#[derive(Debug, Error)]
pub enum Error {
    /// An expense or payment references a member id absent from the household.
    #[error("Unknown member: {member_id}")]
    UnknownMember {
        /// The offending member id
        member_id: String,
    },

    /// An expense's shares do not add up to its total.
    #[error("Shares of expense {expense_id} sum to {actual:.2}, expected {expected:.2}")]
    InvalidShareSum {
        /// Expense whose shares are inconsistent
        expense_id: String,
        /// The expense total
        expected: f64,
        /// The sum of its shares
        actual: f64,
    },

    /// Balances do not conserve money, so they cannot be settled.
    #[error("Ledger is unbalanced by {residual:.6}")]
    UnbalancedLedger {
        /// Sum of the balances left unsettled
        residual: f64,
    },

    /// A money amount is negative, zero where it must be positive, or not finite.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A split was requested with nobody to charge.
    #[error("An expense needs at least one participant")]
    NoParticipants,

    /// No member has the requested id.
    #[error("Member not found: {member_id}")]
    MemberNotFound {
        /// The id that was looked up
        member_id: String,
    },

    /// A member with this id already exists.
    #[error("Member already exists: {member_id}")]
    DuplicateMember {
        /// The id already taken
        member_id: String,
    },

    /// The member still has ledger history and cannot be removed.
    #[error("Member {member_id} is still referenced by expenses or payments")]
    MemberInUse {
        /// The referenced member
        member_id: String,
    },

    /// No expense has the requested id.
    #[error("Expense not found: {expense_id}")]
    ExpenseNotFound {
        /// The id that was looked up
        expense_id: i64,
    },

    /// No chore has the requested id.
    #[error("Chore not found: {chore_id}")]
    ChoreNotFound {
        /// The id that was looked up
        chore_id: i64,
    },

    /// A payment that cannot be recorded, such as a member paying themselves.
    #[error("Invalid payment: {message}")]
    InvalidPayment {
        /// What is wrong with the payment
        message: String,
    },

    /// Bad configuration or bad input to a store operation.
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// Failure reported by `SeaORM`.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An environment variable could not be read.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
