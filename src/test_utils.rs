//! Shared test utilities for `HomeHarmony`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test members and expenses with sensible defaults.

use crate::{
    core::{
        expense::{self, ExpenseWithShares, NewExpense, Split},
        member,
    },
    entities,
    errors::Result,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Routes `tracing` output to the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Creates a test member with sensible defaults.
///
/// # Defaults
/// * `email`: "<id>@example.com"
/// * `role`: Member
pub async fn create_test_member(
    db: &DatabaseConnection,
    id: &str,
    name: &str,
) -> Result<entities::member::Model> {
    member::add_member(
        db,
        id,
        name,
        &format!("{id}@example.com"),
        entities::member::MemberRole::Member,
    )
    .await
}

/// Sets up a database with the three-person household most tests use.
///
/// * `user1` "Alice Wonderland" (owner)
/// * `user2` "Bob The Builder"
/// * `user3` "Charlie Brown"
pub async fn setup_household() -> Result<(DatabaseConnection, Vec<entities::member::Model>)> {
    init_test_tracing();
    let db = setup_test_db().await?;
    let owner = member::add_member(
        &db,
        "user1",
        "Alice Wonderland",
        "alice@example.com",
        entities::member::MemberRole::Owner,
    )
    .await?;
    let bob = create_test_member(&db, "user2", "Bob The Builder").await?;
    let charlie = create_test_member(&db, "user3", "Charlie Brown").await?;
    Ok((db, vec![owner, bob, charlie]))
}

/// Logs an equally split expense dated now.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    payer_id: &str,
    amount: f64,
    participants: &[&str],
) -> Result<ExpenseWithShares> {
    expense::create_expense(
        db,
        NewExpense {
            description: "Test expense".to_string(),
            amount,
            payer_id: payer_id.to_string(),
            category: None,
            date: Utc::now(),
            split: Split::Equal(participants.iter().map(ToString::to_string).collect()),
        },
    )
    .await
}
