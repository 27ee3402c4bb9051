//! Database configuration module for `HomeHarmony`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{Chore, Expense, ExpenseShare, Member, Payment};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use std::path::Path;
use tracing::{debug, info};

/// Default database location, created on first use.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/home_harmony.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back to a
/// local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    if let Some(parent) = sqlite_file_path(&database_url).and_then(Path::parent) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Database::connect(&database_url).await.map_err(Into::into)
}

/// File path of a `sqlite://` URL, without query parameters.
fn sqlite_file_path(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite://")?;
    let path = rest.split('?').next().unwrap_or(rest);
    (!path.is_empty() && !path.starts_with(':')).then(|| Path::new(path))
}

/// Creates all household tables if they do not exist yet.
///
/// Members are created first so the expense foreign keys have a target.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut member_table = schema.create_table_from_entity(Member);
    let mut expense_table = schema.create_table_from_entity(Expense);
    let mut share_table = schema.create_table_from_entity(ExpenseShare);
    let mut payment_table = schema.create_table_from_entity(Payment);
    let mut chore_table = schema.create_table_from_entity(Chore);

    for table in [
        member_table.if_not_exists(),
        expense_table.if_not_exists(),
        share_table.if_not_exists(),
        payment_table.if_not_exists(),
        chore_table.if_not_exists(),
    ] {
        db.execute(builder.build(&*table)).await?;
    }

    info!("Household tables are ready");
    Ok(())
}
