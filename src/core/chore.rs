//! Chore business logic - creating, assigning and completing household chores.

use crate::{
    core::member::ensure_members_exist,
    entities::{Chore, chore},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{IntoActiveModel, QueryOrder, Set, prelude::*};
use tracing::info;

/// Input for [`create_chore`].
#[derive(Debug, Clone)]
pub struct NewChore {
    /// Short name
    pub name: String,
    /// Optional details
    pub description: Option<String>,
    /// Recurrence
    pub frequency: chore::ChoreFrequency,
    /// Assignee, if known
    pub assigned_to: Option<String>,
    /// Due date, if scheduled
    pub due_date: Option<DateTime<Utc>>,
}

/// Chores split into the three lists a household dashboard shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoreBoard {
    /// Not completed, due now or later, soonest first
    pub upcoming: Vec<chore::Model>,
    /// Not completed and overdue, oldest due date first
    pub past_due: Vec<chore::Model>,
    /// Completed, most recently completed first
    pub completed: Vec<chore::Model>,
}

/// Creates a new, incomplete chore.
///
/// # Errors
/// * [`Error::Config`] for an empty name
/// * [`Error::UnknownMember`] if the assignee does not exist
pub async fn create_chore<C>(db: &C, new_chore: NewChore) -> Result<chore::Model>
where
    C: ConnectionTrait,
{
    if new_chore.name.trim().is_empty() {
        return Err(Error::Config {
            message: "Chore name cannot be empty".to_string(),
        });
    }
    if let Some(assignee) = new_chore.assigned_to.as_deref() {
        ensure_members_exist(db, &[assignee]).await?;
    }

    let result = chore::ActiveModel {
        name: Set(new_chore.name.trim().to_string()),
        description: Set(new_chore.description.filter(|d| !d.trim().is_empty())),
        frequency: Set(new_chore.frequency),
        assigned_to: Set(new_chore.assigned_to),
        due_date: Set(new_chore.due_date),
        completed: Set(false),
        completed_by: Set(None),
        completed_at: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(chore_id = result.id, name = %result.name, "Created chore");
    Ok(result)
}

/// Retrieves every chore in creation order.
pub async fn get_all_chores<C>(db: &C) -> Result<Vec<chore::Model>>
where
    C: ConnectionTrait,
{
    Chore::find()
        .order_by_asc(chore::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn find_chore<C>(db: &C, chore_id: i64) -> Result<chore::Model>
where
    C: ConnectionTrait,
{
    Chore::find_by_id(chore_id)
        .one(db)
        .await?
        .ok_or(Error::ChoreNotFound { chore_id })
}

/// Assigns a chore to a member, or clears the assignee with `None`.
pub async fn assign_chore<C>(db: &C, chore_id: i64, member_id: Option<&str>) -> Result<chore::Model>
where
    C: ConnectionTrait,
{
    let existing = find_chore(db, chore_id).await?;
    if let Some(member_id) = member_id {
        ensure_members_exist(db, &[member_id]).await?;
    }

    let mut active = existing.into_active_model();
    active.assigned_to = Set(member_id.map(ToString::to_string));
    let updated = active.update(db).await?;

    info!(chore_id, assignee = ?updated.assigned_to, "Assigned chore");
    Ok(updated)
}

/// Marks a chore done by `member_id` at `at`, or reopens it with `None`.
///
/// Reopening clears who completed it and when.
pub async fn set_chore_completion<C>(
    db: &C,
    chore_id: i64,
    completion: Option<(&str, DateTime<Utc>)>,
) -> Result<chore::Model>
where
    C: ConnectionTrait,
{
    let existing = find_chore(db, chore_id).await?;
    let mut active = existing.into_active_model();

    match completion {
        Some((member_id, at)) => {
            ensure_members_exist(db, &[member_id]).await?;
            active.completed = Set(true);
            active.completed_by = Set(Some(member_id.to_string()));
            active.completed_at = Set(Some(at));
        }
        None => {
            active.completed = Set(false);
            active.completed_by = Set(None);
            active.completed_at = Set(None);
        }
    }

    let updated = active.update(db).await?;
    info!(chore_id, completed = updated.completed, "Updated chore completion");
    Ok(updated)
}

/// Sorts chores into upcoming, past-due and completed lists relative to `now`.
///
/// Incomplete chores without a due date appear in neither of the first two lists.
#[must_use]
pub fn partition_chores(chores: Vec<chore::Model>, now: DateTime<Utc>) -> ChoreBoard {
    let mut board = ChoreBoard::default();

    for chore in chores {
        if chore.completed {
            board.completed.push(chore);
            continue;
        }
        let due_date = chore.due_date;
        match due_date {
            Some(due) if due >= now => board.upcoming.push(chore),
            Some(_) => board.past_due.push(chore),
            None => {}
        }
    }

    board.upcoming.sort_by_key(|chore| chore.due_date);
    board.past_due.sort_by_key(|chore| chore.due_date);
    board
        .completed
        .sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    board
}
