//! Member business logic - household membership.
//!
//! Members are immutable once created. Removal is only allowed while nothing in the ledger
//! references the member, otherwise their balance history would silently disappear.

use crate::{
    config::household::MemberConfig,
    entities::{Expense, ExpenseShare, Member, Payment, expense, expense_share, member, payment},
    errors::{Error, Result},
};
use sea_orm::{Condition, QueryOrder, Set, prelude::*};
use tracing::info;

/// Adds a member to the household.
///
/// The id and name are trimmed and must not be empty.
///
/// # Errors
/// * [`Error::Config`] for an empty id or name
/// * [`Error::DuplicateMember`] if the id is already taken
pub async fn add_member<C>(
    db: &C,
    id: &str,
    name: &str,
    email: &str,
    role: member::MemberRole,
) -> Result<member::Model>
where
    C: ConnectionTrait,
{
    let id = id.trim();
    let name = name.trim();
    if id.is_empty() {
        return Err(Error::Config {
            message: "Member id cannot be empty".to_string(),
        });
    }
    if name.is_empty() {
        return Err(Error::Config {
            message: "Member name cannot be empty".to_string(),
        });
    }

    if Member::find_by_id(id).one(db).await?.is_some() {
        return Err(Error::DuplicateMember {
            member_id: id.to_string(),
        });
    }

    let model = member::ActiveModel {
        id: Set(id.to_string()),
        name: Set(name.to_string()),
        email: Set(email.trim().to_string()),
        role: Set(role),
        joined_at: Set(chrono::Utc::now()),
    };
    let result = model.insert(db).await?;

    info!(member_id = %result.id, "Added household member");
    Ok(result)
}

/// Finds a member by id, returning None if absent.
pub async fn get_member_by_id<C>(db: &C, member_id: &str) -> Result<Option<member::Model>>
where
    C: ConnectionTrait,
{
    Member::find_by_id(member_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every household member, ordered alphabetically by name.
pub async fn get_all_members<C>(db: &C) -> Result<Vec<member::Model>>
where
    C: ConnectionTrait,
{
    Member::find()
        .order_by_asc(member::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Ensures every id in `member_ids` names an existing member.
///
/// # Errors
/// [`Error::UnknownMember`] naming the first id that does not exist.
pub async fn ensure_members_exist<C>(db: &C, member_ids: &[&str]) -> Result<()>
where
    C: ConnectionTrait,
{
    for member_id in member_ids {
        if Member::find_by_id(*member_id).one(db).await?.is_none() {
            return Err(Error::UnknownMember {
                member_id: (*member_id).to_string(),
            });
        }
    }
    Ok(())
}

/// Inserts configured members that are not in the database yet.
///
/// Existing members are left untouched. Returns how many members were added.
pub async fn seed_members<C>(db: &C, members: &[MemberConfig]) -> Result<usize>
where
    C: ConnectionTrait,
{
    let mut added = 0;
    for config in members {
        if get_member_by_id(db, &config.id).await?.is_some() {
            continue;
        }
        add_member(db, &config.id, &config.name, &config.email, config.role).await?;
        added += 1;
    }
    info!("Seeded {} new household members", added);
    Ok(added)
}

/// Removes a member who has no ledger history.
///
/// # Errors
/// * [`Error::MemberNotFound`] if no member has this id
/// * [`Error::MemberInUse`] if an expense, share or payment still references the member
pub async fn remove_member<C>(db: &C, member_id: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let model = Member::find_by_id(member_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::MemberNotFound {
            member_id: member_id.to_string(),
        })?;

    let paid = Expense::find()
        .filter(expense::Column::PayerId.eq(member_id))
        .count(db)
        .await?;
    let shared = ExpenseShare::find()
        .filter(expense_share::Column::MemberId.eq(member_id))
        .count(db)
        .await?;
    let payments = Payment::find()
        .filter(
            Condition::any()
                .add(payment::Column::FromMemberId.eq(member_id))
                .add(payment::Column::ToMemberId.eq(member_id)),
        )
        .count(db)
        .await?;

    if paid + shared + payments > 0 {
        return Err(Error::MemberInUse {
            member_id: member_id.to_string(),
        });
    }

    model.delete(db).await?;
    info!(member_id, "Removed household member");
    Ok(())
}
