//! Member entity - A roommate belonging to the household.
//!
//! Members are keyed by a caller-chosen string id (e.g. `"user1"`) rather than an
//! auto-increment integer, so the same id can be used in config, expenses and payments.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Household role of a member
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum MemberRole {
    /// Created the household and manages membership
    #[sea_orm(string_value = "Owner")]
    Owner,
    /// Regular roommate
    #[default]
    #[sea_orm(string_value = "Member")]
    Member,
}

/// Member database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    /// Unique member identifier
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name (e.g., "Alice Wonderland")
    pub name: String,
    /// Contact email
    pub email: String,
    /// Owner or regular member
    pub role: MemberRole,
    /// When the member joined the household
    pub joined_at: DateTimeUtc,
}

impl Model {
    /// First word of the display name, used in short calendar titles.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or(&self.name)
    }
}

/// Defines relationships between Member and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One member pays many expenses
    #[sea_orm(has_many = "super::expense::Entity")]
    PaidExpenses,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaidExpenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
