//! Chore entity - A recurring or one-off household task.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How often a chore recurs
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ChoreFrequency {
    /// Every day
    #[sea_orm(string_value = "Daily")]
    Daily,
    /// Every week
    #[sea_orm(string_value = "Weekly")]
    Weekly,
    /// Every month
    #[sea_orm(string_value = "Monthly")]
    Monthly,
    /// A single occurrence
    #[sea_orm(string_value = "Once")]
    Once,
}

/// Chore database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chores")]
pub struct Model {
    /// Unique identifier for the chore
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Short name (e.g., "Wash Dishes")
    pub name: String,
    /// Optional longer explanation
    pub description: Option<String>,
    /// Recurrence
    pub frequency: ChoreFrequency,
    /// Member responsible, if assigned
    pub assigned_to: Option<String>,
    /// When the chore is due, if scheduled
    pub due_date: Option<DateTimeUtc>,
    /// Whether the chore has been done
    pub completed: bool,
    /// Member who completed it
    pub completed_by: Option<String>,
    /// When it was completed
    pub completed_at: Option<DateTimeUtc>,
    /// When the chore was created
    pub created_at: DateTimeUtc,
}

/// `Chore` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
