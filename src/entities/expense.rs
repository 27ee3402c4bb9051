//! Expense entity - A shared purchase paid by one member.
//!
//! The split itself lives in `expense_shares`; one row per participant.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// What was bought (e.g., "Internet Bill")
    pub description: String,
    /// Total amount paid in dollars
    pub amount: f64,
    /// Member who paid
    pub payer_id: String,
    /// Optional grouping such as "Food" or "Utilities"
    pub category: Option<String>,
    /// Whether the shares were produced by an equal split
    pub is_equal_split: bool,
    /// When the expense happened
    pub date: DateTimeUtc,
    /// When the expense was logged
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each expense is paid by one member
    #[sea_orm(
        belongs_to = "super::member::Entity",
        from = "Column::PayerId",
        to = "super::member::Column::Id"
    )]
    Payer,
    /// One expense has many shares
    #[sea_orm(has_many = "super::expense_share::Entity")]
    Shares,
}

impl Related<super::member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payer.def()
    }
}

impl Related<super::expense_share::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
