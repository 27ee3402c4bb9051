//! Payment entity - A settlement that one member actually paid another.
//!
//! Payments are folded into balances after expenses, so paying a suggested settlement
//! clears it from the next report.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Member who paid
    pub from_member_id: String,
    /// Member who received the money
    pub to_member_id: String,
    /// Amount in dollars
    pub amount: f64,
    /// When the payment was made
    pub timestamp: DateTimeUtc,
}

/// `Payment` references members by id but declares no foreign keys
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
