//! Payment business logic - recording settlements that were actually paid.

use crate::{
    core::{ledger::SettlementTransfer, member::ensure_members_exist},
    entities::{Payment, payment},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::info;

impl From<&payment::Model> for SettlementTransfer {
    fn from(model: &payment::Model) -> Self {
        Self {
            from_member_id: model.from_member_id.clone(),
            to_member_id: model.to_member_id.clone(),
            amount: model.amount,
        }
    }
}

/// Records that `from_member_id` paid `to_member_id`.
///
/// # Errors
/// * [`Error::InvalidAmount`] if the amount is not a positive finite number
/// * [`Error::InvalidPayment`] if a member would pay themselves
/// * [`Error::UnknownMember`] if either member does not exist
pub async fn record_payment<C>(
    db: &C,
    from_member_id: &str,
    to_member_id: &str,
    amount: f64,
    timestamp: DateTime<Utc>,
) -> Result<payment::Model>
where
    C: ConnectionTrait,
{
    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    if from_member_id == to_member_id {
        return Err(Error::InvalidPayment {
            message: format!("{from_member_id} cannot pay themselves"),
        });
    }
    ensure_members_exist(db, &[from_member_id, to_member_id]).await?;

    let result = payment::ActiveModel {
        from_member_id: Set(from_member_id.to_string()),
        to_member_id: Set(to_member_id.to_string()),
        amount: Set(amount),
        timestamp: Set(timestamp),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(
        payment_id = result.id,
        from = from_member_id,
        to = to_member_id,
        amount,
        "Recorded payment"
    );
    Ok(result)
}

/// Retrieves every recorded payment, oldest first.
pub async fn get_all_payments<C>(db: &C) -> Result<Vec<payment::Model>>
where
    C: ConnectionTrait,
{
    Payment::find()
        .order_by_asc(payment::Column::Timestamp)
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Loads recorded payments as transfers for [`crate::core::ledger::apply_payments`].
pub async fn load_ledger_payments<C>(db: &C) -> Result<Vec<SettlementTransfer>>
where
    C: ConnectionTrait,
{
    Ok(get_all_payments(db)
        .await?
        .iter()
        .map(SettlementTransfer::from)
        .collect())
}
