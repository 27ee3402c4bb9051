//! Settlement reports - who owes whom, computed from the stored household ledger.
//!
//! This module loads members, expenses and payments from one consistent snapshot, runs the
//! ledger engine over them, and returns structured data with display names attached. The
//! formatting helpers at the bottom produce the text lines a front end shows.

use crate::{
    config::household::LedgerConfig,
    core::{expense, ledger, member, payment},
    entities::member as member_entity,
    errors::Result,
};
use sea_orm::{DatabaseConnection, TransactionTrait};
use std::collections::HashMap;
use tracing::{debug, info};

/// Knobs for [`generate_settlement_report`].
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    /// Re-check every expense's share sum before computing balances
    pub revalidate_shares: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            revalidate_shares: true,
        }
    }
}

impl From<&LedgerConfig> for ReportOptions {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            revalidate_shares: config.revalidate_shares,
        }
    }
}

/// One member's net position.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberBalance {
    /// Member id
    pub member_id: String,
    /// Display name, or the id when the member is unknown
    pub member_name: String,
    /// Positive: the household owes this member. Negative: this member owes.
    pub amount: f64,
}

/// A suggested transfer with display names attached.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementSuggestion {
    /// Member who should pay
    pub from_member_id: String,
    /// Payer's display name
    pub from_member_name: String,
    /// Member who should receive
    pub to_member_id: String,
    /// Recipient's display name
    pub to_member_name: String,
    /// Amount, rounded to cents
    pub amount: f64,
}

/// Balances and the transfers that would clear them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettlementReport {
    /// One entry per member, ordered by member id
    pub balances: Vec<MemberBalance>,
    /// Minimal list of transfers settling every balance
    pub suggestions: Vec<SettlementSuggestion>,
}

impl SettlementReport {
    /// True when nobody owes anybody.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.suggestions.is_empty()
    }
}

/// Computes the household's current balances and settlement suggestions.
///
/// Payments already recorded are folded in after the expenses, so a payment matching a
/// suggestion removes it from the next report.
///
/// # Errors
/// * [`crate::errors::Error::InvalidShareSum`] if revalidation is enabled and a stored
///   expense is inconsistent
/// * [`crate::errors::Error::UnknownMember`] if a stored row references a missing member
/// * [`crate::errors::Error::UnbalancedLedger`] if the balances do not conserve money
pub async fn generate_settlement_report(
    db: &DatabaseConnection,
    options: ReportOptions,
) -> Result<SettlementReport> {
    // Read everything inside one transaction so the three loads agree with each other
    let txn = db.begin().await?;
    let members = member::get_all_members(&txn).await?;
    let expenses = expense::load_ledger_expenses(&txn).await?;
    let payments = payment::load_ledger_payments(&txn).await?;
    txn.commit().await?;

    debug!(
        members = members.len(),
        expenses = expenses.len(),
        payments = payments.len(),
        "Loaded ledger snapshot"
    );

    if options.revalidate_shares {
        ledger::validate_expenses(&expenses)?;
    }

    let member_ids: Vec<&str> = members.iter().map(|m| m.id.as_str()).collect();
    let balances = ledger::compute_balances(&member_ids, &expenses)?;
    let balances = ledger::apply_payments(balances, &payments)?;
    let transfers = ledger::compute_settlements(&balances)?;

    let report = build_report(&members, &balances, &transfers);
    info!(
        suggestions = report.suggestions.len(),
        "Generated settlement report"
    );
    Ok(report)
}

fn build_report(
    members: &[member_entity::Model],
    balances: &ledger::Balances,
    transfers: &[ledger::SettlementTransfer],
) -> SettlementReport {
    let names: HashMap<&str, &str> = members
        .iter()
        .map(|m| (m.id.as_str(), m.name.as_str()))
        .collect();
    let name_of = |member_id: &str| -> String {
        names.get(member_id).copied().unwrap_or(member_id).to_string()
    };

    let balances = balances
        .iter()
        .map(|(member_id, amount)| MemberBalance {
            member_id: member_id.to_string(),
            member_name: name_of(member_id),
            amount: ledger::round_to_cents(amount),
        })
        .collect();

    let suggestions = transfers
        .iter()
        .map(|transfer| SettlementSuggestion {
            from_member_id: transfer.from_member_id.clone(),
            from_member_name: name_of(&transfer.from_member_id),
            to_member_id: transfer.to_member_id.clone(),
            to_member_name: name_of(&transfer.to_member_id),
            amount: transfer.amount,
        })
        .collect();

    SettlementReport {
        balances,
        suggestions,
    }
}

/// Formats a money amount as dollars with two decimals (e.g., `$20.50`).
#[must_use]
pub fn format_amount(amount: f64) -> String {
    format!("${amount:.2}")
}

/// Formats one balance line, e.g. `Alice Wonderland is owed $65.50`.
#[must_use]
pub fn format_balance(balance: &MemberBalance) -> String {
    if balance.amount > ledger::TOLERANCE {
        format!(
            "{} is owed {}",
            balance.member_name,
            format_amount(balance.amount)
        )
    } else if balance.amount < -ledger::TOLERANCE {
        format!(
            "{} owes {}",
            balance.member_name,
            format_amount(-balance.amount)
        )
    } else {
        format!("{} is settled up", balance.member_name)
    }
}

/// Formats one suggestion, e.g. `Bob The Builder pays Alice Wonderland $10.25`.
#[must_use]
pub fn format_settlement_line(suggestion: &SettlementSuggestion) -> String {
    format!(
        "{} pays {} {}",
        suggestion.from_member_name,
        suggestion.to_member_name,
        format_amount(suggestion.amount)
    )
}
