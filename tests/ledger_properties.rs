#![allow(clippy::unwrap_used)]

use home_harmony::core::{
    ledger::{self, Balances, Expense, ExpenseShare},
    split,
};
use proptest::prelude::*;

const REPLAY_TOLERANCE: f64 = 0.005;

fn member_ids(member_count: usize) -> Vec<String> {
    (1..=member_count).map(|idx| format!("user{idx}")).collect()
}

/// Builds equally split expenses from raw strategy output. Amounts are whole cents so
/// every share sum is exact.
fn build_expenses(
    members: &[String],
    amounts: &[u64],
    payer_indexes: &[usize],
    participant_masks: &[usize],
) -> Vec<Expense> {
    amounts
        .iter()
        .enumerate()
        .map(|(idx, cents)| {
            let payer = &members[payer_indexes.get(idx).copied().unwrap_or(0) % members.len()];
            let mask = participant_masks.get(idx).copied().unwrap_or(1);
            let mut participants: Vec<&str> = members
                .iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, id)| id.as_str())
                .collect();
            if participants.is_empty() {
                participants.push(members[0].as_str());
            }

            #[allow(clippy::cast_precision_loss)]
            let amount = *cents as f64 / 100.0;
            Expense {
                id: format!("e{idx}"),
                payer_id: payer.clone(),
                amount,
                shares: split::equal_split(amount, &participants).unwrap(),
            }
        })
        .collect()
}

fn positive_total(balances: &Balances) -> f64 {
    balances
        .iter()
        .map(|(_, amount)| amount)
        .filter(|amount| *amount > 0.0)
        .sum()
}

proptest! {
    #[test]
    fn balances_conserve_money(
        member_count in 1usize..=6,
        amounts in prop::collection::vec(1u64..=100_000, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=5, 0..=30),
        participant_masks in prop::collection::vec(1usize..=63, 0..=30),
    ) {
        let members = member_ids(member_count);
        let expenses = build_expenses(&members, &amounts, &payer_indexes, &participant_masks);

        ledger::validate_expenses(&expenses).unwrap();
        let balances = ledger::compute_balances(&members, &expenses).unwrap();
        prop_assert_eq!(balances.len(), member_count);
        prop_assert!(balances.total().abs() < ledger::TOLERANCE);
    }
}

proptest! {
    #[test]
    fn settlements_replay_to_balances(
        member_count in 1usize..=6,
        amounts in prop::collection::vec(1u64..=100_000, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=5, 0..=30),
        participant_masks in prop::collection::vec(1usize..=63, 0..=30),
    ) {
        let members = member_ids(member_count);
        let expenses = build_expenses(&members, &amounts, &payer_indexes, &participant_masks);
        let balances = ledger::compute_balances(&members, &expenses).unwrap();

        let transfers = ledger::compute_settlements(&balances).unwrap();
        let replayed = ledger::replay_transfers(&transfers);

        for (member_id, amount) in balances.iter() {
            let replayed_amount = replayed.get(member_id).unwrap_or(0.0);
            prop_assert!(
                (replayed_amount - amount).abs() <= REPLAY_TOLERANCE,
                "{} expected {} got {}",
                member_id,
                amount,
                replayed_amount
            );
        }

        let non_zero = balances
            .iter()
            .filter(|(_, amount)| amount.abs() > ledger::TOLERANCE)
            .count();
        prop_assert!(transfers.len() <= non_zero.saturating_sub(1));
        prop_assert!(transfers.iter().all(|t| t.amount > 0.0 && t.from_member_id != t.to_member_id));
    }
}

proptest! {
    #[test]
    fn expense_order_does_not_matter(
        member_count in 2usize..=6,
        amounts in prop::collection::vec(1u64..=100_000, 1..=20),
        payer_indexes in prop::collection::vec(0usize..=5, 1..=20),
        participant_masks in prop::collection::vec(1usize..=63, 1..=20),
    ) {
        let members = member_ids(member_count);
        let expenses = build_expenses(&members, &amounts, &payer_indexes, &participant_masks);
        let mut reversed = expenses.clone();
        reversed.reverse();

        let forward = ledger::compute_balances(&members, &expenses).unwrap();
        let backward = ledger::compute_balances(&members, &reversed).unwrap();
        for (member_id, amount) in forward.iter() {
            prop_assert!((backward.get(member_id).unwrap() - amount).abs() < ledger::TOLERANCE);
        }

        // Every creditor is paid exactly once in full, so the moved volume is fixed
        let moved = |balances: &Balances| -> f64 {
            ledger::compute_settlements(balances)
                .unwrap()
                .iter()
                .map(|t| t.amount)
                .sum()
        };
        prop_assert!((moved(&forward) - positive_total(&forward)).abs() < 0.01 * member_count as f64);
        prop_assert!((moved(&forward) - moved(&backward)).abs() < 0.01 * member_count as f64);
    }
}

proptest! {
    #[test]
    fn settled_ledger_needs_no_more_transfers(
        member_count in 1usize..=6,
        amounts in prop::collection::vec(1u64..=100_000, 0..=30),
        payer_indexes in prop::collection::vec(0usize..=5, 0..=30),
        participant_masks in prop::collection::vec(1usize..=63, 0..=30),
    ) {
        let members = member_ids(member_count);
        let expenses = build_expenses(&members, &amounts, &payer_indexes, &participant_masks);
        let balances = ledger::compute_balances(&members, &expenses).unwrap();
        let transfers = ledger::compute_settlements(&balances).unwrap();

        let settled = ledger::apply_payments(balances, &transfers).unwrap();
        prop_assert!(settled.is_settled());
        prop_assert!(ledger::compute_settlements(&settled).unwrap().is_empty());
    }
}

/// Builds custom-split expenses whose shares are in tenths of a cent, as a ledger filled
/// from hand-typed or imported amounts can be. Each total is the exact sum of its shares.
fn build_fractional_expenses(
    members: &[String],
    share_mills: &[Vec<u64>],
    payer_indexes: &[usize],
) -> Vec<Expense> {
    share_mills
        .iter()
        .enumerate()
        .map(|(idx, mills)| {
            let payer = &members[payer_indexes.get(idx).copied().unwrap_or(0) % members.len()];
            #[allow(clippy::cast_precision_loss)]
            let shares: Vec<ExpenseShare> = mills
                .iter()
                .zip(members)
                .map(|(mill, member_id)| ExpenseShare::new(member_id.clone(), *mill as f64 / 1000.0))
                .collect();
            Expense {
                id: format!("e{idx}"),
                payer_id: payer.clone(),
                amount: shares.iter().map(|share| share.amount).sum(),
                shares,
            }
        })
        .collect()
}

proptest! {
    #[test]
    fn fractional_cent_balances_settle_within_a_cent(
        member_count in 2usize..=8,
        share_mills in prop::collection::vec(prop::collection::vec(0u64..=50_000, 8), 1..=20),
        payer_indexes in prop::collection::vec(0usize..=7, 1..=20),
    ) {
        let members = member_ids(member_count);
        let expenses = build_fractional_expenses(&members, &share_mills, &payer_indexes);
        let balances = ledger::compute_balances(&members, &expenses).unwrap();

        let transfers = ledger::compute_settlements(&balances).unwrap();
        let replayed = ledger::replay_transfers(&transfers);

        let mut net_cents = 0_i64;
        for (member_id, amount) in balances.iter() {
            let replayed_amount = replayed.get(member_id).unwrap_or(0.0);
            prop_assert!(
                (replayed_amount - amount).abs() < 0.01,
                "{} expected {} got {}",
                member_id,
                amount,
                replayed_amount
            );
            net_cents += ledger::to_cents(replayed_amount);
        }
        prop_assert_eq!(net_cents, 0);
        prop_assert!(transfers.len() < member_count);
        prop_assert!(transfers.iter().all(|t| ledger::to_cents(t.amount) > 0));
    }
}

#[test]
fn zero_balances_need_no_transfers() {
    let balances: Balances = member_ids(4).into_iter().map(|id| (id, 0.0)).collect();
    assert!(ledger::compute_settlements(&balances).unwrap().is_empty());
}
