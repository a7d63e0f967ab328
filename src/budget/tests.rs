#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::db::memory::{FailingStore, MemoryStore};
use crate::db::Database;
use crate::error::LedgerError;
use crate::ledger::{add_transaction, set_budget};
use crate::models::TransactionType;

// ── evaluate ──────────────────────────────────────────────────

#[test]
fn test_evaluate_no_budget() {
    assert_eq!(evaluate(dec!(500), None), Verdict::NoBudget);
    assert_eq!(evaluate(Decimal::ZERO, None), Verdict::NoBudget);
}

#[test]
fn test_evaluate_equal_is_within() {
    assert_eq!(evaluate(dec!(3000), Some(dec!(3000))), Verdict::WithinBudget);
    assert_eq!(evaluate(dec!(3000.00), Some(dec!(3000))), Verdict::WithinBudget);
}

#[test]
fn test_evaluate_strictly_greater_exceeds() {
    assert_eq!(
        evaluate(dec!(3000.01), Some(dec!(3000))),
        Verdict::BudgetExceeded
    );
    assert_eq!(evaluate(dec!(0.01), Some(Decimal::ZERO)), Verdict::BudgetExceeded);
}

#[test]
fn test_evaluate_under() {
    assert_eq!(evaluate(dec!(10), Some(dec!(20))), Verdict::WithinBudget);
    assert_eq!(evaluate(Decimal::ZERO, Some(Decimal::ZERO)), Verdict::WithinBudget);
}

// ── effective_budget ──────────────────────────────────────────

#[test]
fn test_effective_budget_highest_id_wins() {
    let budgets = vec![
        Budget {
            id: Some(7),
            user_id: 1,
            category: "Food".into(),
            amount: dec!(200),
        },
        Budget {
            id: Some(3),
            user_id: 1,
            category: "Food".into(),
            amount: dec!(100),
        },
        Budget {
            id: Some(9),
            user_id: 1,
            category: "Rent".into(),
            amount: dec!(900),
        },
    ];
    let chosen = effective_budget(&budgets, "Food").unwrap();
    assert_eq!(chosen.id, Some(7));
    assert_eq!(chosen.amount, dec!(200));
    assert!(effective_budget(&budgets, "Travel").is_none());
}

// ── check_budget ──────────────────────────────────────────────

#[test]
fn test_groceries_scenario_exceeded() {
    let mut db = Database::open_in_memory().unwrap();
    set_budget(&mut db, 1, "Groceries", dec!(3000)).unwrap();
    add_transaction(&mut db, 1, "Groceries", dec!(1500), "Expense").unwrap();
    add_transaction(&mut db, 1, "Groceries", dec!(2000), "Expense").unwrap();

    let check = check_budget(&db, 1).unwrap();
    let groceries = check.get("Groceries").unwrap();
    assert_eq!(groceries.expense_total, dec!(3500));
    assert_eq!(groceries.budget_amount, Some(dec!(3000)));
    assert_eq!(groceries.verdict, Verdict::BudgetExceeded);
    assert!(groceries
        .message
        .as_deref()
        .unwrap()
        .contains("⚠️ Budget exceeded for Groceries"));
    assert!(!check.all_within());
}

#[test]
fn test_food_without_budget_is_no_budget() {
    let mut db = Database::open_in_memory().unwrap();
    add_transaction(&mut db, 1, "Food", dec!(500), "Expense").unwrap();

    let check = check_budget(&db, 1).unwrap();
    let food = check.get("Food").unwrap();
    assert_eq!(food.verdict, Verdict::NoBudget);
    assert_eq!(food.expense_total, dec!(500));
    assert!(food.budget_amount.is_none());
    assert!(food.message.is_none());
    assert!(!check.has_budgets());
}

#[test]
fn test_budget_without_transactions_is_within() {
    let mut store = MemoryStore::default();
    set_budget(&mut store, 1, "Travel", dec!(400)).unwrap();

    let check = check_budget(&store, 1).unwrap();
    let travel = check.get("Travel").unwrap();
    assert_eq!(travel.expense_total, Decimal::ZERO);
    assert_eq!(travel.verdict, Verdict::WithinBudget);
    assert!(travel
        .message
        .as_deref()
        .unwrap()
        .starts_with("✅ Within budget for Travel"));
}

#[test]
fn test_exact_spend_is_within_budget() {
    let mut store = MemoryStore::default();
    set_budget(&mut store, 1, "Rent", dec!(1200)).unwrap();
    add_transaction(&mut store, 1, "Rent", dec!(1200), "Expense").unwrap();

    let check = check_budget(&store, 1).unwrap();
    assert_eq!(check.get("Rent").unwrap().verdict, Verdict::WithinBudget);
    assert!(check.all_within());
}

#[test]
fn test_income_does_not_count_against_budget() {
    let mut store = MemoryStore::default();
    set_budget(&mut store, 1, "Freelance", dec!(100)).unwrap();
    add_transaction(&mut store, 1, "Freelance", dec!(5000), "Income").unwrap();

    let check = check_budget(&store, 1).unwrap();
    let status = check.get("Freelance").unwrap();
    assert_eq!(status.expense_total, Decimal::ZERO);
    assert_eq!(status.verdict, Verdict::WithinBudget);
}

#[test]
fn test_later_budget_wins_consistently() {
    let mut db = Database::open_in_memory().unwrap();
    set_budget(&mut db, 1, "Food", dec!(100)).unwrap();
    set_budget(&mut db, 1, "Food", dec!(1000)).unwrap();
    add_transaction(&mut db, 1, "Food", dec!(500), "Expense").unwrap();

    for _ in 0..5 {
        let check = check_budget(&db, 1).unwrap();
        let food = check.get("Food").unwrap();
        assert_eq!(food.budget_amount, Some(dec!(1000)));
        assert_eq!(food.verdict, Verdict::WithinBudget);
    }

    // A later, lower budget flips the verdict
    set_budget(&mut db, 1, "Food", dec!(50)).unwrap();
    let food = check_category(&db, 1, "Food").unwrap();
    assert_eq!(food.budget_amount, Some(dec!(50)));
    assert_eq!(food.verdict, Verdict::BudgetExceeded);
}

#[test]
fn test_categories_from_both_sources_sorted() {
    let mut store = MemoryStore::default();
    set_budget(&mut store, 1, "Utilities", dec!(80)).unwrap();
    add_transaction(&mut store, 1, "Food", dec!(5), "Expense").unwrap();
    add_transaction(&mut store, 1, "Salary", dec!(2000), "Income").unwrap();
    set_budget(&mut store, 2, "Hidden", dec!(1)).unwrap();

    let check = check_budget(&store, 1).unwrap();
    let names: Vec<&str> = check.statuses.iter().map(|s| s.category.as_str()).collect();
    assert_eq!(names, vec!["Food", "Salary", "Utilities"]);
}

#[test]
fn test_users_are_isolated() {
    let mut store = MemoryStore::default();
    set_budget(&mut store, 1, "Food", dec!(10)).unwrap();
    add_transaction(&mut store, 2, "Food", dec!(999), "Expense").unwrap();

    let check = check_budget(&store, 1).unwrap();
    assert_eq!(check.get("Food").unwrap().expense_total, Decimal::ZERO);
    assert!(check_budget(&store, 3).unwrap().statuses.is_empty());
}

#[test]
fn test_check_budget_is_idempotent() {
    let mut db = Database::open_in_memory().unwrap();
    set_budget(&mut db, 1, "Food", dec!(100)).unwrap();
    add_transaction(&mut db, 1, "Food", dec!(60), "Expense").unwrap();
    add_transaction(&mut db, 1, "Fun", dec!(60), "Expense").unwrap();

    let first = check_budget(&db, 1).unwrap();
    let second = check_budget(&db, 1).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_check_category_matches_check_budget() {
    let mut store = MemoryStore::default();
    set_budget(&mut store, 1, "Food", dec!(100)).unwrap();
    add_transaction(&mut store, 1, "Food", dec!(150), "Expense").unwrap();

    let single = check_category(&store, 1, "Food").unwrap();
    let all = check_budget(&store, 1).unwrap();
    assert_eq!(Some(&single), all.get("Food"));
}

#[test]
fn test_check_budget_propagates_storage_error() {
    let store = FailingStore::default();
    assert!(matches!(
        check_budget(&store, 1).unwrap_err(),
        LedgerError::Storage(_)
    ));
}

// ── BudgetStatus ──────────────────────────────────────────────

#[test]
fn test_usage_ratio() {
    let mut store = MemoryStore::default();
    set_budget(&mut store, 1, "Food", dec!(200)).unwrap();
    set_budget(&mut store, 1, "Free", Decimal::ZERO).unwrap();
    add_transaction(&mut store, 1, "Food", dec!(50), "Expense").unwrap();
    add_transaction(&mut store, 1, "Other", dec!(50), "Expense").unwrap();

    let check = check_budget(&store, 1).unwrap();
    assert_eq!(check.get("Food").unwrap().usage(), Some(dec!(0.25)));
    assert_eq!(check.get("Free").unwrap().usage(), None);
    assert_eq!(check.get("Other").unwrap().usage(), None);
}

#[test]
fn test_usage_none_when_ratio_overflows() {
    let status = BudgetStatus::new("Tiny", dec!(999999999999.99), Some(Decimal::new(1, 28)));
    assert_eq!(status.verdict, Verdict::BudgetExceeded);
    assert_eq!(status.usage(), None);
}

#[test]
fn test_oversized_legacy_rows_fail_check_without_panic() {
    let when = chrono::Utc::now();
    let big = dec!(50000000000000000000000000000);
    let txns = vec![
        Transaction::new(1, "Rent".into(), big, TransactionType::Expense, when),
        Transaction::new(1, "Rent".into(), big, TransactionType::Expense, when),
    ];
    let err = check_ledger(&txns, &[]).unwrap_err();
    assert!(matches!(
        err,
        LedgerError::Storage(crate::error::StorageError::Overflow(_))
    ));
}

#[test]
fn test_message_keeps_sub_cent_difference_visible() {
    let when = chrono::Utc::now();
    let txns = vec![Transaction::new(
        1,
        "Rent".into(),
        dec!(100.004),
        TransactionType::Expense,
        when,
    )];
    let mut budget = Budget::new(1, "Rent".into(), dec!(100));
    budget.id = Some(1);

    let check = check_ledger(&txns, &[budget]).unwrap();
    let rent = check.get("Rent").unwrap();
    assert_eq!(rent.verdict, Verdict::BudgetExceeded);
    assert_eq!(
        rent.message.as_deref(),
        Some("⚠️ Budget exceeded for Rent: spent 100.004, budget 100.00")
    );
}

#[test]
fn test_verdict_display() {
    assert_eq!(Verdict::BudgetExceeded.to_string(), "Budget exceeded");
    assert_eq!(Verdict::WithinBudget.to_string(), "Within budget");
    assert_eq!(Verdict::NoBudget.to_string(), "No budget");
}
