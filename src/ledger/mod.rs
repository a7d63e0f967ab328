//! Validated writes into the ledger and the expense aggregation the budget
//! checks are built on.

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;

use crate::db::LedgerStore;
use crate::error::{LedgerError, Result, StorageError};
use crate::models::{Budget, Transaction, TransactionType};

/// Record a transaction stamped with the current UTC time.
pub(crate) fn add_transaction<S: LedgerStore>(
    store: &mut S,
    user_id: i64,
    category: &str,
    amount: Decimal,
    kind: &str,
) -> Result<Transaction> {
    add_transaction_at(store, user_id, category, amount, kind, Utc::now())
}

/// Record a transaction with an explicit timestamp (backdated entries).
/// Sub-second precision is dropped so the returned value matches what a later read yields.
pub(crate) fn add_transaction_at<S: LedgerStore>(
    store: &mut S,
    user_id: i64,
    category: &str,
    amount: Decimal,
    kind: &str,
    timestamp: DateTime<Utc>,
) -> Result<Transaction> {
    let category = validate_category(category)?;
    validate_amount(amount)?;
    let kind = TransactionType::parse(kind)?;

    let mut txn = Transaction::new(user_id, category, amount, kind, timestamp.trunc_subsecs(0));
    txn.id = Some(store.insert_transaction(&txn)?);
    Ok(txn)
}

/// Append a budget row. An existing budget for the same category is left in
/// place; the evaluator uses the newest one.
pub(crate) fn set_budget<S: LedgerStore>(
    store: &mut S,
    user_id: i64,
    category: &str,
    amount: Decimal,
) -> Result<Budget> {
    let category = validate_category(category)?;
    validate_amount(amount)?;

    let mut budget = Budget::new(user_id, category, amount);
    budget.id = Some(store.insert_budget(&budget)?);
    Ok(budget)
}

pub(crate) fn list_transactions<S: LedgerStore>(
    store: &S,
    user_id: i64,
    category: Option<&str>,
) -> Result<Vec<Transaction>> {
    store.transactions(user_id, category.map(str::trim))
}

pub(crate) fn list_budgets<S: LedgerStore>(
    store: &S,
    user_id: i64,
    category: Option<&str>,
) -> Result<Vec<Budget>> {
    store.budgets(user_id, category.map(str::trim))
}

/// Sum of expense amounts for one category, read fresh from the store.
/// Income never counts against a budget.
pub(crate) fn expense_total<S: LedgerStore>(
    store: &S,
    user_id: i64,
    category: &str,
) -> Result<Decimal> {
    let txns = store.transactions(user_id, Some(category.trim()))?;
    sum_expenses(&txns, category.trim())
}

pub(crate) fn sum_expenses(txns: &[Transaction], category: &str) -> Result<Decimal> {
    txns.iter()
        .filter(|t| t.is_expense() && t.category == category)
        .try_fold(Decimal::ZERO, |acc, t| checked_add(acc, t.amount, "expense"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub count: usize,
}

impl Totals {
    pub(crate) fn of<'a>(txns: impl IntoIterator<Item = &'a Transaction>) -> Result<Self> {
        txns.into_iter().try_fold(Self::default(), |mut acc, t| {
            match t.kind {
                TransactionType::Income => {
                    acc.income = checked_add(acc.income, t.amount, "income")?;
                }
                TransactionType::Expense => {
                    acc.expense = checked_add(acc.expense, t.amount, "expense")?;
                }
            }
            acc.count += 1;
            Ok(acc)
        })
    }

    pub(crate) fn net(&self) -> Decimal {
        self.income - self.expense
    }
}

fn validate_category(category: &str) -> Result<String> {
    let trimmed = category.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation("category cannot be empty".into()));
    }
    Ok(trimmed.to_string())
}

/// Largest amount accepted for a single transaction or budget.
pub(crate) const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

// Amounts land in a NUMERIC column that SQLite may keep as a double, so
// anything wider than cents below a trillion would not read back exactly.
fn validate_amount(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "amount must not be negative, got {amount}"
        )));
    }
    if amount.normalize().scale() > 2 {
        return Err(LedgerError::Validation(format!(
            "amount must have at most 2 decimal places, got {amount}"
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(LedgerError::Validation(format!(
            "amount must not exceed {MAX_AMOUNT}, got {amount}"
        )));
    }
    Ok(())
}

fn checked_add(total: Decimal, amount: Decimal, what: &'static str) -> Result<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| StorageError::Overflow(what).into())
}
