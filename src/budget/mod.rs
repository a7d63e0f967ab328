//! Budget evaluation: compares accumulated expenses per category with the
//! effective budget and produces a verdict. Nothing here is persisted; every
//! check is computed from the store contents at call time.

use rust_decimal::Decimal;
use std::collections::BTreeSet;

use crate::db::LedgerStore;
use crate::error::Result;
use crate::ledger;
use crate::models::{Budget, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    NoBudget,
    WithinBudget,
    BudgetExceeded,
}

impl Verdict {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::NoBudget => "No budget",
            Self::WithinBudget => "Within budget",
            Self::BudgetExceeded => "Budget exceeded",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Outcome of checking one category.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BudgetStatus {
    pub category: String,
    pub expense_total: Decimal,
    pub budget_amount: Option<Decimal>,
    pub verdict: Verdict,
    pub message: Option<String>,
}

impl BudgetStatus {
    fn new(category: &str, expense_total: Decimal, budget_amount: Option<Decimal>) -> Self {
        let verdict = evaluate(expense_total, budget_amount);
        let spent = money(expense_total);
        let message = budget_amount.map(|limit| {
            let limit = money(limit);
            if verdict == Verdict::BudgetExceeded {
                format!("⚠️ Budget exceeded for {category}: spent {spent}, budget {limit}")
            } else {
                format!("✅ Within budget for {category}: spent {spent}, budget {limit}")
            }
        });
        Self {
            category: category.to_string(),
            expense_total,
            budget_amount,
            verdict,
            message,
        }
    }

    /// Fraction of the budget used, `None` without a budget, with a zero
    /// budget, or when the ratio does not fit in a `Decimal`.
    pub(crate) fn usage(&self) -> Option<Decimal> {
        self.budget_amount
            .filter(|b| !b.is_zero())
            .and_then(|b| self.expense_total.checked_div(b))
    }
}

/// Two decimal places, or every digit when cents would hide the difference.
fn money(amount: Decimal) -> String {
    let amount = amount.normalize();
    if amount.scale() <= 2 {
        format!("{amount:.2}")
    } else {
        amount.to_string()
    }
}

/// Result of `check_budget`: one status per category, sorted by category name.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct BudgetCheck {
    pub statuses: Vec<BudgetStatus>,
}

impl BudgetCheck {
    pub(crate) fn exceeded(&self) -> impl Iterator<Item = &BudgetStatus> {
        self.statuses
            .iter()
            .filter(|s| s.verdict == Verdict::BudgetExceeded)
    }

    pub(crate) fn has_budgets(&self) -> bool {
        self.statuses.iter().any(|s| s.budget_amount.is_some())
    }

    pub(crate) fn all_within(&self) -> bool {
        self.exceeded().next().is_none()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, category: &str) -> Option<&BudgetStatus> {
        self.statuses.iter().find(|s| s.category == category)
    }
}

/// Spending equal to the budget is still within it; exceeding needs strictly more.
pub(crate) fn evaluate(expense_total: Decimal, budget_amount: Option<Decimal>) -> Verdict {
    match budget_amount {
        None => Verdict::NoBudget,
        Some(limit) if expense_total > limit => Verdict::BudgetExceeded,
        Some(_) => Verdict::WithinBudget,
    }
}

/// The budget row in force for a category: the most recently inserted one.
pub(crate) fn effective_budget<'a>(budgets: &'a [Budget], category: &str) -> Option<&'a Budget> {
    budgets
        .iter()
        .filter(|b| b.category == category)
        .max_by_key(|b| b.id.unwrap_or(i64::MIN))
}

/// Check every category that appears in the user's budgets or transactions.
pub(crate) fn check_budget<S: LedgerStore>(store: &S, user_id: i64) -> Result<BudgetCheck> {
    let txns = store.transactions(user_id, None)?;
    let budgets = store.budgets(user_id, None)?;
    check_ledger(&txns, &budgets)
}

/// Check a single category against its effective budget.
pub(crate) fn check_category<S: LedgerStore>(
    store: &S,
    user_id: i64,
    category: &str,
) -> Result<BudgetStatus> {
    let category = category.trim();
    let spent = ledger::expense_total(store, user_id, category)?;
    let budgets = store.budgets(user_id, Some(category))?;
    let limit = effective_budget(&budgets, category).map(|b| b.amount);
    Ok(BudgetStatus::new(category, spent, limit))
}

/// Evaluate an already-loaded snapshot of transactions and budgets.
pub(crate) fn check_ledger(txns: &[Transaction], budgets: &[Budget]) -> Result<BudgetCheck> {
    let categories: BTreeSet<&str> = budgets
        .iter()
        .map(|b| b.category.as_str())
        .chain(txns.iter().map(|t| t.category.as_str()))
        .collect();

    let statuses = categories
        .into_iter()
        .map(|category| {
            let spent = ledger::sum_expenses(txns, category)?;
            let limit = effective_budget(budgets, category).map(|b| b.amount);
            Ok(BudgetStatus::new(category, spent, limit))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BudgetCheck { statuses })
}

#[cfg(test)]
mod tests;
