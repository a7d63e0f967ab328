mod export;
mod period;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::budget::{self, BudgetStatus, Verdict};
use crate::db::LedgerStore;
use crate::error::Result;
use crate::ledger::Totals;
use crate::models::Transaction;

pub(crate) use export::export_csv;
pub(crate) use period::Period;

/// Per-category section of a report.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryLine {
    pub category: String,
    pub totals: Totals,
    /// Percentage of all expenses in the report, one decimal place.
    pub expense_share: Option<Decimal>,
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ReportDocument {
    pub user_id: i64,
    pub period: Option<Period>,
    pub categories: Vec<CategoryLine>,
    pub totals: Totals,
}

impl ReportDocument {
    pub(crate) fn net(&self) -> Decimal {
        self.totals.net()
    }

    pub(crate) fn exceeded_count(&self) -> usize {
        self.categories
            .iter()
            .filter(|c| c.status.verdict == Verdict::BudgetExceeded)
            .count()
    }

    #[cfg(test)]
    pub(crate) fn category(&self, name: &str) -> Option<&CategoryLine> {
        self.categories.iter().find(|c| c.category == name)
    }

    /// Categories with spending, largest first; ties keep name order.
    pub(crate) fn expense_breakdown(&self) -> Vec<&CategoryLine> {
        let mut lines: Vec<&CategoryLine> = self
            .categories
            .iter()
            .filter(|c| c.totals.expense > Decimal::ZERO)
            .collect();
        lines.sort_by(|a, b| b.totals.expense.cmp(&a.totals.expense));
        lines
    }
}

/// All-time report for one user.
pub(crate) fn generate_report<S: LedgerStore>(store: &S, user_id: i64) -> Result<ReportDocument> {
    generate_report_for(store, user_id, None)
}

/// Report restricted to `period` when given. Budgets are compared with the
/// expenses that fall inside the period.
pub(crate) fn generate_report_for<S: LedgerStore>(
    store: &S,
    user_id: i64,
    period: Option<Period>,
) -> Result<ReportDocument> {
    let txns: Vec<Transaction> = store
        .transactions(user_id, None)?
        .into_iter()
        .filter(|t| period.map_or(true, |p| p.contains(&t.timestamp)))
        .collect();
    let budgets = store.budgets(user_id, None)?;

    let check = budget::check_ledger(&txns, &budgets)?;
    let totals = Totals::of(&txns)?;

    let categories = check
        .statuses
        .into_iter()
        .map(|status| {
            let line_totals =
                Totals::of(txns.iter().filter(|t| t.category == status.category))?;
            Ok(CategoryLine {
                category: status.category.clone(),
                expense_share: share(line_totals.expense, totals.expense),
                totals: line_totals,
                status,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ReportDocument {
        user_id,
        period,
        categories,
        totals,
    })
}

fn share(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .map(|pct| pct.round_dp(1))
}

/// Two decimal places with thousand separators: `1234567.8` → `"1,234,567.80"`.
pub(crate) fn format_amount(val: Decimal) -> String {
    let val = val.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let rounded = format!("{:.2}", val.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if val < Decimal::ZERO { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

impl std::fmt::Display for ReportDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scope = self
            .period
            .map_or_else(|| "all time".to_string(), |p| p.to_string());
        writeln!(f, "Financial report for user {} ({scope})", self.user_id)?;
        writeln!(f, "{}", "─".repeat(48))?;
        writeln!(f, "  Income:        {:>14}", format_amount(self.totals.income))?;
        writeln!(f, "  Expenses:      {:>14}", format_amount(self.totals.expense))?;
        writeln!(f, "  Net:           {:>14}", format_amount(self.net()))?;
        writeln!(f, "  Transactions:  {:>14}", self.totals.count)?;

        if self.categories.is_empty() {
            writeln!(f)?;
            return writeln!(f, "No transactions or budgets recorded.");
        }

        writeln!(f)?;
        writeln!(f, "Categories:")?;
        for line in &self.categories {
            let limit = line
                .status
                .budget_amount
                .map_or_else(|| "-".to_string(), format_amount);
            writeln!(
                f,
                "  {:<20} {:>4} txns  in {:>12}  out {:>12}  budget {:>12}  {}",
                line.category,
                line.totals.count,
                format_amount(line.totals.income),
                format_amount(line.totals.expense),
                limit,
                line.status.verdict,
            )?;
        }

        let warnings: Vec<&str> = self
            .categories
            .iter()
            .filter(|c| c.status.verdict == Verdict::BudgetExceeded)
            .filter_map(|c| c.status.message.as_deref())
            .collect();
        let has_budgets = self
            .categories
            .iter()
            .any(|c| c.status.budget_amount.is_some());
        if !warnings.is_empty() {
            writeln!(f)?;
            for warning in warnings {
                writeln!(f, "{warning}")?;
            }
        } else if has_budgets {
            writeln!(f)?;
            writeln!(f, "All budgets are within limits.")?;
        }

        let breakdown = self.expense_breakdown();
        if !breakdown.is_empty() {
            writeln!(f)?;
            writeln!(f, "Expense breakdown by category:")?;
            for line in breakdown {
                let pct = line
                    .expense_share
                    .map(|share| format!(" ({share:.1}%)"))
                    .unwrap_or_default();
                writeln!(
                    f,
                    "  {:<20} {:>14}{pct}",
                    line.category,
                    format_amount(line.totals.expense)
                )?;
            }
        }
        Ok(())
    }
}
