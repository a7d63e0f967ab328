use chrono::{DateTime, Datelike, Utc};

use crate::db::LedgerStore;
use crate::error::Result;
use crate::ledger;
use crate::models::Transaction;
use crate::report::{self, Period, ReportDocument};
use crate::ui::util::ListCursor;

/// Which pane receives the movement keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Budgets,
    Transactions,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) user_id: i64,
    pub(crate) period: Option<Period>,
    pub(crate) focus: Focus,

    pub(crate) report: ReportDocument,
    // Newest first
    pub(crate) transactions: Vec<Transaction>,

    pub(crate) budget_cursor: ListCursor,
    pub(crate) txn_cursor: ListCursor,
    pub(crate) visible_rows: usize,

    pub(crate) status_message: String,
}

impl App {
    pub(crate) fn new(user_id: i64) -> Self {
        Self {
            running: true,
            user_id,
            period: None,
            focus: Focus::Budgets,
            report: ReportDocument {
                user_id,
                ..ReportDocument::default()
            },
            transactions: Vec::new(),
            budget_cursor: ListCursor::default(),
            txn_cursor: ListCursor::default(),
            visible_rows: 20,
            status_message: String::new(),
        }
    }

    /// Reload the report and transaction list for the current period.
    pub(crate) fn refresh<S: LedgerStore>(&mut self, store: &S) -> Result<()> {
        self.report = report::generate_report_for(store, self.user_id, self.period)?;

        let mut txns = ledger::list_transactions(store, self.user_id, None)?;
        if let Some(period) = self.period {
            txns.retain(|t| period.contains(&t.timestamp));
        }
        txns.reverse();
        self.transactions = txns;

        self.budget_cursor.clamp(self.report.categories.len());
        self.txn_cursor.clamp(self.transactions.len());
        self.status_message = format!(
            "{} transactions, {} over budget",
            self.report.totals.count,
            self.report.exceeded_count()
        );
        Ok(())
    }

    /// Switch between the whole ledger and the month containing `now`.
    pub(crate) fn toggle_period<S: LedgerStore>(
        &mut self,
        store: &S,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.period = match self.period {
            None => Some(Period::Month {
                year: now.year(),
                month: now.month(),
            }),
            Some(_) => None,
        };
        self.budget_cursor = ListCursor::default();
        self.txn_cursor = ListCursor::default();
        self.refresh(store)
    }

    pub(crate) fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Budgets => Focus::Transactions,
            Focus::Transactions => Focus::Budgets,
        };
    }

    pub(crate) fn period_label(&self) -> String {
        self.period
            .map(|p| p.to_string())
            .unwrap_or_else(|| "All time".to_string())
    }

    pub(crate) fn move_down(&mut self) {
        let page = self.visible_rows;
        match self.focus {
            Focus::Budgets => self.budget_cursor.down(self.report.categories.len(), page),
            Focus::Transactions => self.txn_cursor.down(self.transactions.len(), page),
        }
    }

    pub(crate) fn move_up(&mut self) {
        match self.focus {
            Focus::Budgets => self.budget_cursor.up(),
            Focus::Transactions => self.txn_cursor.up(),
        }
    }

    pub(crate) fn goto_top(&mut self) {
        match self.focus {
            Focus::Budgets => self.budget_cursor.top(),
            Focus::Transactions => self.txn_cursor.top(),
        }
    }

    pub(crate) fn goto_bottom(&mut self) {
        let page = self.visible_rows;
        match self.focus {
            Focus::Budgets => self.budget_cursor.bottom(self.report.categories.len(), page),
            Focus::Transactions => self.txn_cursor.bottom(self.transactions.len(), page),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::ledger::{add_transaction_at, set_budget};

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::default();
        let march = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
        let april = Utc.with_ymd_and_hms(2024, 4, 2, 9, 30, 0).unwrap();
        add_transaction_at(&mut store, 1, "Salary", dec!(5000), "Income", march).unwrap();
        add_transaction_at(&mut store, 1, "Groceries", dec!(2000), "Expense", march).unwrap();
        add_transaction_at(&mut store, 1, "Groceries", dec!(1500), "Expense", april).unwrap();
        set_budget(&mut store, 1, "Groceries", dec!(3000)).unwrap();
        store
    }

    #[test]
    fn test_refresh_loads_report_and_newest_first() {
        let store = seeded();
        let mut app = App::new(1);
        app.refresh(&store).unwrap();

        assert_eq!(app.report.totals.count, 3);
        assert_eq!(app.report.exceeded_count(), 1);
        assert_eq!(app.transactions.len(), 3);
        assert_eq!(app.transactions[0].amount, dec!(1500));
        assert_eq!(app.status_message, "3 transactions, 1 over budget");
    }

    #[test]
    fn test_toggle_period_restricts_to_month() {
        let store = seeded();
        let mut app = App::new(1);
        app.refresh(&store).unwrap();

        let now = Utc.with_ymd_and_hms(2024, 4, 20, 0, 0, 0).unwrap();
        app.toggle_period(&store, now).unwrap();
        assert_eq!(app.period_label(), "2024-04");
        assert_eq!(app.transactions.len(), 1);
        assert_eq!(app.report.exceeded_count(), 0);

        app.toggle_period(&store, now).unwrap();
        assert_eq!(app.period_label(), "All time");
        assert_eq!(app.transactions.len(), 3);
    }

    #[test]
    fn test_movement_follows_focus() {
        let store = seeded();
        let mut app = App::new(1);
        app.refresh(&store).unwrap();

        app.move_down();
        assert_eq!(app.budget_cursor.index, 1);
        assert_eq!(app.txn_cursor.index, 0);

        app.toggle_focus();
        app.goto_bottom();
        assert_eq!(app.txn_cursor.index, 2);
        app.move_up();
        assert_eq!(app.txn_cursor.index, 1);
        app.goto_top();
        assert_eq!(app.txn_cursor.index, 0);
    }

    #[test]
    fn test_refresh_other_user_is_empty() {
        let store = seeded();
        let mut app = App::new(2);
        app.refresh(&store).unwrap();
        assert!(app.transactions.is_empty());
        assert!(app.report.categories.is_empty());
    }
}
