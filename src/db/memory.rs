//! In-memory stand-ins for `Database`, used by the aggregator, evaluator and
//! report tests so they run without SQLite.

use super::LedgerStore;
use crate::error::{Result, StorageError};
use crate::models::{Budget, Transaction};

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
}

impl LedgerStore for MemoryStore {
    fn insert_transaction(&mut self, txn: &Transaction) -> Result<i64> {
        let id = self.transactions.len() as i64 + 1;
        self.transactions.push(Transaction {
            id: Some(id),
            ..txn.clone()
        });
        Ok(id)
    }

    fn insert_budget(&mut self, budget: &Budget) -> Result<i64> {
        let id = self.budgets.len() as i64 + 1;
        self.budgets.push(Budget {
            id: Some(id),
            ..budget.clone()
        });
        Ok(id)
    }

    fn transactions(&self, user_id: i64, category: Option<&str>) -> Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .iter()
            .filter(|t| t.user_id == user_id && category.map_or(true, |c| t.category == c))
            .cloned()
            .collect())
    }

    fn budgets(&self, user_id: i64, category: Option<&str>) -> Result<Vec<Budget>> {
        Ok(self
            .budgets
            .iter()
            .filter(|b| b.user_id == user_id && category.map_or(true, |c| b.category == c))
            .cloned()
            .collect())
    }
}

/// Every call fails, as a store on a vanished disk would.
#[derive(Debug, Default)]
pub(crate) struct FailingStore {
    pub(crate) calls: usize,
}

impl FailingStore {
    fn fail<T>(&mut self) -> Result<T> {
        self.calls += 1;
        Err(StorageError::Unavailable("disk unavailable".into()).into())
    }
}

impl LedgerStore for FailingStore {
    fn insert_transaction(&mut self, _txn: &Transaction) -> Result<i64> {
        self.fail()
    }

    fn insert_budget(&mut self, _budget: &Budget) -> Result<i64> {
        self.fail()
    }

    fn transactions(&self, _user_id: i64, _category: Option<&str>) -> Result<Vec<Transaction>> {
        Err(StorageError::Unavailable("disk unavailable".into()).into())
    }

    fn budgets(&self, _user_id: i64, _category: Option<&str>) -> Result<Vec<Budget>> {
        Err(StorageError::Unavailable("disk unavailable".into()).into())
    }
}
