use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;

use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::Expense => "Expense",
        }
    }

    /// Case-insensitive parse of the two stored labels.
    pub(crate) fn parse(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(LedgerError::Validation(format!(
                "transaction type must be Income or Expense, got '{s}'"
            ))),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

// Stored labels are exact; anything else in the column means a damaged file.
impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "Income" => Ok(Self::Income),
            "Expense" => Ok(Self::Expense),
            other => Err(FromSqlError::Other(
                format!("unknown transaction type '{other}'").into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Transaction {
    pub id: Option<i64>,
    pub user_id: i64,
    pub category: String,
    pub amount: Decimal,
    pub kind: TransactionType,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        user_id: i64,
        category: String,
        amount: Decimal,
        kind: TransactionType,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            category,
            amount,
            kind,
            timestamp,
        }
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    /// Amount with sign applied: income positive, expense negative.
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}
