use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Budget {
    pub id: Option<i64>,
    pub user_id: i64,
    pub category: String,
    /// Spending ceiling for the category.
    pub amount: Decimal,
}

impl Budget {
    pub fn new(user_id: i64, category: String, amount: Decimal) -> Self {
        Self {
            id: None,
            user_id,
            category,
            amount,
        }
    }
}
