use std::io::Write;

use super::Period;
use crate::db::{format_timestamp, LedgerStore};
use crate::error::Result;

/// Write the user's ledger as CSV using the stored column names.
/// Returns the number of transactions written.
pub(crate) fn export_csv<S: LedgerStore, W: Write>(
    store: &S,
    user_id: i64,
    period: Option<Period>,
    writer: W,
) -> Result<usize> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["id", "user_id", "category", "amount", "type", "timestamp"])?;

    let mut count = 0;
    for txn in store.transactions(user_id, None)? {
        if !period.map_or(true, |p| p.contains(&txn.timestamp)) {
            continue;
        }
        wtr.write_record([
            txn.id.map(|id| id.to_string()).unwrap_or_default(),
            txn.user_id.to_string(),
            txn.category.clone(),
            txn.amount.to_string(),
            txn.kind.as_str().to_string(),
            format_timestamp(&txn.timestamp),
        ])?;
        count += 1;
    }

    wtr.flush()?;
    Ok(count)
}
