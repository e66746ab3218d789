use anyhow::Context;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs `f` inside a single write transaction.
///
/// The transaction commits only when `f` returns `Ok`. An error, a panic, or any
/// early return drops the transaction, which rolls it back.
pub fn within<T>(
    conn: &mut Connection,
    f: impl FnOnce(&Transaction<'_>) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .context("begin unit of work")?;
    let out = f(&tx)?;
    tx.commit().context("commit unit of work")?;
    Ok(out)
}
