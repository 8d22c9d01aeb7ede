//! The storage capability the window talks to.

use anyhow::Result;
use chrono::NaiveDate;

use crate::db::{signed, Transaction, TransactionId, TransactionKind};

/// Add/remove/list/balance over the stored transactions.
///
/// Implementations trust their inputs; validation happens in the form.
pub trait Ledger {
    /// Append a new transaction with a freshly assigned id.
    fn add(
        &mut self,
        kind: TransactionKind,
        description: &str,
        amount: f64,
        date: NaiveDate,
    ) -> Result<()>;

    /// Delete the transaction with `id`. Unknown ids are not an error.
    fn remove(&mut self, id: TransactionId) -> Result<()>;

    /// Every transaction, newest date first, then highest id first.
    fn list_all(&self) -> Result<Vec<Transaction>>;

    /// Income minus expense over every stored transaction, recomputed from
    /// scratch on each call.
    fn balance(&self) -> Result<f64>;
}

/// Fold kind/amount pairs into a signed sum.
pub fn signed_total<I>(entries: I) -> f64
where
    I: IntoIterator<Item = (TransactionKind, f64)>,
{
    entries
        .into_iter()
        .fold(0.0, |total, (kind, amount)| total + signed(kind, amount))
}

/// In-memory ledger with the same ordering and id rules as the SQLite one.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    transactions: Vec<Transaction>,
    next_id: TransactionId,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

impl Ledger for MemoryLedger {
    fn add(
        &mut self,
        kind: TransactionKind,
        description: &str,
        amount: f64,
        date: NaiveDate,
    ) -> Result<()> {
        self.next_id += 1;
        self.transactions.push(Transaction {
            id: self.next_id,
            kind,
            description: description.to_string(),
            amount,
            date,
        });

        Ok(())
    }

    fn remove(&mut self, id: TransactionId) -> Result<()> {
        self.transactions.retain(|tx| tx.id != id);
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Transaction>> {
        let mut all = self.transactions.clone();
        all.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(all)
    }

    fn balance(&self) -> Result<f64> {
        Ok(signed_total(
            self.transactions.iter().map(|tx| (tx.kind, tx.amount)),
        ))
    }
}
