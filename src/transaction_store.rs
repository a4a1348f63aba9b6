use std::path::{Path, PathBuf};
use log::{debug, trace};
use rust_decimal::Decimal;
use crate::error::StoreError;
use crate::file_handler;
use crate::transaction::{Kind, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub loaded: usize,
    pub skipped: usize,
}

/// Ordered, file-backed collection of transactions.
///
/// The in-memory sequence is authoritative. Every mutation rewrites the whole
/// backing file; a failed write is returned to the caller and leaves the
/// in-memory sequence as it is.
#[derive(Debug)]
pub struct TransactionStore {
    path: PathBuf,
    transactions: Vec<Transaction>,
}

impl TransactionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TransactionStore {
            path: path.into(),
            transactions: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn add(&mut self, transaction: Transaction) -> Result<(), StoreError> {
        trace!("Adding transaction '{}' of {}", transaction.description(), transaction.amount());
        self.transactions.push(transaction);
        self.save()
    }

    /// Removes the first transaction whose description matches, ignoring case.
    ///
    /// Returns `Ok(false)` without saving when nothing matched. An `Err` means
    /// the removal happened but the backing file could not be rewritten.
    pub fn delete(&mut self, description: &str) -> Result<bool, StoreError> {
        let Some(index) = self.transactions.iter().position(|t| eq_ignore_case(t.description(), description)) else {
            trace!("No transaction matches description '{}'", description);
            return Ok(false);
        };

        self.transactions.remove(index);
        trace!("Deleted transaction '{}' at position {}", description, index);
        self.save()?;
        Ok(true)
    }

    /// `None` when the sum does not fit in a `Decimal`.
    #[inline]
    fn total_of(&self, kind: Kind) -> Option<Decimal> {
        self.transactions.iter()
            .filter(|t| t.kind() == kind)
            .try_fold(Decimal::ZERO, |total, t| total.checked_add(t.amount()))
    }

    pub fn total_income(&self) -> Option<Decimal> {
        self.total_of(Kind::Income)
    }

    pub fn total_expenses(&self) -> Option<Decimal> {
        self.total_of(Kind::Expense)
    }

    pub fn net_savings(&self) -> Option<Decimal> {
        self.total_income()?.checked_sub(self.total_expenses()?)
    }

    /// Expense totals per category, in order of each category's first appearance.
    /// A category whose sum overflows reports `None`.
    pub fn category_totals(&self) -> Vec<(String, Option<Decimal>)> {
        let mut totals: Vec<(String, Option<Decimal>)> = Vec::new();
        for transaction in self.transactions.iter().filter(|t| t.kind() == Kind::Expense) {
            match totals.iter_mut().find(|(category, _)| category == transaction.category()) {
                Some((_, total)) => *total = total.and_then(|sum| sum.checked_add(transaction.amount())),
                None => totals.push((transaction.category().to_string(), Some(transaction.amount()))),
            }
        }
        totals
    }

    pub fn sort_by_date(&mut self) -> Result<(), StoreError> {
        self.transactions.sort_by_key(Transaction::date);
        trace!("Sorted {} transactions by date", self.transactions.len());
        self.save()
    }

    pub fn sort_by_amount(&mut self) -> Result<(), StoreError> {
        self.transactions.sort_by_key(Transaction::amount);
        trace!("Sorted {} transactions by amount", self.transactions.len());
        self.save()
    }

    /// Replaces the in-memory sequence with the contents of the backing file.
    ///
    /// Malformed lines are skipped and counted. If the file cannot be read the
    /// current sequence is kept.
    pub fn load(&mut self) -> Result<LoadSummary, StoreError> {
        let parsed = file_handler::read_transactions(&self.path)?;
        self.transactions = parsed.transactions;

        let summary = LoadSummary {
            loaded: self.transactions.len(),
            skipped: parsed.skipped,
        };
        debug!("Loaded {} transactions from {} ({} skipped)", summary.loaded, self.path.display(), summary.skipped);
        Ok(summary)
    }

    pub fn save(&self) -> Result<(), StoreError> {
        file_handler::write_transactions(&self.path, &self.transactions)
    }
}

/// Case-insensitive comparison on uppercase mappings, so final and medial sigma compare equal.
fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars().flat_map(char::to_uppercase).eq(b.chars().flat_map(char::to_uppercase))
}
