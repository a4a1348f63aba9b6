use std::fmt;
use std::str::FromStr;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use crate::error::InputError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Kind {
    Income,
    Expense,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Income => f.write_str("Income"),
            Kind::Expense => f.write_str("Expense"),
        }
    }
}

impl FromStr for Kind {
    type Err = InputError;

    /// Exact, case-sensitive match on the persisted spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Income" => Ok(Kind::Income),
            "Expense" => Ok(Kind::Expense),
            other => Err(InputError::InvalidKind(other.to_string())),
        }
    }
}

/// One recorded income or expense event.
///
/// Field order matches the column order of the backing file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    description: String,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
    kind: Kind,
    category: String,
    date: NaiveDate,
}

impl Transaction {
    pub fn new(description: impl Into<String>, amount: Decimal, kind: Kind, category: impl Into<String>, date: NaiveDate) -> Self {
        Transaction {
            description: description.into(),
            amount,
            kind,
            category: category.into(),
            date,
        }
    }

    #[inline]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[inline]
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.kind
    }

    #[inline]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}
