// Entry form - the three inputs above the list and their validation

use thiserror::Error;

use crate::db::TransactionKind;
use crate::money::parse_amount;

/// Reasons a submission is refused before it reaches storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EntryError {
    /// Description or amount left blank
    #[error("Fill in all fields.")]
    MissingFields,

    /// Amount is not a number, or not above zero
    #[error("Enter a positive numeric value.")]
    InvalidAmount,
}

impl EntryError {
    /// Dialog title
    pub fn title(&self) -> &'static str {
        match self {
            EntryError::MissingFields => "Required fields",
            EntryError::InvalidAmount => "Invalid amount",
        }
    }
}

/// A submission that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub description: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryForm {
    pub description: String,
    pub amount: String,
    pub kind: TransactionKind,
}

impl EntryForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank fields are checked first, then the amount itself.
    pub fn validate(&self) -> Result<NewTransaction, EntryError> {
        let description = self.description.trim();

        if description.is_empty() || self.amount.trim().is_empty() {
            return Err(EntryError::MissingFields);
        }

        let amount = parse_amount(&self.amount).ok_or(EntryError::InvalidAmount)?;

        Ok(NewTransaction {
            kind: self.kind,
            description: description.to_string(),
            amount,
        })
    }

    /// Empty the text inputs; the selected type stays.
    pub fn clear(&mut self) {
        self.description.clear();
        self.amount.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.description.is_empty() && self.amount.is_empty()
    }
}
