// Window state - form, list, balance and dialogs, independent of the terminal
//
// Every mutation goes straight to the ledger and is followed by a full reload
// of the list and a fresh balance; nothing is cached between actions.

use anyhow::Result;
use chrono::{Local, NaiveDate};

use crate::db::{Transaction, TransactionId};
use crate::form::{EntryError, EntryForm};
use crate::ledger::Ledger;
use crate::money::{format_currency, is_negative_in_cents, Locale};

/// Widget receiving keyboard input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Description,
    Amount,
    Kind,
    List,
}

impl Focus {
    pub fn next(&self) -> Self {
        match self {
            Focus::Description => Focus::Amount,
            Focus::Amount => Focus::Kind,
            Focus::Kind => Focus::List,
            Focus::List => Focus::Description,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Focus::Description => Focus::List,
            Focus::Amount => Focus::Description,
            Focus::Kind => Focus::Amount,
            Focus::List => Focus::Kind,
        }
    }
}

/// Blocking dialog shown over the window
#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    Warning { title: String, message: String },
    Error { title: String, message: String },
    Info { title: String, message: String },
    /// Waiting for yes/no before deleting `id`
    Confirm { id: TransactionId },
}

impl Modal {
    pub fn title(&self) -> &str {
        match self {
            Modal::Warning { title, .. } | Modal::Error { title, .. } | Modal::Info { title, .. } => {
                title.as_str()
            }
            Modal::Confirm { .. } => "Confirm",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Modal::Warning { message, .. }
            | Modal::Error { message, .. }
            | Modal::Info { message, .. } => message.as_str(),
            Modal::Confirm { .. } => "Do you really want to delete this transaction?",
        }
    }
}

/// One rendered list row: id, date, type, description, formatted amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: TransactionId,
    pub date: String,
    pub kind: String,
    pub description: String,
    pub amount: String,
}

/// Today's date in local time
pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

pub struct App<L: Ledger> {
    ledger: L,
    pub locale: Locale,
    pub form: EntryForm,
    pub transactions: Vec<Transaction>,
    pub balance: f64,
    pub selected: Option<usize>,
    pub focus: Focus,
    pub modal: Option<Modal>,
    pub should_quit: bool,
    clock: fn() -> NaiveDate,
}

impl<L: Ledger> App<L> {
    /// Build the window state and load the list and balance once.
    pub fn new(ledger: L, locale: Locale) -> Result<Self> {
        let mut app = Self {
            ledger,
            locale,
            form: EntryForm::new(),
            transactions: Vec::new(),
            balance: 0.0,
            selected: None,
            focus: Focus::Description,
            modal: None,
            should_quit: false,
            clock: today_local,
        };

        app.refresh_list()?;
        app.refresh_balance()?;

        Ok(app)
    }

    /// Replace the date source used when adding transactions
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    // ========================================================================
    // ACTIONS
    // ========================================================================

    /// Add transaction. Validation failures open a dialog and keep the input.
    pub fn submit(&mut self) -> Result<()> {
        let entry = match self.form.validate() {
            Ok(entry) => entry,
            Err(err) => {
                let title = err.title().to_string();
                let message = err.to_string();
                self.modal = Some(match err {
                    EntryError::MissingFields => Modal::Warning { title, message },
                    EntryError::InvalidAmount => Modal::Error { title, message },
                });
                return Ok(());
            }
        };

        let date = (self.clock)();
        self.ledger
            .add(entry.kind, &entry.description, entry.amount, date)?;

        self.form.clear();
        self.refresh_list()?;
        self.refresh_balance()?;

        Ok(())
    }

    /// Delete selected: asks for confirmation, or explains that nothing is
    /// selected.
    pub fn request_delete(&mut self) {
        self.modal = Some(match self.selected_transaction() {
            Some(tx) => Modal::Confirm { id: tx.id },
            None => Modal::Info {
                title: "Select".to_string(),
                message: "Select a transaction to delete.".to_string(),
            },
        });
    }

    /// Answer the open confirmation. Only "yes" touches storage.
    pub fn answer_confirm(&mut self, yes: bool) -> Result<()> {
        let Some(Modal::Confirm { id }) = self.modal else {
            return Ok(());
        };
        self.modal = None;

        if yes {
            self.ledger.remove(id)?;
            self.refresh_list()?;
            self.refresh_balance()?;
        }

        Ok(())
    }

    /// Close a message dialog. Confirmations must be answered instead.
    pub fn dismiss_modal(&mut self) {
        if !matches!(self.modal, Some(Modal::Confirm { .. })) {
            self.modal = None;
        }
    }

    /// Reload every row from storage. The selection does not survive.
    pub fn refresh_list(&mut self) -> Result<()> {
        self.transactions = self.ledger.list_all()?;
        self.selected = None;
        Ok(())
    }

    pub fn refresh_balance(&mut self) -> Result<()> {
        self.balance = self.ledger.balance()?;
        Ok(())
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    pub fn select_next(&mut self) {
        let len = self.transactions.len();
        if len == 0 {
            return;
        }
        let i = match self.selected {
            Some(i) if i + 1 < len => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.selected = Some(i);
    }

    pub fn select_previous(&mut self) {
        if self.transactions.is_empty() {
            return;
        }
        let i = match self.selected {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.selected = Some(i);
    }

    /// Text field under the cursor, if the focus is on one
    pub fn focused_field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Description => Some(&mut self.form.description),
            Focus::Amount => Some(&mut self.form.amount),
            Focus::Kind | Focus::List => None,
        }
    }

    pub fn toggle_kind(&mut self) {
        self.form.kind = self.form.kind.toggle();
    }

    // ========================================================================
    // VIEW DATA
    // ========================================================================

    pub fn selected_transaction(&self) -> Option<&Transaction> {
        self.selected.and_then(|i| self.transactions.get(i))
    }

    pub fn rows(&self) -> Vec<Row> {
        self.transactions
            .iter()
            .map(|tx| Row {
                id: tx.id,
                date: tx.date_text(),
                kind: tx.kind.label().to_string(),
                description: tx.description.clone(),
                amount: format_currency(tx.amount, &self.locale),
            })
            .collect()
    }

    pub fn formatted_balance(&self) -> String {
        format_currency(self.balance, &self.locale)
    }

    /// Sign of the balance as displayed, so `$0.00` is never drawn as a debt.
    pub fn balance_is_negative(&self) -> bool {
        is_negative_in_cents(self.balance)
    }
}
