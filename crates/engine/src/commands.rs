//! Command structs for expense writes.
//!
//! These types group parameters for create/update, keeping call sites
//! readable and avoiding long argument lists.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Create an expense.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub user_id: Uuid,
    pub category: String,
    pub amount_minor: i64,
    pub note: Option<String>,
    /// Assigned by the caller layer, usually `Utc::now()`.
    pub created_at: DateTime<Utc>,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(
        user_id: Uuid,
        category: impl Into<String>,
        amount_minor: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            category: category.into(),
            amount_minor,
            note: None,
            created_at,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Partially update an expense.
///
/// Only the fields listed here can change; `None` leaves a field untouched.
/// For `note`, `Some("")` clears it.
#[derive(Clone, Debug)]
pub struct UpdateExpenseCmd {
    pub user_id: Uuid,
    pub expense_id: Uuid,

    pub category: Option<String>,
    pub amount_minor: Option<i64>,
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,

    /// Stored as the expense's `updated_at`.
    pub updated_at: DateTime<Utc>,
}

impl UpdateExpenseCmd {
    #[must_use]
    pub fn new(user_id: Uuid, expense_id: Uuid, updated_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            expense_id,
            category: None,
            amount_minor: None,
            note: None,
            created_at: None,
            updated_at,
        }
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Returns `true` when no updatable field is set.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.amount_minor.is_none()
            && self.note.is_none()
            && self.created_at.is_none()
    }
}
