//! Expense store and query engine.
//!
//! The [`Engine`] owns the database handle and answers every request on
//! behalf of an already verified user id: writes, filtered and paginated
//! listings, summaries and time-bucketed trends.

pub use commands::{ExpenseCmd, UpdateExpenseCmd};
pub use error::EngineError;
pub use expenses::Expense;
pub use money::MoneyCents;
pub use ops::{
    DEFAULT_PAGE_LIMIT, DailyTotal, Engine, EngineBuilder, ExpenseFilter, ExpensePage,
    ExpenseQuery, ExpenseSort, MAX_PAGE_LIMIT, MAX_TREND_DAYS, MonthlyTotal, PageRequest, SortKey,
    SortOrder, Summary,
};
pub use period::{MAX_YEAR, MIN_YEAR, Month, Period};
pub use users::User;
pub use util::MAX_AMOUNT_MINOR;

/// Timezone type accepted by [`EngineBuilder::timezone`].
pub use chrono_tz::Tz;

mod commands;
mod error;
mod expenses;
mod money;
mod ops;
mod period;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
