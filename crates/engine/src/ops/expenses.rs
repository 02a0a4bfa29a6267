//! Expense records: owner-scoped writes, filtered listing and aggregates.

mod list;
mod summary;
mod trend;
mod write;

pub use list::{
    DEFAULT_PAGE_LIMIT, ExpenseFilter, ExpensePage, ExpenseQuery, ExpenseSort, MAX_PAGE_LIMIT,
    PageRequest, SortKey, SortOrder,
};
pub use summary::Summary;
pub use trend::{DailyTotal, MAX_TREND_DAYS, MonthlyTotal};
