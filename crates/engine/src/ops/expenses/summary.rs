use std::collections::BTreeMap;

use sea_orm::{FromQueryResult, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, Month, ResultEngine, expenses};

use super::{
    super::{Engine, with_tx},
    list::{ApplyExpenseFilters, ExpenseFilter, resolve_filter},
};

/// Totals over a user's expenses, optionally restricted to one month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    /// `None` when the summary spans all time.
    pub period: Option<Month>,
    pub total_spent: MoneyCents,
    pub count: u64,
    /// `total_spent / count`, zero when there are no expenses.
    pub average: MoneyCents,
    /// Only categories with at least one matching expense appear.
    pub by_category: BTreeMap<String, MoneyCents>,
}

#[derive(Debug, FromQueryResult)]
struct CategoryTotal {
    category: String,
    total_minor: i64,
    expenses: i64,
}

/// SQLite aborts `SUM` over integers that leave `i64`. Report it the same
/// way the in-memory folds do.
fn sum_overflow(err: DbErr) -> EngineError {
    if err.to_string().contains("integer overflow") {
        EngineError::InvalidAmount("total amount overflow".to_string())
    } else {
        EngineError::Database(err)
    }
}

/// Per-category groups folded into `(total_spent, count, by_category)`.
fn fold_groups(
    groups: Vec<CategoryTotal>,
) -> ResultEngine<(MoneyCents, u64, BTreeMap<String, MoneyCents>)> {
    let mut total_spent = MoneyCents::ZERO;
    let mut count: u64 = 0;
    let mut by_category = BTreeMap::new();
    for group in groups {
        let amount = MoneyCents::new(group.total_minor);
        total_spent = total_spent
            .checked_add(amount)
            .ok_or_else(|| EngineError::InvalidAmount("total amount overflow".to_string()))?;
        let expenses = u64::try_from(group.expenses).map_err(|_| {
            EngineError::Database(DbErr::Custom(format!(
                "negative expense count for category '{}'",
                group.category
            )))
        })?;
        count = count.checked_add(expenses).ok_or_else(|| {
            EngineError::Database(DbErr::Custom("expense count overflow".to_string()))
        })?;
        by_category.insert(group.category, amount);
    }
    Ok((total_spent, count, by_category))
}

impl Engine {
    /// Summarizes the user's spending, for one month or overall.
    ///
    /// Uses the same predicate as [`Engine::list_expenses`] with only the
    /// month set, so `count` equals the listing's `total`. Everything comes
    /// from a single grouped select, which means `total_spent` is exactly the
    /// sum of `by_category`.
    pub async fn summary(&self, user_id: Uuid, month: Option<Month>) -> ResultEngine<Summary> {
        let filter = resolve_filter(&ExpenseFilter::for_month(month), self.timezone)?;

        with_tx!(self, |db_tx| {
            let groups: Vec<CategoryTotal> = expenses::Entity::find()
                .select_only()
                .column(expenses::Column::Category)
                .column_as(expenses::Column::AmountMinor.sum(), "total_minor")
                .column_as(expenses::Column::Id.count(), "expenses")
                .apply_expense_filters(user_id, &filter)
                .group_by(expenses::Column::Category)
                .into_model::<CategoryTotal>()
                .all(&db_tx)
                .await
                .map_err(sum_overflow)?;

            let (total_spent, count, by_category) = fold_groups(groups)?;

            tracing::debug!(
                user_id = %user_id,
                period = ?month.map(|m| m.to_string()),
                count,
                "computed summary"
            );

            Ok(Summary {
                period: month,
                total_spent,
                count,
                average: total_spent.average(count),
                by_category,
            })
        })
    }
}
