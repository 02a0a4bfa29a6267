use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use sea_orm::{
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
    sea_query::{Expr, LikeExpr},
};
use uuid::Uuid;

use crate::{
    EngineError, Expense, Month, Period, ResultEngine, expenses,
    util::{escape_like, fold_note, normalize_category},
};

use super::super::{Engine, with_tx};

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: u64 = 200;
pub const DEFAULT_PAGE_LIMIT: u64 = 50;

/// Filters for listing expenses. All of them must hold (AND).
///
/// `date_from` is inclusive and `date_to` is exclusive. When `month` is set
/// the explicit dates are ignored.
#[derive(Clone, Debug, Default)]
pub struct ExpenseFilter {
    /// Exact category match.
    pub category: Option<String>,
    /// Case-insensitive substring of the note.
    pub note_contains: Option<String>,
    pub min_amount_minor: Option<i64>,
    pub max_amount_minor: Option<i64>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub month: Option<Month>,
}

impl ExpenseFilter {
    /// Only expenses created during `month`.
    #[must_use]
    pub fn for_month(month: Option<Month>) -> Self {
        Self {
            month,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    CreatedAt,
    Amount,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExpenseSort {
    pub key: SortKey,
    pub order: SortOrder,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ExpenseQuery {
    pub filter: ExpenseFilter,
    pub sort: ExpenseSort,
    pub page: PageRequest,
}

/// One page of results plus the number of matches before slicing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpensePage {
    pub items: Vec<Expense>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

/// Filter after validation, with the month already expanded.
#[derive(Clone, Debug)]
pub(super) struct ResolvedFilter {
    category: Option<String>,
    note_pattern: Option<String>,
    min_amount_minor: Option<i64>,
    max_amount_minor: Option<i64>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

pub(super) fn resolve_filter(filter: &ExpenseFilter, tz: Tz) -> ResultEngine<ResolvedFilter> {
    let category = filter
        .category
        .as_deref()
        .map(normalize_category)
        .transpose()?;

    let note_pattern = filter
        .note_contains
        .as_deref()
        .filter(|needle| !needle.is_empty())
        .and_then(|needle| fold_note(Some(needle)))
        .map(|needle| format!("%{}%", escape_like(&needle)));

    for bound in [filter.min_amount_minor, filter.max_amount_minor]
        .into_iter()
        .flatten()
    {
        if bound < 0 {
            return Err(EngineError::InvalidQuery(
                "amount bounds must be >= 0".to_string(),
            ));
        }
    }
    if let (Some(min), Some(max)) = (filter.min_amount_minor, filter.max_amount_minor)
        && min > max
    {
        return Err(EngineError::InvalidQuery(
            "invalid amount range: min must be <= max".to_string(),
        ));
    }

    let (from, to) = if let Some(month) = filter.month {
        let range = month.range(tz);
        (Some(range.start), Some(range.end))
    } else {
        if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
            Period::new(from, to)?;
        }
        (filter.date_from, filter.date_to)
    };

    Ok(ResolvedFilter {
        category,
        note_pattern,
        min_amount_minor: filter.min_amount_minor,
        max_amount_minor: filter.max_amount_minor,
        from,
        to,
    })
}

fn validate_page(page: &PageRequest) -> ResultEngine<()> {
    if !(1..=MAX_PAGE_LIMIT).contains(&page.limit) {
        return Err(EngineError::InvalidQuery(format!(
            "limit must be between 1 and {MAX_PAGE_LIMIT}"
        )));
    }
    Ok(())
}

pub(super) trait ApplyExpenseFilters: QueryFilter + Sized {
    fn apply_expense_filters(self, user_id: Uuid, filter: &ResolvedFilter) -> Self;
}

impl<T> ApplyExpenseFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_expense_filters(mut self, user_id: Uuid, filter: &ResolvedFilter) -> Self {
        self = self.filter(expenses::Column::UserId.eq(user_id.to_string()));

        if let Some(category) = &filter.category {
            self = self.filter(expenses::Column::Category.eq(category.as_str()));
        }
        if let Some(pattern) = &filter.note_pattern {
            self = self.filter(
                Expr::col(expenses::Column::NoteSearch)
                    .like(LikeExpr::new(pattern.as_str()).escape('\\')),
            );
        }
        if let Some(min) = filter.min_amount_minor {
            self = self.filter(expenses::Column::AmountMinor.gte(min));
        }
        if let Some(max) = filter.max_amount_minor {
            self = self.filter(expenses::Column::AmountMinor.lte(max));
        }
        if let Some(from) = filter.from {
            self = self.filter(expenses::Column::CreatedAt.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(expenses::Column::CreatedAt.lt(to));
        }

        self
    }
}

impl Engine {
    /// Lists the user's expenses matching `query`, sorted and sliced.
    ///
    /// Ties on the sort key are broken by id in the same direction, so
    /// consecutive pages never overlap. An offset past the end yields an
    /// empty page with the right `total` and skips the slice query, so any
    /// `u64` offset is accepted.
    pub async fn list_expenses(
        &self,
        user_id: Uuid,
        query: &ExpenseQuery,
    ) -> ResultEngine<ExpensePage> {
        validate_page(&query.page)?;
        let filter = resolve_filter(&query.filter, self.timezone)?;

        let order = match query.sort.order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        };
        let sort_column = match query.sort.key {
            SortKey::CreatedAt => expenses::Column::CreatedAt,
            SortKey::Amount => expenses::Column::AmountMinor,
        };

        with_tx!(self, |db_tx| {
            let base = expenses::Entity::find().apply_expense_filters(user_id, &filter);
            let total = base.clone().count(&db_tx).await?;
            let rows: Vec<expenses::Model> = if query.page.offset >= total {
                Vec::new()
            } else {
                base.order_by(sort_column, order.clone())
                    .order_by(expenses::Column::Id, order)
                    .offset(query.page.offset)
                    .limit(query.page.limit)
                    .all(&db_tx)
                    .await?
            };

            tracing::debug!(
                user_id = %user_id,
                total,
                returned = rows.len(),
                "listed expenses"
            );

            let items = rows
                .into_iter()
                .map(Expense::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok(ExpensePage {
                items,
                total,
                limit: query.page.limit,
                offset: query.page.offset,
            })
        })
    }
}
