//! Expense API endpoints

use api_types::{
    Page, PageMeta,
    expense::{ExpenseListParams, ExpenseNew, ExpenseUpdate, ExpenseView, Order, SortBy},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
};
use chrono::Utc;
use engine::{
    EngineError, ExpenseCmd, ExpenseFilter, ExpenseQuery, ExpenseSort, Month, PageRequest,
    SortKey, SortOrder, UpdateExpenseCmd,
};
use uuid::Uuid;

use crate::{
    ServerError,
    server::{CurrentUser, ServerState},
};

pub(crate) fn view(expense: engine::Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        user_id: expense.user_id,
        category: expense.category,
        amount_minor: expense.amount.cents(),
        note: expense.note,
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}

/// Any id the caller can't see is reported the same way as a missing one.
fn expense_id(raw: &str) -> Result<Uuid, ServerError> {
    Uuid::parse_str(raw)
        .map_err(|_| EngineError::KeyNotFound("expense not exists".to_string()).into())
}

pub(crate) fn parse_month(raw: Option<&str>) -> Result<Option<Month>, ServerError> {
    Ok(raw.map(str::parse::<Month>).transpose()?)
}

fn query_from_params(params: ExpenseListParams) -> Result<ExpenseQuery, ServerError> {
    let month = parse_month(params.month.as_deref())?;

    let key = match params.sort_by.unwrap_or_default() {
        SortBy::CreatedAt => SortKey::CreatedAt,
        SortBy::Amount => SortKey::Amount,
    };
    let order = match params.order.unwrap_or_default() {
        Order::Asc => SortOrder::Asc,
        Order::Desc => SortOrder::Desc,
    };

    Ok(ExpenseQuery {
        filter: ExpenseFilter {
            category: params.category,
            note_contains: params.q,
            min_amount_minor: params.min_amount_minor,
            max_amount_minor: params.max_amount_minor,
            date_from: params.date_from.map(|dt| dt.with_timezone(&Utc)),
            date_to: params.date_to.map(|dt| dt.with_timezone(&Utc)),
            month,
        },
        sort: ExpenseSort { key, order },
        page: PageRequest {
            limit: params.limit.unwrap_or(engine::DEFAULT_PAGE_LIMIT),
            offset: params.offset.unwrap_or(0),
        },
    })
}

pub async fn list(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    params: Result<Query<ExpenseListParams>, QueryRejection>,
) -> Result<Json<Page<ExpenseView>>, ServerError> {
    let Query(params) = params?;
    let query = query_from_params(params)?;
    let page = state.engine.list_expenses(user_id, &query).await?;

    Ok(Json(Page {
        items: page.items.into_iter().map(view).collect(),
        meta: PageMeta {
            total: page.total,
            limit: page.limit,
            offset: page.offset,
        },
    }))
}

pub async fn create(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let created_at = payload
        .created_at
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now);

    let mut cmd = ExpenseCmd::new(user_id, payload.category, payload.amount_minor, created_at);
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }

    let expense = state.engine.create_expense(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(expense))))
}

pub async fn get(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state.engine.expense(user_id, expense_id(&id)?).await?;
    Ok(Json(view(expense)))
}

pub async fn update(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseView>, ServerError> {
    let mut cmd = UpdateExpenseCmd::new(user_id, expense_id(&id)?, Utc::now());
    if let Some(category) = payload.category {
        cmd = cmd.category(category);
    }
    if let Some(amount_minor) = payload.amount_minor {
        cmd = cmd.amount_minor(amount_minor);
    }
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }
    if let Some(created_at) = payload.created_at {
        cmd = cmd.created_at(created_at.with_timezone(&Utc));
    }

    let expense = state.engine.update_expense(cmd).await?;
    Ok(Json(view(expense)))
}

pub async fn delete(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_expense(user_id, expense_id(&id)?)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_give_default_query() {
        let query = query_from_params(ExpenseListParams::default()).ok().unwrap();
        assert_eq!(query.sort, ExpenseSort::default());
        assert_eq!(query.page, PageRequest::default());
        assert!(query.filter.month.is_none());
    }

    #[test]
    fn malformed_month_is_rejected() {
        let params = ExpenseListParams {
            month: Some("2024-13".to_string()),
            ..ExpenseListParams::default()
        };
        assert!(matches!(
            query_from_params(params),
            Err(ServerError::Engine(EngineError::InvalidPeriod(_)))
        ));
    }

    #[test]
    fn malformed_id_reads_as_missing() {
        assert!(matches!(
            expense_id("not-a-uuid"),
            Err(ServerError::Engine(EngineError::KeyNotFound(_)))
        ));
    }
}
