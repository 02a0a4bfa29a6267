//! Statistics API endpoints

use api_types::stats::{DailyTrendParams, MonthlyTrendParams, Summary, SummaryParams, TrendPoint};
use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};
use chrono::Utc;

use crate::{
    ServerError,
    expenses::parse_month,
    server::{CurrentUser, ServerState},
};

const DEFAULT_TREND_DAYS: u32 = 30;

/// Handle requests for the spending summary, for one month or all time.
pub async fn summary(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    params: Result<Query<SummaryParams>, QueryRejection>,
) -> Result<Json<Summary>, ServerError> {
    let Query(params) = params?;
    let month = parse_month(params.month.as_deref())?;
    let summary = state.engine.summary(user_id, month).await?;

    Ok(Json(Summary {
        period: summary.period.map(|month| month.to_string()),
        total_spent_minor: summary.total_spent.cents(),
        count: summary.count,
        average_minor: summary.average.cents(),
        by_category: summary
            .by_category
            .into_iter()
            .map(|(category, total)| (category, total.cents()))
            .collect(),
    }))
}

pub async fn daily_trend(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    params: Result<Query<DailyTrendParams>, QueryRejection>,
) -> Result<Json<Vec<TrendPoint>>, ServerError> {
    let Query(params) = params?;
    let days = params.days.unwrap_or(DEFAULT_TREND_DAYS);
    let trend = state.engine.daily_trend(user_id, days, Utc::now()).await?;

    Ok(Json(
        trend
            .into_iter()
            .map(|point| TrendPoint {
                period: point.day.format("%Y-%m-%d").to_string(),
                total_minor: point.total.cents(),
            })
            .collect(),
    ))
}

pub async fn monthly_trend(
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    State(state): State<ServerState>,
    params: Result<Query<MonthlyTrendParams>, QueryRejection>,
) -> Result<Json<Vec<TrendPoint>>, ServerError> {
    let Query(params) = params?;
    let trend = state.engine.monthly_trend(user_id, params.year).await?;

    Ok(Json(
        trend
            .into_iter()
            .map(|point| TrendPoint {
                period: point.month.to_string(),
                total_minor: point.total.cents(),
            })
            .collect(),
    ))
}
