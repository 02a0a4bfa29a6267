use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One slice of a listing plus the numbers needed to fetch the rest.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Number of matching records before `limit`/`offset` are applied.
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseNew {
        pub category: String,
        /// Must be > 0.
        pub amount_minor: i64,
        pub note: Option<String>,
        /// RFC3339 timestamp. If absent, server uses now().
        pub created_at: Option<DateTime<FixedOffset>>,
    }

    /// Partial update; at least one field must be present.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseUpdate {
        pub category: Option<String>,
        pub amount_minor: Option<i64>,
        /// An empty string clears the note.
        pub note: Option<String>,
        pub created_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenseView {
        pub id: Uuid,
        pub user_id: Uuid,
        pub category: String,
        pub amount_minor: i64,
        pub note: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: Option<DateTime<Utc>>,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum SortBy {
        #[default]
        CreatedAt,
        Amount,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Order {
        Asc,
        #[default]
        Desc,
    }

    /// Query string of `GET /expenses`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenseListParams {
        pub category: Option<String>,
        /// Case-insensitive substring of the note.
        pub q: Option<String>,
        pub min_amount_minor: Option<i64>,
        pub max_amount_minor: Option<i64>,
        /// Inclusive lower bound.
        pub date_from: Option<DateTime<FixedOffset>>,
        /// Exclusive upper bound.
        pub date_to: Option<DateTime<FixedOffset>>,
        /// `YYYY-MM`; overrides `date_from`/`date_to`.
        pub month: Option<String>,
        pub sort_by: Option<SortBy>,
        pub order: Option<Order>,
        pub limit: Option<u64>,
        pub offset: Option<u64>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct SummaryParams {
        /// `YYYY-MM`; absent means all time.
        pub month: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Summary {
        /// The requested month, or `null` for all time.
        pub period: Option<String>,
        pub total_spent_minor: i64,
        pub count: u64,
        pub average_minor: i64,
        pub by_category: BTreeMap<String, i64>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct DailyTrendParams {
        /// Defaults to 30.
        pub days: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyTrendParams {
        pub year: i32,
    }

    /// One bucket of a trend, labelled `YYYY-MM-DD` or `YYYY-MM`.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TrendPoint {
        pub period: String,
        pub total_minor: i64,
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub email: String,
    }
}

pub mod health {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ServiceInfo {
        pub ok: bool,
        pub service: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Status {
        pub message: String,
    }
}
