use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{DatabaseTransaction, QueryFilter, QuerySelect, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, Month, Period, ResultEngine, expenses, period::local_day,
};

use super::super::{Engine, with_tx};

/// Longest lookback accepted by [`Engine::daily_trend`].
pub const MAX_TREND_DAYS: u32 = 365;

/// Spending on one calendar day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DailyTotal {
    pub day: NaiveDate,
    pub total: MoneyCents,
}

/// Spending in one calendar month.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthlyTotal {
    pub month: Month,
    pub total: MoneyCents,
}

fn add_to_bucket<K: Ord>(
    buckets: &mut BTreeMap<K, MoneyCents>,
    key: K,
    amount: MoneyCents,
) -> ResultEngine<()> {
    let slot = buckets.entry(key).or_insert(MoneyCents::ZERO);
    *slot = slot
        .checked_add(amount)
        .ok_or_else(|| EngineError::InvalidAmount("total amount overflow".to_string()))?;
    Ok(())
}

impl Engine {
    /// `(created_at, amount_minor)` of the user's expenses inside `period`.
    async fn amounts_in_period(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
        period: Period,
    ) -> ResultEngine<Vec<(DateTimeUtc, i64)>> {
        expenses::Entity::find()
            .select_only()
            .column(expenses::Column::CreatedAt)
            .column(expenses::Column::AmountMinor)
            .filter(expenses::Column::UserId.eq(user_id.to_string()))
            .filter(expenses::Column::CreatedAt.gte(period.start))
            .filter(expenses::Column::CreatedAt.lt(period.end))
            .into_tuple::<(DateTimeUtc, i64)>()
            .all(db)
            .await
            .map_err(Into::into)
    }

    /// Per-day totals over the last `days` calendar days (today included,
    /// nothing after `now`).
    ///
    /// Days are taken in the engine timezone. Days without expenses are
    /// omitted; the result is ascending.
    ///
    /// The window is whole calendar days, not a rolling `days * 24h` span:
    /// it starts at local midnight `days - 1` days before today. Expenses in
    /// the partial day at `now - days` (before that midnight) are excluded.
    pub async fn daily_trend(
        &self,
        user_id: Uuid,
        days: u32,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<DailyTotal>> {
        if !(1..=MAX_TREND_DAYS).contains(&days) {
            return Err(EngineError::InvalidPeriod(format!(
                "days must be between 1 and {MAX_TREND_DAYS}"
            )));
        }
        let tz = self.timezone;
        let window = Period::trailing_days(days, now, tz)?;

        with_tx!(self, |db_tx| {
            let rows = self.amounts_in_period(&db_tx, user_id, window).await?;

            let mut buckets: BTreeMap<NaiveDate, MoneyCents> = BTreeMap::new();
            for (created_at, amount_minor) in rows {
                add_to_bucket(
                    &mut buckets,
                    local_day(created_at, tz),
                    MoneyCents::new(amount_minor),
                )?;
            }

            Ok(buckets
                .into_iter()
                .map(|(day, total)| DailyTotal { day, total })
                .collect())
        })
    }

    /// Per-month totals for calendar `year` in the engine timezone.
    ///
    /// Months without expenses are omitted; the result is ascending.
    pub async fn monthly_trend(&self, user_id: Uuid, year: i32) -> ResultEngine<Vec<MonthlyTotal>> {
        let tz = self.timezone;
        let period = Period::year(year, tz)?;

        with_tx!(self, |db_tx| {
            let rows = self.amounts_in_period(&db_tx, user_id, period).await?;

            let mut buckets: BTreeMap<Month, MoneyCents> = BTreeMap::new();
            for (created_at, amount_minor) in rows {
                add_to_bucket(
                    &mut buckets,
                    Month::containing(local_day(created_at, tz)),
                    MoneyCents::new(amount_minor),
                )?;
            }

            Ok(buckets
                .into_iter()
                .map(|(month, total)| MonthlyTotal { month, total })
                .collect())
        })
    }
}
