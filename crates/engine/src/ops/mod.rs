use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

mod access;
mod expenses;
mod users;

pub use expenses::{
    DEFAULT_PAGE_LIMIT, DailyTotal, ExpenseFilter, ExpensePage, ExpenseQuery, ExpenseSort,
    MAX_PAGE_LIMIT, MAX_TREND_DAYS, MonthlyTotal, PageRequest, SortKey, SortOrder, Summary,
};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Query engine over the expense store.
///
/// Every operation takes the verified user id and never touches rows owned
/// by anybody else. The engine keeps no state between calls besides the
/// injected connection and the timezone used for calendar bucketing.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    timezone: Tz,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Timezone used to turn timestamps into calendar days and months.
    pub fn timezone(&self) -> Tz {
        self.timezone
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    timezone: Option<Tz>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Timezone for day/month bucketing (defaults to UTC).
    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = Some(timezone);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> crate::ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            timezone: self.timezone.unwrap_or(Tz::UTC),
        })
    }
}
