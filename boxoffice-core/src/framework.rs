use sqlx::PgPool;

/// Executes single-statement queries against the pool.
///
/// Each query is a plain struct with a `kanau::processor::Processor` impl on
/// this type. Multi-statement units of work take a `sqlx::Transaction`
/// directly instead (see the `*_tx` helpers on the entities).
#[derive(Debug, Clone)]
pub struct DatabaseProcessor {
    pub pool: PgPool,
}

impl DatabaseProcessor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, sqlx::Error> {
        self.pool.begin().await
    }
}
