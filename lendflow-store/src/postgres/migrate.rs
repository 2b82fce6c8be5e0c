use sqlx::PgPool;

use crate::store::StoreError;

pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
    let migrator = sqlx::migrate!("postgres/migrations");
    migrator
        .run(pool)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
    tracing::info!("migrations applied");
    Ok(())
}
