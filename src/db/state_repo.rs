use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::IngestionState;

/// Record the watermark for (source, key). Called exactly once, at the end
/// of a fully successful pass, with the pass start time; a stalled pipeline
/// shows up as a watermark that stops advancing.
pub async fn set_watermark(
    pool: &PgPool,
    source: &str,
    key: &str,
    ts: DateTime<Utc>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO ingestion_state (source, key, last_timestamp)
        VALUES ($1, $2, $3)
        ON CONFLICT (source, key) DO UPDATE SET
            last_timestamp = EXCLUDED.last_timestamp,
            updated_at = NOW()
        "#,
    )
    .bind(source)
    .bind(key)
    .bind(ts)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_watermark(
    pool: &PgPool,
    source: &str,
    key: &str,
) -> anyhow::Result<Option<IngestionState>> {
    let row = sqlx::query_as::<_, IngestionState>(
        "SELECT * FROM ingestion_state WHERE source = $1 AND key = $2",
    )
    .bind(source)
    .bind(key)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
