use serde_json::Value;
use sqlx::Row;
use time::OffsetDateTime;

use crate::{Result, db::Db};

/// Returns the live payload for `key`, counting the hit.
pub async fn fetch_payload(db: &Db, key: &str, now: OffsetDateTime) -> Result<Option<Value>> {
	let row = sqlx::query(
		"SELECT payload FROM related_cache WHERE cache_key = $1 AND expires_at > $2",
	)
	.bind(key)
	.bind(now)
	.fetch_optional(&db.pool)
	.await?;
	let Some(row) = row else {
		return Ok(None);
	};
	let value: Value = row.try_get("payload")?;

	sqlx::query(
		"\
UPDATE related_cache
SET last_accessed_at = $1, hit_count = hit_count + 1
WHERE cache_key = $2",
	)
	.bind(now)
	.bind(key)
	.execute(&db.pool)
	.await?;

	Ok(Some(value))
}

/// Upserts `value` under `key`, resetting its hit count.
pub async fn store_payload(
	db: &Db,
	key: &str,
	value: Value,
	now: OffsetDateTime,
	expires_at: OffsetDateTime,
) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO related_cache (cache_key, payload, created_at, last_accessed_at, expires_at, hit_count)
VALUES ($1, $2, $3, $3, $4, 0)
ON CONFLICT (cache_key) DO UPDATE SET
	payload = EXCLUDED.payload,
	last_accessed_at = EXCLUDED.last_accessed_at,
	expires_at = EXCLUDED.expires_at,
	hit_count = 0",
	)
	.bind(key)
	.bind(value)
	.bind(now)
	.bind(expires_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn purge_expired(db: &Db, now: OffsetDateTime) -> Result<u64> {
	let result = sqlx::query("DELETE FROM related_cache WHERE expires_at <= $1")
		.bind(now)
		.execute(&db.pool)
		.await?;

	Ok(result.rows_affected())
}
