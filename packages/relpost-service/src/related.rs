use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use relpost_domain::{cache_key, taxonomy::ItemId};

use crate::{Error, PageContext, RelatedItem, RelatedService, Result, render};

const RELATED_CACHE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct RelatedCachePayload {
	schema_version: u32,
	items: Vec<RelatedItem>,
}

impl RelatedService {
	pub fn cache_key(&self, source_item_id: ItemId, now: OffsetDateTime) -> String {
		let offset = cache_key::utc_offset_from_minutes(self.cfg.cache.utc_offset_minutes);

		cache_key::related_cache_key(
			self.cfg.cache.namespace.as_str(),
			source_item_id,
			cache_key::cache_day(now, offset),
		)
	}

	/// Related items for `source_item_id`, served from the daily cache when possible.
	///
	/// A cached selection is returned verbatim until it expires. A source item without taxonomy
	/// signal yields an empty list that is not cached.
	pub async fn related(&self, source_item_id: ItemId) -> Result<Vec<RelatedItem>> {
		let cache_key = if self.cfg.cache.enabled {
			Some(self.cache_key(source_item_id, OffsetDateTime::now_utc()))
		} else {
			None
		};

		if let Some(key) = cache_key.as_deref()
			&& let Some(items) = self.read_cached(key).await
		{
			return Ok(items);
		}

		let retrieval = self.retrieve(source_item_id).await?;

		if !retrieval.has_signal() {
			return Ok(Vec::new());
		}

		let items = self.rank(&retrieval).await?;

		tracing::debug!(
			source_item_id,
			candidates = retrieval.candidates.len(),
			selected = items.len(),
			"Related items selected."
		);

		if let Some(key) = cache_key.as_deref() {
			self.write_cached(key, &items).await;
		}

		Ok(items)
	}

	pub async fn related_for_item(&self, item_id: ItemId) -> Result<Vec<RelatedItem>> {
		if self.stores.content.get_item(item_id).await?.is_none() {
			return Err(Error::NotFound { message: format!("Item {item_id}.") });
		}

		self.related(item_id).await
	}

	/// Renders the related-items grid for a single-item page, or `""` for any other page.
	///
	/// Store failures are logged and render as nothing.
	pub async fn render_related(&self, ctx: &PageContext) -> String {
		let Some(item_id) = self.single_item(ctx) else {
			return String::new();
		};

		match self.related(item_id).await {
			Ok(items) => render::related_markup(&items, &self.cfg.render),
			Err(err) => {
				tracing::warn!(error = %err, source_item_id = item_id, "Related items unavailable.");

				String::new()
			},
		}
	}

	async fn read_cached(&self, key: &str) -> Option<Vec<RelatedItem>> {
		let value = match self.stores.cache.get(key).await {
			Ok(Some(value)) => value,
			Ok(None) => {
				tracing::info!(cache_key = key, hit = false, "Cache miss.");

				return None;
			},
			Err(err) => {
				tracing::warn!(error = %err, cache_key = key, "Cache read failed.");

				return None;
			},
		};

		match serde_json::from_value::<RelatedCachePayload>(value) {
			Ok(payload) if payload.schema_version == RELATED_CACHE_SCHEMA_VERSION => {
				tracing::info!(cache_key = key, hit = true, items = payload.items.len(), "Cache hit.");

				Some(payload.items)
			},
			Ok(payload) => {
				tracing::info!(
					cache_key = key,
					schema_version = payload.schema_version,
					"Cache payload has a stale schema version."
				);

				None
			},
			Err(err) => {
				tracing::warn!(error = %err, cache_key = key, "Cache payload decode failed.");

				None
			},
		}
	}

	async fn write_cached(&self, key: &str, items: &[RelatedItem]) {
		let payload = RelatedCachePayload {
			schema_version: RELATED_CACHE_SCHEMA_VERSION,
			items: items.to_vec(),
		};
		let value = match serde_json::to_value(&payload) {
			Ok(value) => value,
			Err(err) => {
				tracing::warn!(error = %err, cache_key = key, "Cache payload encode failed.");

				return;
			},
		};
		let payload_size = value.to_string().len();

		if let Some(max) = self.cfg.cache.max_payload_bytes
			&& payload_size as u64 > max
		{
			tracing::warn!(cache_key = key, payload_size, "Cache payload skipped due to size.");

			return;
		}

		let ttl = time::Duration::seconds(self.cfg.cache.ttl_seconds.min(i64::MAX as u64) as i64);

		if let Err(err) = self.stores.cache.set(key, value, ttl).await {
			tracing::warn!(error = %err, cache_key = key, "Cache write failed.");

			return;
		}

		tracing::info!(
			cache_key = key,
			payload_size,
			ttl_seconds = self.cfg.cache.ttl_seconds,
			"Cache stored."
		);

		// Day-bucketed keys are never read again once their day has passed.
		match self.stores.cache.purge_expired().await {
			Ok(0) => {},
			Ok(purged) => tracing::debug!(purged, "Expired cache entries purged."),
			Err(err) => tracing::warn!(error = %err, "Cache purge failed."),
		}
	}
}
