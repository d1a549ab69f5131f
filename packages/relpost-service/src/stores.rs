use std::{future, sync::Arc};

use serde_json::Value;
use time::OffsetDateTime;

use relpost_config::{Config, StorageBackend};
use relpost_domain::taxonomy::{ItemId, Term, TermKind};
use relpost_storage::{
	cache, content,
	db::Db,
	memory::{MemoryCache, MemoryContentStore},
	models::{Item, ItemQuery},
};

use crate::{BoxFuture, CacheStore, ContentStore, Error, Result};

#[derive(Clone)]
pub struct Stores {
	pub content: Arc<dyn ContentStore>,
	pub cache: Arc<dyn CacheStore>,
}
impl Stores {
	pub fn new(content: Arc<dyn ContentStore>, cache: Arc<dyn CacheStore>) -> Self {
		Self { content, cache }
	}

	pub fn memory(content: MemoryContentStore) -> Self {
		Self { content: Arc::new(content), cache: Arc::new(MemoryCache::new()) }
	}

	pub async fn from_config(cfg: &Config) -> Result<Self> {
		match StorageBackend::parse(cfg.storage.backend.as_str()) {
			Some(StorageBackend::Postgres) => {
				let postgres = cfg.storage.postgres.as_ref().ok_or_else(|| Error::InvalidRequest {
					message: "storage.postgres is required for the postgres backend.".to_string(),
				})?;
				let db = Db::connect(postgres).await?;

				db.ensure_schema().await?;

				tracing::info!(backend = "postgres", "Content and cache stores ready.");

				Ok(Self { content: Arc::new(db.clone()), cache: Arc::new(db) })
			},
			Some(StorageBackend::Memory) => {
				let content = match cfg.storage.memory.seed_path.as_deref() {
					Some(path) => MemoryContentStore::load_seed(path)?,
					None => MemoryContentStore::new(),
				};

				tracing::info!(
					backend = "memory",
					seeded = cfg.storage.memory.seed_path.is_some(),
					"Content and cache stores ready."
				);

				Ok(Self::memory(content))
			},
			None => Err(Error::InvalidRequest {
				message: format!("Unknown storage backend {:?}.", cfg.storage.backend),
			}),
		}
	}
}

impl ContentStore for Db {
	fn get_item<'a>(&'a self, item_id: ItemId) -> BoxFuture<'a, Result<Option<Item>>> {
		Box::pin(async move { Ok(content::fetch_item(self, item_id).await?) })
	}

	fn terms_of<'a>(&'a self, item_id: ItemId, kind: TermKind) -> BoxFuture<'a, Result<Vec<Term>>> {
		Box::pin(async move { Ok(content::fetch_terms(self, item_id, kind).await?) })
	}

	fn query_items<'a>(&'a self, query: &'a ItemQuery) -> BoxFuture<'a, Result<Vec<Item>>> {
		Box::pin(async move { Ok(content::query_items(self, query).await?) })
	}
}

impl CacheStore for Db {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>> {
		Box::pin(async move {
			cache::fetch_payload(self, key, OffsetDateTime::now_utc())
				.await
				.map_err(|err| Error::Cache { message: err.to_string() })
		})
	}

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: Value,
		ttl: time::Duration,
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			let now = OffsetDateTime::now_utc();
			let expires_at = expiry(now, ttl)?;

			cache::store_payload(self, key, value, now, expires_at)
				.await
				.map_err(|err| Error::Cache { message: err.to_string() })
		})
	}

	fn purge_expired<'a>(&'a self) -> BoxFuture<'a, Result<u64>> {
		Box::pin(async move {
			cache::purge_expired(self, OffsetDateTime::now_utc())
				.await
				.map_err(|err| Error::Cache { message: err.to_string() })
		})
	}
}

impl ContentStore for MemoryContentStore {
	fn get_item<'a>(&'a self, item_id: ItemId) -> BoxFuture<'a, Result<Option<Item>>> {
		Box::pin(future::ready(Ok(self.item(item_id))))
	}

	fn terms_of<'a>(&'a self, item_id: ItemId, kind: TermKind) -> BoxFuture<'a, Result<Vec<Term>>> {
		Box::pin(future::ready(Ok(MemoryContentStore::terms_of(self, item_id, kind))))
	}

	fn query_items<'a>(&'a self, query: &'a ItemQuery) -> BoxFuture<'a, Result<Vec<Item>>> {
		Box::pin(future::ready(Ok(MemoryContentStore::query_items(self, query))))
	}
}

impl CacheStore for MemoryCache {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>> {
		Box::pin(future::ready(Ok(self.fetch(key, OffsetDateTime::now_utc()))))
	}

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: Value,
		ttl: time::Duration,
	) -> BoxFuture<'a, Result<()>> {
		let stored = expiry(OffsetDateTime::now_utc(), ttl)
			.map(|expires_at| self.store(key, value, expires_at));

		Box::pin(future::ready(stored))
	}

	fn purge_expired<'a>(&'a self) -> BoxFuture<'a, Result<u64>> {
		let purged = MemoryCache::purge_expired(self, OffsetDateTime::now_utc());

		Box::pin(future::ready(Ok(purged as u64)))
	}
}

fn expiry(now: OffsetDateTime, ttl: time::Duration) -> Result<OffsetDateTime> {
	now.checked_add(ttl).ok_or_else(|| Error::Cache {
		message: format!("Cache TTL of {}s overflows the expiry timestamp.", ttl.whole_seconds()),
	})
}
