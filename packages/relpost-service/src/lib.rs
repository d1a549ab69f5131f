pub mod embed;
pub mod rank;
pub mod related;
pub mod render;
pub mod retrieve;
pub mod stores;

mod error;

pub use embed::{EmbedHandler, EmbedRegistry, RelatedItemsEmbed};
pub use error::{Error, Result};
pub use retrieve::Retrieval;
pub use stores::Stores;

use std::{future::Future, pin::Pin};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use relpost_config::Config;
use relpost_domain::{
	scoring::ScoringWeights,
	selection::SelectionPolicy,
	taxonomy::{IgnoreList, ItemId, Term, TermKind},
};
use relpost_storage::models::{Item, ItemQuery};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait ContentStore
where
	Self: Send + Sync,
{
	fn get_item<'a>(&'a self, item_id: ItemId) -> BoxFuture<'a, Result<Option<Item>>>;

	fn terms_of<'a>(&'a self, item_id: ItemId, kind: TermKind) -> BoxFuture<'a, Result<Vec<Term>>>;

	fn query_items<'a>(&'a self, query: &'a ItemQuery) -> BoxFuture<'a, Result<Vec<Item>>>;
}

pub trait CacheStore
where
	Self: Send + Sync,
{
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Value>>>;

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: Value,
		ttl: time::Duration,
	) -> BoxFuture<'a, Result<()>>;

	/// Removes every expired entry, not only those of today's keys.
	fn purge_expired<'a>(&'a self) -> BoxFuture<'a, Result<u64>>;
}

/// The projection of an item that is cached and rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedItem {
	pub item_id: ItemId,
	pub title: String,
	pub permalink: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub thumbnail_url: Option<String>,
}
impl From<&Item> for RelatedItem {
	fn from(item: &Item) -> Self {
		Self {
			item_id: item.item_id,
			title: item.title.clone(),
			permalink: item.permalink.clone(),
			thumbnail_url: item.thumbnail_url.clone(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PageContext {
	/// A detail page for exactly one item.
	Single { item_id: ItemId, item_type: String },
	/// Archives, search results, feeds and anything else listing several items.
	Listing,
}

pub struct RelatedService {
	pub cfg: Config,
	pub stores: Stores,
	ignore: IgnoreList,
	weights: ScoringWeights,
	policy: SelectionPolicy,
}
impl RelatedService {
	pub fn new(cfg: Config, stores: Stores) -> Self {
		let ignore = IgnoreList::new(cfg.ignore.categories.clone(), cfg.ignore.tags.clone());
		let weights = ScoringWeights {
			tag: cfg.ranking.tag_weight,
			category: cfg.ranking.category_weight,
		};
		let policy = SelectionPolicy {
			top_pool_size: cfg.ranking.top_pool_size as usize,
			output_count: cfg.ranking.output_count as usize,
		};

		Self { cfg, stores, ignore, weights, policy }
	}

	pub fn ignore_list(&self) -> &IgnoreList {
		&self.ignore
	}

	pub fn weights(&self) -> ScoringWeights {
		self.weights
	}

	pub fn policy(&self) -> SelectionPolicy {
		self.policy
	}

	/// Returns the item id when `ctx` is a detail page of the primary content type.
	pub fn single_item(&self, ctx: &PageContext) -> Option<ItemId> {
		match ctx {
			PageContext::Single { item_id, item_type }
				if item_type == &self.cfg.content.item_type =>
				Some(*item_id),
			_ => None,
		}
	}

	pub async fn page_context(&self, item_id: ItemId) -> Result<PageContext> {
		let item = self
			.stores
			.content
			.get_item(item_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: format!("Item {item_id}.") })?;

		Ok(PageContext::Single { item_id: item.item_id, item_type: item.item_type })
	}
}
