use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use relpost_domain::taxonomy::{ItemId, TermId, TermKind};

pub const STATUS_PUBLISH: &str = "publish";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
	pub item_id: ItemId,
	pub item_type: String,
	#[serde(default = "default_status")]
	pub status: String,
	pub title: String,
	pub permalink: String,
	#[serde(default)]
	pub thumbnail_url: Option<String>,
	#[serde(default)]
	pub sticky: bool,
	#[serde(with = "time::serde::rfc3339")]
	pub published_at: OffsetDateTime,
}
impl Item {
	pub fn is_published(&self) -> bool {
		self.status == STATUS_PUBLISH
	}
}

/// Membership of an item in any of `term_ids` within one taxonomy kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyCondition {
	pub kind: TermKind,
	pub term_ids: Vec<TermId>,
}

/// Candidate lookup. Conditions in `taxonomy_or` are OR-combined; an empty list matches every
/// item of `item_type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
	pub item_type: String,
	pub exclude_ids: Vec<ItemId>,
	pub limit: u32,
	/// Ignore pinned items when ordering, so the pool is the plain match set.
	pub sticky_disabled: bool,
	pub taxonomy_or: Vec<TaxonomyCondition>,
}
impl ItemQuery {
	pub fn term_ids(&self, kind: TermKind) -> Vec<TermId> {
		self.taxonomy_or
			.iter()
			.filter(|condition| condition.kind == kind)
			.flat_map(|condition| condition.term_ids.iter().copied())
			.collect()
	}
}

fn default_status() -> String {
	STATUS_PUBLISH.to_string()
}
