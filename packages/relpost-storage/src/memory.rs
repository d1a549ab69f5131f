//! Process-local stores with the same contracts as the Postgres tables.

use std::{
	collections::{BTreeMap, HashMap},
	fs,
	path::Path,
	sync::{Mutex, RwLock},
};

use serde::Deserialize;
use serde_json::Value;
use time::OffsetDateTime;

use relpost_domain::taxonomy::{ItemId, Term, TermId, TermKind};

use crate::{
	Error, Result,
	models::{Item, ItemQuery},
};

/// A JSON corpus: terms plus items with the ids of the terms attached to them.
#[derive(Debug, Default, Deserialize)]
pub struct Seed {
	#[serde(default)]
	pub terms: Vec<Term>,
	#[serde(default)]
	pub items: Vec<SeedItem>,
}

#[derive(Debug, Deserialize)]
pub struct SeedItem {
	#[serde(flatten)]
	pub item: Item,
	#[serde(default)]
	pub term_ids: Vec<TermId>,
}

#[derive(Default)]
struct Corpus {
	items: BTreeMap<ItemId, Item>,
	terms: HashMap<TermId, Term>,
	item_terms: HashMap<ItemId, Vec<TermId>>,
}

#[derive(Default)]
pub struct MemoryContentStore {
	corpus: RwLock<Corpus>,
}
impl MemoryContentStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_seed(seed: Seed) -> Result<Self> {
		let store = Self::new();

		for term in seed.terms {
			store.insert_term(term);
		}
		for SeedItem { item, term_ids } in seed.items {
			let item_id = item.item_id;

			store.insert_item(item);

			for term_id in term_ids {
				store.attach_term(item_id, term_id).map_err(|err| Error::Seed(err.to_string()))?;
			}
		}

		Ok(store)
	}

	pub fn load_seed(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::Seed(format!("Failed to read {path:?}: {err}")))?;
		let seed: Seed = serde_json::from_str(&raw)
			.map_err(|err| Error::Seed(format!("Failed to parse {path:?}: {err}")))?;

		Self::from_seed(seed)
	}

	pub fn insert_item(&self, item: Item) {
		let mut corpus = self.corpus.write().unwrap_or_else(|err| err.into_inner());

		corpus.items.insert(item.item_id, item);
	}

	pub fn insert_term(&self, term: Term) {
		let mut corpus = self.corpus.write().unwrap_or_else(|err| err.into_inner());

		corpus.terms.insert(term.term_id, term);
	}

	pub fn attach_term(&self, item_id: ItemId, term_id: TermId) -> Result<()> {
		let mut corpus = self.corpus.write().unwrap_or_else(|err| err.into_inner());

		if !corpus.items.contains_key(&item_id) || !corpus.terms.contains_key(&term_id) {
			return Err(Error::NotFound(format!("Item {item_id} or term {term_id}.")));
		}

		let attached = corpus.item_terms.entry(item_id).or_default();

		if !attached.contains(&term_id) {
			attached.push(term_id);
		}

		Ok(())
	}

	pub fn item(&self, item_id: ItemId) -> Option<Item> {
		let corpus = self.corpus.read().unwrap_or_else(|err| err.into_inner());

		corpus.items.get(&item_id).cloned()
	}

	/// Terms of one kind attached to `item_id`, ordered by name then id.
	pub fn terms_of(&self, item_id: ItemId, kind: TermKind) -> Vec<Term> {
		let corpus = self.corpus.read().unwrap_or_else(|err| err.into_inner());
		let mut terms: Vec<Term> = corpus
			.item_terms
			.get(&item_id)
			.into_iter()
			.flatten()
			.filter_map(|term_id| corpus.terms.get(term_id))
			.filter(|term| term.kind == kind)
			.cloned()
			.collect();

		terms.sort_by(|lhs, rhs| lhs.name.cmp(&rhs.name).then(lhs.term_id.cmp(&rhs.term_id)));

		terms
	}

	pub fn query_items(&self, query: &ItemQuery) -> Vec<Item> {
		let corpus = self.corpus.read().unwrap_or_else(|err| err.into_inner());
		let mut matched: Vec<&Item> = corpus
			.items
			.values()
			.filter(|item| item.item_type == query.item_type && item.is_published())
			.filter(|item| !query.exclude_ids.contains(&item.item_id))
			.filter(|item| {
				if query.taxonomy_or.is_empty() {
					return true;
				}

				let attached = corpus.item_terms.get(&item.item_id);

				query.taxonomy_or.iter().any(|condition| {
					attached.into_iter().flatten().any(|term_id| {
						condition.term_ids.contains(term_id)
							&& corpus
								.terms
								.get(term_id)
								.map(|term| term.kind == condition.kind)
								.unwrap_or(false)
					})
				})
			})
			.collect();

		matched.sort_by(|lhs, rhs| {
			let pinned = if query.sticky_disabled {
				std::cmp::Ordering::Equal
			} else {
				rhs.sticky.cmp(&lhs.sticky)
			};

			pinned
				.then(rhs.published_at.cmp(&lhs.published_at))
				.then(rhs.item_id.cmp(&lhs.item_id))
		});

		matched.into_iter().take(query.limit as usize).cloned().collect()
	}
}

struct CacheSlot {
	value: Value,
	expires_at: OffsetDateTime,
	hit_count: u64,
}

/// Expiring key/value cache kept in process memory.
#[derive(Default)]
pub struct MemoryCache {
	slots: Mutex<HashMap<String, CacheSlot>>,
}
impl MemoryCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn fetch(&self, key: &str, now: OffsetDateTime) -> Option<Value> {
		let mut slots = self.slots.lock().unwrap_or_else(|err| err.into_inner());
		let slot = slots.get_mut(key)?;

		if slot.expires_at <= now {
			slots.remove(key);

			return None;
		}

		slot.hit_count += 1;

		Some(slot.value.clone())
	}

	pub fn store(&self, key: &str, value: Value, expires_at: OffsetDateTime) {
		let mut slots = self.slots.lock().unwrap_or_else(|err| err.into_inner());

		slots.insert(key.to_string(), CacheSlot { value, expires_at, hit_count: 0 });
	}

	/// Drops every slot expired at `now` and returns how many went.
	pub fn purge_expired(&self, now: OffsetDateTime) -> usize {
		let mut slots = self.slots.lock().unwrap_or_else(|err| err.into_inner());
		let before = slots.len();

		slots.retain(|_, slot| slot.expires_at > now);

		before - slots.len()
	}

	pub fn hit_count(&self, key: &str) -> Option<u64> {
		let slots = self.slots.lock().unwrap_or_else(|err| err.into_inner());

		slots.get(key).map(|slot| slot.hit_count)
	}

	pub fn len(&self) -> usize {
		self.slots.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
