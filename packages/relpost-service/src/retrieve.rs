use relpost_domain::taxonomy::{ItemId, TaxonomySignal, TermKind};
use relpost_storage::models::{Item, ItemQuery, TaxonomyCondition};

use crate::{RelatedService, Result};

/// The source item's usable taxonomy signal and the candidates sharing any of it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Retrieval {
	pub signal: TaxonomySignal,
	pub candidates: Vec<Item>,
}
impl Retrieval {
	pub fn has_signal(&self) -> bool {
		!self.signal.is_empty()
	}
}

impl RelatedService {
	pub async fn retrieve(&self, source_item_id: ItemId) -> Result<Retrieval> {
		let content = &self.stores.content;
		let categories = content.terms_of(source_item_id, TermKind::Category).await?;
		let tags = content.terms_of(source_item_id, TermKind::Tag).await?;
		let signal = TaxonomySignal::from_terms(&categories, &tags, self.ignore_list());

		if signal.is_empty() {
			tracing::debug!(
				source_item_id,
				categories = categories.len(),
				tags = tags.len(),
				"No taxonomy signal after ignore-list filtering."
			);

			return Ok(Retrieval { signal, candidates: Vec::new() });
		}

		let query = self.candidate_query(source_item_id, &signal);
		let mut candidates = content.query_items(&query).await?;

		candidates.retain(|item| item.item_id != source_item_id);

		tracing::debug!(
			source_item_id,
			signal_categories = signal.category_ids.len(),
			signal_tags = signal.tag_ids.len(),
			candidates = candidates.len(),
			"Candidates retrieved."
		);

		Ok(Retrieval { signal, candidates })
	}

	pub fn candidate_query(&self, source_item_id: ItemId, signal: &TaxonomySignal) -> ItemQuery {
		let taxonomy_or = [TermKind::Category, TermKind::Tag]
			.into_iter()
			.filter(|kind| !signal.ids(*kind).is_empty())
			.map(|kind| TaxonomyCondition { kind, term_ids: signal.ids(kind).to_vec() })
			.collect();

		ItemQuery {
			item_type: self.cfg.content.item_type.clone(),
			exclude_ids: vec![source_item_id],
			limit: self.cfg.content.candidate_limit,
			sticky_disabled: true,
			taxonomy_or,
		}
	}
}
