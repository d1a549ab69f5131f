use std::collections::HashSet;

use serde::{Deserialize, Serialize};

pub type ItemId = i64;
pub type TermId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermKind {
	Category,
	Tag,
}
impl TermKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Category => "category",
			Self::Tag => "tag",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"category" => Some(Self::Category),
			"tag" => Some(Self::Tag),
			_ => None,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
	pub term_id: TermId,
	pub kind: TermKind,
	pub slug: String,
	#[serde(default)]
	pub name: String,
}

/// Per-kind slugs excluded from a source item's relevance signal.
///
/// Matching is exact and case-sensitive. The list applies to the source item only; candidate
/// terms are always compared unfiltered.
#[derive(Debug, Clone, Default)]
pub struct IgnoreList {
	categories: HashSet<String>,
	tags: HashSet<String>,
}
impl IgnoreList {
	pub fn new<C, T>(categories: C, tags: T) -> Self
	where
		C: IntoIterator,
		C::Item: Into<String>,
		T: IntoIterator,
		T::Item: Into<String>,
	{
		Self {
			categories: categories.into_iter().map(Into::into).collect(),
			tags: tags.into_iter().map(Into::into).collect(),
		}
	}

	pub fn contains(&self, kind: TermKind, slug: &str) -> bool {
		match kind {
			TermKind::Category => self.categories.contains(slug),
			TermKind::Tag => self.tags.contains(slug),
		}
	}
}

/// The filtered taxonomy ids of a source item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomySignal {
	pub category_ids: Vec<TermId>,
	pub tag_ids: Vec<TermId>,
}
impl TaxonomySignal {
	pub fn from_terms(categories: &[Term], tags: &[Term], ignore: &IgnoreList) -> Self {
		Self {
			category_ids: signal_ids(categories, TermKind::Category, ignore),
			tag_ids: signal_ids(tags, TermKind::Tag, ignore),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.category_ids.is_empty() && self.tag_ids.is_empty()
	}

	pub fn ids(&self, kind: TermKind) -> &[TermId] {
		match kind {
			TermKind::Category => &self.category_ids,
			TermKind::Tag => &self.tag_ids,
		}
	}
}

/// Returns the ids of `terms` whose slug is not ignored for `kind`, first occurrence order.
pub fn signal_ids(terms: &[Term], kind: TermKind, ignore: &IgnoreList) -> Vec<TermId> {
	let mut seen = HashSet::new();

	terms
		.iter()
		.filter(|term| !ignore.contains(kind, term.slug.as_str()))
		.map(|term| term.term_id)
		.filter(|term_id| seen.insert(*term_id))
		.collect()
}
