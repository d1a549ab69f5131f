use std::collections::HashSet;

use crate::taxonomy::{TaxonomySignal, TermId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
	pub tag: f32,
	pub category: f32,
}
impl Default for ScoringWeights {
	fn default() -> Self {
		Self { tag: 1.0, category: 0.5 }
	}
}

/// A candidate with its relevance score and its position in the retrieved pool.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<T> {
	pub item: T,
	pub score: f32,
	pub retrieval_rank: usize,
}

/// Counts candidate ids present in `signal_ids`.
pub fn overlap_count(candidate_ids: &[TermId], signal_ids: &[TermId]) -> usize {
	if candidate_ids.is_empty() || signal_ids.is_empty() {
		return 0;
	}

	let signal: HashSet<TermId> = signal_ids.iter().copied().collect();

	candidate_ids.iter().filter(|term_id| signal.contains(term_id)).count()
}

pub fn score_candidate(
	signal: &TaxonomySignal,
	candidate_category_ids: &[TermId],
	candidate_tag_ids: &[TermId],
	weights: ScoringWeights,
) -> f32 {
	let tags = overlap_count(candidate_tag_ids, &signal.tag_ids) as f32;
	let categories = overlap_count(candidate_category_ids, &signal.category_ids) as f32;

	tags * weights.tag + categories * weights.category
}
