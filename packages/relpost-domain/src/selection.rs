use std::cmp::Ordering;

use rand::{Rng, seq::SliceRandom};

use crate::scoring::ScoredCandidate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionPolicy {
	/// Number of best-scored candidates eligible for the final pick.
	pub top_pool_size: usize,
	pub output_count: usize,
}
impl Default for SelectionPolicy {
	fn default() -> Self {
		Self { top_pool_size: 6, output_count: 3 }
	}
}

/// Drops candidates without signal and orders the rest by descending score.
///
/// Equal scores keep their retrieval order.
pub fn rank_scored<T>(mut scored: Vec<ScoredCandidate<T>>) -> Vec<ScoredCandidate<T>> {
	scored.retain(|candidate| candidate.score > 0.0);
	scored.sort_by(|lhs, rhs| {
		rhs.score
			.partial_cmp(&lhs.score)
			.unwrap_or(Ordering::Equal)
			.then_with(|| lhs.retrieval_rank.cmp(&rhs.retrieval_rank))
	});

	scored
}

/// Picks the final items from an already ranked list.
///
/// Only the top pool takes part. A pool larger than the output count is shuffled as a whole
/// before truncation; a smaller one is returned in rank order.
pub fn select_from_ranked<T, R>(
	ranked: Vec<ScoredCandidate<T>>,
	policy: SelectionPolicy,
	rng: &mut R,
) -> Vec<T>
where
	R: Rng + ?Sized,
{
	let mut pool: Vec<T> =
		ranked.into_iter().take(policy.top_pool_size).map(|candidate| candidate.item).collect();

	if pool.len() > policy.output_count {
		pool.shuffle(rng);
	}

	pool.truncate(policy.output_count);

	pool
}

pub fn select_related<T, R>(
	scored: Vec<ScoredCandidate<T>>,
	policy: SelectionPolicy,
	rng: &mut R,
) -> Vec<T>
where
	R: Rng + ?Sized,
{
	select_from_ranked(rank_scored(scored), policy, rng)
}
