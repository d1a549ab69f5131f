use rand::Rng;

use relpost_domain::{
	scoring::{self, ScoredCandidate},
	selection,
	taxonomy::{ItemId, TermId, TermKind},
};

use crate::{RelatedItem, RelatedService, Result, retrieve::Retrieval};

impl RelatedService {
	pub async fn rank(&self, retrieval: &Retrieval) -> Result<Vec<RelatedItem>> {
		let scored = self.score_candidates(retrieval).await?;

		Ok(selection::select_related(scored, self.policy(), &mut rand::rng()))
	}

	pub async fn rank_with<R>(&self, retrieval: &Retrieval, rng: &mut R) -> Result<Vec<RelatedItem>>
	where
		R: Rng + ?Sized,
	{
		let scored = self.score_candidates(retrieval).await?;

		Ok(selection::select_related(scored, self.policy(), rng))
	}

	/// Scores every candidate against the source signal. Candidate terms are not filtered.
	pub async fn score_candidates(
		&self,
		retrieval: &Retrieval,
	) -> Result<Vec<ScoredCandidate<RelatedItem>>> {
		let mut scored = Vec::with_capacity(retrieval.candidates.len());

		for (retrieval_rank, candidate) in retrieval.candidates.iter().enumerate() {
			let tag_ids = self.term_ids(candidate.item_id, TermKind::Tag).await?;
			let category_ids = self.term_ids(candidate.item_id, TermKind::Category).await?;
			let score =
				scoring::score_candidate(&retrieval.signal, &category_ids, &tag_ids, self.weights());

			scored.push(ScoredCandidate { item: RelatedItem::from(candidate), score, retrieval_rank });
		}

		Ok(scored)
	}

	async fn term_ids(&self, item_id: ItemId, kind: TermKind) -> Result<Vec<TermId>> {
		let terms = self.stores.content.terms_of(item_id, kind).await?;

		Ok(terms.into_iter().map(|term| term.term_id).collect())
	}
}
