use std::collections::HashSet;

use rand::{SeedableRng, rngs::StdRng};
use time::{Date, Month, OffsetDateTime, UtcOffset, macros::datetime};

use relpost_domain::{
	cache_key,
	scoring::{self, ScoredCandidate, ScoringWeights},
	selection::{self, SelectionPolicy},
	taxonomy::{IgnoreList, TaxonomySignal, Term, TermKind},
};

fn term(term_id: i64, kind: TermKind, slug: &str) -> Term {
	Term { term_id, kind, slug: slug.to_string(), name: slug.to_string() }
}

fn scored(item: i64, score: f32, retrieval_rank: usize) -> ScoredCandidate<i64> {
	ScoredCandidate { item, score, retrieval_rank }
}

fn seven_pool() -> Vec<ScoredCandidate<i64>> {
	vec![
		scored(1, 7.0, 0),
		scored(2, 6.0, 1),
		scored(3, 5.0, 2),
		scored(4, 4.0, 3),
		scored(5, 3.0, 4),
		scored(6, 2.0, 5),
		scored(7, 1.0, 6),
		scored(8, 0.5, 7),
	]
}

#[test]
fn ignore_list_filters_source_signal_by_exact_slug() {
	let ignore = IgnoreList::new(["architect-on-demand"], ["diy-ally"]);
	let categories = vec![
		term(1, TermKind::Category, "architect-on-demand"),
		term(2, TermKind::Category, "kitchens"),
		term(3, TermKind::Category, "Architect-On-Demand"),
	];
	let tags = vec![term(10, TermKind::Tag, "diy-ally"), term(11, TermKind::Tag, "lighting")];
	let signal = TaxonomySignal::from_terms(&categories, &tags, &ignore);

	assert_eq!(signal.category_ids, vec![2, 3]);
	assert_eq!(signal.tag_ids, vec![11]);
	assert!(!signal.is_empty());
}

#[test]
fn ignore_list_is_kind_specific() {
	let ignore = IgnoreList::new(["shared"], Vec::<String>::new());
	let tags = vec![term(5, TermKind::Tag, "shared")];
	let signal = TaxonomySignal::from_terms(&[], &tags, &ignore);

	assert_eq!(signal.tag_ids, vec![5]);
}

#[test]
fn signal_is_empty_when_every_term_is_noise() {
	let ignore = IgnoreList::new(["a"], ["b"]);
	let signal = TaxonomySignal::from_terms(
		&[term(1, TermKind::Category, "a")],
		&[term(2, TermKind::Tag, "b")],
		&ignore,
	);

	assert!(signal.is_empty());
	assert!(signal.ids(TermKind::Category).is_empty());
}

#[test]
fn duplicate_terms_contribute_one_signal_id() {
	let ignore = IgnoreList::default();
	let tags = vec![term(4, TermKind::Tag, "x"), term(4, TermKind::Tag, "x")];

	assert_eq!(TaxonomySignal::from_terms(&[], &tags, &ignore).tag_ids, vec![4]);
}

#[test]
fn scores_weight_tags_over_categories() {
	let signal = TaxonomySignal { category_ids: vec![100, 101], tag_ids: vec![1, 2, 3] };
	let weights = ScoringWeights::default();
	let c1 = scoring::score_candidate(&signal, &[100, 200], &[1, 2, 9], weights);
	let c2 = scoring::score_candidate(&signal, &[101], &[7], weights);
	let none = scoring::score_candidate(&signal, &[300], &[8], weights);

	assert_eq!(c1, 2.5);
	assert_eq!(c2, 0.5);
	assert_eq!(none, 0.0);

	let ranked = selection::rank_scored(vec![scored(2, c2, 0), scored(1, c1, 1)]);

	assert_eq!(ranked.iter().map(|c| c.item).collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn overlap_ignores_empty_inputs() {
	assert_eq!(scoring::overlap_count(&[], &[1, 2]), 0);
	assert_eq!(scoring::overlap_count(&[1, 2], &[]), 0);
	assert_eq!(scoring::overlap_count(&[1, 2, 3], &[3, 1]), 2);
}

#[test]
fn rank_drops_non_positive_scores() {
	let ranked = selection::rank_scored(vec![scored(1, 0.0, 0), scored(2, 1.0, 1), scored(3, -1.0, 2)]);

	assert_eq!(ranked.len(), 1);
	assert_eq!(ranked[0].item, 2);
}

#[test]
fn equal_scores_keep_retrieval_order() {
	let ranked = selection::rank_scored(vec![
		scored(30, 1.0, 2),
		scored(10, 1.0, 0),
		scored(40, 2.0, 3),
		scored(20, 1.0, 1),
	]);

	assert_eq!(ranked.iter().map(|c| c.item).collect::<Vec<_>>(), vec![40, 10, 20, 30]);
}

#[test]
fn small_pool_is_returned_in_rank_order_without_shuffle() {
	let policy = SelectionPolicy::default();

	for seed in 0..32 {
		let mut rng = StdRng::seed_from_u64(seed);
		let picked = selection::select_related(
			vec![scored(3, 0.5, 0), scored(1, 2.5, 1), scored(2, 1.0, 2)],
			policy,
			&mut rng,
		);

		assert_eq!(picked, vec![1, 2, 3]);
	}
}

#[test]
fn only_top_pool_members_are_ever_selected() {
	let policy = SelectionPolicy::default();
	let top: HashSet<i64> = (1..=6).collect();
	let mut seen = HashSet::new();

	for seed in 0..256 {
		let mut rng = StdRng::seed_from_u64(seed);
		let picked = selection::select_related(seven_pool(), policy, &mut rng);

		assert_eq!(picked.len(), 3);
		assert_eq!(picked.iter().collect::<HashSet<_>>().len(), 3);

		for item in &picked {
			assert!(top.contains(item), "item {item} is outside the top pool");
		}

		seen.extend(picked);
	}

	assert_eq!(seen, top);
}

#[test]
fn same_seed_yields_same_selection() {
	let policy = SelectionPolicy::default();
	let first = selection::select_related(seven_pool(), policy, &mut StdRng::seed_from_u64(7));
	let second = selection::select_related(seven_pool(), policy, &mut StdRng::seed_from_u64(7));

	assert_eq!(first, second);
}

#[test]
fn output_size_is_bounded_for_any_pool_size() {
	let policy = SelectionPolicy::default();
	let mut rng = StdRng::seed_from_u64(42);

	for size in 0..12 {
		let pool = (0..size).map(|i| scored(i as i64, 1.0 + i as f32, i)).collect();
		let picked = selection::select_related(pool, policy, &mut rng);

		assert_eq!(picked.len(), size.min(3));
	}
}

#[test]
fn cache_key_is_date_bucketed() {
	let day = Date::from_calendar_date(2026, Month::March, 7).expect("Valid date.");

	assert_eq!(cache_key::related_cache_key("related_items", 42, day), "related_items_42_20260307");
}

#[test]
fn cache_day_follows_the_configured_offset() {
	let now: OffsetDateTime = datetime!(2026-10-19 23:30 UTC);
	let utc = cache_key::cache_day(now, UtcOffset::UTC);
	let plus_two = cache_key::cache_day(now, cache_key::utc_offset_from_minutes(120));

	assert_eq!(utc, Date::from_calendar_date(2026, Month::October, 19).expect("Valid date."));
	assert_eq!(plus_two, Date::from_calendar_date(2026, Month::October, 20).expect("Valid date."));
}

#[test]
fn term_kind_round_trips_through_its_label() {
	for kind in [TermKind::Category, TermKind::Tag] {
		assert_eq!(TermKind::parse(kind.as_str()), Some(kind));
	}

	assert_eq!(TermKind::parse("post_tag"), None);
}

#[test]
fn terms_deserialize_without_a_name() {
	let term: Term = serde_json::from_value(serde_json::json!({
		"term_id": 3,
		"kind": "tag",
		"slug": "lighting",
	}))
	.expect("Term must deserialize.");

	assert_eq!(term.kind, TermKind::Tag);
	assert!(term.name.is_empty());
}
