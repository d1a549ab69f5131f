use relpost_domain::taxonomy::{ItemId, Term, TermId, TermKind};

use crate::{
	Error, Result,
	db::Db,
	models::{Item, ItemQuery, STATUS_PUBLISH},
};

const ITEM_COLUMNS: &str =
	"i.item_id, i.item_type, i.status, i.title, i.permalink, i.thumbnail_url, i.sticky, i.published_at";

pub async fn fetch_item(db: &Db, item_id: ItemId) -> Result<Option<Item>> {
	let sql = format!("SELECT {ITEM_COLUMNS} FROM content_items i WHERE i.item_id = $1");
	let item = sqlx::query_as::<_, Item>(sql.as_str()).bind(item_id).fetch_optional(&db.pool).await?;

	Ok(item)
}

pub async fn fetch_terms(db: &Db, item_id: ItemId, kind: TermKind) -> Result<Vec<Term>> {
	let rows: Vec<(TermId, String, String, String)> = sqlx::query_as(
		"\
SELECT t.term_id, t.kind, t.slug, t.name
FROM taxonomy_terms t
JOIN item_terms it ON it.term_id = t.term_id
WHERE it.item_id = $1 AND t.kind = $2
ORDER BY t.name ASC, t.term_id ASC",
	)
	.bind(item_id)
	.bind(kind.as_str())
	.fetch_all(&db.pool)
	.await?;

	rows.into_iter()
		.map(|(term_id, raw_kind, slug, name)| {
			let kind = TermKind::parse(raw_kind.as_str()).ok_or_else(|| {
				Error::InvalidArgument(format!("Unknown taxonomy kind {raw_kind:?}."))
			})?;

			Ok(Term { term_id, kind, slug, name })
		})
		.collect()
}

pub async fn query_items(db: &Db, query: &ItemQuery) -> Result<Vec<Item>> {
	if query.limit == 0 {
		return Ok(Vec::new());
	}

	let order = if query.sticky_disabled {
		"i.published_at DESC, i.item_id DESC"
	} else {
		"i.sticky DESC, i.published_at DESC, i.item_id DESC"
	};
	let sql = format!(
		"\
SELECT {ITEM_COLUMNS}
FROM content_items i
WHERE i.item_type = $1
	AND i.status = $2
	AND NOT (i.item_id = ANY($3))
	AND (
		NOT $4
		OR EXISTS (
			SELECT 1
			FROM item_terms it
			JOIN taxonomy_terms t ON t.term_id = it.term_id
			WHERE it.item_id = i.item_id
				AND (
					(t.kind = 'category' AND t.term_id = ANY($5))
					OR (t.kind = 'tag' AND t.term_id = ANY($6))
				)
		)
	)
ORDER BY {order}
LIMIT $7"
	);
	let items = sqlx::query_as::<_, Item>(sql.as_str())
		.bind(query.item_type.as_str())
		.bind(STATUS_PUBLISH)
		.bind(query.exclude_ids.as_slice())
		.bind(!query.taxonomy_or.is_empty())
		.bind(query.term_ids(TermKind::Category))
		.bind(query.term_ids(TermKind::Tag))
		.bind(i64::from(query.limit))
		.fetch_all(&db.pool)
		.await?;

	Ok(items)
}

pub async fn upsert_item(db: &Db, item: &Item) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO content_items (
	item_id,
	item_type,
	status,
	title,
	permalink,
	thumbnail_url,
	sticky,
	published_at
)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
ON CONFLICT (item_id) DO UPDATE SET
	item_type = EXCLUDED.item_type,
	status = EXCLUDED.status,
	title = EXCLUDED.title,
	permalink = EXCLUDED.permalink,
	thumbnail_url = EXCLUDED.thumbnail_url,
	sticky = EXCLUDED.sticky,
	published_at = EXCLUDED.published_at",
	)
	.bind(item.item_id)
	.bind(item.item_type.as_str())
	.bind(item.status.as_str())
	.bind(item.title.as_str())
	.bind(item.permalink.as_str())
	.bind(item.thumbnail_url.as_deref())
	.bind(item.sticky)
	.bind(item.published_at)
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn upsert_term(db: &Db, term: &Term) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO taxonomy_terms (term_id, kind, slug, name)
VALUES ($1, $2, $3, $4)
ON CONFLICT (term_id) DO UPDATE SET
	kind = EXCLUDED.kind,
	slug = EXCLUDED.slug,
	name = EXCLUDED.name",
	)
	.bind(term.term_id)
	.bind(term.kind.as_str())
	.bind(term.slug.as_str())
	.bind(term.name.as_str())
	.execute(&db.pool)
	.await?;

	Ok(())
}

pub async fn attach_term(db: &Db, item_id: ItemId, term_id: TermId) -> Result<()> {
	let result = sqlx::query(
		"\
INSERT INTO item_terms (item_id, term_id)
SELECT i.item_id, t.term_id
FROM content_items i, taxonomy_terms t
WHERE i.item_id = $1 AND t.term_id = $2
ON CONFLICT DO NOTHING",
	)
	.bind(item_id)
	.bind(term_id)
	.execute(&db.pool)
	.await?;

	if result.rows_affected() == 0 {
		let exists: bool = sqlx::query_scalar(
			"SELECT EXISTS (SELECT 1 FROM item_terms WHERE item_id = $1 AND term_id = $2)",
		)
		.bind(item_id)
		.bind(term_id)
		.fetch_one(&db.pool)
		.await?;

		if !exists {
			return Err(Error::NotFound(format!("Item {item_id} or term {term_id}.")));
		}
	}

	Ok(())
}
