const INIT: &str = include_str!("../../../sql/init.sql");
const TABLES: [(&str, &str); 4] = [
	("tables/001_content_items.sql", include_str!("../../../sql/tables/001_content_items.sql")),
	("tables/002_taxonomy_terms.sql", include_str!("../../../sql/tables/002_taxonomy_terms.sql")),
	("tables/003_item_terms.sql", include_str!("../../../sql/tables/003_item_terms.sql")),
	("tables/004_related_cache.sql", include_str!("../../../sql/tables/004_related_cache.sql")),
];

/// `sql/init.sql` with every `\ir` include replaced by the bundled table file.
pub fn render_schema() -> String {
	let tables_len: usize = TABLES.iter().map(|(_, sql)| sql.len()).sum();
	let mut out = String::with_capacity(INIT.len() + tables_len);

	for line in INIT.lines() {
		let included = line
			.trim()
			.strip_prefix("\\ir ")
			.and_then(|path| TABLES.iter().find(|(name, _)| *name == path.trim()))
			.map(|(_, sql)| *sql);

		out.push_str(included.unwrap_or(line));
		out.push('\n');
	}

	out
}
