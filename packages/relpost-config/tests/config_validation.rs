use std::{env, fs, path::PathBuf};

use toml::Value;

use relpost_config::{Config, Error, StorageBackend};

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let mut table = root.as_table_mut().expect("Sample config must be a table.");

	for part in section.split('.') {
		table = table
			.entry(part.to_string())
			.or_insert_with(|| Value::Table(Default::default()))
			.as_table_mut()
			.expect("Section must be a table.");
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn validation_message(raw: &str) -> String {
	match relpost_config::parse(raw) {
		Err(Error::Validation { message }) => message,
		other => panic!("Expected validation error, got {other:?}."),
	}
}

#[test]
fn sample_config_parses_with_expected_values() {
	let cfg: Config = relpost_config::parse(SAMPLE_CONFIG_TOML).expect("Sample config must be valid.");

	assert_eq!(StorageBackend::parse(&cfg.storage.backend), Some(StorageBackend::Postgres));
	assert_eq!(cfg.content.candidate_limit, 50);
	assert_eq!(cfg.ranking.top_pool_size, 6);
	assert_eq!(cfg.ranking.output_count, 3);
	assert_eq!(cfg.cache.ttl_seconds, 86_400);
	assert_eq!(cfg.render.thumbnail_size, "medium");
}

#[test]
fn omitted_sections_fall_back_to_defaults() {
	let raw = r#"
[service]
http_bind = "127.0.0.1:0"

[storage]
backend = "memory"
"#;
	let cfg = relpost_config::parse(raw).expect("Minimal config must be valid.");

	assert_eq!(cfg.service.log_level, "info");
	assert_eq!(cfg.content.item_type, "post");
	assert_eq!(cfg.ranking.tag_weight, 1.0);
	assert_eq!(cfg.ranking.category_weight, 0.5);
	assert_eq!(cfg.cache.namespace, "related_items");
	assert!(cfg.cache.enabled);
	assert!(cfg.ignore.categories.contains(&"architect-on-demand".to_string()));
	assert!(cfg.ignore.tags.contains(&"diy-ally".to_string()));
	assert_eq!(cfg.ignore.tags.len(), 6);
	assert_eq!(cfg.render.embed_token, "related_items");
}

#[test]
fn explicit_ignore_lists_replace_defaults_and_drop_blank_slugs() {
	let raw = r#"
[service]
http_bind = "127.0.0.1:0"

[storage]
backend = "Memory"

[ignore]
categories = ["uncategorized", "  "]
tags = [" featured "]
"#;
	let cfg = relpost_config::parse(raw).expect("Config must be valid.");

	assert_eq!(cfg.storage.backend, "memory");
	assert_eq!(cfg.ignore.categories, vec!["uncategorized".to_string()]);
	assert_eq!(cfg.ignore.tags, vec!["featured".to_string()]);
}

#[test]
fn unknown_backend_is_rejected() {
	let raw = sample_with("storage", "backend", Value::String("redis".to_string()));

	match relpost_config::parse(&raw) {
		Err(Error::UnknownBackend { backend }) => assert_eq!(backend, "redis"),
		other => panic!("Expected unknown backend error, got {other:?}."),
	}
}

#[test]
fn postgres_backend_requires_postgres_section() {
	let raw = r#"
[service]
http_bind = "127.0.0.1:0"

[storage]
backend = "postgres"
"#;

	assert_eq!(
		validation_message(raw),
		"storage.postgres is required when storage.backend is postgres."
	);
}

#[test]
fn top_pool_must_cover_output_count() {
	let raw = sample_with("ranking", "top_pool_size", Value::Integer(2));

	assert_eq!(
		validation_message(&raw),
		"ranking.top_pool_size must be at least ranking.output_count."
	);
}

#[test]
fn negative_weights_are_rejected() {
	let raw = sample_with("ranking", "category_weight", Value::Float(-0.5));

	assert_eq!(validation_message(&raw), "ranking.category_weight must be zero or greater.");
}

#[test]
fn zero_weights_are_rejected() {
	let raw = sample_with("ranking", "tag_weight", Value::Float(0.0));
	let raw = {
		let mut value: Value = toml::from_str(&raw).expect("Failed to parse config.");

		value["ranking"]
			.as_table_mut()
			.expect("ranking must be a table.")
			.insert("category_weight".to_string(), Value::Float(0.0));

		toml::to_string(&value).expect("Failed to render config.")
	};

	assert_eq!(
		validation_message(&raw),
		"ranking.tag_weight and ranking.category_weight must not both be zero."
	);
}

#[test]
fn cache_ttl_must_be_positive() {
	let raw = sample_with("cache", "ttl_seconds", Value::Integer(0));

	assert_eq!(validation_message(&raw), "cache.ttl_seconds must be greater than zero.");
}

#[test]
fn cache_ttl_is_capped_at_one_year() {
	let raw = sample_with("cache", "ttl_seconds", Value::Integer(365 * 86_400 + 1));

	assert_eq!(validation_message(&raw), "cache.ttl_seconds must be at most 31536000.");

	let raw = sample_with("cache", "ttl_seconds", Value::Integer(365 * 86_400));

	assert!(relpost_config::parse(&raw).is_ok());
}

#[test]
fn cache_namespace_rejects_whitespace() {
	let raw = sample_with("cache", "namespace", Value::String("related items".to_string()));

	assert_eq!(
		validation_message(&raw),
		"cache.namespace must be non-empty and contain no whitespace."
	);
}

#[test]
fn cache_max_payload_bytes_must_be_positive_when_set() {
	let raw = sample_with("cache", "max_payload_bytes", Value::Integer(0));

	assert_eq!(validation_message(&raw), "cache.max_payload_bytes must be greater than zero.");
}

#[test]
fn utc_offset_is_bounded() {
	let raw = sample_with("cache", "utc_offset_minutes", Value::Integer(24 * 60));

	assert_eq!(validation_message(&raw), "cache.utc_offset_minutes must be within +/-1080.");
}

#[test]
fn embed_token_rejects_brackets() {
	let raw = sample_with("render", "embed_token", Value::String("[related]".to_string()));

	assert_eq!(
		validation_message(&raw),
		"render.embed_token must be non-empty and contain no whitespace or brackets."
	);
}

#[test]
fn load_reports_the_config_path_on_parse_failure() {
	let path: PathBuf =
		env::temp_dir().join(format!("relpost_config_invalid_{}.toml", std::process::id()));

	fs::write(&path, "service = [").expect("Failed to write temp config.");

	let result = relpost_config::load(&path);

	fs::remove_file(&path).ok();

	match result {
		Err(Error::ParseConfig { path: reported, .. }) => assert_eq!(reported, path),
		other => panic!("Expected parse error, got {other:?}."),
	}
}

#[test]
fn load_reports_missing_files() {
	let path = env::temp_dir().join("relpost_config_missing_file.toml");
	let result = relpost_config::load(&path);

	assert!(matches!(result, Err(Error::ReadConfig { .. })));
}
