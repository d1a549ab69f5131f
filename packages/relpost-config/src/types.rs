use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	#[serde(default)]
	pub content: Content,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub ignore: Ignore,
	#[serde(default)]
	pub cache: Cache,
	#[serde(default)]
	pub render: Render,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub backend: String,
	pub postgres: Option<Postgres>,
	#[serde(default)]
	pub memory: MemoryStorage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
	Postgres,
	Memory,
}
impl StorageBackend {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"postgres" => Some(Self::Postgres),
			"memory" => Some(Self::Memory),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Postgres => "postgres",
			Self::Memory => "memory",
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Default, Deserialize)]
pub struct MemoryStorage {
	/// Optional JSON corpus loaded into the in-memory content store at startup.
	pub seed_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Content {
	/// The primary content type; only items of this type are candidates or render targets.
	pub item_type: String,
	/// Upper bound on the candidate pool fetched from the content store.
	pub candidate_limit: u32,
}
impl Default for Content {
	fn default() -> Self {
		Self { item_type: "post".to_string(), candidate_limit: 50 }
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub tag_weight: f32,
	pub category_weight: f32,
	pub top_pool_size: u32,
	pub output_count: u32,
}
impl Default for Ranking {
	fn default() -> Self {
		Self { tag_weight: 1.0, category_weight: 0.5, top_pool_size: 6, output_count: 3 }
	}
}

/// Slugs that appear on nearly every item and carry no relevance signal.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Ignore {
	pub categories: Vec<String>,
	pub tags: Vec<String>,
}
impl Default for Ignore {
	fn default() -> Self {
		Self {
			categories: to_strings(&[
				"advice-without-strings",
				"architect-on-demand",
				"an-online-architect",
			]),
			tags: to_strings(&[
				"advice-without-strings",
				"online-architect",
				"architect-on-demand",
				"online-architectural-services",
				"diy-architect",
				"diy-ally",
			]),
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Cache {
	pub enabled: bool,
	pub namespace: String,
	pub ttl_seconds: u64,
	/// Offset applied to the wall clock before deriving the cache day.
	pub utc_offset_minutes: i32,
	pub max_payload_bytes: Option<u64>,
}
impl Default for Cache {
	fn default() -> Self {
		Self {
			enabled: true,
			namespace: "related_items".to_string(),
			ttl_seconds: 86_400,
			utc_offset_minutes: 0,
			max_payload_bytes: None,
		}
	}
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Render {
	pub embed_token: String,
	pub wrapper_class: String,
	pub thumbnail_size: String,
	pub inject_after_content: bool,
}
impl Default for Render {
	fn default() -> Self {
		Self {
			embed_token: "related_items".to_string(),
			wrapper_class: "related-items-group alignwide".to_string(),
			thumbnail_size: "medium".to_string(),
			inject_after_content: false,
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}

fn to_strings(values: &[&str]) -> Vec<String> {
	values.iter().map(|value| value.to_string()).collect()
}
