mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, Config, Content, Ignore, MemoryStorage, Postgres, Ranking, Render, Service, Storage,
	StorageBackend,
};

use std::{fs, path::Path};

const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;
const MAX_CACHE_TTL_SECONDS: u64 = 365 * 86_400;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse_at(&raw, path)
}

/// Parses inline TOML, e.g. a config embedded by a host or a test.
pub fn parse(raw: &str) -> Result<Config> {
	parse_at(raw, Path::new("<inline>"))
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}

	let Some(backend) = StorageBackend::parse(cfg.storage.backend.as_str()) else {
		return Err(Error::UnknownBackend { backend: cfg.storage.backend.clone() });
	};

	if backend == StorageBackend::Postgres {
		let Some(postgres) = cfg.storage.postgres.as_ref() else {
			return Err(Error::Validation {
				message: "storage.postgres is required when storage.backend is postgres."
					.to_string(),
			});
		};

		if postgres.dsn.trim().is_empty() {
			return Err(Error::Validation {
				message: "storage.postgres.dsn must be non-empty.".to_string(),
			});
		}
		if postgres.pool_max_conns == 0 {
			return Err(Error::Validation {
				message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
			});
		}
	}
	if cfg.content.item_type.trim().is_empty() {
		return Err(Error::Validation {
			message: "content.item_type must be non-empty.".to_string(),
		});
	}
	if cfg.content.candidate_limit == 0 {
		return Err(Error::Validation {
			message: "content.candidate_limit must be greater than zero.".to_string(),
		});
	}

	for (label, weight) in [
		("ranking.tag_weight", cfg.ranking.tag_weight),
		("ranking.category_weight", cfg.ranking.category_weight),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if weight < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}
	}

	if cfg.ranking.tag_weight == 0.0 && cfg.ranking.category_weight == 0.0 {
		return Err(Error::Validation {
			message: "ranking.tag_weight and ranking.category_weight must not both be zero."
				.to_string(),
		});
	}
	if cfg.ranking.output_count == 0 {
		return Err(Error::Validation {
			message: "ranking.output_count must be greater than zero.".to_string(),
		});
	}
	if cfg.ranking.top_pool_size < cfg.ranking.output_count {
		return Err(Error::Validation {
			message: "ranking.top_pool_size must be at least ranking.output_count.".to_string(),
		});
	}
	if cfg.cache.namespace.is_empty() || cfg.cache.namespace.chars().any(char::is_whitespace) {
		return Err(Error::Validation {
			message: "cache.namespace must be non-empty and contain no whitespace.".to_string(),
		});
	}
	if cfg.cache.ttl_seconds == 0 {
		return Err(Error::Validation {
			message: "cache.ttl_seconds must be greater than zero.".to_string(),
		});
	}
	if cfg.cache.ttl_seconds > MAX_CACHE_TTL_SECONDS {
		return Err(Error::Validation {
			message: format!("cache.ttl_seconds must be at most {MAX_CACHE_TTL_SECONDS}."),
		});
	}
	if cfg.cache.utc_offset_minutes.abs() > MAX_UTC_OFFSET_MINUTES {
		return Err(Error::Validation {
			message: "cache.utc_offset_minutes must be within +/-1080.".to_string(),
		});
	}

	if let Some(max) = cfg.cache.max_payload_bytes
		&& max == 0
	{
		return Err(Error::Validation {
			message: "cache.max_payload_bytes must be greater than zero.".to_string(),
		});
	}

	let token = cfg.render.embed_token.as_str();

	if token.is_empty() || token.chars().any(|c| c.is_whitespace() || c == '[' || c == ']') {
		return Err(Error::Validation {
			message: "render.embed_token must be non-empty and contain no whitespace or brackets."
				.to_string(),
		});
	}

	Ok(())
}

fn parse_at(raw: &str, path: &Path) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

fn normalize(cfg: &mut Config) {
	cfg.storage.backend = cfg.storage.backend.trim().to_ascii_lowercase();
	cfg.content.item_type = cfg.content.item_type.trim().to_string();
	cfg.render.embed_token = cfg.render.embed_token.trim().to_string();

	for slugs in [&mut cfg.ignore.categories, &mut cfg.ignore.tags] {
		slugs.iter_mut().for_each(|slug| *slug = slug.trim().to_string());
		slugs.retain(|slug| !slug.is_empty());
	}

	if cfg
		.storage
		.memory
		.seed_path
		.as_deref()
		.map(|path| path.as_os_str().to_string_lossy().trim().is_empty())
		.unwrap_or(false)
	{
		cfg.storage.memory.seed_path = None;
	}
}
