mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, GeneratorProviderConfig, Indexer, Providers, Qdrant,
	Retrieval, Service, Storage,
};

use std::{env, fs, path::Path};

/// Environment variable that overrides `providers.embedding.api_key`.
pub const EMBEDDING_API_KEY_VAR: &str = "DEBRIEF_EMBEDDING_API_KEY";
/// Environment variable that overrides `providers.generator.api_key`.
pub const GENERATOR_API_KEY_VAR: &str = "DEBRIEF_GENERATOR_API_KEY";

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	apply_env_overrides(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.url.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.url must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.collection.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.qdrant.collection must be non-empty.".to_string(),
		});
	}
	if cfg.storage.qdrant.vector_dim == 0 {
		return Err(Error::Validation {
			message: "storage.qdrant.vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if !cfg.providers.generator.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.generator.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&cfg.providers.generator.temperature) {
		return Err(Error::Validation {
			message: "providers.generator.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("generator", &cfg.providers.generator.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	for (label, value) in [
		("retrieval.crm_example_k", cfg.retrieval.crm_example_k),
		("retrieval.question_top_k", cfg.retrieval.question_top_k),
		("retrieval.task_top_k", cfg.retrieval.task_top_k),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if cfg.retrieval.task_query.trim().is_empty() {
		return Err(Error::Validation {
			message: "retrieval.task_query must be non-empty.".to_string(),
		});
	}
	if cfg.indexer.id_prefix.trim().is_empty() {
		return Err(Error::Validation {
			message: "indexer.id_prefix must be non-empty.".to_string(),
		});
	}

	Ok(())
}

// Credentials may arrive out-of-band; a set environment variable wins over the file value.
fn apply_env_overrides(cfg: &mut Config) {
	override_from(&mut cfg.providers.embedding.api_key, env::var(EMBEDDING_API_KEY_VAR).ok());
	override_from(&mut cfg.providers.generator.api_key, env::var(GENERATOR_API_KEY_VAR).ok());
}

fn override_from(slot: &mut String, value: Option<String>) {
	if let Some(value) = value
		&& !value.trim().is_empty()
	{
		*slot = value;
	}
}
