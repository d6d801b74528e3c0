mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, Corpus, Dialogue, EmbeddingProviderConfig, Filters, Pipeline, Providers, Ranking,
	SelectorProviderConfig, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.corpus.path.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.corpus.path must be non-empty.".to_string(),
		});
	}
	if cfg.storage.corpus.vector_dim == 0 {
		return Err(Error::Validation {
			message: "storage.corpus.vector_dim must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.corpus.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.corpus.vector_dim."
				.to_string(),
		});
	}
	if cfg.dialogue.turn_cap == 0 {
		return Err(Error::Validation {
			message: "dialogue.turn_cap must be greater than zero.".to_string(),
		});
	}
	if cfg.dialogue.default_occasion.trim().is_empty() {
		return Err(Error::Validation {
			message: "dialogue.default_occasion must be non-empty.".to_string(),
		});
	}
	if cfg.pipeline.vector_top_k == 0 {
		return Err(Error::Validation {
			message: "pipeline.vector_top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.pipeline.rerank_top_n == 0 {
		return Err(Error::Validation {
			message: "pipeline.rerank_top_n must be greater than zero.".to_string(),
		});
	}
	if cfg.pipeline.rerank_top_n > cfg.pipeline.vector_top_k {
		return Err(Error::Validation {
			message: "pipeline.rerank_top_n must not exceed pipeline.vector_top_k.".to_string(),
		});
	}
	if cfg.pipeline.llm_candidate_cap == 0 {
		return Err(Error::Validation {
			message: "pipeline.llm_candidate_cap must be greater than zero.".to_string(),
		});
	}
	if cfg.pipeline.max_recommendations == 0 || cfg.pipeline.max_recommendations > 3 {
		return Err(Error::Validation {
			message: "pipeline.max_recommendations must be between 1 and 3.".to_string(),
		});
	}
	if cfg.pipeline.max_recommendations > cfg.pipeline.llm_candidate_cap {
		return Err(Error::Validation {
			message: "pipeline.max_recommendations must not exceed pipeline.llm_candidate_cap."
				.to_string(),
		});
	}
	if cfg.pipeline.embed_budget_ms == 0 || cfg.pipeline.select_budget_ms == 0 {
		return Err(Error::Validation {
			message: "pipeline stage budgets must be greater than zero.".to_string(),
		});
	}

	for (label, weight) in [
		("ranking.friend_weight", cfg.ranking.friend_weight),
		("ranking.rating_weight", cfg.ranking.rating_weight),
		("ranking.review_weight", cfg.ranking.review_weight),
		("ranking.vector_weight", cfg.ranking.vector_weight),
		("ranking.social_weight", cfg.ranking.social_weight),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation {
				message: format!("{label} must be a finite number."),
			});
		}
		if weight < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}
	}

	if cfg.ranking.vector_weight + cfg.ranking.social_weight <= 0.0 {
		return Err(Error::Validation {
			message: "ranking.vector_weight and ranking.social_weight must not both be zero."
				.to_string(),
		});
	}
	if cfg.filters.walking_radius_m <= 0.0 {
		return Err(Error::Validation {
			message: "filters.walking_radius_m must be greater than zero.".to_string(),
		});
	}
	if cfg.filters.travel_radius_m < cfg.filters.walking_radius_m {
		return Err(Error::Validation {
			message: "filters.travel_radius_m must not be less than filters.walking_radius_m."
				.to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("selector", &cfg.providers.selector.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.dialogue.default_occasion = cfg.dialogue.default_occasion.trim().to_lowercase();
	cfg.dialogue.default_location = cfg.dialogue.default_location.trim().to_lowercase();
}
