use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub dialogue: Dialogue,
	pub pipeline: Pipeline,
	pub ranking: Ranking,
	pub filters: Filters,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub corpus: Corpus,
}

#[derive(Debug, Deserialize)]
pub struct Corpus {
	pub path: String,
	pub vector_dim: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub selector: SelectorProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct SelectorProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Dialogue {
	/// Turns without the minimum slots before the funnel is forced with
	/// defaults.
	pub turn_cap: u32,
	pub default_occasion: String,
	pub default_location: String,
}

#[derive(Debug, Deserialize)]
pub struct Pipeline {
	pub vector_top_k: u32,
	pub rerank_top_n: u32,
	pub llm_candidate_cap: u32,
	pub max_recommendations: u32,
	pub filter_sample_size: u32,
	pub embed_budget_ms: u64,
	pub select_budget_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Ranking {
	pub friend_weight: f32,
	pub rating_weight: f32,
	pub review_weight: f32,
	pub vector_weight: f32,
	pub social_weight: f32,
}

#[derive(Debug, Deserialize)]
pub struct Filters {
	pub walking_radius_m: f64,
	pub travel_radius_m: f64,
}
