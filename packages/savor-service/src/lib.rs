pub mod candidate;
pub mod chat;
pub mod debug;
pub mod recommend;

mod filter;
mod rerank;
mod retrieval;
mod select;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

use savor_config::{Config, EmbeddingProviderConfig, SelectorProviderConfig};
use savor_providers::{embedding, selector};
use savor_storage::CorpusStore;

pub use candidate::{Candidate, RecommendationResult, UserLocation};
pub use chat::{ChatMessage, TurnRequest, TurnResponse};
pub use debug::{PipelineDebugBundle, Step1Debug, Step2Debug, Step3Debug, Step4Debug};
pub use recommend::{RecommendError, RecommendRequest, RecommendResponse};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Turns query text into a query embedding. The real implementation is an
/// HTTP provider; tests substitute deterministic vectors.
pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>>;
}

/// The nondeterministic selection seam. Implementations return the raw
/// selection payload; the service validates it and owns the fallback.
pub trait SelectorProvider
where
	Self: Send + Sync,
{
	fn select<'a>(
		&'a self,
		cfg: &'a SelectorProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>>;
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("The {stage} stage exceeded its time budget.")]
	Timeout { stage: &'static str },
	#[error("Corpus error: {message}")]
	Corpus { message: String },
}
impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}
impl From<savor_storage::Error> for ServiceError {
	fn from(err: savor_storage::Error) -> Self {
		Self::Corpus { message: err.to_string() }
	}
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub selector: Arc<dyn SelectorProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, selector: Arc<dyn SelectorProvider>) -> Self {
		Self { embedding, selector }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), selector: provider }
	}
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(embedding::embed(cfg, text))
	}
}

impl SelectorProvider for DefaultProviders {
	fn select<'a>(
		&'a self,
		cfg: &'a SelectorProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, color_eyre::Result<Value>> {
		Box::pin(selector::complete(cfg, messages))
	}
}

/// The recommendation core. Stateless across calls: all conversational
/// state arrives in the request and leaves in the response.
pub struct Service {
	pub cfg: Config,
	pub store: CorpusStore,
	pub providers: Providers,
}
impl Service {
	pub fn new(cfg: Config, store: CorpusStore) -> Self {
		Self { cfg, store, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, store: CorpusStore, providers: Providers) -> Self {
		Self { cfg, store, providers }
	}
}
