//! The funnel-invocation operation: hard filter, vector retrieval, social
//! re-rank, and final selection, with per-stage time budgets and a
//! deterministic degradation path for the selection stage.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time;

use savor_domain::{BuiltQuery, ConversationState, context::ConversationContext};

use crate::{
	Service, ServiceError,
	candidate::{Candidate, RecommendationResult, UserLocation},
	debug::{DebugRecorder, PipelineDebugBundle},
	filter, rerank, retrieval, select,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
	pub context: ConversationContext,
	pub user_location: Option<UserLocation>,
	#[serde(default)]
	pub conversation_summary: String,
	#[serde(default)]
	pub include_debug_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
	pub recommendations: Vec<RecommendationResult>,
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub debug_data: Option<PipelineDebugBundle>,
}

/// A funnel failure, carrying whatever part of the debug bundle was recorded
/// before the failing stage.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct RecommendError {
	#[source]
	pub source: ServiceError,
	pub debug_data: Option<PipelineDebugBundle>,
}

impl Service {
	pub async fn recommend(
		&self,
		req: RecommendRequest,
	) -> Result<RecommendResponse, RecommendError> {
		if req.context.state != ConversationState::ReadyToRecommend {
			return Err(RecommendError {
				source: ServiceError::InvalidRequest {
					message: "Context is not ready to recommend.".to_string(),
				},
				debug_data: None,
			});
		}

		let query = BuiltQuery::from_slots(&req.context.slots, &self.cfg.dialogue);
		let snapshot = self.store.snapshot();
		let mut recorder = DebugRecorder::new(
			req.include_debug_data,
			self.cfg.pipeline.filter_sample_size as usize,
		);

		// Stage 1: hard filters.
		let (total_in_db, candidates) = filter::filter_candidates(
			&snapshot,
			&query,
			req.user_location.as_ref(),
			&self.cfg.filters,
		);

		recorder.record_filter(total_in_db, &candidates);
		tracing::info!(
			total_in_db,
			after_filter = candidates.len(),
			occasion = query.occasion.as_str(),
			"Filter stage complete."
		);

		if candidates.is_empty() {
			return Ok(RecommendResponse {
				recommendations: Vec::new(),
				message: "I couldn't find anything matching all of that. \
Want to broaden the search a little?"
					.to_string(),
				debug_data: recorder.finish(),
			});
		}

		// Stage 2: vector retrieval.
		let query_text = query.query_text();
		let query_vec = match self.embed_with_budget(&query_text).await {
			Ok(vec) => vec,
			Err(err) => {
				return Err(RecommendError { source: err, debug_data: recorder.finish() });
			},
		};
		let total_scored = candidates.len();
		let top_by_vector = retrieval::score_by_vector(
			candidates,
			&query_vec,
			self.cfg.pipeline.vector_top_k as usize,
		);

		recorder.record_vector(&query_text, total_scored, &top_by_vector);
		tracing::info!(total_scored, kept = top_by_vector.len(), "Vector stage complete.");

		// Stage 3: social re-rank.
		let top_by_rerank =
			rerank::rerank(top_by_vector, &self.cfg.ranking, self.cfg.pipeline.rerank_top_n as usize);

		recorder.record_rerank(&top_by_rerank);
		tracing::info!(kept = top_by_rerank.len(), "Re-rank stage complete.");

		// Stage 4: selection, capped to what the selector is allowed to see.
		let sent: Vec<Candidate> = top_by_rerank
			.iter()
			.take(self.cfg.pipeline.llm_candidate_cap as usize)
			.cloned()
			.collect();
		let (recommendations, message) =
			self.select_with_fallback(&sent, &query, &req.conversation_summary).await;

		recorder.record_select(&sent, &recommendations);
		tracing::info!(chosen = recommendations.len(), "Selection stage complete.");

		Ok(RecommendResponse { recommendations, message, debug_data: recorder.finish() })
	}

	async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
		let vec = self.providers.embedding.embed(&self.cfg.providers.embedding, text).await?;

		if vec.len() != self.cfg.storage.corpus.vector_dim as usize {
			return Err(ServiceError::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vec)
	}

	/// One attempt at the full budget, one retry at half, then a typed
	/// timeout. Embedding has no safe deterministic fallback.
	async fn embed_with_budget(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
		let budget = Duration::from_millis(self.cfg.pipeline.embed_budget_ms);

		match time::timeout(budget, self.embed_query(text)).await {
			Ok(result) => result,
			Err(_) => {
				tracing::warn!(
					stage = "embedding",
					"Stage budget exceeded; retrying with a reduced budget."
				);

				match time::timeout(budget / 2, self.embed_query(text)).await {
					Ok(result) => result,
					Err(_) => Err(ServiceError::Timeout { stage: "embedding" }),
				}
			},
		}
	}

	/// Runs the selector under its budget; any timeout, transport failure,
	/// or contract violation degrades to the deterministic fallback.
	async fn select_with_fallback(
		&self,
		sent: &[Candidate],
		query: &BuiltQuery,
		conversation_summary: &str,
	) -> (Vec<RecommendationResult>, String) {
		let messages = select::build_selection_messages(
			sent,
			&query.query_text(),
			conversation_summary,
			self.cfg.pipeline.max_recommendations,
		);
		let budget = Duration::from_millis(self.cfg.pipeline.select_budget_ms);
		let cfg = &self.cfg.providers.selector;
		let raw = match time::timeout(budget, self.providers.selector.select(cfg, &messages)).await
		{
			Ok(Ok(raw)) => Some(raw),
			Ok(Err(err)) => {
				tracing::warn!(error = %err, "Selector call failed; falling back.");

				None
			},
			Err(_) => {
				tracing::warn!(
					stage = "selection",
					"Stage budget exceeded; retrying with a reduced budget."
				);

				match time::timeout(budget / 2, self.providers.selector.select(cfg, &messages))
					.await
				{
					Ok(Ok(raw)) => Some(raw),
					Ok(Err(err)) => {
						tracing::warn!(error = %err, "Selector retry failed; falling back.");

						None
					},
					Err(_) => {
						tracing::warn!(stage = "selection", "Selector retry timed out; falling back.");

						None
					},
				}
			},
		};

		if let Some(raw) = raw {
			match select::validate_selection(raw, sent, self.cfg.pipeline.max_recommendations) {
				Ok(validated) => return validated,
				Err(violation) => {
					tracing::warn!(error = %violation, "Selection contract violated; falling back.");
				},
			}
		}

		select::fallback_selection(sent, query, self.cfg.pipeline.max_recommendations)
	}
}
