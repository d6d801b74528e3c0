//! The turn-advance operation: runs the dialogue manager over the
//! caller-supplied context and, once enough intent has been gathered,
//! invokes the recommendation funnel within the same turn.

use serde::{Deserialize, Serialize};

use savor_domain::{Chip, TurnOutcome, advance, context::ConversationContext};

use crate::{
	Service, ServiceError, ServiceResult,
	candidate::{RecommendationResult, UserLocation},
	debug::PipelineDebugBundle,
	recommend::{RecommendError, RecommendRequest},
};

/// Most recent user messages folded into the selection context.
const SUMMARY_MESSAGE_CAP: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
	pub role: String,
	pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
	pub message: String,
	pub conversation_id: Option<String>,
	pub previous_context: Option<ConversationContext>,
	#[serde(default)]
	pub messages: Vec<ChatMessage>,
	pub user_location: Option<UserLocation>,
	#[serde(default)]
	pub include_debug_data: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnResponse {
	pub message: String,
	pub context: ConversationContext,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub recommendations: Option<Vec<RecommendationResult>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub debug_data: Option<PipelineDebugBundle>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub ready_to_recommend: Option<bool>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub chips: Option<Vec<Chip>>,
}

impl Service {
	pub async fn advance_turn(&self, req: TurnRequest) -> ServiceResult<TurnResponse> {
		if req.message.trim().is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "message must be non-empty.".to_string(),
			});
		}

		let context = req.previous_context.clone().unwrap_or_default();
		let (next, outcome) = advance(&context, &req.message, &self.cfg.dialogue);

		match outcome {
			TurnOutcome::AskSlot { slot, prompt, chips } => {
				tracing::info!(
					slot = slot.as_str(),
					turn = next.turn_count,
					"Asking a clarifying question."
				);

				Ok(TurnResponse {
					message: prompt,
					context: next,
					recommendations: None,
					debug_data: None,
					error: None,
					ready_to_recommend: Some(false),
					chips: Some(chips),
				})
			},
			TurnOutcome::Invoke { .. } => {
				let summary = conversation_summary(&req.messages, &req.message);
				let result = self
					.recommend(RecommendRequest {
						context: next.clone(),
						user_location: req.user_location,
						conversation_summary: summary,
						include_debug_data: req.include_debug_data,
					})
					.await;

				match result {
					Ok(response) => Ok(TurnResponse {
						message: response.message,
						context: next,
						recommendations: Some(response.recommendations),
						debug_data: response.debug_data,
						error: None,
						ready_to_recommend: Some(true),
						chips: None,
					}),
					Err(RecommendError { source, debug_data }) => {
						tracing::error!(error = %source, "Funnel invocation failed.");

						Ok(TurnResponse {
							message: "Something went wrong while I was picking places. \
Mind trying that again?"
								.to_string(),
							context: next,
							recommendations: None,
							debug_data,
							error: Some(source.to_string()),
							ready_to_recommend: Some(true),
							chips: None,
						})
					},
				}
			},
		}
	}
}

/// Folds the tail of the conversation into one line for the selector. The
/// caller owns history; the core only ever sees what travels in the request.
fn conversation_summary(messages: &[ChatMessage], current: &str) -> String {
	let mut parts: Vec<&str> = messages
		.iter()
		.filter(|message| message.role == "user")
		.map(|message| message.content.as_str())
		.collect();

	parts.push(current);

	let skip = parts.len().saturating_sub(SUMMARY_MESSAGE_CAP);

	parts[skip..].join(" / ")
}
