//! Stage 4: final selection. The LLM may only pick from the candidates it
//! was sent; anything else degrades to the deterministic top-by-final-score
//! fallback and never reaches the caller.

use serde::Deserialize;
use serde_json::Value;

use savor_domain::BuiltQuery;

use crate::candidate::{Candidate, RecommendationResult};

#[derive(Debug, Deserialize)]
struct SelectionOutput {
	#[serde(default)]
	recommendations: Vec<SelectionItem>,
	message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectionItem {
	id: String,
	match_score: f32,
	reason: String,
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub(crate) struct SelectionViolation(pub String);

pub(crate) fn build_selection_messages(
	candidates: &[Candidate],
	query_text: &str,
	conversation_summary: &str,
	max_recommendations: u32,
) -> Vec<Value> {
	let listing: Vec<Value> = candidates
		.iter()
		.map(|candidate| {
			serde_json::json!({
				"id": candidate.id,
				"name": candidate.name,
				"categories": candidate.categories,
				"rating": candidate.google_rating,
				"reviewCount": candidate.review_count,
				"friendsWhoVisited": candidate.friends_who_visited,
				"distanceMeters": candidate.distance_meters,
			})
		})
		.collect();
	let system_prompt = format!(
		"You are the final selection step of a restaurant recommendation pipeline. \
Pick at most {max_recommendations} restaurants, strictly from the provided candidate list, \
matching them to what the user is looking for. \
Output must be valid JSON only: {{\"recommendations\": [{{\"id\": string, \"matchScore\": number 0-100, \"reason\": string}}], \"message\": string}}. \
Every id must come from the candidate list. Reasons are one short sentence grounded in the conversation. \
In the message, reference chosen restaurants as [[Name]] and nothing else."
	);
	let user_prompt = format!(
		"The user wants: {query_text}\nConversation so far: {conversation_summary}\nCandidates:\n{}",
		serde_json::to_string_pretty(&Value::Array(listing)).unwrap_or_default()
	);

	vec![
		serde_json::json!({ "role": "system", "content": system_prompt }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

/// Checks the selector payload against the candidate set. Violations of the
/// selection contract come back as errors so the caller can degrade; a
/// message whose markers fail to resolve is repaired rather than rejected,
/// since the recommendations themselves are sound.
pub(crate) fn validate_selection(
	raw: Value,
	sent: &[Candidate],
	max_recommendations: u32,
) -> Result<(Vec<RecommendationResult>, String), SelectionViolation> {
	let output: SelectionOutput = serde_json::from_value(raw)
		.map_err(|err| SelectionViolation(format!("Selection payload is malformed: {err}.")))?;

	if output.recommendations.is_empty() {
		return Err(SelectionViolation("Selector returned no recommendations.".to_string()));
	}
	if output.recommendations.len() > max_recommendations as usize {
		return Err(SelectionViolation(format!(
			"Selector returned {} recommendations, cap is {max_recommendations}.",
			output.recommendations.len()
		)));
	}

	let mut results = Vec::with_capacity(output.recommendations.len());

	for item in output.recommendations {
		let Some(candidate) = sent.iter().find(|candidate| candidate.id == item.id) else {
			return Err(SelectionViolation(format!(
				"Selector returned id {} which was never sent to it.",
				item.id
			)));
		};

		if results.iter().any(|result: &RecommendationResult| result.restaurant.id == item.id) {
			return Err(SelectionViolation(format!("Selector returned id {} twice.", item.id)));
		}
		if !item.match_score.is_finite() || !(0.0..=100.0).contains(&item.match_score) {
			return Err(SelectionViolation(format!(
				"Selector returned match score {} for id {}.",
				item.match_score, item.id
			)));
		}
		if item.reason.trim().is_empty() {
			return Err(SelectionViolation(format!(
				"Selector returned an empty reason for id {}.",
				item.id
			)));
		}

		let mut restaurant = candidate.clone();

		restaurant.match_score = Some(item.match_score);
		restaurant.reason = Some(item.reason.clone());
		results.push(RecommendationResult {
			restaurant,
			match_score: item.match_score,
			reason: item.reason,
		});
	}

	let message = match output.message {
		Some(message) if markers_resolve(&message, &results) => message,
		Some(message) => {
			tracing::warn!(
				markers = ?extract_markers(&message),
				"Selection message markers did not resolve; synthesizing message."
			);

			synthesize_message(&results)
		},
		None => synthesize_message(&results),
	};

	Ok((results, message))
}

/// The deterministic stand-in for the LLM: the top candidates by final score
/// with a generic reason derived from the query.
pub(crate) fn fallback_selection(
	reranked: &[Candidate],
	query: &BuiltQuery,
	max_recommendations: u32,
) -> (Vec<RecommendationResult>, String) {
	let results: Vec<RecommendationResult> = reranked
		.iter()
		.take(max_recommendations as usize)
		.map(|candidate| {
			let match_score =
				(candidate.final_score.unwrap_or(0.0) * 100.0).clamp(0.0, 100.0).round();
			let reason = fallback_reason(candidate, query);
			let mut restaurant = candidate.clone();

			restaurant.match_score = Some(match_score);
			restaurant.reason = Some(reason.clone());

			RecommendationResult { restaurant, match_score, reason }
		})
		.collect();
	let message = synthesize_message(&results);

	(results, message)
}

fn fallback_reason(candidate: &Candidate, query: &BuiltQuery) -> String {
	if candidate.friends_who_visited.is_empty() {
		format!(
			"A well-rated pick for a {} ({:.1} stars across {} reviews).",
			query.occasion, candidate.google_rating, candidate.review_count
		)
	} else {
		format!(
			"{} of your friends have been here, and it suits a {}.",
			candidate.friends_who_visited.len(),
			query.occasion
		)
	}
}

fn synthesize_message(results: &[RecommendationResult]) -> String {
	let names: Vec<String> =
		results.iter().map(|result| format!("[[{}]]", result.restaurant.name)).collect();

	match names.len() {
		0 => "I couldn't settle on a recommendation this time.".to_string(),
		1 => format!("I'd go with {}, it fits what you described.", names[0]),
		_ => {
			let (last, rest) = names.split_last().expect("names is non-empty");

			format!("Here's what I'd pick: {} and {}.", rest.join(", "), last)
		},
	}
}

fn markers_resolve(message: &str, results: &[RecommendationResult]) -> bool {
	extract_markers(message).iter().all(|marker| {
		let marker = marker.to_lowercase();

		results.iter().any(|result| {
			let name = result.restaurant.name.to_lowercase();

			name.contains(&marker) || marker.contains(&name)
		})
	})
}

fn extract_markers(message: &str) -> Vec<String> {
	let mut markers = Vec::new();
	let mut rest = message;

	while let Some(start) = rest.find("[[") {
		let after = &rest[start + 2..];
		let Some(end) = after.find("]]") else {
			break;
		};

		markers.push(after[..end].to_string());
		rest = &after[end + 2..];
	}

	markers
}
