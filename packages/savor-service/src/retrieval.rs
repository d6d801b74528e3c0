//! Stage 2: cosine similarity between the query embedding and each
//! candidate's precomputed embedding, keeping the top-K.

use crate::candidate::Candidate;

/// Scores every candidate and returns the top `top_k` sorted descending by
/// vector score, ties broken by id so identical inputs always produce
/// identical output.
pub(crate) fn score_by_vector(
	mut candidates: Vec<Candidate>,
	query_vec: &[f32],
	top_k: usize,
) -> Vec<Candidate> {
	for candidate in &mut candidates {
		candidate.vector_score = Some(round4(cosine(&candidate.embedding, query_vec)));
	}

	candidates.sort_by(|a, b| {
		b.vector_score
			.partial_cmp(&a.vector_score)
			.unwrap_or(std::cmp::Ordering::Equal)
			.then_with(|| a.id.cmp(&b.id))
	});
	candidates.truncate(top_k);

	candidates
}

pub(crate) fn cosine(a: &[f32], b: &[f32]) -> f32 {
	if a.len() != b.len() || a.is_empty() {
		return 0.0;
	}

	let mut dot = 0.0f32;
	let mut norm_a = 0.0f32;
	let mut norm_b = 0.0f32;

	for (x, y) in a.iter().zip(b.iter()) {
		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	if norm_a == 0.0 || norm_b == 0.0 {
		return 0.0;
	}

	dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Scores are stored at 4 decimal places; anything finer is provider noise.
pub(crate) fn round4(value: f32) -> f32 {
	(value * 10_000.0).round() / 10_000.0
}
