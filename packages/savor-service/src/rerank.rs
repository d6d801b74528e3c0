//! Stage 3: blends vector similarity with social signals. Friend
//! endorsement carries the heaviest weight; it is the strongest
//! personalization signal the corpus offers.

use crate::{candidate::Candidate, retrieval::round4};

/// Review counts saturate the volume signal here; beyond this a restaurant
/// is simply "well reviewed".
const REVIEW_SATURATION: f32 = 1_000.0;
/// Friend visits saturate at this count.
const FRIEND_SATURATION: f32 = 3.0;

/// Attaches `social_score` and `final_score`, then returns the top `top_n`
/// sorted descending by final score. Ties fall to higher review count, then
/// higher rating, then id.
pub(crate) fn rerank(
	mut candidates: Vec<Candidate>,
	weights: &savor_config::Ranking,
	top_n: usize,
) -> Vec<Candidate> {
	for candidate in &mut candidates {
		let social = social_score(candidate, weights);
		let vector = candidate.vector_score.unwrap_or(0.0);

		candidate.social_score = Some(social);
		candidate.final_score = Some(round4(blend(vector, social, weights)));
	}

	candidates.sort_by(|a, b| {
		b.final_score
			.partial_cmp(&a.final_score)
			.unwrap_or(std::cmp::Ordering::Equal)
			.then_with(|| b.review_count.cmp(&a.review_count))
			.then_with(|| {
				b.google_rating.partial_cmp(&a.google_rating).unwrap_or(std::cmp::Ordering::Equal)
			})
			.then_with(|| a.id.cmp(&b.id))
	});
	candidates.truncate(top_n);

	candidates
}

fn social_score(candidate: &Candidate, weights: &savor_config::Ranking) -> f32 {
	let friend_signal =
		(candidate.friends_who_visited.len() as f32 / FRIEND_SATURATION).min(1.0);
	let rating_signal = (candidate.google_rating / 5.0).clamp(0.0, 1.0);
	let review_signal =
		((1.0 + candidate.review_count as f32).ln() / (1.0 + REVIEW_SATURATION).ln()).min(1.0);
	let total = weights.friend_weight + weights.rating_weight + weights.review_weight;

	if total <= 0.0 {
		return 0.0;
	}

	let weighted = weights.friend_weight * friend_signal
		+ weights.rating_weight * rating_signal
		+ weights.review_weight * review_signal;

	round4(weighted / total)
}

/// Linear in both inputs, so raising either score never lowers the blend.
fn blend(vector: f32, social: f32, weights: &savor_config::Ranking) -> f32 {
	let total = weights.vector_weight + weights.social_weight;

	if total <= 0.0 {
		return 0.0;
	}

	(weights.vector_weight * vector + weights.social_weight * social) / total
}
