use std::sync::Arc;

use savor_service::{Providers, RecommendRequest};
use savor_storage::Restaurant;

use super::{FailSelector, SeededEmbedding, VECTOR_DIM, build_service, ready_context, test_config};

fn corpus() -> Vec<Restaurant> {
	(0..60)
		.map(|i| {
			let mut restaurant = savor_testkit::restaurant(&format!("r{i:02}"), VECTOR_DIM as usize);

			restaurant.friends_who_visited = (0..(i % 3)).map(|f| format!("f{f}")).collect();
			restaurant.review_count = 20 + (i as u32 * 13) % 700;
			restaurant.google_rating = 3.5 + (i % 3) as f32 * 0.5;

			restaurant
		})
		.collect()
}

fn request() -> RecommendRequest {
	let mut context = ready_context("date", "anywhere");

	context.slots.vibe = Some("cozy".to_string());

	RecommendRequest {
		context,
		user_location: None,
		conversation_summary: "cozy date".to_string(),
		include_debug_data: true,
	}
}

/// Filtering, retrieval, and re-ranking carry no randomness: the same corpus
/// and slot state must produce identical stage outputs on every invocation.
#[tokio::test]
async fn first_three_stages_are_deterministic() {
	let providers = Providers::new(Arc::new(SeededEmbedding), Arc::new(FailSelector));
	let service = build_service(test_config(), corpus(), providers);

	let first = service.recommend(request()).await.expect("first run failed");
	let second = service.recommend(request()).await.expect("second run failed");

	let a = first.debug_data.expect("first bundle missing");
	let b = second.debug_data.expect("second bundle missing");

	assert_eq!(a.step1, b.step1);
	assert_eq!(a.step2, b.step2);
	assert_eq!(a.step3, b.step3);
}
