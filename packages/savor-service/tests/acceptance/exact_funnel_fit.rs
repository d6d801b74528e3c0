use std::sync::Arc;

use savor_service::{Providers, RecommendRequest};
use savor_storage::Restaurant;

use super::{SeededEmbedding, StubSelector, VECTOR_DIM, build_service, ready_context, test_config};

/// Exactly 15 restaurants survive the filter while `rerank_top_n` is 15, so
/// the selector must see all of them, in re-rank order, with nothing dropped.
fn snug_corpus() -> Vec<Restaurant> {
	let mut restaurants: Vec<Restaurant> = (0..15)
		.map(|i| {
			let mut restaurant = savor_testkit::restaurant(&format!("m{i:02}"), VECTOR_DIM as usize);

			restaurant.review_count = 100 + i as u32 * 40;

			restaurant
		})
		.collect();

	for i in 0..30 {
		let mut filler = savor_testkit::restaurant(&format!("x{i:02}"), VECTOR_DIM as usize);

		filler.categories = vec!["ramen".to_string()];
		restaurants.push(filler);
	}

	restaurants
}

#[tokio::test]
async fn selector_sees_every_survivor_when_the_funnel_fits_exactly() {
	let payload = serde_json::json!({
		"recommendations": [
			{ "id": "m03", "matchScore": 88.0, "reason": "Fits a relaxed date night." }
		],
		"message": "Book [[Place m03]] tonight."
	});
	let providers =
		Providers::new(Arc::new(SeededEmbedding), Arc::new(StubSelector { payload }));
	let service = build_service(test_config(), snug_corpus(), providers);
	let mut context = ready_context("date", "anywhere");

	context.slots.cuisine = Some("italian".to_string());

	let response = service
		.recommend(RecommendRequest {
			context,
			user_location: None,
			conversation_summary: "date night".to_string(),
			include_debug_data: true,
		})
		.await
		.expect("recommend failed");
	let bundle = response.debug_data.expect("debug bundle missing");

	assert_eq!(bundle.step1.after_filter, 15);

	let step3 = bundle.step3.expect("step3 missing");
	let step4 = bundle.step4.expect("step4 missing");
	let rerank_ids: Vec<&str> = step3.top_by_rerank.iter().map(|c| c.id.as_str()).collect();
	let sent_ids: Vec<&str> = step4.candidates_sent_to_llm.iter().map(|c| c.id.as_str()).collect();

	assert_eq!(sent_ids.len(), 15);
	assert_eq!(sent_ids, rerank_ids);

	assert_eq!(response.recommendations.len(), 1);
	assert_eq!(response.recommendations[0].restaurant.id, "m03");
	assert_eq!(response.recommendations[0].match_score, 88.0);
	assert_eq!(response.message, "Book [[Place m03]] tonight.");
}
