use std::sync::Arc;

use savor_service::{Providers, RecommendRequest};
use savor_storage::Restaurant;

use super::{FailSelector, SeededEmbedding, VECTOR_DIM, build_service, ready_context, test_config};

/// 500 restaurants, 80 of which survive the hard filter. Checks the shape of
/// every stage of the funnel against the debug bundle.
fn wide_corpus() -> Vec<Restaurant> {
	(0..500)
		.map(|i| {
			let mut restaurant = savor_testkit::restaurant(&format!("r{i:03}"), VECTOR_DIM as usize);

			// The first 80 match the italian cuisine constraint.
			if i >= 80 {
				restaurant.categories = vec!["sushi".to_string()];
			}

			restaurant.friends_who_visited =
				(0..(i % 4)).map(|f| format!("friend-{f}")).collect();
			restaurant.review_count = 50 + (i as u32 * 7) % 900;

			restaurant
		})
		.collect()
}

#[tokio::test]
async fn funnel_narrows_stage_by_stage() {
	let providers = Providers::new(Arc::new(SeededEmbedding), Arc::new(FailSelector));
	let service = build_service(test_config(), wide_corpus(), providers);
	let mut context = ready_context("date", "anywhere");

	context.slots.cuisine = Some("italian".to_string());

	let response = service
		.recommend(RecommendRequest {
			context,
			user_location: None,
			conversation_summary: "date night, italian".to_string(),
			include_debug_data: true,
		})
		.await
		.expect("recommend failed");
	let bundle = response.debug_data.expect("debug bundle missing");

	assert_eq!(bundle.step1.total_in_db, 500);
	assert_eq!(bundle.step1.after_filter, 80);
	assert!(bundle.step1.after_filter <= bundle.step1.total_in_db);
	assert_eq!(bundle.step1.sample_restaurants.len(), 5);

	let step2 = bundle.step2.expect("step2 missing");

	assert_eq!(step2.total_scored, 80);
	assert_eq!(step2.top_by_vector.len(), 50);

	for pair in step2.top_by_vector.windows(2) {
		assert!(pair[0].vector_score >= pair[1].vector_score);
	}

	let step3 = bundle.step3.expect("step3 missing");

	assert_eq!(step3.top_by_rerank.len(), 15);

	for pair in step3.top_by_rerank.windows(2) {
		assert!(pair[0].final_score >= pair[1].final_score);
	}

	let step4 = bundle.step4.expect("step4 missing");
	let sent_ids: Vec<&str> = step4.candidates_sent_to_llm.iter().map(|c| c.id.as_str()).collect();
	let rerank_ids: Vec<&str> = step3.top_by_rerank.iter().map(|c| c.id.as_str()).collect();

	// What the selector saw is exactly the head of the re-ranked order.
	assert_eq!(sent_ids, rerank_ids[..sent_ids.len()]);
	assert!(response.recommendations.len() <= 3);

	for result in &response.recommendations {
		assert!(sent_ids.contains(&result.restaurant.id.as_str()));
	}

	// The selector failed, so the deterministic fallback takes the head of
	// the re-ranked order.
	let rec_ids: Vec<&str> =
		response.recommendations.iter().map(|r| r.restaurant.id.as_str()).collect();

	assert_eq!(rec_ids, rerank_ids[..3]);
}

#[tokio::test]
async fn scores_are_rounded_to_four_decimals() {
	let providers = Providers::new(Arc::new(SeededEmbedding), Arc::new(FailSelector));
	let service = build_service(test_config(), wide_corpus(), providers);
	let mut context = ready_context("date", "anywhere");

	context.slots.cuisine = Some("italian".to_string());

	let response = service
		.recommend(RecommendRequest {
			context,
			user_location: None,
			conversation_summary: String::new(),
			include_debug_data: true,
		})
		.await
		.expect("recommend failed");
	let bundle = response.debug_data.expect("debug bundle missing");

	for candidate in &bundle.step2.expect("step2 missing").top_by_vector {
		let score = candidate.vector_score.expect("vector score missing");

		assert!((score * 10_000.0 - (score * 10_000.0).round()).abs() < 1e-3);
	}
}

#[tokio::test]
async fn debug_bundle_is_absent_unless_requested() {
	let providers = Providers::new(Arc::new(SeededEmbedding), Arc::new(FailSelector));
	let service = build_service(test_config(), wide_corpus(), providers);

	let response = service
		.recommend(RecommendRequest {
			context: ready_context("date", "anywhere"),
			user_location: None,
			conversation_summary: String::new(),
			include_debug_data: false,
		})
		.await
		.expect("recommend failed");

	assert!(response.debug_data.is_none());
	assert!(!response.recommendations.is_empty());
}
