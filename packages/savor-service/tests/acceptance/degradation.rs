use std::{
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use savor_service::{Providers, RecommendRequest, ServiceError};
use savor_storage::Restaurant;

use super::{
	SeededEmbedding, SlowEmbedding, SlowSelector, StubSelector, VECTOR_DIM, build_service,
	ready_context, test_config,
};

fn small_corpus() -> Vec<Restaurant> {
	(0..10)
		.map(|i| {
			let mut restaurant = savor_testkit::restaurant(&format!("r{i}"), VECTOR_DIM as usize);

			restaurant.review_count = 100 + i as u32 * 50;

			restaurant
		})
		.collect()
}

#[tokio::test]
async fn hallucinated_id_degrades_to_the_fallback() {
	let payload = serde_json::json!({
		"recommendations": [
			{ "id": "made-up", "matchScore": 95.0, "reason": "Sounds great." }
		],
		"message": "Try [[Nowhere]]."
	});
	let providers =
		Providers::new(Arc::new(SeededEmbedding), Arc::new(StubSelector { payload }));
	let service = build_service(test_config(), small_corpus(), providers);

	let response = service
		.recommend(RecommendRequest {
			context: ready_context("date", "anywhere"),
			user_location: None,
			conversation_summary: String::new(),
			include_debug_data: true,
		})
		.await
		.expect("recommend failed");

	// The invented id must never surface; the fallback substitutes the head
	// of the re-ranked order.
	assert_eq!(response.recommendations.len(), 3);
	assert!(response.recommendations.iter().all(|r| r.restaurant.id != "made-up"));

	let step3 = response.debug_data.expect("debug bundle missing").step3.expect("step3 missing");
	let rec_ids: Vec<&str> =
		response.recommendations.iter().map(|r| r.restaurant.id.as_str()).collect();
	let rerank_ids: Vec<&str> = step3.top_by_rerank.iter().map(|c| c.id.as_str()).collect();

	assert_eq!(rec_ids, rerank_ids[..3]);
}

#[tokio::test]
async fn over_cap_selection_degrades_to_the_fallback() {
	let payload = serde_json::json!({
		"recommendations": [
			{ "id": "r0", "matchScore": 90.0, "reason": "a" },
			{ "id": "r1", "matchScore": 89.0, "reason": "b" },
			{ "id": "r2", "matchScore": 88.0, "reason": "c" },
			{ "id": "r3", "matchScore": 87.0, "reason": "d" }
		]
	});
	let providers =
		Providers::new(Arc::new(SeededEmbedding), Arc::new(StubSelector { payload }));
	let service = build_service(test_config(), small_corpus(), providers);

	let response = service
		.recommend(RecommendRequest {
			context: ready_context("date", "anywhere"),
			user_location: None,
			conversation_summary: String::new(),
			include_debug_data: false,
		})
		.await
		.expect("recommend failed");

	assert_eq!(response.recommendations.len(), 3);
}

#[tokio::test]
async fn slow_selector_is_retried_then_degrades() {
	let calls = Arc::new(AtomicUsize::new(0));
	let providers = Providers::new(
		Arc::new(SeededEmbedding),
		Arc::new(SlowSelector { delay: Duration::from_millis(500), calls: calls.clone() }),
	);
	let mut cfg = test_config();

	cfg.pipeline.select_budget_ms = 60;

	let service = build_service(cfg, small_corpus(), providers);

	let response = service
		.recommend(RecommendRequest {
			context: ready_context("date", "anywhere"),
			user_location: None,
			conversation_summary: String::new(),
			include_debug_data: false,
		})
		.await
		.expect("recommend failed");

	// One attempt at the full budget, one more at half.
	assert_eq!(calls.load(Ordering::SeqCst), 2);
	assert_eq!(response.recommendations.len(), 3);
}

#[tokio::test]
async fn slow_embedding_fails_with_a_partial_bundle() {
	let providers = Providers::new(
		Arc::new(SlowEmbedding { delay: Duration::from_millis(500) }),
		Arc::new(StubSelector { payload: serde_json::json!({ "recommendations": [] }) }),
	);
	let mut cfg = test_config();

	cfg.pipeline.embed_budget_ms = 60;

	let service = build_service(cfg, small_corpus(), providers);

	let err = service
		.recommend(RecommendRequest {
			context: ready_context("date", "anywhere"),
			user_location: None,
			conversation_summary: String::new(),
			include_debug_data: true,
		})
		.await
		.expect_err("embedding timeout must fail the funnel");

	assert!(matches!(err.source, ServiceError::Timeout { stage: "embedding" }));

	// The bundle still carries everything recorded before the failure.
	let bundle = err.debug_data.expect("partial bundle missing");

	assert_eq!(bundle.step1.after_filter, 10);
	assert!(bundle.step2.is_none());
}
