use std::{sync::Arc, time::Duration};

use savor_service::{Providers, ServiceError, TurnRequest};
use savor_storage::Restaurant;

use super::{FailSelector, SeededEmbedding, SlowEmbedding, VECTOR_DIM, build_service, test_config};

fn corpus() -> Vec<Restaurant> {
	(0..8).map(|i| savor_testkit::restaurant(&format!("r{i}"), VECTOR_DIM as usize)).collect()
}

fn turn(message: &str) -> TurnRequest {
	TurnRequest {
		message: message.to_string(),
		conversation_id: None,
		previous_context: None,
		messages: Vec::new(),
		user_location: None,
		include_debug_data: false,
	}
}

#[tokio::test]
async fn a_full_conversation_reaches_recommendations() {
	let providers = Providers::new(Arc::new(SeededEmbedding), Arc::new(FailSelector));
	let service = build_service(test_config(), corpus(), providers);

	// Turn 1: nothing extractable, so the manager asks for the occasion.
	let first = service.advance_turn(turn("somewhere nice to eat")).await.expect("turn 1 failed");

	assert_eq!(first.ready_to_recommend, Some(false));
	assert!(first.recommendations.is_none());
	assert!(first.chips.as_deref().is_some_and(|chips| !chips.is_empty()));
	assert_eq!(first.context.turn_count, 1);

	// Turn 2: the occasion lands, the location question follows.
	let second = service
		.advance_turn(TurnRequest {
			previous_context: Some(first.context),
			..turn("it's a date night")
		})
		.await
		.expect("turn 2 failed");

	assert_eq!(second.ready_to_recommend, Some(false));
	assert_eq!(second.context.slots.occasion.as_deref(), Some("date"));
	assert_eq!(second.context.turn_count, 2);

	// Turn 3: minimum slots are filled, the funnel runs in the same turn.
	let third = service
		.advance_turn(TurnRequest {
			previous_context: Some(second.context),
			..turn("walking distance")
		})
		.await
		.expect("turn 3 failed");

	assert_eq!(third.ready_to_recommend, Some(true));
	assert!(third.error.is_none());

	let recommendations = third.recommendations.expect("recommendations missing");

	assert!(!recommendations.is_empty());
	assert!(recommendations.len() <= 3);
}

#[tokio::test]
async fn turn_cap_forces_recommendations_with_defaults() {
	let providers = Providers::new(Arc::new(SeededEmbedding), Arc::new(FailSelector));
	let mut cfg = test_config();

	cfg.dialogue.turn_cap = 2;

	let service = build_service(cfg, corpus(), providers);

	let first = service.advance_turn(turn("hello")).await.expect("turn 1 failed");

	assert_eq!(first.ready_to_recommend, Some(false));

	// Still nothing extractable, but the cap is reached.
	let second = service
		.advance_turn(TurnRequest { previous_context: Some(first.context), ..turn("no idea") })
		.await
		.expect("turn 2 failed");

	assert_eq!(second.ready_to_recommend, Some(true));
	assert!(second.recommendations.is_some());
}

#[tokio::test]
async fn empty_message_is_rejected() {
	let providers = Providers::new(Arc::new(SeededEmbedding), Arc::new(FailSelector));
	let service = build_service(test_config(), corpus(), providers);

	let err = service.advance_turn(turn("   ")).await.expect_err("blank message must be rejected");

	assert!(matches!(err, ServiceError::InvalidRequest { .. }));
}

#[tokio::test]
async fn funnel_failure_surfaces_in_the_turn_response() {
	let providers = Providers::new(
		Arc::new(SlowEmbedding { delay: Duration::from_millis(500) }),
		Arc::new(FailSelector),
	);
	let mut cfg = test_config();

	cfg.pipeline.embed_budget_ms = 60;

	let service = build_service(cfg, corpus(), providers);

	let response = service
		.advance_turn(TurnRequest { include_debug_data: true, ..turn("date night, anywhere") })
		.await
		.expect("turn must not error at the transport level");

	assert_eq!(response.ready_to_recommend, Some(true));
	assert!(response.recommendations.is_none());
	assert!(response.error.is_some());
	// The partial bundle from before the failing stage is preserved.
	assert!(response.debug_data.is_some_and(|bundle| bundle.step2.is_none()));
}
