//! The dialogue manager: merges extracted slots into the caller-supplied
//! context and decides between asking a clarifying question and invoking the
//! recommendation funnel.

use serde::{Deserialize, Serialize};

use crate::{
	context::{ConversationContext, ConversationState, SlotName},
	extract::extract_slots,
	query::BuiltQuery,
};

/// A pre-canned quick reply. Sending `value` as the next utterance is
/// equivalent to clicking the chip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chip {
	pub label: String,
	pub value: String,
}
impl Chip {
	fn new(label: &str, value: &str) -> Self {
		Self { label: label.to_string(), value: value.to_string() }
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
	AskSlot { slot: SlotName, prompt: String, chips: Vec<Chip> },
	Invoke { query: BuiltQuery },
}

/// Advances the conversation by one user turn. Pure: the only effect is the
/// returned context.
pub fn advance(
	context: &ConversationContext,
	utterance: &str,
	cfg: &savor_config::Dialogue,
) -> (ConversationContext, TurnOutcome) {
	let mut next = context.clone();
	let extracted = extract_slots(utterance, context.last_question);

	next.slots.merge(extracted);
	next.turn_count = context.turn_count + 1;

	let force = next.turn_count >= cfg.turn_cap;

	if next.has_minimum_slots() || force {
		next.state = ConversationState::ReadyToRecommend;
		next.last_question = None;

		let query = BuiltQuery::from_slots(&next.slots, cfg);

		return (next, TurnOutcome::Invoke { query });
	}

	let slot = if next.slots.occasion.is_none() { SlotName::Occasion } else { SlotName::Location };

	next.state = ConversationState::Gathering;
	next.last_question = Some(slot);

	let (prompt, chips) = clarifying_question(slot);

	(next, TurnOutcome::AskSlot { slot, prompt, chips })
}

fn clarifying_question(slot: SlotName) -> (String, Vec<Chip>) {
	match slot {
		SlotName::Occasion => (
			"What's the occasion?".to_string(),
			vec![
				Chip::new("Date night", "date"),
				Chip::new("Celebration", "celebration"),
				Chip::new("Business meal", "business"),
				Chip::new("Out with friends", "friends"),
				Chip::new("Family dinner", "family"),
			],
		),
		SlotName::Location => (
			"How far are you willing to go?".to_string(),
			vec![
				Chip::new("Walking distance", "walking"),
				Chip::new("Happy to travel", "travel"),
				Chip::new("Anywhere in the city", "anywhere"),
			],
		),
		SlotName::Cuisine => (
			"Any cuisine in mind?".to_string(),
			vec![
				Chip::new("Italian", "italian"),
				Chip::new("Japanese", "japanese"),
				Chip::new("Mexican", "mexican"),
			],
		),
		SlotName::Vibe => (
			"What kind of vibe?".to_string(),
			vec![
				Chip::new("Cozy", "cozy"),
				Chip::new("Lively", "lively"),
				Chip::new("Quiet", "quiet"),
			],
		),
		SlotName::Budget => (
			"What's the budget?".to_string(),
			vec![
				Chip::new("Keep it cheap", "budget"),
				Chip::new("Moderate", "moderate"),
				Chip::new("Splurge", "upscale"),
			],
		),
		SlotName::Timing => (
			"When are you going?".to_string(),
			vec![
				Chip::new("Tonight", "tonight"),
				Chip::new("Tomorrow", "tomorrow"),
				Chip::new("This weekend", "weekend"),
			],
		),
	}
}
