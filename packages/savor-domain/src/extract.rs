//! Rule-based slot extraction. Keyword tables map free text onto canonical
//! slot values; a bare short answer is resolved against the slot that was
//! last asked about.

use crate::context::{SlotName, Slots};

const OCCASIONS: &[(&str, &str)] = &[
	("date", "date"),
	("romantic", "date"),
	("anniversary", "celebration"),
	("birthday", "celebration"),
	("celebrat", "celebration"),
	("business", "business"),
	("client", "business"),
	("coworker", "business"),
	("friend", "friends"),
	("group", "friends"),
	("catch up", "friends"),
	("family", "family"),
	("parents", "family"),
	("kids", "family"),
	("solo", "solo"),
	("by myself", "solo"),
	("alone", "solo"),
	("casual", "casual"),
];

const LOCATION_MODES: &[(&str, &str)] = &[
	("walk", "walking"),
	("nearby", "walking"),
	("close by", "walking"),
	("around here", "walking"),
	("travel", "travel"),
	("drive", "travel"),
	("transit", "travel"),
	("anywhere", "citywide"),
	("whole city", "citywide"),
	("across the city", "citywide"),
	("doesn't matter where", "citywide"),
];

const BUDGETS: &[(&str, &str)] = &[
	("cheap", "budget"),
	("budget", "budget"),
	("inexpensive", "budget"),
	("affordable", "budget"),
	("moderate", "moderate"),
	("mid-range", "moderate"),
	("mid range", "moderate"),
	("fancy", "upscale"),
	("upscale", "upscale"),
	("fine dining", "upscale"),
	("splurge", "upscale"),
	("expensive", "upscale"),
];

const CUISINES: &[&str] = &[
	"italian",
	"japanese",
	"sushi",
	"ramen",
	"chinese",
	"korean",
	"thai",
	"vietnamese",
	"indian",
	"mexican",
	"french",
	"spanish",
	"greek",
	"mediterranean",
	"middle eastern",
	"seafood",
	"steakhouse",
	"bbq",
	"burgers",
	"pizza",
	"vegan",
	"vegetarian",
	"brunch",
	"tapas",
];

const VIBES: &[&str] = &[
	"cozy",
	"quiet",
	"lively",
	"trendy",
	"romantic",
	"casual",
	"elegant",
	"outdoor",
	"rooftop",
	"intimate",
];

const TIMINGS: &[&str] =
	&["tonight", "tomorrow", "lunch", "dinner", "brunch", "late night", "weekend", "now"];

/// Extracts slot values from one utterance. Only slots the utterance actually
/// mentions are filled; everything else stays `None` so the merge step cannot
/// clobber earlier turns.
pub fn extract_slots(utterance: &str, last_question: Option<SlotName>) -> Slots {
	let text = utterance.trim().to_lowercase();
	let mut slots = Slots::default();

	if text.is_empty() {
		return slots;
	}

	for (keyword, canonical) in OCCASIONS {
		if text.contains(keyword) {
			slots.occasion = Some((*canonical).to_string());
			break;
		}
	}
	for (keyword, canonical) in LOCATION_MODES {
		if text.contains(keyword) {
			slots.location = Some((*canonical).to_string());
			break;
		}
	}
	for (keyword, canonical) in BUDGETS {
		if text.contains(keyword) {
			slots.budget = Some((*canonical).to_string());
			break;
		}
	}
	for cuisine in CUISINES {
		if text.contains(cuisine) {
			slots.cuisine = Some((*cuisine).to_string());
			break;
		}
	}
	for vibe in VIBES {
		if text.contains(vibe) {
			slots.vibe = Some((*vibe).to_string());
			break;
		}
	}
	for timing in TIMINGS {
		if text.contains(timing) {
			slots.timing = Some((*timing).to_string());
			break;
		}
	}

	// "casual" doubles as an occasion and a vibe; when it matched both,
	// keep the slot that was asked about.
	if slots.occasion.as_deref() == Some("casual") && slots.vibe.as_deref() == Some("casual") {
		match last_question {
			Some(SlotName::Vibe) => slots.occasion = None,
			_ => slots.vibe = None,
		}
	}

	if let Some(asked) = last_question
		&& slots.get(asked).is_none()
		&& is_bare_answer(&text)
	{
		slots.set(asked, text);
	}

	slots
}

const NON_ANSWERS: &[&str] =
	&["no", "nope", "no idea", "not sure", "idk", "dunno", "hmm", "whatever", "you choose", "skip"];

/// A short free-form reply with no recognized keyword is taken verbatim as
/// the answer to the pending question, unless it reads as a non-answer.
fn is_bare_answer(text: &str) -> bool {
	text.split_whitespace().count() <= 3 && !NON_ANSWERS.contains(&text)
}
