use serde::{Deserialize, Serialize};

use crate::context::Slots;

/// How far the user is willing to go, derived from the `location` slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMode {
	Walking,
	Travel,
	#[default]
	CityWide,
}
impl LocationMode {
	pub fn from_slot(value: &str) -> Self {
		match value {
			"walking" => Self::Walking,
			"travel" => Self::Travel,
			_ => Self::CityWide,
		}
	}
}

/// The structured query the funnel runs on. Built from slots once the
/// dialogue decides to invoke; missing required slots are filled with
/// configured defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltQuery {
	pub occasion: String,
	pub location: LocationMode,
	pub cuisine: Option<String>,
	pub vibe: Option<String>,
	pub budget: Option<String>,
	pub timing: Option<String>,
}
impl BuiltQuery {
	pub fn from_slots(slots: &Slots, cfg: &savor_config::Dialogue) -> Self {
		Self {
			occasion: slots
				.occasion
				.clone()
				.unwrap_or_else(|| cfg.default_occasion.clone()),
			location: slots
				.location
				.as_deref()
				.map(LocationMode::from_slot)
				.unwrap_or_else(|| LocationMode::from_slot(&cfg.default_location)),
			cuisine: slots.cuisine.clone(),
			vibe: slots.vibe.clone(),
			budget: slots.budget.clone(),
			timing: slots.timing.clone(),
		}
	}

	/// Stable natural-language summary of the query intent. Part of the
	/// observable debug contract: identical slot state must yield an
	/// identical string.
	pub fn query_text(&self) -> String {
		let mut parts = vec![format!("{} meal", self.occasion)];

		if let Some(cuisine) = &self.cuisine {
			parts.push(format!("{cuisine} cuisine"));
		}
		if let Some(vibe) = &self.vibe {
			parts.push(format!("{vibe} atmosphere"));
		}
		if let Some(budget) = &self.budget {
			parts.push(format!("{budget} price range"));
		}
		if let Some(timing) = &self.timing {
			parts.push(format!("for {timing}"));
		}

		parts.join(", ")
	}
}
