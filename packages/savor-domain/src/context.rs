use serde::{Deserialize, Serialize};

/// Dialogue state for a single recommendation cycle. The caller owns the
/// context and may reset it to start a new cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
	#[default]
	Gathering,
	ReadyToRecommend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotName {
	Occasion,
	Location,
	Cuisine,
	Vibe,
	Budget,
	Timing,
}
impl SlotName {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Occasion => "occasion",
			Self::Location => "location",
			Self::Cuisine => "cuisine",
			Self::Vibe => "vibe",
			Self::Budget => "budget",
			Self::Timing => "timing",
		}
	}
}

/// Slot values are canonical lowercase strings; `None` means the slot has not
/// been filled yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slots {
	pub occasion: Option<String>,
	pub location: Option<String>,
	pub cuisine: Option<String>,
	pub vibe: Option<String>,
	pub budget: Option<String>,
	pub timing: Option<String>,
}
impl Slots {
	pub fn get(&self, name: SlotName) -> Option<&str> {
		match name {
			SlotName::Occasion => self.occasion.as_deref(),
			SlotName::Location => self.location.as_deref(),
			SlotName::Cuisine => self.cuisine.as_deref(),
			SlotName::Vibe => self.vibe.as_deref(),
			SlotName::Budget => self.budget.as_deref(),
			SlotName::Timing => self.timing.as_deref(),
		}
	}

	pub fn set(&mut self, name: SlotName, value: String) {
		let slot = match name {
			SlotName::Occasion => &mut self.occasion,
			SlotName::Location => &mut self.location,
			SlotName::Cuisine => &mut self.cuisine,
			SlotName::Vibe => &mut self.vibe,
			SlotName::Budget => &mut self.budget,
			SlotName::Timing => &mut self.timing,
		};
		*slot = Some(value);
	}

	/// A filled slot is only replaced by a new non-empty extraction; it is
	/// never cleared by a later turn.
	pub fn merge(&mut self, extracted: Slots) {
		for name in SlotName::ALL {
			if let Some(value) = extracted.get(name) {
				self.set(name, value.to_string());
			}
		}
	}
}

impl SlotName {
	pub const ALL: [SlotName; 6] = [
		SlotName::Occasion,
		SlotName::Location,
		SlotName::Cuisine,
		SlotName::Vibe,
		SlotName::Budget,
		SlotName::Timing,
	];
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
	#[serde(default)]
	pub state: ConversationState,
	#[serde(default)]
	pub slots: Slots,
	#[serde(default)]
	pub turn_count: u32,
	#[serde(default)]
	pub last_question: Option<SlotName>,
}
impl ConversationContext {
	pub fn has_minimum_slots(&self) -> bool {
		self.slots.occasion.is_some() && self.slots.location.is_some()
	}
}
