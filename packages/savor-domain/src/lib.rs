pub mod context;
pub mod dialogue;
pub mod extract;
pub mod query;

pub use context::{ConversationContext, ConversationState, SlotName, Slots};
pub use dialogue::{Chip, TurnOutcome, advance};
pub use query::{BuiltQuery, LocationMode};
