use serde::{Deserialize, Serialize};

/// A restaurant as held by the corpus snapshot: identity, geography, social
/// annotations, and a precomputed embedding. The store never mutates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
	pub id: String,
	pub name: String,
	pub city: String,
	pub categories: Vec<String>,
	pub lat: Option<f64>,
	pub lng: Option<f64>,
	/// 1 (cheapest) through 4 (most expensive).
	pub price_level: u8,
	/// Occasion tags, e.g. "date" or "business". Empty means generic.
	#[serde(default)]
	pub good_for: Vec<String>,
	pub embedding: Vec<f32>,
	#[serde(default)]
	pub friends_who_visited: Vec<String>,
	pub google_rating: f32,
	pub review_count: u32,
}
