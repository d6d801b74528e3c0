use serde::{Deserialize, Serialize};

use savor_storage::Restaurant;

/// One restaurant flowing through the funnel. Each stage only adds its own
/// fields; nothing written by an earlier stage is touched downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
	pub id: String,
	pub name: String,
	pub city: String,
	pub categories: Vec<String>,
	pub distance_meters: Option<f64>,
	/// Set by the vector retrieval stage.
	pub vector_score: Option<f32>,
	/// Set by the social re-rank stage.
	pub social_score: Option<f32>,
	/// Set by the social re-rank stage.
	pub final_score: Option<f32>,
	/// Set by the final selection stage.
	pub match_score: Option<f32>,
	/// Set by the final selection stage.
	pub reason: Option<String>,
	pub friends_who_visited: Vec<String>,
	pub google_rating: f32,
	pub review_count: u32,
	#[serde(skip)]
	pub(crate) embedding: Vec<f32>,
}
impl Candidate {
	pub(crate) fn from_restaurant(restaurant: &Restaurant, distance_meters: Option<f64>) -> Self {
		Self {
			id: restaurant.id.clone(),
			name: restaurant.name.clone(),
			city: restaurant.city.clone(),
			categories: restaurant.categories.clone(),
			distance_meters,
			vector_score: None,
			social_score: None,
			final_score: None,
			match_score: None,
			reason: None,
			friends_who_visited: restaurant.friends_who_visited.clone(),
			google_rating: restaurant.google_rating,
			review_count: restaurant.review_count,
			embedding: restaurant.embedding.clone(),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
	pub restaurant: Candidate,
	/// The selector's confidence, 0 through 100.
	pub match_score: f32,
	pub reason: String,
}

/// Caller-supplied geolocation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
	pub lat: f64,
	pub lng: f64,
}
