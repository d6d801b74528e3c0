//! Stage 1: deterministic hard filters over the corpus snapshot. No ranking
//! happens here; output order is simply corpus order (by id).

use savor_domain::{BuiltQuery, LocationMode};
use savor_storage::{CorpusSnapshot, Restaurant};

use crate::candidate::{Candidate, UserLocation};

/// Applies the location, occasion, cuisine, and budget predicates. Returns
/// the corpus size alongside the surviving candidates.
pub(crate) fn filter_candidates(
	snapshot: &CorpusSnapshot,
	query: &BuiltQuery,
	location: Option<&UserLocation>,
	limits: &savor_config::Filters,
) -> (usize, Vec<Candidate>) {
	let total_in_db = snapshot.len();
	let mut candidates = Vec::new();

	for restaurant in snapshot.restaurants() {
		let distance = distance_to(restaurant, location);

		if !location_matches(query.location, distance, limits) {
			continue;
		}
		if !occasion_matches(restaurant, &query.occasion) {
			continue;
		}
		if let Some(cuisine) = query.cuisine.as_deref()
			&& !cuisine_matches(restaurant, cuisine)
		{
			continue;
		}
		if let Some(budget) = query.budget.as_deref()
			&& !budget_matches(restaurant, budget)
		{
			continue;
		}

		candidates.push(Candidate::from_restaurant(restaurant, distance));
	}

	(total_in_db, candidates)
}

fn distance_to(restaurant: &Restaurant, location: Option<&UserLocation>) -> Option<f64> {
	let location = location?;
	let (lat, lng) = (restaurant.lat?, restaurant.lng?);

	Some(haversine_meters(location.lat, location.lng, lat, lng))
}

/// Distance predicates degrade to city-wide when no distance can be
/// computed; a missing coordinate must not silently empty the funnel.
fn location_matches(mode: LocationMode, distance: Option<f64>, limits: &savor_config::Filters) -> bool {
	let radius = match mode {
		LocationMode::Walking => limits.walking_radius_m,
		LocationMode::Travel => limits.travel_radius_m,
		LocationMode::CityWide => return true,
	};

	distance.map(|meters| meters <= radius).unwrap_or(true)
}

/// Restaurants with no occasion tags are generic and pass every occasion.
fn occasion_matches(restaurant: &Restaurant, occasion: &str) -> bool {
	restaurant.good_for.is_empty()
		|| restaurant.good_for.iter().any(|tag| tag.eq_ignore_ascii_case(occasion))
}

fn cuisine_matches(restaurant: &Restaurant, cuisine: &str) -> bool {
	restaurant.categories.iter().any(|category| category.eq_ignore_ascii_case(cuisine))
}

fn budget_matches(restaurant: &Restaurant, budget: &str) -> bool {
	let allowed: &[u8] = match budget {
		"budget" => &[1, 2],
		"moderate" => &[2, 3],
		"upscale" => &[3, 4],
		// Free-text budget answers carry no price mapping; let them pass.
		_ => return true,
	};

	allowed.contains(&restaurant.price_level)
}

const EARTH_RADIUS_M: f64 = 6_371_000.0;

fn haversine_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
	let d_lat = (lat2 - lat1).to_radians();
	let d_lng = (lng2 - lng1).to_radians();
	let a = (d_lat / 2.0).sin().powi(2)
		+ lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

	2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}
