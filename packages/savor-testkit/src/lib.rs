//! Deterministic corpus fixtures for tests. Embeddings are derived from
//! seeds so a test corpus ranks identically on every run.

use savor_storage::{CorpusSnapshot, CorpusStore, Restaurant};

/// A unit-length vector derived from `seed` via FNV-1a. Identical seeds
/// always produce identical vectors.
pub fn seeded_unit_vector(seed: &str, dim: usize) -> Vec<f32> {
	let mut hash: u64 = 0xcbf2_9ce4_8422_2325;

	for byte in seed.bytes() {
		hash ^= byte as u64;
		hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
	}

	let mut out = Vec::with_capacity(dim);

	for i in 0..dim {
		hash ^= (i as u64).wrapping_add(1);
		hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
		// Map the hash onto [-1, 1].
		out.push((hash >> 11) as f32 / (1u64 << 53) as f32 * 2.0 - 1.0);
	}

	let norm: f32 = out.iter().map(|v| v * v).sum::<f32>().sqrt();

	if norm > 0.0 {
		for value in &mut out {
			*value /= norm;
		}
	} else if dim > 0 {
		out[0] = 1.0;
	}

	out
}

/// A restaurant with sensible defaults and a seeded embedding; tests tweak
/// individual fields as needed.
pub fn restaurant(id: &str, dim: usize) -> Restaurant {
	Restaurant {
		id: id.to_string(),
		name: format!("Place {id}"),
		city: "Lisbon".to_string(),
		categories: vec!["italian".to_string()],
		lat: Some(38.72),
		lng: Some(-9.14),
		price_level: 2,
		good_for: Vec::new(),
		embedding: seeded_unit_vector(id, dim),
		friends_who_visited: Vec::new(),
		google_rating: 4.0,
		review_count: 100,
	}
}

pub fn corpus(restaurants: Vec<Restaurant>) -> CorpusSnapshot {
	CorpusSnapshot::new(restaurants)
}

pub fn store(restaurants: Vec<Restaurant>) -> CorpusStore {
	CorpusStore::from_snapshot(corpus(restaurants))
}
