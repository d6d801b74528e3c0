use std::{collections::HashSet, fs, path::Path, sync::Arc};

use serde::Deserialize;

use crate::{Error, Result, models::Restaurant};

#[derive(Debug, Deserialize)]
struct CorpusFile {
	restaurants: Vec<Restaurant>,
}

/// An immutable view of the restaurant corpus. Every funnel invocation works
/// against one snapshot, so reads are consistent for the whole invocation.
#[derive(Debug)]
pub struct CorpusSnapshot {
	restaurants: Vec<Restaurant>,
}
impl CorpusSnapshot {
	pub fn new(mut restaurants: Vec<Restaurant>) -> Self {
		// Corpus order is not contractual; keep it stable by id so the
		// unranked filter stage is reproducible.
		restaurants.sort_by(|a, b| a.id.cmp(&b.id));

		Self { restaurants }
	}

	pub fn restaurants(&self) -> &[Restaurant] {
		&self.restaurants
	}

	pub fn len(&self) -> usize {
		self.restaurants.len()
	}

	pub fn is_empty(&self) -> bool {
		self.restaurants.is_empty()
	}
}

/// Read-only access to the corpus. The store is loaded once at startup and
/// hands out cheap snapshot handles.
#[derive(Debug, Clone)]
pub struct CorpusStore {
	snapshot: Arc<CorpusSnapshot>,
}
impl CorpusStore {
	pub fn load(path: &Path, vector_dim: u32) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadCorpus { path: path.to_path_buf(), source: err })?;
		let file: CorpusFile = serde_json::from_str(&raw)
			.map_err(|err| Error::ParseCorpus { path: path.to_path_buf(), source: err })?;
		let snapshot = CorpusSnapshot::new(file.restaurants);

		validate(&snapshot, vector_dim)?;

		Ok(Self { snapshot: Arc::new(snapshot) })
	}

	pub fn from_snapshot(snapshot: CorpusSnapshot) -> Self {
		Self { snapshot: Arc::new(snapshot) }
	}

	pub fn snapshot(&self) -> Arc<CorpusSnapshot> {
		self.snapshot.clone()
	}
}

fn validate(snapshot: &CorpusSnapshot, vector_dim: u32) -> Result<()> {
	let mut seen = HashSet::new();

	for restaurant in snapshot.restaurants() {
		if restaurant.id.trim().is_empty() {
			return Err(Error::InvalidCorpus {
				message: "Restaurant ids must be non-empty.".to_string(),
			});
		}
		if !seen.insert(restaurant.id.as_str()) {
			return Err(Error::InvalidCorpus {
				message: format!("Duplicate restaurant id {}.", restaurant.id),
			});
		}
		if restaurant.embedding.len() != vector_dim as usize {
			return Err(Error::InvalidCorpus {
				message: format!(
					"Restaurant {} embedding has {} dimensions, expected {vector_dim}.",
					restaurant.id,
					restaurant.embedding.len()
				),
			});
		}
		if !(0.0..=5.0).contains(&restaurant.google_rating) {
			return Err(Error::InvalidCorpus {
				message: format!("Restaurant {} rating is out of range.", restaurant.id),
			});
		}
		if !(1..=4).contains(&restaurant.price_level) {
			return Err(Error::InvalidCorpus {
				message: format!("Restaurant {} price level is out of range.", restaurant.id),
			});
		}
	}

	Ok(())
}
