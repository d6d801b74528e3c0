use std::{path::Path, sync::Arc};

use savor_service::Service;
use savor_storage::CorpusStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<Service>,
}
impl AppState {
	pub fn new(config: savor_config::Config) -> color_eyre::Result<Self> {
		let store = CorpusStore::load(
			Path::new(&config.storage.corpus.path),
			config.storage.corpus.vector_dim,
		)?;
		let service = Service::new(config, store);

		Ok(Self { service: Arc::new(service) })
	}
}
