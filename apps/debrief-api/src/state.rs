use std::sync::Arc;

use debrief_service::DebriefService;
use debrief_storage::qdrant::MeetingStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<DebriefService>,
}
impl AppState {
	pub async fn new(config: debrief_config::Config) -> color_eyre::Result<Self> {
		let store = MeetingStore::new(&config.storage.qdrant)?;

		// The indexer normally creates the collection first; covering it here
		// too means the API can come up against a fresh Qdrant instance.
		store.ensure_collection().await?;

		let service = DebriefService::new(config, store);

		Ok(Self { service: Arc::new(service) })
	}
}
