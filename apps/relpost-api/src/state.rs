use std::sync::Arc;

use relpost_service::{EmbedRegistry, RelatedService, Stores};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RelatedService>,
	pub embeds: Arc<EmbedRegistry>,
}
impl AppState {
	pub async fn new(config: relpost_config::Config) -> color_eyre::Result<Self> {
		let stores = Stores::from_config(&config).await?;

		Ok(Self::from_service(RelatedService::new(config, stores)))
	}

	/// Wires the embed registry for an already-built service.
	pub fn from_service(service: RelatedService) -> Self {
		let service = Arc::new(service);
		let embeds = EmbedRegistry::for_service(service.clone());

		Self { service, embeds: Arc::new(embeds) }
	}
}
