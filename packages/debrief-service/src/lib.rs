pub mod crm;
pub mod question;
pub mod tasks;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

pub use crm::{CrmContact, CrmData, CrmDataResponse, CrmDealSize};
use debrief_config::{Config, EmbeddingProviderConfig, GeneratorProviderConfig};
use debrief_providers::{embedding, generator};
use debrief_storage::{
	models::{MeetingRecord, ScoredMeeting},
	qdrant::MeetingStore,
};
pub use question::QuestionAnswerResponse;
pub use tasks::TaskDataResponse;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, debrief_providers::Result<Vec<Vec<f32>>>>;
}

pub trait GeneratorProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a GeneratorProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, debrief_providers::Result<String>>;

	fn complete_json<'a>(
		&'a self,
		cfg: &'a GeneratorProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, debrief_providers::Result<Value>>;
}

/// The injected view of the vector index: exact lookup and top-K similarity.
/// The production implementation is the Qdrant-backed [`MeetingStore`]; tests
/// substitute an in-memory fake.
pub trait MeetingIndex
where
	Self: Send + Sync,
{
	fn fetch<'a>(
		&'a self,
		meeting_id: &'a str,
	) -> BoxFuture<'a, debrief_storage::Result<Option<MeetingRecord>>>;

	fn search<'a>(
		&'a self,
		vector: Vec<f32>,
		top_k: u32,
	) -> BoxFuture<'a, debrief_storage::Result<Vec<ScoredMeeting>>>;
}

#[derive(Debug)]
pub enum ServiceError {
	NotFound { meeting_id: String },
	EmptyContext { message: String },
	InvalidRequest { message: String },
	Provider { message: String },
	Index { message: String },
}

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::NotFound { meeting_id } => {
				write!(f, "Meeting '{meeting_id}' was not found in the index.")
			},
			Self::EmptyContext { message } => write!(f, "Empty context: {message}"),
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Provider { message } => write!(f, "Provider error: {message}"),
			Self::Index { message } => write!(f, "Index error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<debrief_providers::Error> for ServiceError {
	fn from(err: debrief_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<debrief_storage::Error> for ServiceError {
	fn from(err: debrief_storage::Error) -> Self {
		Self::Index { message: err.to_string() }
	}
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub generator: Arc<dyn GeneratorProvider>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, debrief_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl GeneratorProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a GeneratorProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, debrief_providers::Result<String>> {
		Box::pin(generator::complete(cfg, messages))
	}

	fn complete_json<'a>(
		&'a self,
		cfg: &'a GeneratorProviderConfig,
		messages: &'a [Value],
	) -> BoxFuture<'a, debrief_providers::Result<Value>> {
		Box::pin(generator::complete_json(cfg, messages))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, generator: Arc<dyn GeneratorProvider>) -> Self {
		Self { embedding, generator }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), generator: provider }
	}
}

impl MeetingIndex for MeetingStore {
	fn fetch<'a>(
		&'a self,
		meeting_id: &'a str,
	) -> BoxFuture<'a, debrief_storage::Result<Option<MeetingRecord>>> {
		Box::pin(self.fetch_meeting(meeting_id))
	}

	fn search<'a>(
		&'a self,
		vector: Vec<f32>,
		top_k: u32,
	) -> BoxFuture<'a, debrief_storage::Result<Vec<ScoredMeeting>>> {
		Box::pin(self.search_meetings(vector, top_k))
	}
}

/// Stateless per-request orchestrator: retrieve from the index, assemble a
/// prompt, call the generator, format the output. All durable state lives in
/// the external index.
pub struct DebriefService {
	pub cfg: Config,
	pub index: Arc<dyn MeetingIndex>,
	pub providers: Providers,
}

impl DebriefService {
	pub fn new(cfg: Config, store: MeetingStore) -> Self {
		Self { cfg, index: Arc::new(store), providers: Providers::default() }
	}

	pub fn with_index(cfg: Config, index: Arc<dyn MeetingIndex>, providers: Providers) -> Self {
		Self { cfg, index, providers }
	}

	/// Embeds a single text and checks the configured dimension.
	pub(crate) async fn embed_one(&self, text: &str) -> ServiceResult<Vec<f32>> {
		let texts = [text.to_string()];
		let vectors =
			self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(ServiceError::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
			return Err(ServiceError::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vector)
	}
}
