pub mod ingest;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre;
use tracing_subscriber::EnvFilter;

use debrief_providers::embedding;
use debrief_storage::{models::MeetingRecord, qdrant::MeetingStore};

#[derive(Debug, Parser)]
#[command(
	version = debrief_cli::VERSION,
	rename_all = "kebab",
	styles = debrief_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Overrides `indexer.data_dir` from the config file.
	#[arg(long, value_name = "DIR")]
	pub data_dir: Option<PathBuf>,
}

/// Populates the external index from the sample data directory. Sequential
/// and batch-style: the first embedding or upsert failure aborts the run,
/// leaving any already-written points in place.
pub async fn run(args: Args) -> color_eyre::Result<()> {
	let config = debrief_config::load(&args.config)?;
	init_tracing(&config)?;

	let data_dir = args.data_dir.unwrap_or_else(|| config.indexer.data_dir.clone());
	let notes = ingest::read_meeting_notes(&data_dir)?;

	if notes.is_empty() {
		tracing::warn!(data_dir = %data_dir.display(), "No meeting note files found.");

		return Ok(());
	}

	let store = MeetingStore::new(&config.storage.qdrant)?;

	store.ensure_collection().await?;

	for note in &notes {
		let meeting_id = ingest::meeting_id_for(&config.indexer.id_prefix, &note.name);

		tracing::info!(meeting_id = %meeting_id, chars = note.text.len(), "Indexing meeting note.");

		let texts = [note.text.clone()];
		let vectors = embedding::embed(&config.providers.embedding, &texts).await?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(eyre::eyre!("Embedding provider returned no vectors for {meeting_id}."));
		};

		if vector.len() != config.storage.qdrant.vector_dim as usize {
			return Err(eyre::eyre!(
				"Embedding dimension {} does not match configured vector_dim {}.",
				vector.len(),
				config.storage.qdrant.vector_dim
			));
		}

		let record = MeetingRecord {
			meeting_id,
			text: note.text.clone(),
			filename: note.name.clone(),
			source: "meeting_notes".to_string(),
			example: note.example.clone(),
		};

		store.upsert_meeting(&record, vector).await?;
	}

	tracing::info!(count = notes.len(), "Index population complete.");

	Ok(())
}

fn init_tracing(config: &debrief_config::Config) -> color_eyre::Result<()> {
	let filter =
		EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
	tracing_subscriber::fmt().with_env_filter(filter).init();
	Ok(())
}
