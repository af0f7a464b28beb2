use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use debrief_config::Config;

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse test config.")
}

fn write_temp_config(payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("debrief_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

#[test]
fn sample_config_is_valid() {
	let cfg = base_config();

	assert!(debrief_config::validate(&cfg).is_ok());
}

#[test]
fn load_rejects_unreadable_path() {
	let mut path = env::temp_dir();

	path.push("debrief_config_test_missing.toml");

	let err = debrief_config::load(&path).expect_err("Expected read error for missing file.");

	assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn load_parses_and_validates_a_file() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML);
	let result = debrief_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected sample config to load.");

	assert_eq!(cfg.storage.qdrant.collection, "meeting-notes");
	assert_eq!(cfg.retrieval.question_top_k, 5);
}

#[test]
fn embedding_dimensions_must_match_vector_dim() {
	let mut cfg = base_config();

	cfg.providers.embedding.dimensions = 8;

	let err = debrief_config::validate(&cfg).expect_err("Expected dimension validation error.");

	assert!(
		err.to_string()
			.contains("providers.embedding.dimensions must match storage.qdrant.vector_dim."),
		"Unexpected error: {err}"
	);
}

#[test]
fn embedding_dimensions_must_be_positive() {
	let mut cfg = base_config();

	cfg.providers.embedding.dimensions = 0;
	cfg.storage.qdrant.vector_dim = 0;

	let err = debrief_config::validate(&cfg).expect_err("Expected vector_dim validation error.");

	assert!(
		err.to_string().contains("storage.qdrant.vector_dim must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn api_keys_must_be_non_empty() {
	let mut cfg = base_config();

	cfg.providers.generator.api_key = "   ".to_string();

	let err = debrief_config::validate(&cfg).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string().contains("Provider generator api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn retrieval_counts_must_be_positive() {
	let mut cfg = base_config();

	cfg.retrieval.question_top_k = 0;

	let err = debrief_config::validate(&cfg).expect_err("Expected top_k validation error.");

	assert!(
		err.to_string().contains("retrieval.question_top_k must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn task_query_cannot_be_blank() {
	let mut cfg = base_config();

	cfg.retrieval.task_query = " ".to_string();

	let err = debrief_config::validate(&cfg).expect_err("Expected task_query validation error.");

	assert!(
		err.to_string().contains("retrieval.task_query must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn generator_temperature_must_be_in_range() {
	let mut cfg = base_config();

	cfg.providers.generator.temperature = 2.5;

	let err = debrief_config::validate(&cfg).expect_err("Expected temperature validation error.");

	assert!(
		err.to_string()
			.contains("providers.generator.temperature must be in the range 0.0-2.0."),
		"Unexpected error: {err}"
	);
}

#[test]
fn debrief_example_toml_is_valid() {
	let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

	path.push("../../debrief.example.toml");

	debrief_config::load(&path).expect("Expected debrief.example.toml to be a valid config.");
}
