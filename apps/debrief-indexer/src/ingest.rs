use std::{fs, path::Path};

use color_eyre::{Result, eyre};
use serde_json::Value;

/// One meeting note read from disk, plus its optional example-output sidecar
/// (`<stem>.json` next to `<stem>.txt`).
#[derive(Debug, Clone)]
pub struct SourceNote {
	pub name: String,
	pub text: String,
	pub example: Option<Value>,
}

pub fn meeting_id_for(prefix: &str, name: &str) -> String {
	format!("{prefix}-{}", name.to_lowercase())
}

/// Reads every `*.txt` file in the data directory, sorted by file stem so
/// repeated runs process the corpus in the same order.
pub fn read_meeting_notes(data_dir: &Path) -> Result<Vec<SourceNote>> {
	if !data_dir.is_dir() {
		return Err(eyre::eyre!("Data directory {:?} does not exist.", data_dir));
	}

	let mut notes = Vec::new();

	for entry in fs::read_dir(data_dir)? {
		let path = entry?.path();

		if path.extension().and_then(|ext| ext.to_str()) != Some("txt") {
			continue;
		}

		let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
			continue;
		};
		let text = fs::read_to_string(&path)?.trim().to_string();

		if text.is_empty() {
			tracing::warn!(file = %path.display(), "Skipping empty meeting note file.");

			continue;
		}

		let example = read_example(data_dir, name)?;

		notes.push(SourceNote { name: name.to_string(), text, example });
	}

	notes.sort_by(|a, b| a.name.cmp(&b.name));

	Ok(notes)
}

fn read_example(data_dir: &Path, name: &str) -> Result<Option<Value>> {
	let path = data_dir.join(format!("{name}.json"));

	if !path.is_file() {
		return Ok(None);
	}

	let raw = fs::read_to_string(&path)?;
	let value = serde_json::from_str(&raw)
		.map_err(|err| eyre::eyre!("Example file {:?} is not valid JSON: {err}.", path))?;

	Ok(Some(value))
}

#[cfg(test)]
mod tests {
	use super::*;

	use std::{
		env,
		path::PathBuf,
		sync::atomic::{AtomicU64, Ordering},
		time::{SystemTime, UNIX_EPOCH},
	};

	fn temp_data_dir() -> PathBuf {
		static COUNTER: AtomicU64 = AtomicU64::new(0);

		let nanos = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.expect("System time must be valid.")
			.as_nanos();
		let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
		let pid = std::process::id();
		let mut path = env::temp_dir();

		path.push(format!("debrief_ingest_test_{nanos}_{pid}_{ordinal}"));

		fs::create_dir_all(&path).expect("Failed to create temp data dir.");

		path
	}

	#[test]
	fn derives_lowercase_prefixed_ids() {
		assert_eq!(meeting_id_for("meeting", "ACME"), "meeting-acme");
		assert_eq!(meeting_id_for("meeting", "DataFlow"), "meeting-dataflow");
	}

	#[test]
	fn reads_txt_files_sorted_with_sidecar_examples() {
		let dir = temp_data_dir();

		fs::write(dir.join("TECHSTART.txt"), "Demo for Mike Patterson.\n").unwrap();
		fs::write(dir.join("ACME.txt"), "  Quote due Friday.  \n").unwrap();
		fs::write(dir.join("ACME.json"), "{\"company\": \"ACME Corp\"}").unwrap();
		fs::write(dir.join("notes.md"), "not a meeting note").unwrap();

		let notes = read_meeting_notes(&dir).expect("Failed to read notes.");

		fs::remove_dir_all(&dir).expect("Failed to remove temp data dir.");

		assert_eq!(notes.len(), 2);
		assert_eq!(notes[0].name, "ACME");
		assert_eq!(notes[0].text, "Quote due Friday.");
		assert_eq!(notes[0].example, Some(serde_json::json!({ "company": "ACME Corp" })));
		assert_eq!(notes[1].name, "TECHSTART");
		assert!(notes[1].example.is_none());
	}

	#[test]
	fn skips_empty_note_files() {
		let dir = temp_data_dir();

		fs::write(dir.join("EMPTY.txt"), "   \n").unwrap();
		fs::write(dir.join("ACME.txt"), "Quote due Friday.\n").unwrap();

		let notes = read_meeting_notes(&dir).expect("Failed to read notes.");

		fs::remove_dir_all(&dir).expect("Failed to remove temp data dir.");

		assert_eq!(notes.len(), 1);
		assert_eq!(notes[0].name, "ACME");
	}

	#[test]
	fn missing_directory_is_an_error() {
		let mut dir = env::temp_dir();

		dir.push("debrief_ingest_test_missing_dir");

		assert!(read_meeting_notes(&dir).is_err());
	}

	#[test]
	fn invalid_sidecar_json_is_an_error() {
		let dir = temp_data_dir();

		fs::write(dir.join("ACME.txt"), "Quote due Friday.\n").unwrap();
		fs::write(dir.join("ACME.json"), "{not json").unwrap();

		let result = read_meeting_notes(&dir);

		fs::remove_dir_all(&dir).expect("Failed to remove temp data dir.");

		assert!(result.is_err());
	}
}
