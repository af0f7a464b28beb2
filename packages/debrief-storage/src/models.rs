use std::collections::HashMap;

use qdrant_client::qdrant::{Value, value::Kind};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::{Error, Result};

/// One indexed meeting. The identifier is the caller-facing key
/// (e.g. `meeting-acme`); the Qdrant point ID is derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingRecord {
	pub meeting_id: String,
	pub text: String,
	pub filename: String,
	pub source: String,
	/// Optional pre-computed example output, carried as few-shot context.
	pub example: Option<JsonValue>,
}

#[derive(Debug, Clone)]
pub struct ScoredMeeting {
	pub record: MeetingRecord,
	pub score: f32,
}

/// Qdrant point IDs must be UUIDs or integers, so string identifiers map to
/// a deterministic UUIDv5 digest. Re-indexing the same identifier overwrites
/// the same point.
pub fn point_id_for(meeting_id: &str) -> Uuid {
	Uuid::new_v5(&Uuid::NAMESPACE_OID, meeting_id.as_bytes())
}

impl MeetingRecord {
	pub fn to_payload(&self) -> Result<HashMap<String, Value>> {
		let mut payload = HashMap::new();

		payload.insert("meeting_id".to_string(), Value::from(self.meeting_id.clone()));
		payload.insert("text".to_string(), Value::from(self.text.clone()));
		payload.insert("filename".to_string(), Value::from(self.filename.clone()));
		payload.insert("source".to_string(), Value::from(self.source.clone()));

		if let Some(example) = &self.example {
			payload
				.insert("example_json".to_string(), Value::from(serde_json::to_string(example)?));
		}

		Ok(payload)
	}

	pub fn from_payload(payload: &HashMap<String, Value>) -> Result<Self> {
		let meeting_id = required_str(payload, "meeting_id")?;
		let text = required_str(payload, "text")?;
		let filename = payload_str(payload, "filename").unwrap_or_default();
		let source = payload_str(payload, "source").unwrap_or_default();
		let example = match payload_str(payload, "example_json") {
			Some(raw) => Some(serde_json::from_str(&raw)?),
			None => None,
		};

		Ok(Self { meeting_id, text, filename, source, example })
	}
}

fn payload_str(payload: &HashMap<String, Value>, field: &str) -> Option<String> {
	payload.get(field).and_then(|value| match &value.kind {
		Some(Kind::StringValue(text)) => Some(text.clone()),
		_ => None,
	})
}

fn required_str(payload: &HashMap<String, Value>, field: &str) -> Result<String> {
	payload_str(payload, field)
		.ok_or_else(|| Error::MalformedPayload(format!("missing string field '{field}'")))
}
