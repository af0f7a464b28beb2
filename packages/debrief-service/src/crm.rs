use serde::{Deserialize, Serialize};
use serde_json::Value;

use debrief_storage::models::ScoredMeeting;

use crate::{DebriefService, ServiceError, ServiceResult};

pub const URGENCY_LEVELS: [&str; 3] = ["HIGH", "MEDIUM", "LOW"];

const SYSTEM_PROMPT: &str = "\
You are an expert at extracting structured CRM data from meeting notes.
Analyze the meeting notes and extract these fields:

1. Contact: name and job title or role
2. Company: company name
3. Deal Size: quantity (licenses, seats) and estimated value
4. Stage: sales stage (Discovery, Negotiation, Proposal, Closing)
5. Urgency: HIGH, MEDIUM, or LOW
6. Close Date: timeline or deadline mentioned
7. Pain Points: concerns or problems mentioned
8. Key Discussion: main topics or requirements discussed

Use null or empty values for information that is not present.
Return the data as a JSON object.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrmContact {
	pub name: Option<String>,
	pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrmDealSize {
	pub quantity: Option<String>,
	pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrmData {
	pub contact: CrmContact,
	pub company: Option<String>,
	pub deal_size: CrmDealSize,
	pub stage: String,
	pub urgency: String,
	pub close_date: Option<String>,
	pub pain_points: Vec<String>,
	pub key_discussion: Option<String>,
}

impl Default for CrmData {
	fn default() -> Self {
		Self {
			contact: CrmContact::default(),
			company: None,
			deal_size: CrmDealSize::default(),
			stage: "Discovery".to_string(),
			urgency: "MEDIUM".to_string(),
			close_date: None,
			pain_points: Vec::new(),
			key_discussion: None,
		}
	}
}

impl CrmData {
	/// Best-effort decode of whatever JSON the model produced. Missing or
	/// mistyped fields fall back to defaults instead of failing the request.
	pub fn from_model_output(value: &Value) -> Self {
		let defaults = Self::default();
		let contact = CrmContact {
			name: value.get("contact").and_then(|contact| opt_str(contact, "name")),
			title: value.get("contact").and_then(|contact| opt_str(contact, "title")),
		};
		let deal_size = match value.get("deal_size") {
			Some(deal) => CrmDealSize {
				quantity: opt_str(deal, "quantity"),
				value: opt_str(deal, "value"),
			},
			None => CrmDealSize::default(),
		};
		let urgency = match opt_str(value, "urgency").map(|raw| raw.to_uppercase()) {
			Some(raw) if URGENCY_LEVELS.contains(&raw.as_str()) => raw,
			_ => defaults.urgency.clone(),
		};
		let pain_points = value
			.get("pain_points")
			.and_then(Value::as_array)
			.map(|items| {
				items.iter().filter_map(Value::as_str).map(str::to_string).collect()
			})
			.unwrap_or_default();

		Self {
			contact,
			company: opt_str(value, "company"),
			deal_size,
			stage: opt_str(value, "stage").unwrap_or(defaults.stage),
			urgency,
			close_date: opt_str(value, "close_date"),
			pain_points,
			key_discussion: opt_str(value, "key_discussion"),
		}
	}
}

fn opt_str(value: &Value, field: &str) -> Option<String> {
	value
		.get(field)
		.and_then(Value::as_str)
		.map(|raw| raw.trim().to_string())
		.filter(|raw| !raw.is_empty())
}

#[derive(Debug, Serialize)]
pub struct CrmDataResponse {
	pub status: String,
	pub vector_id: String,
	pub data: CrmData,
	pub formatted: String,
}

pub(crate) fn build_messages(examples: &[ScoredMeeting], meeting_notes: &str) -> Vec<Value> {
	let mut context = String::new();

	for (i, meeting) in examples.iter().enumerate() {
		context.push_str(&format!("Example {}:\n{}\n", i + 1, meeting.record.text));

		if let Some(example) = &meeting.record.example {
			context.push_str(&format!("Example {} output:\n{}\n", i + 1, example));
		}

		context.push('\n');
	}

	if context.is_empty() {
		context.push_str("No similar meetings found.\n");
	}

	let user_prompt = format!(
		"\
Based on the following examples of similar meetings, extract CRM data from the new meeting notes below.

EXAMPLES OF SIMILAR MEETINGS:
{context}
NEW MEETING NOTES TO ANALYZE:
{meeting_notes}

Extract the CRM data in the following JSON format:
{{
    \"contact\": {{ \"name\": \"Full name\", \"title\": \"Job title or role\" }},
    \"company\": \"Company name\",
    \"deal_size\": {{ \"quantity\": \"e.g. 50 licenses\", \"value\": \"e.g. ~$50K\" }},
    \"stage\": \"Discovery/Negotiation/Proposal/Closing\",
    \"urgency\": \"HIGH/MEDIUM/LOW\",
    \"close_date\": \"Timeline or deadline\",
    \"pain_points\": [\"concern 1\", \"concern 2\"],
    \"key_discussion\": \"Main topics or requirements\"
}}"
	);

	vec![
		serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
		serde_json::json!({ "role": "user", "content": user_prompt }),
	]
}

pub fn format_crm_output(data: &CrmData) -> String {
	let mut out = Vec::new();

	out.push("CRM DATA:".to_string());
	out.push("=".repeat(50));

	if let Some(name) = &data.contact.name {
		let contact = match &data.contact.title {
			Some(title) => format!("{name}, {title}"),
			None => name.clone(),
		};

		out.push(format!("Contact: {contact}"));
	}
	if let Some(company) = &data.company {
		out.push(format!("Company: {company}"));
	}

	let deal = match (&data.deal_size.quantity, &data.deal_size.value) {
		(Some(quantity), Some(value)) => Some(format!("{quantity} ({value})")),
		(Some(quantity), None) => Some(quantity.clone()),
		(None, Some(value)) => Some(value.clone()),
		(None, None) => None,
	};

	if let Some(deal) = deal {
		out.push(format!("Deal Size: {deal}"));
	}

	out.push(format!("Stage: {}", data.stage));
	out.push(format!("Urgency: {}", data.urgency));

	if let Some(close_date) = &data.close_date {
		out.push(format!("Close Date: {close_date}"));
	}
	if !data.pain_points.is_empty() {
		out.push("Pain Points:".to_string());

		for point in &data.pain_points {
			out.push(format!("  - {point}"));
		}
	}
	if let Some(key_discussion) = &data.key_discussion {
		out.push(format!("Key Discussion: {key_discussion}"));
	}

	out.join("\n")
}

impl DebriefService {
	/// Fetch a stored meeting by identifier, retrieve similar meetings as
	/// few-shot examples, and extract structured CRM data from it.
	pub async fn extract_crm_data(&self, vector_id: &str) -> ServiceResult<CrmDataResponse> {
		let vector_id = vector_id.trim();

		if vector_id.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "vector_id is required.".to_string(),
			});
		}

		let Some(record) = self.index.fetch(vector_id).await? else {
			return Err(ServiceError::NotFound { meeting_id: vector_id.to_string() });
		};

		if record.text.trim().is_empty() {
			return Err(ServiceError::EmptyContext {
				message: format!("Meeting '{vector_id}' has no stored notes."),
			});
		}

		let vector = self.embed_one(&record.text).await?;
		let examples = self.index.search(vector, self.cfg.retrieval.crm_example_k).await?;
		let messages = build_messages(&examples, &record.text);
		// Malformed output degrades to defaults; only transport-level
		// failures surface as errors.
		let data = match self
			.providers
			.generator
			.complete_json(&self.cfg.providers.generator, &messages)
			.await
		{
			Ok(output) => CrmData::from_model_output(&output),
			Err(debrief_providers::Error::InvalidResponse { message }) => {
				tracing::warn!(%message, "Generator output did not parse; returning defaults.");

				CrmData::default()
			},
			Err(err) => return Err(err.into()),
		};
		let formatted = format_crm_output(&data);

		tracing::info!(meeting_id = %vector_id, examples = examples.len(), "Extracted CRM data.");

		Ok(CrmDataResponse {
			status: "success".to_string(),
			vector_id: vector_id.to_string(),
			data,
			formatted,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use debrief_storage::models::MeetingRecord;

	fn scored(text: &str, example: Option<Value>) -> ScoredMeeting {
		ScoredMeeting {
			record: MeetingRecord {
				meeting_id: "meeting-acme".to_string(),
				text: text.to_string(),
				filename: "ACME".to_string(),
				source: "meeting_notes".to_string(),
				example,
			},
			score: 0.91,
		}
	}

	#[test]
	fn decodes_complete_model_output() {
		let output = serde_json::json!({
			"contact": { "name": "Sarah Chen", "title": "VP Operations" },
			"company": "ACME Corp",
			"deal_size": { "quantity": "50 licenses", "value": "~$50K" },
			"stage": "Negotiation",
			"urgency": "high",
			"close_date": "Friday",
			"pain_points": ["Budget concerns", "Competitive pressure"],
			"key_discussion": "Salesforce integration"
		});
		let data = CrmData::from_model_output(&output);

		assert_eq!(data.contact.name.as_deref(), Some("Sarah Chen"));
		assert_eq!(data.company.as_deref(), Some("ACME Corp"));
		assert_eq!(data.urgency, "HIGH");
		assert_eq!(data.pain_points.len(), 2);
	}

	#[test]
	fn malformed_output_degrades_to_defaults() {
		let output = serde_json::json!({
			"urgency": "CRITICAL",
			"pain_points": "not a list",
			"contact": "not an object"
		});
		let data = CrmData::from_model_output(&output);

		assert_eq!(data.urgency, "MEDIUM");
		assert_eq!(data.stage, "Discovery");
		assert!(data.pain_points.is_empty());
		assert!(data.contact.name.is_none());
		assert!(data.company.is_none());
	}

	#[test]
	fn arbitrary_json_never_panics() {
		for output in [
			serde_json::json!(null),
			serde_json::json!([1, 2, 3]),
			serde_json::json!("just a string"),
			serde_json::json!({ "deal_size": 42 }),
		] {
			let data = CrmData::from_model_output(&output);

			assert_eq!(data.urgency, "MEDIUM");
		}
	}

	#[test]
	fn formatted_output_lists_present_fields() {
		let output = serde_json::json!({
			"contact": { "name": "Sarah Chen", "title": "VP Operations" },
			"company": "ACME Corp",
			"deal_size": { "quantity": "50 licenses", "value": "~$50K" },
			"stage": "Negotiation",
			"urgency": "HIGH",
			"pain_points": ["Budget concerns"]
		});
		let formatted = format_crm_output(&CrmData::from_model_output(&output));

		assert!(formatted.starts_with("CRM DATA:"));
		assert!(formatted.contains("Contact: Sarah Chen, VP Operations"));
		assert!(formatted.contains("Company: ACME Corp"));
		assert!(formatted.contains("Deal Size: 50 licenses (~$50K)"));
		assert!(formatted.contains("Urgency: HIGH"));
		assert!(formatted.contains("  - Budget concerns"));
		assert!(!formatted.contains("Close Date:"));
	}

	#[test]
	fn messages_carry_examples_and_target_notes() {
		let examples = vec![scored(
			"Met with Sarah Chen about 50 licenses.",
			Some(serde_json::json!({ "company": "ACME Corp" })),
		)];
		let messages = build_messages(&examples, "New meeting with BuildCo.");
		let user = messages[1]["content"].as_str().expect("user prompt missing");

		assert_eq!(messages.len(), 2);
		assert!(user.contains("Example 1:\nMet with Sarah Chen about 50 licenses."));
		assert!(user.contains("Example 1 output:"));
		assert!(user.contains("ACME Corp"));
		assert!(user.contains("New meeting with BuildCo."));
	}

	#[test]
	fn messages_note_when_no_examples_exist() {
		let messages = build_messages(&[], "New meeting with BuildCo.");
		let user = messages[1]["content"].as_str().expect("user prompt missing");

		assert!(user.contains("No similar meetings found."));
	}
}
