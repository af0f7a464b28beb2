use serde::Serialize;

use debrief_storage::models::ScoredMeeting;

use crate::{DebriefService, ServiceError, ServiceResult};

const SYSTEM_PROMPT: &str = "\
You are a helpful assistant that answers questions based ONLY on the provided meeting notes.
Rules:
- Answer from the provided context alone
- If the answer is not in the meetings, say \"I don't have that information\"
- Be concise and direct
- Cite specific companies and names when relevant";

#[derive(Debug, Serialize)]
pub struct QuestionAnswerResponse {
	pub status: String,
	pub question: String,
	pub answer: String,
	pub meetings_used: usize,
	pub formatted_output: String,
}

pub(crate) fn build_context(meetings: &[ScoredMeeting]) -> String {
	meetings
		.iter()
		.map(|meeting| format!("--- {} ---\n{}\n", meeting.record.filename, meeting.record.text))
		.collect::<Vec<_>>()
		.join("\n")
}

pub fn format_qa_output(question: &str, answer: &str, meetings_used: usize) -> String {
	let rule = "=".repeat(70);
	let divider = "-".repeat(70);

	format!(
		"QUESTION & ANSWER\n{rule}\nQ: {question}\n{divider}\nA: {answer}\n{rule}\nBased on {meetings_used} relevant meetings"
	)
}

impl DebriefService {
	/// Answers a free-text question grounded in the top-K most similar
	/// indexed meetings. Zero retrieval results fail the request rather than
	/// letting the model answer from nothing.
	pub async fn answer_question(&self, question: &str) -> ServiceResult<QuestionAnswerResponse> {
		let question = question.trim();

		if question.is_empty() {
			return Err(ServiceError::InvalidRequest {
				message: "question must be non-empty.".to_string(),
			});
		}

		let vector = self.embed_one(question).await?;
		let meetings = self.index.search(vector, self.cfg.retrieval.question_top_k).await?;

		if meetings.is_empty() {
			return Err(ServiceError::EmptyContext {
				message: "No indexed meetings matched the question.".to_string(),
			});
		}

		let context = build_context(&meetings);
		let user_prompt = format!("Context from meetings:\n{context}\n\nQuestion: {question}");
		let messages = vec![
			serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
			serde_json::json!({ "role": "user", "content": user_prompt }),
		];
		let answer = self
			.providers
			.generator
			.complete(&self.cfg.providers.generator, &messages)
			.await?;
		let meetings_used = meetings.len();
		let formatted_output = format_qa_output(question, &answer, meetings_used);

		tracing::info!(meetings_used, "Answered question from meeting context.");

		Ok(QuestionAnswerResponse {
			status: "success".to_string(),
			question: question.to_string(),
			answer,
			meetings_used,
			formatted_output,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	use debrief_storage::models::MeetingRecord;

	fn scored(filename: &str, text: &str) -> ScoredMeeting {
		ScoredMeeting {
			record: MeetingRecord {
				meeting_id: format!("meeting-{}", filename.to_lowercase()),
				text: text.to_string(),
				filename: filename.to_string(),
				source: "meeting_notes".to_string(),
				example: None,
			},
			score: 0.8,
		}
	}

	#[test]
	fn context_labels_each_meeting_by_filename() {
		let meetings = vec![
			scored("ACME", "Sarah Chen is our contact."),
			scored("DATAFLOW", "Marcus Johnson wants a pilot."),
		];
		let context = build_context(&meetings);

		assert!(context.contains("--- ACME ---\nSarah Chen is our contact."));
		assert!(context.contains("--- DATAFLOW ---\nMarcus Johnson wants a pilot."));
	}

	#[test]
	fn formatted_output_shows_question_answer_and_count() {
		let formatted =
			format_qa_output("Who is our contact at ACME Corp?", "Sarah Chen, VP Operations.", 5);

		assert!(formatted.starts_with("QUESTION & ANSWER\n"));
		assert!(formatted.contains("Q: Who is our contact at ACME Corp?"));
		assert!(formatted.contains("A: Sarah Chen, VP Operations."));
		assert!(formatted.ends_with("Based on 5 relevant meetings"));
	}
}
