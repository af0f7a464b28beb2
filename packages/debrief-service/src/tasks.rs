use serde::Serialize;

use debrief_storage::models::ScoredMeeting;

use crate::{DebriefService, ServiceResult};

const SYSTEM_PROMPT: &str = "\
You are an expert at extracting and prioritizing action items from sales meetings.

Your job:
1. Read through ALL provided meetings
2. Extract every action item or task mentioned
3. Identify which company each task is for (the meeting header names the source file)
4. Categorize by urgency:
   - HIGH: due this week, critical deadlines, urgent follow-ups
   - MEDIUM: due next week, important but not urgent
   - LOW: ongoing tasks, long-term items
5. Sort by deadline within each priority level

Output exactly in this format:

HIGH PRIORITY (This Week)
├─ Task: [Description] - [Company Name]
│  ├─ Deadline: [When]
│  ├─ Owner: [Who]
│  └─ Details: [Context]

MEDIUM PRIORITY (Next Week)
└─ Task: [Description] - [Company Name]
   ├─ Deadline: [When]
   └─ Owner: [Who]

LOW PRIORITY (Ongoing)
└─ Task: [Description] - [Company Name]
   └─ Owner: [Who]

Always include the company name with each task.";

#[derive(Debug, Serialize)]
pub struct TaskDataResponse {
	pub status: String,
	pub tasks: String,
	pub meetings_analyzed: usize,
	pub formatted_output: String,
}

// Blank or whitespace-only notes are treated the same as no notes at all.
pub(crate) fn normalized_notes(notes: Option<&str>) -> Option<&str> {
	notes.map(str::trim).filter(|trimmed| !trimmed.is_empty())
}

pub(crate) fn build_context(meetings: &[ScoredMeeting], new_notes: Option<&str>) -> String {
	let mut parts = Vec::with_capacity(meetings.len() + 1);

	for (i, meeting) in meetings.iter().enumerate() {
		parts.push(format!(
			"--- Meeting {} [{}] (Score: {:.3}) ---\n{}\n",
			i + 1,
			meeting.record.filename,
			meeting.score,
			meeting.record.text
		));
	}

	if let Some(notes) = new_notes {
		parts.push(format!("--- NEW MEETING (NOT YET INDEXED) ---\n{notes}\n"));
	}

	parts.join("\n")
}

pub fn format_task_output(meetings_analyzed: usize, tasks: &str) -> String {
	let rule = "=".repeat(70);

	format!(
		"TASK PRIORITY LIST\n{rule}\nMeetings Analyzed: {meetings_analyzed}\n{rule}\n\n{tasks}"
	)
}

impl DebriefService {
	/// Retrieves the indexed corpus with a broad fixed query and asks the
	/// generator for a prioritized task list across all of it. A supplied
	/// new note joins the prompt as ephemeral context; it is never written
	/// to the index. Latency grows with corpus size, by design.
	pub async fn prioritize_tasks(
		&self,
		meeting_notes: Option<&str>,
	) -> ServiceResult<TaskDataResponse> {
		let new_notes = normalized_notes(meeting_notes);
		let vector = self.embed_one(&self.cfg.retrieval.task_query).await?;
		let meetings = self.index.search(vector, self.cfg.retrieval.task_top_k).await?;
		let meetings_analyzed = meetings.len();
		let context = build_context(&meetings, new_notes);
		let messages = vec![
			serde_json::json!({ "role": "system", "content": SYSTEM_PROMPT }),
			serde_json::json!({ "role": "user", "content": format!("Extract all tasks:\n\n{context}") }),
		];
		let tasks = self
			.providers
			.generator
			.complete(&self.cfg.providers.generator, &messages)
			.await?;
		let formatted_output = format_task_output(meetings_analyzed, &tasks);

		tracing::info!(
			meetings_analyzed,
			new_note = new_notes.is_some(),
			"Extracted task priorities."
		);

		Ok(TaskDataResponse {
			status: "success".to_string(),
			tasks,
			meetings_analyzed,
			formatted_output,
		})
	}
}
