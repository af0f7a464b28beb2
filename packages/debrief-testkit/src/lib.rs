mod error;

pub use error::{Error, Result};

use std::{env, time::Duration};

use qdrant_client::Qdrant;
use tokio::time;
use uuid::Uuid;

pub fn env_qdrant_url() -> Option<String> {
	env::var("DEBRIEF_QDRANT_URL").ok()
}

/// A uniquely named Qdrant collection for one test. Call [`cleanup`] at the
/// end of the test; deletion retries with backoff because a freshly written
/// collection can briefly refuse deletes.
///
/// [`cleanup`]: TestCollection::cleanup
pub struct TestCollection {
	name: String,
}
impl TestCollection {
	pub fn new(prefix: &str) -> Self {
		Self { name: format!("{prefix}_{}", Uuid::new_v4().simple()) }
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub async fn cleanup(self, qdrant_url: &str) -> Result<()> {
		let client = Qdrant::from_url(qdrant_url).build()?;
		let max_attempts = 5;
		let mut backoff = Duration::from_millis(100);

		for attempt in 1..=max_attempts {
			let result = time::timeout(
				Duration::from_secs(10),
				client.delete_collection(self.name.clone()),
			)
			.await;

			match result {
				Ok(Ok(_)) => return Ok(()),
				Ok(Err(err)) =>
					if attempt == max_attempts {
						return Err(Error::Message(format!(
							"Failed to delete Qdrant collection {:?} after {attempt} attempts: {err}.",
							self.name
						)));
					},
				Err(_) =>
					if attempt == max_attempts {
						return Err(Error::Message(format!(
							"Timed out deleting Qdrant collection {:?} after {attempt} attempts.",
							self.name
						)));
					},
			}

			time::sleep(backoff).await;

			backoff = backoff.saturating_mul(2).min(Duration::from_secs(2));
		}

		Ok(())
	}
}
