use qdrant_client::{
	Qdrant,
	client::Payload,
	qdrant::{
		CreateCollectionBuilder, Distance, GetPointsBuilder, PointStruct, Query,
		QueryPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
	},
};

use crate::{
	Result,
	models::{MeetingRecord, ScoredMeeting, point_id_for},
};

pub struct MeetingStore {
	pub client: Qdrant,
	pub collection: String,
	pub vector_dim: u32,
}
impl MeetingStore {
	pub fn new(cfg: &debrief_config::Qdrant) -> Result<Self> {
		let client = Qdrant::from_url(&cfg.url).build()?;

		Ok(Self { client, collection: cfg.collection.clone(), vector_dim: cfg.vector_dim })
	}

	pub async fn ensure_collection(&self) -> Result<()> {
		if self.client.collection_exists(&self.collection).await? {
			return Ok(());
		}

		self.client
			.create_collection(
				CreateCollectionBuilder::new(&self.collection).vectors_config(
					VectorParamsBuilder::new(self.vector_dim as u64, Distance::Cosine),
				),
			)
			.await?;

		tracing::info!(collection = %self.collection, dim = self.vector_dim, "Created Qdrant collection.");

		Ok(())
	}

	/// Insert-or-overwrite, keyed by the record's identifier.
	pub async fn upsert_meeting(&self, record: &MeetingRecord, vector: Vec<f32>) -> Result<()> {
		let payload = Payload::from(record.to_payload()?);
		let point =
			PointStruct::new(point_id_for(&record.meeting_id).to_string(), vector, payload);
		let upsert = UpsertPointsBuilder::new(self.collection.clone(), vec![point]).wait(true);

		self.client.upsert_points(upsert).await?;

		Ok(())
	}

	pub async fn fetch_meeting(&self, meeting_id: &str) -> Result<Option<MeetingRecord>> {
		let get = GetPointsBuilder::new(
			self.collection.clone(),
			vec![point_id_for(meeting_id).to_string().into()],
		)
		.with_payload(true);
		let response = self.client.get_points(get).await?;
		let Some(point) = response.result.into_iter().next() else {
			return Ok(None);
		};

		Ok(Some(MeetingRecord::from_payload(&point.payload)?))
	}

	/// Top-K nearest neighbors by cosine similarity, best first. Ordering is
	/// whatever the index returns; no re-ranking happens here.
	pub async fn search_meetings(
		&self,
		vector: Vec<f32>,
		top_k: u32,
	) -> Result<Vec<ScoredMeeting>> {
		let query = QueryPointsBuilder::new(self.collection.clone())
			.query(Query::new_nearest(vector))
			.limit(top_k as u64)
			.with_payload(true);
		let response = self.client.query(query).await?;
		let mut out = Vec::with_capacity(response.result.len());

		for point in response.result {
			let record = MeetingRecord::from_payload(&point.payload)?;

			out.push(ScoredMeeting { record, score: point.score });
		}

		Ok(out)
	}
}
