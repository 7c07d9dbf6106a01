use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use souk_storage::models::{Interaction, InteractionData, Session, ViewTarget};

use crate::{ServiceResult, SignalService};

impl SignalService {
	/// Append an interaction to a session's history and touch its activity
	/// time. Fire-and-forget: a tracking failure is logged and swallowed so it
	/// can never break the user-facing action that triggered it.
	pub async fn track_interaction(
		&self,
		session_id: &str,
		data: InteractionData,
		duration_ms: Option<i64>,
	) {
		let now = OffsetDateTime::now_utc();

		if let Err(err) = self.record_interaction(session_id, data, duration_ms, now).await {
			tracing::error!(error = %err, session_id, "Failed to track interaction.");
		}
	}

	async fn record_interaction(
		&self,
		session_id: &str,
		data: InteractionData,
		duration_ms: Option<i64>,
		now: OffsetDateTime,
	) -> ServiceResult<()> {
		let mut session = self.resolve_session(session_id, now).await?;
		let interaction = Interaction {
			id: Uuid::new_v4(),
			session_id: session.id,
			kind: data.kind(),
			data: data.payload(),
			duration_ms,
			timestamp: now,
			created_at: now,
		};

		self.store.insert_interaction(&interaction).await?;

		session.last_activity_time = now;

		append_session_signal(&mut session, &data);

		self.store.save_session(&session).await?;

		Ok(())
	}
}

/// Mirror the interaction into the session's denormalized convenience lists.
/// Append-only and informational; scoring never reads these.
fn append_session_signal(session: &mut Session, data: &InteractionData) {
	match data {
		InteractionData::Search { query } => session.search_queries.push(query.clone()),
		InteractionData::Click { result_id } => session.clicked_results.push(result_id.clone()),
		InteractionData::View(ViewTarget::Category { category_id }) =>
			session.viewed_categories.push(category_id.clone()),
		InteractionData::View(ViewTarget::Brand { brand_id }) =>
			session.viewed_brands.push(brand_id.clone()),
		InteractionData::Filter { filter_type, filter_value } => session
			.filters
			.push(json!({ "filterType": filter_type, "filterValue": filter_value })),
		InteractionData::Sort(_)
		| InteractionData::Impression { .. }
		| InteractionData::Dwell { .. }
		| InteractionData::AddToCart(_)
		| InteractionData::Purchase(_) => {},
	}
}
