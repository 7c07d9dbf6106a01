use souk_storage::models::{Interaction, InteractionKind};

use crate::{ServiceResult, SignalService};

impl SignalService {
	/// The most recent interactions for a session, newest first, optionally
	/// filtered to one kind. Degrades to an empty list on any failure; an
	/// unknown session reads as empty without being created.
	pub async fn recent_interactions(
		&self,
		session_id: &str,
		kind: Option<InteractionKind>,
		limit: Option<u32>,
	) -> Vec<Interaction> {
		let limit = limit.unwrap_or(self.cfg.signals.default_recent_limit);

		match self.load_recent(session_id, kind, limit).await {
			Ok(interactions) => interactions,
			Err(err) => {
				tracing::warn!(error = %err, session_id, "Failed to load recent interactions.");

				Vec::new()
			},
		}
	}

	/// The most recent interactions of one kind across all sessions. A
	/// debugging/analytics read; degrades to empty like the per-session path.
	pub async fn interactions_by_kind(
		&self,
		kind: InteractionKind,
		limit: Option<u32>,
	) -> Vec<Interaction> {
		let limit = limit.unwrap_or(self.cfg.signals.kind_scan_limit);

		match self.store.interactions_by_kind(kind, i64::from(limit)).await {
			Ok(interactions) => interactions,
			Err(err) => {
				tracing::warn!(
					error = %err,
					kind = kind.as_str(),
					"Failed to load interactions by kind."
				);

				Vec::new()
			},
		}
	}

	async fn load_recent(
		&self,
		session_id: &str,
		kind: Option<InteractionKind>,
		limit: u32,
	) -> ServiceResult<Vec<Interaction>> {
		let Some(session) = self.store.find_session(session_id).await? else {
			return Ok(Vec::new());
		};

		Ok(self.store.session_interactions(session.id, kind, Some(i64::from(limit))).await?)
	}
}
