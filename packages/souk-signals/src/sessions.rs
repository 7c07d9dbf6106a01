use time::OffsetDateTime;

use souk_storage::models::Session;

use crate::{ServiceResult, SignalService};

impl SignalService {
	/// Look up a session by its external key, creating it on first contact.
	/// Total: a store failure yields a detached, unsaved session for the key
	/// so callers always have something structurally valid to work with.
	pub async fn get_or_create_session(&self, session_id: &str) -> Session {
		let now = OffsetDateTime::now_utc();

		match self.resolve_session(session_id, now).await {
			Ok(session) => session,
			Err(err) => {
				tracing::error!(
					error = %err,
					session_id,
					"Failed to get or create session; returning a detached session."
				);

				Session::started(session_id, now)
			},
		}
	}

	pub(crate) async fn resolve_session(
		&self,
		session_id: &str,
		now: OffsetDateTime,
	) -> ServiceResult<Session> {
		if let Some(session) = self.store.find_session(session_id).await? {
			return Ok(session);
		}

		let session = Session::started(session_id, now);

		Ok(self.store.create_session(&session).await?)
	}
}
