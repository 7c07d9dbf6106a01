//! Test support for the session signal engine: hermetic in-memory and
//! always-failing `SessionStore` implementations, plus a disposable
//! live-Postgres database harness for the `#[ignore]`d storage smoke tests.

mod error;
mod pg;

pub use error::{Error, Result};
pub use pg::{TestDatabase, env_dsn};

use std::sync::Mutex;

use uuid::Uuid;

use souk_signals::{BoxFuture, SessionStore, StoreResult};
use souk_storage::models::{Interaction, InteractionKind, Session};

#[derive(Default)]
struct MemoryState {
	sessions: Vec<Session>,
	interactions: Vec<(u64, Interaction)>,
	next_seq: u64,
}

/// In-memory `SessionStore` with the same upsert, ordering, and limit
/// semantics as the Postgres store.
#[derive(Default)]
pub struct MemorySessionStore {
	state: Mutex<MemoryState>,
}

impl MemorySessionStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Insert an interaction directly, bypassing the service write path.
	/// Lets tests control timestamps for decay assertions.
	pub fn seed_interaction(&self, interaction: Interaction) {
		let mut state = self.lock();
		let seq = state.next_seq;

		state.next_seq += 1;
		state.interactions.push((seq, interaction));
	}

	pub fn session_count(&self) -> usize {
		self.lock().sessions.len()
	}

	pub fn interaction_count(&self) -> usize {
		self.lock().interactions.len()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
		self.state.lock().unwrap_or_else(|err| err.into_inner())
	}
}

impl SessionStore for MemorySessionStore {
	fn find_session<'a>(
		&'a self,
		session_id: &'a str,
	) -> BoxFuture<'a, StoreResult<Option<Session>>> {
		let found = self
			.lock()
			.sessions
			.iter()
			.find(|session| session.session_id == session_id)
			.cloned();

		Box::pin(async move { Ok(found) })
	}

	fn create_session<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, StoreResult<Session>> {
		let stored = {
			let mut state = self.lock();
			let existing = state
				.sessions
				.iter()
				.position(|existing| existing.session_id == session.session_id);

			match existing {
				Some(index) => state.sessions[index].clone(),
				None => {
					state.sessions.push(session.clone());

					session.clone()
				},
			}
		};

		Box::pin(async move { Ok(stored) })
	}

	fn save_session<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, StoreResult<()>> {
		{
			let mut state = self.lock();
			let existing = state.sessions.iter().position(|existing| existing.id == session.id);

			match existing {
				Some(index) => state.sessions[index] = session.clone(),
				None => state.sessions.push(session.clone()),
			}
		}

		Box::pin(async move { Ok(()) })
	}

	fn insert_interaction<'a>(
		&'a self,
		interaction: &'a Interaction,
	) -> BoxFuture<'a, StoreResult<()>> {
		self.seed_interaction(interaction.clone());

		Box::pin(async move { Ok(()) })
	}

	fn session_interactions(
		&self,
		session_pk: Uuid,
		kind: Option<InteractionKind>,
		limit: Option<i64>,
	) -> BoxFuture<'_, StoreResult<Vec<Interaction>>> {
		let mut matched: Vec<(u64, Interaction)> = self
			.lock()
			.interactions
			.iter()
			.filter(|(_, interaction)| interaction.session_id == session_pk)
			.filter(|(_, interaction)| kind.map(|kind| interaction.kind == kind).unwrap_or(true))
			.cloned()
			.collect();

		matched.sort_by(|(seq_a, a), (seq_b, b)| {
			b.timestamp.cmp(&a.timestamp).then(seq_b.cmp(seq_a))
		});

		if let Some(limit) = limit {
			matched.truncate(limit.max(0) as usize);
		}

		let interactions = matched.into_iter().map(|(_, interaction)| interaction).collect();

		Box::pin(async move { Ok(interactions) })
	}

	fn interactions_by_kind(
		&self,
		kind: InteractionKind,
		limit: i64,
	) -> BoxFuture<'_, StoreResult<Vec<Interaction>>> {
		let mut matched: Vec<(u64, Interaction)> = self
			.lock()
			.interactions
			.iter()
			.filter(|(_, interaction)| interaction.kind == kind)
			.cloned()
			.collect();

		matched.sort_by(|(seq_a, a), (seq_b, b)| {
			b.timestamp.cmp(&a.timestamp).then(seq_b.cmp(seq_a))
		});
		matched.truncate(limit.max(0) as usize);

		let interactions = matched.into_iter().map(|(_, interaction)| interaction).collect();

		Box::pin(async move { Ok(interactions) })
	}
}

/// A store whose every call fails, for exercising the degraded paths.
pub struct FailingSessionStore;

fn unavailable<T>() -> StoreResult<T> {
	Err(souk_storage::Error::Unavailable("Session store offline.".to_string()))
}

impl SessionStore for FailingSessionStore {
	fn find_session<'a>(
		&'a self,
		_session_id: &'a str,
	) -> BoxFuture<'a, StoreResult<Option<Session>>> {
		Box::pin(async { unavailable() })
	}

	fn create_session<'a>(&'a self, _session: &'a Session) -> BoxFuture<'a, StoreResult<Session>> {
		Box::pin(async { unavailable() })
	}

	fn save_session<'a>(&'a self, _session: &'a Session) -> BoxFuture<'a, StoreResult<()>> {
		Box::pin(async { unavailable() })
	}

	fn insert_interaction<'a>(
		&'a self,
		_interaction: &'a Interaction,
	) -> BoxFuture<'a, StoreResult<()>> {
		Box::pin(async { unavailable() })
	}

	fn session_interactions(
		&self,
		_session_pk: Uuid,
		_kind: Option<InteractionKind>,
		_limit: Option<i64>,
	) -> BoxFuture<'_, StoreResult<Vec<Interaction>>> {
		Box::pin(async { unavailable() })
	}

	fn interactions_by_kind(
		&self,
		_kind: InteractionKind,
		_limit: i64,
	) -> BoxFuture<'_, StoreResult<Vec<Interaction>>> {
		Box::pin(async { unavailable() })
	}
}
