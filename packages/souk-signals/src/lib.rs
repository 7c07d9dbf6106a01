//! Session signal tracking and time-decayed weighting. Interaction writes
//! are fire-and-forget and the read paths degrade to empty defaults: no
//! operation here is ever allowed to be the reason a search request fails.

pub mod recent;
pub mod sessions;
pub mod track;
pub mod weights;

use std::{future::Future, pin::Pin, sync::Arc};

use uuid::Uuid;

use souk_config::Config;
use souk_storage::{
	db::Db,
	models::{Interaction, InteractionKind, Session},
	queries,
};

pub use weights::WeightProfile;

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type StoreResult<T> = Result<T, souk_storage::Error>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error("Storage error: {0}")]
	Storage(#[from] souk_storage::Error),
}

/// Repository seam over the session/interaction store. The engine never
/// builds queries itself; everything it needs from storage is one of these
/// six calls.
pub trait SessionStore
where
	Self: Send + Sync,
{
	fn find_session<'a>(&'a self, session_id: &'a str)
	-> BoxFuture<'a, StoreResult<Option<Session>>>;

	/// Insert-or-fetch: concurrent creation for the same unseen key must
	/// resolve to a single surviving row.
	fn create_session<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, StoreResult<Session>>;

	fn save_session<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, StoreResult<()>>;

	fn insert_interaction<'a>(
		&'a self,
		interaction: &'a Interaction,
	) -> BoxFuture<'a, StoreResult<()>>;

	fn session_interactions(
		&self,
		session_pk: Uuid,
		kind: Option<InteractionKind>,
		limit: Option<i64>,
	) -> BoxFuture<'_, StoreResult<Vec<Interaction>>>;

	fn interactions_by_kind(
		&self,
		kind: InteractionKind,
		limit: i64,
	) -> BoxFuture<'_, StoreResult<Vec<Interaction>>>;
}

/// Default store backed by Postgres.
pub struct PgSessionStore {
	pub db: Db,
}

impl SessionStore for PgSessionStore {
	fn find_session<'a>(
		&'a self,
		session_id: &'a str,
	) -> BoxFuture<'a, StoreResult<Option<Session>>> {
		Box::pin(queries::find_session(&self.db.pool, session_id))
	}

	fn create_session<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, StoreResult<Session>> {
		Box::pin(queries::upsert_session(&self.db.pool, session))
	}

	fn save_session<'a>(&'a self, session: &'a Session) -> BoxFuture<'a, StoreResult<()>> {
		Box::pin(queries::save_session(&self.db.pool, session))
	}

	fn insert_interaction<'a>(
		&'a self,
		interaction: &'a Interaction,
	) -> BoxFuture<'a, StoreResult<()>> {
		Box::pin(queries::insert_interaction(&self.db.pool, interaction))
	}

	fn session_interactions(
		&self,
		session_pk: Uuid,
		kind: Option<InteractionKind>,
		limit: Option<i64>,
	) -> BoxFuture<'_, StoreResult<Vec<Interaction>>> {
		Box::pin(queries::session_interactions(&self.db.pool, session_pk, kind, limit))
	}

	fn interactions_by_kind(
		&self,
		kind: InteractionKind,
		limit: i64,
	) -> BoxFuture<'_, StoreResult<Vec<Interaction>>> {
		Box::pin(queries::interactions_by_kind(&self.db.pool, kind, limit))
	}
}

pub struct SignalService {
	pub cfg: Config,
	pub store: Arc<dyn SessionStore>,
}

impl SignalService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, store: Arc::new(PgSessionStore { db }) }
	}

	pub fn with_store(cfg: Config, store: Arc<dyn SessionStore>) -> Self {
		Self { cfg, store }
	}
}
