use serde_json::Value;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
	Error, Result,
	models::{Interaction, InteractionKind, Session},
};

pub async fn find_session(pool: &PgPool, session_id: &str) -> Result<Option<Session>> {
	let row = sqlx::query(
		"\
SELECT id, session_id, start_time, last_activity_time, search_queries, clicked_results,
	viewed_categories, viewed_brands, filters
FROM sessions
WHERE session_id = $1",
	)
	.bind(session_id)
	.fetch_optional(pool)
	.await?;

	row.as_ref().map(session_from_row).transpose()
}

/// Insert a session, or return the row that already owns the external key.
/// The no-op conflict update makes `RETURNING` yield the surviving row either
/// way, which is what makes concurrent first-contact creation safe.
pub async fn upsert_session(pool: &PgPool, session: &Session) -> Result<Session> {
	let row = sqlx::query(
		"\
INSERT INTO sessions (
	id,
	session_id,
	start_time,
	last_activity_time,
	search_queries,
	clicked_results,
	viewed_categories,
	viewed_brands,
	filters
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
ON CONFLICT (session_id) DO UPDATE SET session_id = EXCLUDED.session_id
RETURNING id, session_id, start_time, last_activity_time, search_queries, clicked_results,
	viewed_categories, viewed_brands, filters",
	)
	.bind(session.id)
	.bind(session.session_id.as_str())
	.bind(session.start_time)
	.bind(session.last_activity_time)
	.bind(&session.search_queries)
	.bind(&session.clicked_results)
	.bind(&session.viewed_categories)
	.bind(&session.viewed_brands)
	.bind(Value::Array(session.filters.clone()))
	.fetch_one(pool)
	.await?;

	session_from_row(&row)
}

pub async fn save_session(pool: &PgPool, session: &Session) -> Result<()> {
	sqlx::query(
		"\
UPDATE sessions
SET last_activity_time = $2,
	search_queries = $3,
	clicked_results = $4,
	viewed_categories = $5,
	viewed_brands = $6,
	filters = $7
WHERE id = $1",
	)
	.bind(session.id)
	.bind(session.last_activity_time)
	.bind(&session.search_queries)
	.bind(&session.clicked_results)
	.bind(&session.viewed_categories)
	.bind(&session.viewed_brands)
	.bind(Value::Array(session.filters.clone()))
	.execute(pool)
	.await?;

	Ok(())
}

pub async fn insert_interaction(pool: &PgPool, interaction: &Interaction) -> Result<()> {
	sqlx::query(
		"\
INSERT INTO session_interactions (id, session_id, type, data, duration_ms, timestamp, created_at)
VALUES ($1,$2,$3,$4,$5,$6,$7)",
	)
	.bind(interaction.id)
	.bind(interaction.session_id)
	.bind(interaction.kind.as_str())
	.bind(&interaction.data)
	.bind(interaction.duration_ms)
	.bind(interaction.timestamp)
	.bind(interaction.created_at)
	.execute(pool)
	.await?;

	Ok(())
}

/// Interactions belonging to one session, most recent first, optionally
/// filtered to a single kind and capped.
pub async fn session_interactions(
	pool: &PgPool,
	session_pk: Uuid,
	kind: Option<InteractionKind>,
	limit: Option<i64>,
) -> Result<Vec<Interaction>> {
	let mut builder = sqlx::QueryBuilder::new(
		"SELECT id, session_id, type, data, duration_ms, timestamp, created_at \
		 FROM session_interactions WHERE session_id = ",
	);

	builder.push_bind(session_pk);

	if let Some(kind) = kind {
		builder.push(" AND type = ").push_bind(kind.as_str());
	}

	builder.push(" ORDER BY timestamp DESC, created_at DESC");

	if let Some(limit) = limit {
		builder.push(" LIMIT ").push_bind(limit);
	}

	let rows = builder.build().fetch_all(pool).await?;

	rows.iter().map(interaction_from_row).collect()
}

/// Most recent interactions of one kind across all sessions.
pub async fn interactions_by_kind(
	pool: &PgPool,
	kind: InteractionKind,
	limit: i64,
) -> Result<Vec<Interaction>> {
	let rows = sqlx::query(
		"\
SELECT id, session_id, type, data, duration_ms, timestamp, created_at
FROM session_interactions
WHERE type = $1
ORDER BY timestamp DESC, created_at DESC
LIMIT $2",
	)
	.bind(kind.as_str())
	.bind(limit)
	.fetch_all(pool)
	.await?;

	rows.iter().map(interaction_from_row).collect()
}

fn session_from_row(row: &PgRow) -> Result<Session> {
	let filters: Value = row.try_get("filters")?;
	let filters = match filters {
		Value::Array(items) => items,
		Value::Null => Vec::new(),
		other => {
			return Err(Error::Decode(format!("Session filters column is not an array: {other}.")));
		},
	};

	Ok(Session {
		id: row.try_get("id")?,
		session_id: row.try_get("session_id")?,
		start_time: row.try_get("start_time")?,
		last_activity_time: row.try_get("last_activity_time")?,
		search_queries: row.try_get("search_queries")?,
		clicked_results: row.try_get("clicked_results")?,
		viewed_categories: row.try_get("viewed_categories")?,
		viewed_brands: row.try_get("viewed_brands")?,
		filters,
	})
}

fn interaction_from_row(row: &PgRow) -> Result<Interaction> {
	let kind: String = row.try_get("type")?;
	let kind = InteractionKind::parse(&kind)
		.ok_or_else(|| Error::Decode(format!("Unknown interaction type {kind:?}.")))?;

	Ok(Interaction {
		id: row.try_get("id")?,
		session_id: row.try_get("session_id")?,
		kind,
		data: row.try_get("data")?,
		duration_ms: row.try_get("duration_ms")?,
		timestamp: row.try_get("timestamp")?,
		created_at: row.try_get("created_at")?,
	})
}
