use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

use souk_config::Postgres;
use souk_storage::{
	db::Db,
	models::{Interaction, InteractionData, InteractionKind, Session},
	queries,
};
use souk_testkit::TestDatabase;

#[tokio::test]
#[ignore = "Requires external Postgres. Set SOUK_PG_DSN to run."]
async fn db_connects_and_bootstraps() {
	let Some(base_dsn) = souk_testkit::env_dsn() else {
		eprintln!("Skipping db_connects_and_bootstraps; set SOUK_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	for table in ["sessions", "session_interactions"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "missing table {table}");
	}

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SOUK_PG_DSN to run."]
async fn upsert_session_returns_the_surviving_row() {
	let Some(base_dsn) = souk_testkit::env_dsn() else {
		eprintln!("Skipping upsert_session_returns_the_surviving_row; set SOUK_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let now = OffsetDateTime::now_utc();
	let first = queries::upsert_session(&db.pool, &Session::started("s1", now))
		.await
		.expect("Failed to upsert session.");
	let second = queries::upsert_session(&db.pool, &Session::started("s1", now))
		.await
		.expect("Failed to upsert session.");

	assert_eq!(first.id, second.id);

	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM sessions")
		.fetch_one(&db.pool)
		.await
		.expect("Failed to count sessions.");

	assert_eq!(count, 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set SOUK_PG_DSN to run."]
async fn interactions_read_back_most_recent_first() {
	let Some(base_dsn) = souk_testkit::env_dsn() else {
		eprintln!("Skipping interactions_read_back_most_recent_first; set SOUK_PG_DSN to run.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let cfg = Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 1 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	let now = OffsetDateTime::now_utc();
	let session = queries::upsert_session(&db.pool, &Session::started("s2", now))
		.await
		.expect("Failed to upsert session.");
	let older = InteractionData::Search { query: "tote bag".to_string() };
	let newer = InteractionData::Click { result_id: "p42".to_string() };

	for (offset, data) in [(time::Duration::minutes(10), &older), (time::Duration::ZERO, &newer)] {
		let at = now - offset;
		let interaction = Interaction {
			id: Uuid::new_v4(),
			session_id: session.id,
			kind: data.kind(),
			data: data.payload(),
			duration_ms: None,
			timestamp: at,
			created_at: at,
		};

		queries::insert_interaction(&db.pool, &interaction)
			.await
			.expect("Failed to insert interaction.");
	}

	let all = queries::session_interactions(&db.pool, session.id, None, None)
		.await
		.expect("Failed to list interactions.");

	assert_eq!(all.len(), 2);
	assert_eq!(all[0].kind, InteractionKind::Click);
	assert_eq!(all[0].data, json!({ "resultId": "p42" }));

	let searches =
		queries::session_interactions(&db.pool, session.id, Some(InteractionKind::Search), None)
			.await
			.expect("Failed to list interactions.");

	assert_eq!(searches.len(), 1);

	let capped = queries::session_interactions(&db.pool, session.id, None, Some(1))
		.await
		.expect("Failed to list interactions.");

	assert_eq!(capped.len(), 1);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
