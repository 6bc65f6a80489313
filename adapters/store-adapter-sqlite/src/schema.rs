//! Table creation. Runs once at pool construction; every statement is
//! idempotent.

use sqlx::SqlitePool;

pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS features (
		uid text NOT NULL,
		enabled integer NOT NULL DEFAULT 0,
		description text,
		group_name text,
		properties json,
		strategies json,
		acl json,
		PRIMARY KEY(uid)
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_features_group ON features(group_name) WHERE group_name NOT NULL")
		.execute(&mut *tx)
		.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS properties (
		uid text NOT NULL,
		doc json NOT NULL,
		PRIMARY KEY(uid)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS roles (
		uid text NOT NULL,
		permissions json,
		PRIMARY KEY(uid)
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE TABLE IF NOT EXISTS users (
		uid text NOT NULL,
		firstname text,
		lastname text,
		description text,
		roles json,
		permissions json,
		PRIMARY KEY(uid)
	)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
