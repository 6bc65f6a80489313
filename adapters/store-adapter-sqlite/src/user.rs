//! User table access.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use togglr_types::access::User;
use togglr_types::prelude::*;
use togglr_types::repository::{Repository, UserRepository};

use crate::db_err;

#[derive(Clone, Debug)]
pub struct SqliteUserRepository {
	db: SqlitePool,
}

impl SqliteUserRepository {
	pub(crate) fn new(db: SqlitePool) -> Self {
		Self { db }
	}
}

fn from_row(row: &SqliteRow) -> TgResult<User> {
	let uid: Box<str> = row.try_get("uid").map_err(db_err)?;
	let mut user = User::new(&uid);
	user.first_name = row.try_get("firstname").map_err(db_err)?;
	user.last_name = row.try_get("lastname").map_err(db_err)?;
	user.description = row.try_get("description").map_err(db_err)?;
	if let Some(json) = row.try_get::<Option<&str>, _>("roles").map_err(db_err)? {
		user.roles = serde_json::from_str(json)?;
	}
	if let Some(json) = row.try_get::<Option<&str>, _>("permissions").map_err(db_err)? {
		user.permissions = serde_json::from_str(json)?;
	}
	Ok(user)
}

#[async_trait]
impl Repository<User> for SqliteUserRepository {
	async fn exists(&self, uid: &str) -> TgResult<bool> {
		let row = sqlx::query("SELECT count(*) FROM users WHERE uid=?")
			.bind(uid)
			.fetch_one(&self.db)
			.await
			.map_err(db_err)?;
		Ok(row.try_get::<i64, _>(0).map_err(db_err)? > 0)
	}

	async fn find(&self, uid: &str) -> TgResult<Option<User>> {
		let row = sqlx::query(
			"SELECT uid, firstname, lastname, description, roles, permissions
			FROM users WHERE uid=?",
		)
		.bind(uid)
		.fetch_optional(&self.db)
		.await
		.map_err(db_err)?;
		row.as_ref().map(from_row).transpose()
	}

	async fn find_all(&self) -> TgResult<Vec<User>> {
		let rows = sqlx::query(
			"SELECT uid, firstname, lastname, description, roles, permissions FROM users",
		)
		.fetch_all(&self.db)
		.await
		.map_err(db_err)?;
		rows.iter().map(from_row).collect()
	}

	async fn find_all_ids(&self) -> TgResult<Vec<Box<str>>> {
		let rows =
			sqlx::query("SELECT uid FROM users").fetch_all(&self.db).await.map_err(db_err)?;
		rows.iter().map(|row| row.try_get("uid").map_err(db_err)).collect()
	}

	async fn save(&self, entity: &User) -> TgResult<()> {
		let roles = if entity.roles.is_empty() {
			None
		} else {
			Some(serde_json::to_string(&entity.roles)?)
		};
		let permissions = if entity.permissions.is_empty() {
			None
		} else {
			Some(serde_json::to_string(&entity.permissions)?)
		};

		let mut tx = self.db.begin().await.map_err(db_err)?;
		sqlx::query("DELETE FROM users WHERE uid=?")
			.bind(&entity.uid)
			.execute(&mut *tx)
			.await
			.map_err(db_err)?;
		sqlx::query(
			"INSERT INTO users (uid, firstname, lastname, description, roles, permissions)
			VALUES (?, ?, ?, ?, ?, ?)",
		)
		.bind(&entity.uid)
		.bind(entity.first_name.as_deref())
		.bind(entity.last_name.as_deref())
		.bind(entity.description.as_deref())
		.bind(roles)
		.bind(permissions)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;
		tx.commit().await.map_err(db_err)?;
		Ok(())
	}

	async fn count(&self) -> TgResult<u64> {
		let row =
			sqlx::query("SELECT count(*) FROM users").fetch_one(&self.db).await.map_err(db_err)?;
		Ok(row.try_get::<i64, _>(0).map_err(db_err)? as u64)
	}

	async fn delete(&self, uid: &str) -> TgResult<()> {
		let res = sqlx::query("DELETE FROM users WHERE uid=?")
			.bind(uid)
			.execute(&self.db)
			.await
			.map_err(db_err)?;
		if res.rows_affected() == 0 {
			return Err(Error::not_found("user", uid));
		}
		Ok(())
	}

	async fn delete_all(&self) -> TgResult<()> {
		sqlx::query("DELETE FROM users").execute(&self.db).await.map_err(db_err)?;
		Ok(())
	}
}

impl UserRepository for SqliteUserRepository {}

// vim: ts=4
