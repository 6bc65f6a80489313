//! Role table access.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use togglr_types::access::Role;
use togglr_types::prelude::*;
use togglr_types::repository::{Repository, RoleRepository};

use crate::db_err;

#[derive(Clone, Debug)]
pub struct SqliteRoleRepository {
	db: SqlitePool,
}

impl SqliteRoleRepository {
	pub(crate) fn new(db: SqlitePool) -> Self {
		Self { db }
	}
}

fn from_row(row: &SqliteRow) -> TgResult<Role> {
	let uid: Box<str> = row.try_get("uid").map_err(db_err)?;
	let mut role = Role::new(&uid);
	if let Some(json) = row.try_get::<Option<&str>, _>("permissions").map_err(db_err)? {
		role.permissions = serde_json::from_str(json)?;
	}
	Ok(role)
}

#[async_trait]
impl Repository<Role> for SqliteRoleRepository {
	async fn exists(&self, uid: &str) -> TgResult<bool> {
		let row = sqlx::query("SELECT count(*) FROM roles WHERE uid=?")
			.bind(uid)
			.fetch_one(&self.db)
			.await
			.map_err(db_err)?;
		Ok(row.try_get::<i64, _>(0).map_err(db_err)? > 0)
	}

	async fn find(&self, uid: &str) -> TgResult<Option<Role>> {
		let row = sqlx::query("SELECT uid, permissions FROM roles WHERE uid=?")
			.bind(uid)
			.fetch_optional(&self.db)
			.await
			.map_err(db_err)?;
		row.as_ref().map(from_row).transpose()
	}

	async fn find_all(&self) -> TgResult<Vec<Role>> {
		let rows = sqlx::query("SELECT uid, permissions FROM roles")
			.fetch_all(&self.db)
			.await
			.map_err(db_err)?;
		rows.iter().map(from_row).collect()
	}

	async fn find_all_ids(&self) -> TgResult<Vec<Box<str>>> {
		let rows =
			sqlx::query("SELECT uid FROM roles").fetch_all(&self.db).await.map_err(db_err)?;
		rows.iter().map(|row| row.try_get("uid").map_err(db_err)).collect()
	}

	async fn save(&self, entity: &Role) -> TgResult<()> {
		let permissions = serde_json::to_string(&entity.permissions)?;

		let mut tx = self.db.begin().await.map_err(db_err)?;
		sqlx::query("DELETE FROM roles WHERE uid=?")
			.bind(&entity.uid)
			.execute(&mut *tx)
			.await
			.map_err(db_err)?;
		sqlx::query("INSERT INTO roles (uid, permissions) VALUES (?, ?)")
			.bind(&entity.uid)
			.bind(permissions)
			.execute(&mut *tx)
			.await
			.map_err(db_err)?;
		tx.commit().await.map_err(db_err)?;
		Ok(())
	}

	async fn count(&self) -> TgResult<u64> {
		let row =
			sqlx::query("SELECT count(*) FROM roles").fetch_one(&self.db).await.map_err(db_err)?;
		Ok(row.try_get::<i64, _>(0).map_err(db_err)? as u64)
	}

	async fn delete(&self, uid: &str) -> TgResult<()> {
		let res = sqlx::query("DELETE FROM roles WHERE uid=?")
			.bind(uid)
			.execute(&self.db)
			.await
			.map_err(db_err)?;
		if res.rows_affected() == 0 {
			return Err(Error::not_found("role", uid));
		}
		Ok(())
	}

	async fn delete_all(&self) -> TgResult<()> {
		sqlx::query("DELETE FROM roles").execute(&self.db).await.map_err(db_err)?;
		Ok(())
	}
}

impl RoleRepository for SqliteRoleRepository {}

// vim: ts=4
