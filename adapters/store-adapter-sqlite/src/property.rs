//! Global property table access. The whole property is stored as its
//! document form in a JSON column; hydration runs through the kind registry,
//! so fixed-value invariants are re-checked on every read.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use std::sync::Arc;

use togglr_config::doc::{self, PropertyDoc};
use togglr_types::prelude::*;
use togglr_types::property::{Property, PropertyRegistry};
use togglr_types::repository::{PropertyRepository, Repository};

use crate::db_err;

#[derive(Clone, Debug)]
pub struct SqlitePropertyRepository {
	db: SqlitePool,
	registry: Arc<PropertyRegistry>,
}

impl SqlitePropertyRepository {
	pub(crate) fn new(db: SqlitePool, registry: Arc<PropertyRegistry>) -> Self {
		Self { db, registry }
	}

	fn from_row(&self, row: &SqliteRow) -> TgResult<Property> {
		let json: &str = row.try_get("doc").map_err(db_err)?;
		let prop_doc: PropertyDoc = serde_json::from_str(json)?;
		doc::property_from_doc(&self.registry, &prop_doc)
	}
}

#[async_trait]
impl Repository<Property> for SqlitePropertyRepository {
	async fn exists(&self, uid: &str) -> TgResult<bool> {
		let row = sqlx::query("SELECT count(*) FROM properties WHERE uid=?")
			.bind(uid)
			.fetch_one(&self.db)
			.await
			.map_err(db_err)?;
		Ok(row.try_get::<i64, _>(0).map_err(db_err)? > 0)
	}

	async fn find(&self, uid: &str) -> TgResult<Option<Property>> {
		let row = sqlx::query("SELECT doc FROM properties WHERE uid=?")
			.bind(uid)
			.fetch_optional(&self.db)
			.await
			.map_err(db_err)?;
		row.as_ref().map(|r| self.from_row(r)).transpose()
	}

	async fn find_all(&self) -> TgResult<Vec<Property>> {
		let rows =
			sqlx::query("SELECT doc FROM properties").fetch_all(&self.db).await.map_err(db_err)?;
		rows.iter().map(|row| self.from_row(row)).collect()
	}

	async fn find_all_ids(&self) -> TgResult<Vec<Box<str>>> {
		let rows =
			sqlx::query("SELECT uid FROM properties").fetch_all(&self.db).await.map_err(db_err)?;
		rows.iter().map(|row| row.try_get("uid").map_err(db_err)).collect()
	}

	async fn save(&self, entity: &Property) -> TgResult<()> {
		let json = serde_json::to_string(&doc::property_to_doc(entity))?;

		let mut tx = self.db.begin().await.map_err(db_err)?;
		sqlx::query("DELETE FROM properties WHERE uid=?")
			.bind(entity.uid())
			.execute(&mut *tx)
			.await
			.map_err(db_err)?;
		sqlx::query("INSERT INTO properties (uid, doc) VALUES (?, ?)")
			.bind(entity.uid())
			.bind(json)
			.execute(&mut *tx)
			.await
			.map_err(db_err)?;
		tx.commit().await.map_err(db_err)?;
		Ok(())
	}

	async fn count(&self) -> TgResult<u64> {
		let row = sqlx::query("SELECT count(*) FROM properties")
			.fetch_one(&self.db)
			.await
			.map_err(db_err)?;
		Ok(row.try_get::<i64, _>(0).map_err(db_err)? as u64)
	}

	async fn delete(&self, uid: &str) -> TgResult<()> {
		let res = sqlx::query("DELETE FROM properties WHERE uid=?")
			.bind(uid)
			.execute(&self.db)
			.await
			.map_err(db_err)?;
		if res.rows_affected() == 0 {
			return Err(Error::not_found("property", uid));
		}
		Ok(())
	}

	async fn delete_all(&self) -> TgResult<()> {
		sqlx::query("DELETE FROM properties").execute(&self.db).await.map_err(db_err)?;
		Ok(())
	}
}

#[async_trait]
impl PropertyRepository for SqlitePropertyRepository {
	async fn update_value(&self, uid: &str, raw: &str) -> TgResult<()> {
		let mut property =
			self.find(uid).await?.ok_or_else(|| Error::not_found("property", uid))?;
		property.set_from_str(&self.registry, raw)?;
		self.save(&property).await
	}
}

// vim: ts=4
