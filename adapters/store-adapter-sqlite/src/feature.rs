//! Feature table access.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use std::sync::Arc;

use togglr_config::doc::{self, AclEntryDoc, PropertyDoc, StrategyDoc};
use togglr_types::feature::Feature;
use togglr_types::prelude::*;
use togglr_types::property::PropertyRegistry;
use togglr_types::repository::{FeatureRepository, Repository};

use crate::db_err;

#[derive(Clone, Debug)]
pub struct SqliteFeatureRepository {
	db: SqlitePool,
	registry: Arc<PropertyRegistry>,
}

impl SqliteFeatureRepository {
	pub(crate) fn new(db: SqlitePool, registry: Arc<PropertyRegistry>) -> Self {
		Self { db, registry }
	}

	fn from_row(&self, row: &SqliteRow) -> TgResult<Feature> {
		let uid: Box<str> = row.try_get("uid").map_err(db_err)?;
		let mut feature = Feature::new(&uid);
		feature.enabled = row.try_get("enabled").map_err(db_err)?;
		feature.description = row.try_get("description").map_err(db_err)?;
		feature.group = row.try_get("group_name").map_err(db_err)?;

		if let Some(json) = row.try_get::<Option<&str>, _>("properties").map_err(db_err)? {
			let docs: Vec<PropertyDoc> = serde_json::from_str(json)?;
			for prop_doc in &docs {
				let property = doc::property_from_doc(&self.registry, prop_doc)?;
				feature.properties.insert(property.uid().into(), property);
			}
		}
		if let Some(json) = row.try_get::<Option<&str>, _>("strategies").map_err(db_err)? {
			let docs: Vec<StrategyDoc> = serde_json::from_str(json)?;
			for strategy_doc in &docs {
				feature
					.toggle_strategies
					.push(doc::strategy_from_doc(&self.registry, &uid, strategy_doc)?);
			}
		}
		if let Some(json) = row.try_get::<Option<&str>, _>("acl").map_err(db_err)? {
			let docs: Vec<AclEntryDoc> = serde_json::from_str(json)?;
			feature.acl = doc::acl_from_docs(&docs)?;
		}

		Ok(feature)
	}

	fn to_columns(
		feature: &Feature,
	) -> TgResult<(Option<String>, Option<String>, Option<String>)> {
		let properties = if feature.properties.is_empty() {
			None
		} else {
			let mut props: Vec<_> = feature.properties.values().collect();
			props.sort_by(|a, b| a.uid().cmp(b.uid()));
			let docs: Vec<PropertyDoc> = props.into_iter().map(doc::property_to_doc).collect();
			Some(serde_json::to_string(&docs)?)
		};
		let strategies = if feature.toggle_strategies.is_empty() {
			None
		} else {
			let docs: Vec<StrategyDoc> =
				feature.toggle_strategies.iter().map(doc::strategy_to_doc).collect();
			Some(serde_json::to_string(&docs)?)
		};
		let acl = if feature.acl.is_empty() {
			None
		} else {
			Some(serde_json::to_string(&doc::acl_to_docs(&feature.acl))?)
		};
		Ok((properties, strategies, acl))
	}

	async fn toggle(&self, uid: &str, enabled: bool) -> TgResult<()> {
		let res = sqlx::query("UPDATE features SET enabled=? WHERE uid=?")
			.bind(enabled)
			.bind(uid)
			.execute(&self.db)
			.await
			.map_err(db_err)?;
		if res.rows_affected() == 0 {
			return Err(Error::not_found("feature", uid));
		}
		Ok(())
	}

	async fn toggle_group(&self, group: &str, enabled: bool) -> TgResult<()> {
		let res = sqlx::query("UPDATE features SET enabled=? WHERE group_name=?")
			.bind(enabled)
			.bind(group)
			.execute(&self.db)
			.await
			.map_err(db_err)?;
		if res.rows_affected() == 0 {
			return Err(Error::not_found("feature group", group));
		}
		Ok(())
	}
}

#[async_trait]
impl Repository<Feature> for SqliteFeatureRepository {
	async fn exists(&self, uid: &str) -> TgResult<bool> {
		let row = sqlx::query("SELECT count(*) FROM features WHERE uid=?")
			.bind(uid)
			.fetch_one(&self.db)
			.await
			.map_err(db_err)?;
		Ok(row.try_get::<i64, _>(0).map_err(db_err)? > 0)
	}

	async fn find(&self, uid: &str) -> TgResult<Option<Feature>> {
		let row = sqlx::query(
			"SELECT uid, enabled, description, group_name, properties, strategies, acl
			FROM features WHERE uid=?",
		)
		.bind(uid)
		.fetch_optional(&self.db)
		.await
		.map_err(db_err)?;

		row.as_ref().map(|r| self.from_row(r)).transpose()
	}

	async fn find_all(&self) -> TgResult<Vec<Feature>> {
		let rows = sqlx::query(
			"SELECT uid, enabled, description, group_name, properties, strategies, acl
			FROM features",
		)
		.fetch_all(&self.db)
		.await
		.map_err(db_err)?;

		rows.iter().map(|row| self.from_row(row)).collect()
	}

	async fn find_all_ids(&self) -> TgResult<Vec<Box<str>>> {
		let rows = sqlx::query("SELECT uid FROM features")
			.fetch_all(&self.db)
			.await
			.map_err(db_err)?;
		rows.iter().map(|row| row.try_get("uid").map_err(db_err)).collect()
	}

	async fn save(&self, entity: &Feature) -> TgResult<()> {
		let (properties, strategies, acl) = Self::to_columns(entity)?;

		// delete-then-insert upsert, atomic under one transaction
		let mut tx = self.db.begin().await.map_err(db_err)?;
		sqlx::query("DELETE FROM features WHERE uid=?")
			.bind(entity.uid())
			.execute(&mut *tx)
			.await
			.map_err(db_err)?;
		sqlx::query(
			"INSERT INTO features (uid, enabled, description, group_name, properties, strategies, acl)
			VALUES (?, ?, ?, ?, ?, ?, ?)",
		)
		.bind(entity.uid())
		.bind(entity.enabled)
		.bind(entity.description.as_deref())
		.bind(entity.group.as_deref())
		.bind(properties)
		.bind(strategies)
		.bind(acl)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;
		tx.commit().await.map_err(db_err)?;
		Ok(())
	}

	async fn count(&self) -> TgResult<u64> {
		let row = sqlx::query("SELECT count(*) FROM features")
			.fetch_one(&self.db)
			.await
			.map_err(db_err)?;
		Ok(row.try_get::<i64, _>(0).map_err(db_err)? as u64)
	}

	async fn delete(&self, uid: &str) -> TgResult<()> {
		let res = sqlx::query("DELETE FROM features WHERE uid=?")
			.bind(uid)
			.execute(&self.db)
			.await
			.map_err(db_err)?;
		if res.rows_affected() == 0 {
			return Err(Error::not_found("feature", uid));
		}
		Ok(())
	}

	async fn delete_all(&self) -> TgResult<()> {
		sqlx::query("DELETE FROM features").execute(&self.db).await.map_err(db_err)?;
		Ok(())
	}
}

#[async_trait]
impl FeatureRepository for SqliteFeatureRepository {
	async fn toggle_on(&self, uid: &str) -> TgResult<()> {
		self.toggle(uid, true).await
	}

	async fn toggle_off(&self, uid: &str) -> TgResult<()> {
		self.toggle(uid, false).await
	}

	async fn toggle_on_group(&self, group: &str) -> TgResult<()> {
		self.toggle_group(group, true).await
	}

	async fn toggle_off_group(&self, group: &str) -> TgResult<()> {
		self.toggle_group(group, false).await
	}

	async fn add_to_group(&self, uid: &str, group: &str) -> TgResult<()> {
		let res = sqlx::query("UPDATE features SET group_name=? WHERE uid=?")
			.bind(group)
			.bind(uid)
			.execute(&self.db)
			.await
			.map_err(db_err)?;
		if res.rows_affected() == 0 {
			return Err(Error::not_found("feature", uid));
		}
		Ok(())
	}

	async fn remove_from_group(&self, uid: &str) -> TgResult<()> {
		let res = sqlx::query("UPDATE features SET group_name=NULL WHERE uid=?")
			.bind(uid)
			.execute(&self.db)
			.await
			.map_err(db_err)?;
		if res.rows_affected() == 0 {
			return Err(Error::not_found("feature", uid));
		}
		Ok(())
	}

	async fn read_group(&self, group: &str) -> TgResult<Vec<Feature>> {
		let rows = sqlx::query(
			"SELECT uid, enabled, description, group_name, properties, strategies, acl
			FROM features WHERE group_name=?",
		)
		.bind(group)
		.fetch_all(&self.db)
		.await
		.map_err(db_err)?;

		if rows.is_empty() {
			return Err(Error::not_found("feature group", group));
		}
		rows.iter().map(|row| self.from_row(row)).collect()
	}
}

// vim: ts=4
