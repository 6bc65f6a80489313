//! SQLite-backed store adapter.
//!
//! One table per entity, keyed by uid; nested bags (properties, toggle
//! strategies, ACLs, permission sets) live in JSON columns and are
//! rehydrated through the same kind registry the codec uses. `save` keeps
//! the delete-then-insert upsert semantics but runs both statements in one
//! transaction, so concurrent readers never observe a transient absence.

use sqlx::sqlite::{self, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::sync::Arc;

use togglr_types::prelude::*;
use togglr_types::property::PropertyRegistry;

mod feature;
mod property;
mod role;
mod schema;
mod user;

pub use feature::SqliteFeatureRepository;
pub use property::SqlitePropertyRepository;
pub use role::SqliteRoleRepository;
pub use user::SqliteUserRepository;

pub(crate) fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

pub(crate) fn db_err(err: sqlx::Error) -> Error {
	inspect(&err);
	Error::Db(err.to_string().into())
}

/// Owns the connection pool and hands out per-entity repositories. The
/// kind registry is injected at construction, never created lazily.
#[derive(Debug)]
pub struct SqliteStore {
	db: SqlitePool,
	registry: Arc<PropertyRegistry>,
}

impl SqliteStore {
	pub async fn new(registry: Arc<PropertyRegistry>, path: impl AsRef<Path>) -> TgResult<Self> {
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.map_err(db_err)?;

		schema::init_db(&db).await.map_err(db_err)?;

		Ok(Self { db, registry })
	}

	pub fn features(&self) -> SqliteFeatureRepository {
		SqliteFeatureRepository::new(self.db.clone(), self.registry.clone())
	}

	pub fn properties(&self) -> SqlitePropertyRepository {
		SqlitePropertyRepository::new(self.db.clone(), self.registry.clone())
	}

	pub fn roles(&self) -> SqliteRoleRepository {
		SqliteRoleRepository::new(self.db.clone())
	}

	pub fn users(&self) -> SqliteUserRepository {
		SqliteUserRepository::new(self.db.clone())
	}
}

// vim: ts=4
