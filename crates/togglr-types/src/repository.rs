//! Storage-agnostic repository contracts.
//!
//! Every backing store implements [`Repository`] per entity type. `save` is
//! an upsert with delete-then-insert reference semantics; implementations
//! are expected to make it atomic (single transaction or native upsert) so
//! readers never observe a transient absence.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::access::{Role, User};
use crate::event::EventScope;
use crate::feature::Feature;
use crate::prelude::*;
use crate::property::Property;

/// An entity addressable by uid, with a scope tag used in error messages
/// and audit events.
pub trait Entity: Clone + Debug + Send + Sync {
	const SCOPE: EventScope;
	/// Scope name used in `NotFound` errors
	const SCOPE_NAME: &'static str;

	fn uid(&self) -> &str;
}

impl Entity for Feature {
	const SCOPE: EventScope = EventScope::Feature;
	const SCOPE_NAME: &'static str = "feature";

	fn uid(&self) -> &str {
		self.uid()
	}
}

impl Entity for Property {
	const SCOPE: EventScope = EventScope::Property;
	const SCOPE_NAME: &'static str = "property";

	fn uid(&self) -> &str {
		self.uid()
	}
}

impl Entity for Role {
	const SCOPE: EventScope = EventScope::Role;
	const SCOPE_NAME: &'static str = "role";

	fn uid(&self) -> &str {
		&self.uid
	}
}

impl Entity for User {
	const SCOPE: EventScope = EventScope::User;
	const SCOPE_NAME: &'static str = "user";

	fn uid(&self) -> &str {
		&self.uid
	}
}

/// Generic CRUD contract any backing store must satisfy.
///
/// `find_all`/`find_all_ids` are finite, one pass per call; order is
/// unspecified unless the backend documents one.
#[async_trait]
pub trait Repository<E: Entity>: Debug + Send + Sync {
	async fn exists(&self, uid: &str) -> TgResult<bool>;

	async fn find(&self, uid: &str) -> TgResult<Option<E>>;

	async fn find_all(&self) -> TgResult<Vec<E>>;

	async fn find_all_ids(&self) -> TgResult<Vec<Box<str>>>;

	/// Upsert: an existing entity under the same uid is replaced
	async fn save(&self, entity: &E) -> TgResult<()>;

	async fn count(&self) -> TgResult<u64>;

	/// Fails with `NotFound` when the uid does not exist; no partial effect
	async fn delete(&self, uid: &str) -> TgResult<()>;

	async fn delete_all(&self) -> TgResult<()>;
}

/// Feature store: the generic contract plus toggle and group operations.
#[async_trait]
pub trait FeatureRepository: Repository<Feature> {
	async fn toggle_on(&self, uid: &str) -> TgResult<()>;

	async fn toggle_off(&self, uid: &str) -> TgResult<()>;

	/// Toggles every feature of the group; unknown group is `NotFound`
	async fn toggle_on_group(&self, group: &str) -> TgResult<()>;

	async fn toggle_off_group(&self, group: &str) -> TgResult<()>;

	async fn add_to_group(&self, uid: &str, group: &str) -> TgResult<()>;

	async fn remove_from_group(&self, uid: &str) -> TgResult<()>;

	async fn read_group(&self, group: &str) -> TgResult<Vec<Feature>>;
}

#[async_trait]
pub trait PropertyRepository: Repository<Property> {
	/// Validated in-place value update without replacing the whole property
	async fn update_value(&self, uid: &str, raw: &str) -> TgResult<()>;
}

pub trait RoleRepository: Repository<Role> {}

pub trait UserRepository: Repository<User> {}

// vim: ts=4
