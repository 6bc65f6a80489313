//! In-memory repositories.
//!
//! The second backend next to the relational adapter, and the unit-test
//! substrate. Upserts swap the entry under one write lock, so readers never
//! observe a transient absence.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use togglr_types::access::{Role, User};
use togglr_types::feature::Feature;
use togglr_types::prelude::*;
use togglr_types::property::{Property, PropertyRegistry};
use togglr_types::repository::{
	Entity, FeatureRepository, PropertyRepository, Repository, RoleRepository, UserRepository,
};

#[derive(Debug)]
pub struct MemRepository<E> {
	items: RwLock<HashMap<Box<str>, E>>,
}

impl<E> MemRepository<E> {
	pub fn new() -> Self {
		Self { items: RwLock::new(HashMap::new()) }
	}
}

impl<E> Default for MemRepository<E> {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl<E: Entity + 'static> Repository<E> for MemRepository<E> {
	async fn exists(&self, uid: &str) -> TgResult<bool> {
		Ok(self.items.read().contains_key(uid))
	}

	async fn find(&self, uid: &str) -> TgResult<Option<E>> {
		Ok(self.items.read().get(uid).cloned())
	}

	async fn find_all(&self) -> TgResult<Vec<E>> {
		Ok(self.items.read().values().cloned().collect())
	}

	async fn find_all_ids(&self) -> TgResult<Vec<Box<str>>> {
		Ok(self.items.read().keys().cloned().collect())
	}

	async fn save(&self, entity: &E) -> TgResult<()> {
		self.items.write().insert(entity.uid().into(), entity.clone());
		Ok(())
	}

	async fn count(&self) -> TgResult<u64> {
		Ok(self.items.read().len() as u64)
	}

	async fn delete(&self, uid: &str) -> TgResult<()> {
		match self.items.write().remove(uid) {
			Some(_) => Ok(()),
			None => Err(Error::not_found(E::SCOPE_NAME, uid)),
		}
	}

	async fn delete_all(&self) -> TgResult<()> {
		self.items.write().clear();
		Ok(())
	}
}

impl RoleRepository for MemRepository<Role> {}
impl UserRepository for MemRepository<User> {}

// Features //
//**********//
#[derive(Debug, Default)]
pub struct MemFeatureRepository {
	inner: MemRepository<Feature>,
}

impl MemFeatureRepository {
	pub fn new() -> Self {
		Self::default()
	}

	fn toggle(&self, uid: &str, enabled: bool) -> TgResult<()> {
		let mut items = self.inner.items.write();
		match items.get_mut(uid) {
			Some(feature) => {
				feature.enabled = enabled;
				Ok(())
			}
			None => Err(Error::not_found("feature", uid)),
		}
	}

	fn toggle_group(&self, group: &str, enabled: bool) -> TgResult<()> {
		let mut items = self.inner.items.write();
		let mut hit = false;
		for feature in items.values_mut().filter(|f| f.in_group(group)) {
			feature.enabled = enabled;
			hit = true;
		}
		if hit { Ok(()) } else { Err(Error::not_found("feature group", group)) }
	}
}

#[async_trait]
impl Repository<Feature> for MemFeatureRepository {
	async fn exists(&self, uid: &str) -> TgResult<bool> {
		self.inner.exists(uid).await
	}

	async fn find(&self, uid: &str) -> TgResult<Option<Feature>> {
		self.inner.find(uid).await
	}

	async fn find_all(&self) -> TgResult<Vec<Feature>> {
		self.inner.find_all().await
	}

	async fn find_all_ids(&self) -> TgResult<Vec<Box<str>>> {
		self.inner.find_all_ids().await
	}

	async fn save(&self, entity: &Feature) -> TgResult<()> {
		self.inner.save(entity).await
	}

	async fn count(&self) -> TgResult<u64> {
		self.inner.count().await
	}

	async fn delete(&self, uid: &str) -> TgResult<()> {
		self.inner.delete(uid).await
	}

	async fn delete_all(&self) -> TgResult<()> {
		self.inner.delete_all().await
	}
}

#[async_trait]
impl FeatureRepository for MemFeatureRepository {
	async fn toggle_on(&self, uid: &str) -> TgResult<()> {
		self.toggle(uid, true)
	}

	async fn toggle_off(&self, uid: &str) -> TgResult<()> {
		self.toggle(uid, false)
	}

	async fn toggle_on_group(&self, group: &str) -> TgResult<()> {
		self.toggle_group(group, true)
	}

	async fn toggle_off_group(&self, group: &str) -> TgResult<()> {
		self.toggle_group(group, false)
	}

	async fn add_to_group(&self, uid: &str, group: &str) -> TgResult<()> {
		let mut items = self.inner.items.write();
		match items.get_mut(uid) {
			Some(feature) => {
				feature.group = Some(group.into());
				Ok(())
			}
			None => Err(Error::not_found("feature", uid)),
		}
	}

	async fn remove_from_group(&self, uid: &str) -> TgResult<()> {
		let mut items = self.inner.items.write();
		match items.get_mut(uid) {
			Some(feature) => {
				feature.group = None;
				Ok(())
			}
			None => Err(Error::not_found("feature", uid)),
		}
	}

	async fn read_group(&self, group: &str) -> TgResult<Vec<Feature>> {
		let features: Vec<Feature> =
			self.inner.items.read().values().filter(|f| f.in_group(group)).cloned().collect();
		if features.is_empty() {
			Err(Error::not_found("feature group", group))
		} else {
			Ok(features)
		}
	}
}

// Properties //
//************//
#[derive(Debug)]
pub struct MemPropertyRepository {
	inner: MemRepository<Property>,
	registry: Arc<PropertyRegistry>,
}

impl MemPropertyRepository {
	pub fn new(registry: Arc<PropertyRegistry>) -> Self {
		Self { inner: MemRepository::new(), registry }
	}
}

#[async_trait]
impl Repository<Property> for MemPropertyRepository {
	async fn exists(&self, uid: &str) -> TgResult<bool> {
		self.inner.exists(uid).await
	}

	async fn find(&self, uid: &str) -> TgResult<Option<Property>> {
		self.inner.find(uid).await
	}

	async fn find_all(&self) -> TgResult<Vec<Property>> {
		self.inner.find_all().await
	}

	async fn find_all_ids(&self) -> TgResult<Vec<Box<str>>> {
		self.inner.find_all_ids().await
	}

	async fn save(&self, entity: &Property) -> TgResult<()> {
		self.inner.save(entity).await
	}

	async fn count(&self) -> TgResult<u64> {
		self.inner.count().await
	}

	async fn delete(&self, uid: &str) -> TgResult<()> {
		self.inner.delete(uid).await
	}

	async fn delete_all(&self) -> TgResult<()> {
		self.inner.delete_all().await
	}
}

#[async_trait]
impl PropertyRepository for MemPropertyRepository {
	async fn update_value(&self, uid: &str, raw: &str) -> TgResult<()> {
		let mut items = self.inner.items.write();
		match items.get_mut(uid) {
			Some(property) => property.set_from_str(&self.registry, raw),
			None => Err(Error::not_found("property", uid)),
		}
	}
}


// vim: ts=4
