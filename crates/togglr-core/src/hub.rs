//! The hub facade: every mutation runs permission check → repository call →
//! exactly one audit event, whatever store backs the repositories.

use std::sync::Arc;

use togglr_types::access::{Role, User};
use togglr_types::configuration::Configuration;
use togglr_types::event::{Event, EventAction, EventScope};
use togglr_types::feature::Feature;
use togglr_types::prelude::*;
use togglr_types::property::Property;
use togglr_types::repository::{
	FeatureRepository, PropertyRepository, RoleRepository, UserRepository,
};

use crate::access::{self, SecurityContext};
use crate::audit::AuditEmitter;
use crate::strategy::{EvalContext, StrategyPolicy, StrategyRegistry, decide};

/// Front facade over the four repositories.
///
/// All collaborators are injected at construction; there is no lazily
/// created default. Without a [`SecurityContext`] every operation is
/// allowed; with one, protected operations resolve permissions through the
/// four-step grant rules before the repository is touched.
#[derive(Debug)]
pub struct FlagHub {
	features: Arc<dyn FeatureRepository>,
	properties: Arc<dyn PropertyRepository>,
	roles: Arc<dyn RoleRepository>,
	users: Arc<dyn UserRepository>,
	emitter: AuditEmitter,
	strategies: StrategyRegistry,
	policy: StrategyPolicy,
	security: Option<SecurityContext>,
	audit: bool,
	auto_create: bool,
}

impl FlagHub {
	pub fn new(
		features: Arc<dyn FeatureRepository>,
		properties: Arc<dyn PropertyRepository>,
		roles: Arc<dyn RoleRepository>,
		users: Arc<dyn UserRepository>,
		policy: StrategyPolicy,
	) -> Self {
		Self {
			features,
			properties,
			roles,
			users,
			emitter: AuditEmitter::default(),
			strategies: StrategyRegistry::default(),
			policy,
			security: None,
			audit: true,
			auto_create: false,
		}
	}

	pub fn with_emitter(mut self, emitter: AuditEmitter) -> Self {
		self.emitter = emitter;
		self
	}

	pub fn with_strategies(mut self, strategies: StrategyRegistry) -> Self {
		self.strategies = strategies;
		self
	}

	pub fn with_security(mut self, security: SecurityContext) -> Self {
		self.security = Some(security);
		self
	}

	pub fn with_audit(mut self, audit: bool) -> Self {
		self.audit = audit;
		self
	}

	pub fn with_auto_create(mut self, auto_create: bool) -> Self {
		self.auto_create = auto_create;
		self
	}

	pub fn features(&self) -> &Arc<dyn FeatureRepository> {
		&self.features
	}

	pub fn properties(&self) -> &Arc<dyn PropertyRepository> {
		&self.properties
	}

	fn check(&self, permission: &str, acl: &togglr_types::access::Acl) -> TgResult<()> {
		match &self.security {
			Some(security) => security.check(permission, acl),
			None => Ok(()),
		}
	}

	fn check_global(&self, permission: &str) -> TgResult<()> {
		self.check(permission, &togglr_types::access::Acl::default())
	}

	async fn emit(&self, action: EventAction, scope: EventScope, entity_ref: &str) -> TgResult<()> {
		if self.audit {
			self.emitter.emit(Event::new(action, scope, entity_ref)).await
		} else {
			Ok(())
		}
	}

	async fn feature_acl(&self, uid: &str) -> TgResult<togglr_types::access::Acl> {
		let feature = self
			.features
			.find(uid)
			.await?
			.ok_or_else(|| Error::not_found("feature", uid))?;
		Ok(feature.acl)
	}

	// Evaluation //
	//************//

	/// Effective toggle decision: the static flag gated by the strategy
	/// policy. Unknown uid either auto-creates a disabled feature (when
	/// configured) or is `NotFound`.
	pub async fn is_active(&self, uid: &str, ctx: &EvalContext) -> TgResult<bool> {
		match self.features.find(uid).await? {
			Some(feature) => {
				if !feature.enabled {
					return Ok(false);
				}
				Ok(decide(&feature, &self.strategies, ctx, self.policy))
			}
			None if self.auto_create => {
				debug!(uid, "unknown feature, auto-creating disabled");
				self.features.save(&Feature::new(uid)).await?;
				self.emit(EventAction::Create, EventScope::Feature, uid).await?;
				Ok(false)
			}
			None => Err(Error::not_found("feature", uid)),
		}
	}

	// Feature mutations //
	//*******************//

	pub async fn create_feature(&self, feature: &Feature) -> TgResult<()> {
		self.check_global(access::FEATURE_CREATE)?;
		self.features.save(feature).await?;
		self.emit(EventAction::Create, EventScope::Feature, feature.uid()).await
	}

	/// Replaces an existing feature; unknown uid is `NotFound`
	pub async fn update_feature(&self, feature: &Feature) -> TgResult<()> {
		let acl = self.feature_acl(feature.uid()).await?;
		self.check(access::FEATURE_UPDATE, &acl)?;
		self.features.save(feature).await?;
		self.emit(EventAction::Update, EventScope::Feature, feature.uid()).await
	}

	pub async fn delete_feature(&self, uid: &str) -> TgResult<()> {
		let acl = self.feature_acl(uid).await?;
		self.check(access::FEATURE_DELETE, &acl)?;
		self.features.delete(uid).await?;
		self.emit(EventAction::Delete, EventScope::Feature, uid).await
	}

	pub async fn toggle_on(&self, uid: &str) -> TgResult<()> {
		let acl = self.feature_acl(uid).await?;
		self.check(access::FEATURE_TOGGLE, &acl)?;
		self.features.toggle_on(uid).await?;
		self.emit(EventAction::ToggleOn, EventScope::Feature, uid).await
	}

	pub async fn toggle_off(&self, uid: &str) -> TgResult<()> {
		let acl = self.feature_acl(uid).await?;
		self.check(access::FEATURE_TOGGLE, &acl)?;
		self.features.toggle_off(uid).await?;
		self.emit(EventAction::ToggleOff, EventScope::Feature, uid).await
	}

	pub async fn toggle_on_group(&self, group: &str) -> TgResult<()> {
		self.check_global(access::FEATURE_TOGGLE)?;
		self.features.toggle_on_group(group).await?;
		self.emit(EventAction::ToggleOn, EventScope::FeatureGroup, group).await
	}

	pub async fn toggle_off_group(&self, group: &str) -> TgResult<()> {
		self.check_global(access::FEATURE_TOGGLE)?;
		self.features.toggle_off_group(group).await?;
		self.emit(EventAction::ToggleOff, EventScope::FeatureGroup, group).await
	}

	pub async fn add_to_group(&self, uid: &str, group: &str) -> TgResult<()> {
		let acl = self.feature_acl(uid).await?;
		self.check(access::FEATURE_UPDATE, &acl)?;
		self.features.add_to_group(uid, group).await?;
		self.emit(EventAction::AddToGroup, EventScope::Feature, uid).await
	}

	pub async fn remove_from_group(&self, uid: &str) -> TgResult<()> {
		let acl = self.feature_acl(uid).await?;
		self.check(access::FEATURE_UPDATE, &acl)?;
		self.features.remove_from_group(uid).await?;
		self.emit(EventAction::RemoveFromGroup, EventScope::Feature, uid).await
	}

	// Property mutations //
	//********************//

	pub async fn create_property(&self, property: &Property) -> TgResult<()> {
		self.check_global(access::PROPERTY_EDIT)?;
		self.properties.save(property).await?;
		self.emit(EventAction::Create, EventScope::Property, property.uid()).await
	}

	/// Replaces an existing property; unknown uid is `NotFound`
	pub async fn update_property(&self, property: &Property) -> TgResult<()> {
		self.check_global(access::PROPERTY_EDIT)?;
		if !self.properties.exists(property.uid()).await? {
			return Err(Error::not_found("property", property.uid()));
		}
		self.properties.save(property).await?;
		self.emit(EventAction::Update, EventScope::Property, property.uid()).await
	}

	pub async fn update_property_value(&self, uid: &str, raw: &str) -> TgResult<()> {
		self.check_global(access::PROPERTY_EDIT)?;
		self.properties.update_value(uid, raw).await?;
		self.emit(EventAction::Update, EventScope::Property, uid).await
	}

	pub async fn delete_property(&self, uid: &str) -> TgResult<()> {
		self.check_global(access::PROPERTY_EDIT)?;
		self.properties.delete(uid).await?;
		self.emit(EventAction::Delete, EventScope::Property, uid).await
	}

	// Role / user mutations //
	//***********************//

	pub async fn create_role(&self, role: &Role) -> TgResult<()> {
		self.check_global(access::ROLE_ADMIN)?;
		self.roles.save(role).await?;
		self.emit(EventAction::Create, EventScope::Role, &role.uid).await
	}

	/// Replaces an existing role; unknown uid is `NotFound`
	pub async fn update_role(&self, role: &Role) -> TgResult<()> {
		self.check_global(access::ROLE_ADMIN)?;
		if !self.roles.exists(&role.uid).await? {
			return Err(Error::not_found("role", &role.uid));
		}
		self.roles.save(role).await?;
		self.emit(EventAction::Update, EventScope::Role, &role.uid).await
	}

	pub async fn delete_role(&self, uid: &str) -> TgResult<()> {
		self.check_global(access::ROLE_ADMIN)?;
		self.roles.delete(uid).await?;
		self.emit(EventAction::Delete, EventScope::Role, uid).await
	}

	pub async fn create_user(&self, user: &User) -> TgResult<()> {
		self.check_global(access::USER_ADMIN)?;
		self.users.save(user).await?;
		self.emit(EventAction::Create, EventScope::User, &user.uid).await
	}

	/// Replaces an existing user; unknown uid is `NotFound`
	pub async fn update_user(&self, user: &User) -> TgResult<()> {
		self.check_global(access::USER_ADMIN)?;
		if !self.users.exists(&user.uid).await? {
			return Err(Error::not_found("user", &user.uid));
		}
		self.users.save(user).await?;
		self.emit(EventAction::Update, EventScope::User, &user.uid).await
	}

	pub async fn delete_user(&self, uid: &str) -> TgResult<()> {
		self.check_global(access::USER_ADMIN)?;
		self.users.delete(uid).await?;
		self.emit(EventAction::Delete, EventScope::User, uid).await
	}

	// Configuration //
	//***************//

	/// Bulk-load a parsed configuration into the repositories and adopt its
	/// audit/autocreate flags. A bulk load is not a user mutation; it emits
	/// no events and bypasses the guard.
	pub async fn apply_configuration(&mut self, config: &Configuration) -> TgResult<()> {
		for role in config.roles.values() {
			self.roles.save(role).await?;
		}
		for user in config.users.values() {
			self.users.save(user).await?;
		}
		for property in config.properties.values() {
			self.properties.save(property).await?;
		}
		for feature in config.features.values() {
			self.features.save(feature).await?;
		}
		self.audit = config.audit;
		self.auto_create = config.auto_create;
		info!(
			features = config.features.len(),
			properties = config.properties.len(),
			"configuration applied"
		);
		Ok(())
	}

	/// Assemble a configuration from the repositories, e.g. for export
	/// through the codec. Independent of which backend populated them.
	pub async fn snapshot_configuration(&self) -> TgResult<Configuration> {
		let mut config =
			Configuration { audit: self.audit, auto_create: self.auto_create, ..Configuration::default() };
		for role in self.roles.find_all().await? {
			config.add_role(role);
		}
		for user in self.users.find_all().await? {
			config.add_user(user);
		}
		for property in self.properties.find_all().await? {
			config.add_property(property);
		}
		for feature in self.features.find_all().await? {
			config.add_feature(feature);
		}
		Ok(config)
	}
}

// vim: ts=4
