//! Hub facade tests: guard → mutate → exactly one audit event.

use std::sync::Arc;

use togglr_core::access::{self, SecurityContext};
use togglr_core::audit::{AuditEmitter, MemorySink};
use togglr_core::hub::FlagHub;
use togglr_core::mem::{MemFeatureRepository, MemPropertyRepository, MemRepository};
use togglr_core::strategy::{EvalContext, StrategyPolicy};
use togglr_types::access::{Role, User};
use togglr_types::error::Error;
use togglr_types::event::{EventAction, EventScope};
use togglr_types::feature::Feature;
use togglr_types::property::{Property, PropertyRegistry};

fn hub_with_sink() -> (FlagHub, Arc<MemorySink>) {
	let sink = Arc::new(MemorySink::default());
	let registry = Arc::new(PropertyRegistry::default());
	let hub = FlagHub::new(
		Arc::new(MemFeatureRepository::new()),
		Arc::new(MemPropertyRepository::new(registry)),
		Arc::new(MemRepository::<Role>::new()),
		Arc::new(MemRepository::<User>::new()),
		StrategyPolicy::AllMustPass,
	)
	.with_emitter(AuditEmitter::best_effort().with_sink(sink.clone()));
	(hub, sink)
}

#[tokio::test]
async fn test_create_role_emits_one_event() {
	let (hub, sink) = hub_with_sink();

	hub.create_role(&Role::new("admin")).await.expect("create");

	let events = sink.events();
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].action, EventAction::Create);
	assert_eq!(events[0].scope, EventScope::Role);
	assert_eq!(events[0].entity_ref.as_ref(), "admin");
}

#[tokio::test]
async fn test_toggle_emits_after_mutation() {
	let (hub, sink) = hub_with_sink();
	hub.create_feature(&Feature::new("f")).await.expect("create");

	hub.toggle_on("f").await.expect("toggle");
	assert!(hub.features().find("f").await.expect("find").expect("present").enabled);

	let actions: Vec<_> = sink.events().into_iter().map(|e| e.action).collect();
	assert_eq!(actions, vec![EventAction::Create, EventAction::ToggleOn]);
}

#[tokio::test]
async fn test_toggle_unknown_feature_is_not_found_and_silent() {
	let (hub, sink) = hub_with_sink();

	assert!(matches!(hub.toggle_on("ghost").await, Err(Error::NotFound { .. })));
	assert!(sink.events().is_empty(), "failed mutation must not emit");
}

#[tokio::test]
async fn test_guard_denies_before_mutation() {
	let (hub, sink) = hub_with_sink();
	let hub = hub.with_security(SecurityContext::new(User::new("bob")));

	let err = hub.create_feature(&Feature::new("f")).await.unwrap_err();
	assert!(matches!(err, Error::PermissionDenied { .. }));
	assert_eq!(hub.features().count().await.expect("count"), 0, "store untouched");
	assert!(sink.events().is_empty());
}

#[tokio::test]
async fn test_role_grant_allows_toggle_on_any_feature() {
	let (hub, _sink) = hub_with_sink();
	hub.create_feature(&Feature::new("f")).await.expect("create");

	// empty feature-level ACL; the grant comes from the role
	let security = SecurityContext::new(User::new("alice").with_role("ops"))
		.with_role(Role::new("ops").grant(access::FEATURE_TOGGLE));
	let hub = hub.with_security(security);

	hub.toggle_on("f").await.expect("granted via role");
}

#[tokio::test]
async fn test_acl_grant_allows_only_listed_user() {
	let (hub, _sink) = hub_with_sink();
	let mut feature = Feature::new("f");
	feature.acl.grant_user(access::FEATURE_TOGGLE, "alice");
	hub.create_feature(&feature).await.expect("create");

	let alice = hub_clone_security(&hub, "alice");
	alice.toggle_on("f").await.expect("alice is in the ACL");

	let bob = hub_clone_security(&alice, "bob");
	assert!(matches!(bob.toggle_off("f").await, Err(Error::PermissionDenied { .. })));
}

// rebuilds the hub with a different acting user; the feature store is shared
fn hub_clone_security(hub: &FlagHub, user: &str) -> FlagHub {
	let registry = Arc::new(PropertyRegistry::default());
	FlagHub::new(
		hub.features().clone(),
		Arc::new(MemPropertyRepository::new(registry)),
		Arc::new(MemRepository::<Role>::new()),
		Arc::new(MemRepository::<User>::new()),
		StrategyPolicy::AllMustPass,
	)
	.with_security(SecurityContext::new(User::new(user)))
	.with_emitter(AuditEmitter::best_effort())
}

#[tokio::test]
async fn test_auto_create_registers_disabled_feature() {
	let (hub, sink) = hub_with_sink();
	let hub = hub.with_auto_create(true);

	let active = hub.is_active("brand-new", &EvalContext::new()).await.expect("auto-creates");
	assert!(!active);
	assert!(hub.features().exists("brand-new").await.expect("exists"));

	let events = sink.events();
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].action, EventAction::Create);
	assert_eq!(events[0].scope, EventScope::Feature);
}

#[tokio::test]
async fn test_is_active_without_auto_create_is_not_found() {
	let (hub, _sink) = hub_with_sink();
	assert!(hub.is_active("ghost", &EvalContext::new()).await.is_err());
}

#[tokio::test]
async fn test_group_toggle_emits_group_scope() {
	let (hub, sink) = hub_with_sink();
	hub.create_feature(&Feature::new("a").with_group("g")).await.expect("create");
	hub.create_feature(&Feature::new("b").with_group("g")).await.expect("create");

	hub.toggle_on_group("g").await.expect("toggle group");

	let last = sink.events().pop().expect("event");
	assert_eq!(last.action, EventAction::ToggleOn);
	assert_eq!(last.scope, EventScope::FeatureGroup);
	assert_eq!(last.entity_ref.as_ref(), "g");
}

#[tokio::test]
async fn test_role_update_emits_update_not_create() {
	let (hub, sink) = hub_with_sink();

	hub.create_role(&Role::new("admin")).await.expect("create");
	hub.update_role(&Role::new("admin").grant("P")).await.expect("update");

	let events = sink.events();
	let actions: Vec<_> = events.iter().map(|e| e.action).collect();
	assert_eq!(actions, vec![EventAction::Create, EventAction::Update]);
	assert_eq!(events[1].scope, EventScope::Role);
}

#[tokio::test]
async fn test_update_unknown_role_or_user_is_not_found_and_silent() {
	let (hub, sink) = hub_with_sink();

	assert!(matches!(
		hub.update_role(&Role::new("ghost")).await,
		Err(Error::NotFound { scope: "role", .. })
	));
	assert!(matches!(
		hub.update_user(&User::new("ghost")).await,
		Err(Error::NotFound { scope: "user", .. })
	));
	assert!(sink.events().is_empty(), "failed update must not emit");
}

#[tokio::test]
async fn test_user_update_emits_update() {
	let (hub, sink) = hub_with_sink();

	hub.create_user(&User::new("alice")).await.expect("create");
	hub.update_user(&User::new("alice").with_role("ops")).await.expect("update");

	let last = sink.events().pop().expect("event");
	assert_eq!(last.action, EventAction::Update);
	assert_eq!(last.scope, EventScope::User);
	assert_eq!(last.entity_ref.as_ref(), "alice");
}

#[tokio::test]
async fn test_property_replacement_emits_update() {
	let (hub, sink) = hub_with_sink();
	let registry = PropertyRegistry::default();

	let prop = Property::build(&registry, "env", "string", "staging").expect("builds");
	hub.create_property(&prop).await.expect("create");

	let replacement = Property::build(&registry, "env", "string", "prod").expect("builds");
	hub.update_property(&replacement).await.expect("update");

	let actions: Vec<_> = sink.events().into_iter().map(|e| e.action).collect();
	assert_eq!(actions, vec![EventAction::Create, EventAction::Update]);

	assert!(matches!(
		hub.update_property(&Property::build(&registry, "ghost", "string", "x").expect("builds"))
			.await,
		Err(Error::NotFound { scope: "property", .. })
	));
}

#[tokio::test]
async fn test_audit_flag_off_mutes_events() {
	let (hub, sink) = hub_with_sink();
	let hub = hub.with_audit(false);

	hub.create_role(&Role::new("admin")).await.expect("create");
	assert!(sink.events().is_empty());
}
