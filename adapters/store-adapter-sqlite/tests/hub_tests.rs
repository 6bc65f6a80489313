//! Full-stack tests: document codec feeding a hub backed by the SQLite
//! store, and a snapshot exported back out.

use std::sync::Arc;

use tempfile::TempDir;
use togglr_config::{export, parse};
use togglr_core::audit::{AuditEmitter, MemorySink};
use togglr_core::hub::FlagHub;
use togglr_core::strategy::{EvalContext, StrategyPolicy};
use togglr_store_adapter_sqlite::SqliteStore;
use togglr_types::event::{EventAction, EventScope};
use togglr_types::property::PropertyRegistry;

const DOC: &str = r#"{"togglr": {
	"audit": true,
	"autocreate": false,
	"roles": [{"name": "ops", "permissions": ["FEATURE_TOGGLE"]}],
	"users": [{"uid": "alice", "roles": ["ops"]}],
	"properties": [{"name": "env", "value": "staging"}],
	"features": [{
		"uid": "flag-A",
		"enable": true,
		"groupName": "rollout",
		"properties": [
			{"name": "threshold", "type": "int", "value": "10", "fixedValues": [5, 10, 15]}
		],
		"toggleStrategies": [{"class": "releaseDate", "properties": [
			{"name": "date", "type": "date", "value": "2000-01-01T00:00:00Z"}
		]}]
	}]
}}"#;

async fn hub_over_sqlite(temp_dir: &TempDir) -> (FlagHub, Arc<MemorySink>) {
	let registry = Arc::new(PropertyRegistry::default());
	let store = SqliteStore::new(registry, temp_dir.path().join("store.db"))
		.await
		.expect("Failed to create store");
	let sink = Arc::new(MemorySink::default());
	let hub = FlagHub::new(
		Arc::new(store.features()),
		Arc::new(store.properties()),
		Arc::new(store.roles()),
		Arc::new(store.users()),
		StrategyPolicy::AllMustPass,
	)
	.with_emitter(AuditEmitter::best_effort().with_sink(sink.clone()));
	(hub, sink)
}

#[tokio::test]
async fn test_parse_apply_snapshot_export_roundtrip() {
	let temp_dir = TempDir::new().expect("temp dir");
	let (mut hub, _sink) = hub_over_sqlite(&temp_dir).await;
	let registry = PropertyRegistry::default();

	let config = parse(DOC, &registry).expect("parse");
	hub.apply_configuration(&config).await.expect("apply");

	let snapshot = hub.snapshot_configuration().await.expect("snapshot");
	assert_eq!(snapshot, config, "repositories reproduce the parsed model");

	let doc = export(&snapshot).expect("export");
	assert_eq!(parse(&doc, &registry).expect("reparse"), config);
}

#[tokio::test]
async fn test_evaluation_against_sqlite_backed_feature() {
	let temp_dir = TempDir::new().expect("temp dir");
	let (mut hub, _sink) = hub_over_sqlite(&temp_dir).await;
	let registry = PropertyRegistry::default();

	hub.apply_configuration(&parse(DOC, &registry).expect("parse")).await.expect("apply");

	// enabled and the release date is long past
	assert!(hub.is_active("flag-A", &EvalContext::new()).await.expect("evaluates"));

	hub.toggle_off("flag-A").await.expect("toggle off");
	assert!(!hub.is_active("flag-A", &EvalContext::new()).await.expect("evaluates"));
}

#[tokio::test]
async fn test_mutation_emits_against_sqlite_store() {
	let temp_dir = TempDir::new().expect("temp dir");
	let (mut hub, sink) = hub_over_sqlite(&temp_dir).await;
	let registry = PropertyRegistry::default();

	hub.apply_configuration(&parse(DOC, &registry).expect("parse")).await.expect("apply");
	assert!(sink.events().is_empty(), "bulk load emits nothing");

	hub.toggle_off_group("rollout").await.expect("toggle group");

	let events = sink.events();
	assert_eq!(events.len(), 1);
	assert_eq!(events[0].action, EventAction::ToggleOff);
	assert_eq!(events[0].scope, EventScope::FeatureGroup);
	assert_eq!(events[0].entity_ref.as_ref(), "rollout");
}
