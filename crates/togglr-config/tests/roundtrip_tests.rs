//! Round-trip tests: parse(export(c)) == c by value.

use togglr_config::{export, parse};
use togglr_types::access::{Role, User};
use togglr_types::configuration::Configuration;
use togglr_types::feature::{Feature, ToggleStrategy};
use togglr_types::property::{Property, PropertyRegistry, PropertyValue};

fn roundtrip(config: &Configuration) -> Configuration {
	let registry = PropertyRegistry::default();
	let doc = export(config).expect("export");
	parse(&doc, &registry).expect("parse of own export")
}

#[test]
fn test_empty_configuration() {
	let config = Configuration::default();
	assert_eq!(roundtrip(&config), config);
}

#[test]
fn test_flags_only() {
	let config = Configuration { audit: true, auto_create: true, ..Configuration::default() };
	assert_eq!(roundtrip(&config), config);
}

#[test]
fn test_full_configuration() {
	let registry = PropertyRegistry::default();
	let mut config = Configuration { audit: true, ..Configuration::default() };

	config.add_role(Role::new("admin").grant("FEATURE_TOGGLE").grant("FEATURE_CREATE"));
	config.add_role(Role::new("viewer").grant("FEATURE_VIEW"));

	let mut alice = User::new("alice").with_role("admin").grant("PROPERTY_UPDATE");
	alice.first_name = Some("Alice".into());
	alice.description = Some("owns the rollout".into());
	config.add_user(alice);
	config.add_user(User::new("bob").with_role("viewer"));

	config.add_property(
		Property::build(&registry, "env", "string", "staging")
			.expect("builds")
			.with_description("deployment environment"),
	);
	config.add_property(
		Property::build_with_fixed(&registry, "retries", "int", "3", ["1", "3", "5"])
			.expect("builds"),
	);

	let mut feature = Feature::new("checkout-v2")
		.enable()
		.with_group("payments")
		.with_property(
			Property::build_with_fixed(&registry, "threshold", "int", "10", ["5", "10", "15"])
				.expect("builds"),
		)
		.with_strategy(
			ToggleStrategy::new("checkout-v2", "releaseDate").with_property(
				Property::build(&registry, "date", "date", "2026-09-01T00:00:00Z").expect("builds"),
			),
		);
	feature.description = Some("new checkout flow".into());
	feature.acl.grant_role("FEATURE_TOGGLE", "admin");
	feature.acl.grant_user("FEATURE_TOGGLE", "alice");
	config.add_feature(feature);

	// a feature with no strategies and no ACL entries
	config.add_feature(Feature::new("dark-mode"));

	assert_eq!(roundtrip(&config), config);
}

#[test]
fn test_scenario_flag_a() {
	let registry = PropertyRegistry::default();
	let doc = r#"{"togglr": {"features": [{
		"uid": "flag-A",
		"enable": true,
		"properties": [
			{"name": "threshold", "type": "int", "value": "10", "fixedValues": [5, 10, 15]}
		]
	}]}}"#;

	let config = parse(doc, &registry).expect("parses");
	let feature = &config.features["flag-A"];
	assert!(feature.enabled);
	assert_eq!(feature.properties.len(), 1);
	assert_eq!(feature.properties["threshold"].value(), &PropertyValue::Int(10));

	let exported = export(&config).expect("export");
	let reparsed = parse(&exported, &registry).expect("reparse");
	assert_eq!(reparsed.features["flag-A"], config.features["flag-A"]);
}

#[test]
fn test_double_roundtrip_is_stable() {
	let registry = PropertyRegistry::default();
	let mut config = Configuration::default();
	config.add_property(Property::build(&registry, "pi", "double", "3.25").expect("builds"));
	config.add_feature(Feature::new("f").enable());

	let once = export(&config).expect("export");
	let twice = export(&parse(&once, &registry).expect("parse")).expect("export");
	assert_eq!(once, twice, "export must be deterministic across round trips");
}
