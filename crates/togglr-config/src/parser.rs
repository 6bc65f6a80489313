//! Document → Configuration.

use togglr_types::access::{Role, User};
use togglr_types::configuration::Configuration;
use togglr_types::feature::Feature;
use togglr_types::prelude::*;
use togglr_types::property::PropertyRegistry;

use crate::doc::{self, DocumentRoot, FeatureDoc, RoleDoc, UserDoc};

/// Parse a configuration document.
///
/// Sections are read in order: audit flag, autocreate flag, roles, users,
/// global properties, features. Missing top-level sections are empty, not
/// errors; missing mandatory per-entity fields abort the whole parse.
pub fn parse(document: &str, registry: &PropertyRegistry) -> TgResult<Configuration> {
	let root: DocumentRoot = serde_json::from_str(document)?;
	let doc = root.togglr;

	let mut config = Configuration {
		audit: doc.audit.unwrap_or(false),
		auto_create: doc.autocreate.unwrap_or(false),
		..Configuration::default()
	};

	for role_doc in doc.roles.iter().flatten() {
		config.add_role(parse_role(role_doc)?);
	}
	for user_doc in doc.users.iter().flatten() {
		config.add_user(parse_user(user_doc)?);
	}
	for prop_doc in doc.properties.iter().flatten() {
		config.add_property(doc::property_from_doc(registry, prop_doc)?);
	}
	for feature_doc in doc.features.iter().flatten() {
		config.add_feature(parse_feature(feature_doc, registry)?);
	}

	debug!(
		roles = config.roles.len(),
		users = config.users.len(),
		properties = config.properties.len(),
		features = config.features.len(),
		"configuration parsed"
	);
	Ok(config)
}

fn parse_role(doc: &RoleDoc) -> TgResult<Role> {
	let name =
		doc.name.as_deref().ok_or(Error::MissingField { entity: "role", field: "name" })?;
	let permissions = doc
		.permissions
		.as_ref()
		.ok_or(Error::MissingField { entity: "role", field: "permissions" })?;

	let mut role = Role::new(name);
	role.permissions = permissions.iter().cloned().collect();
	Ok(role)
}

fn parse_user(doc: &UserDoc) -> TgResult<User> {
	let uid = doc.uid.as_deref().ok_or(Error::MissingField { entity: "user", field: "uid" })?;

	let mut user = User::new(uid);
	user.first_name = doc.firstname.clone();
	user.last_name = doc.lastname.clone();
	user.description = doc.description.clone();
	user.roles = doc.roles.iter().flatten().cloned().collect();
	user.permissions = doc.permissions.iter().flatten().cloned().collect();
	Ok(user)
}

fn parse_feature(doc: &FeatureDoc, registry: &PropertyRegistry) -> TgResult<Feature> {
	let uid =
		doc.uid.as_deref().ok_or(Error::MissingField { entity: "feature", field: "uid" })?;

	let mut feature = Feature::new(uid);
	feature.enabled = doc.enable.unwrap_or(false);
	feature.description = doc.description.clone();
	feature.group = doc.group_name.clone();

	for prop_doc in doc.properties.iter().flatten() {
		let property = doc::property_from_doc(registry, prop_doc)?;
		feature.properties.insert(property.uid().into(), property);
	}
	for strategy_doc in doc.toggle_strategies.iter().flatten() {
		feature.toggle_strategies.push(doc::strategy_from_doc(registry, uid, strategy_doc)?);
	}
	if let Some(permissions) = &doc.permissions {
		feature.acl = doc::acl_from_docs(permissions)?;
	}

	Ok(feature)
}

#[cfg(test)]
mod tests {
	use super::*;
	use togglr_types::property::{KIND_INT, PropertyValue};

	fn registry() -> PropertyRegistry {
		PropertyRegistry::default()
	}

	#[test]
	fn test_empty_document() {
		let config = parse(r#"{"togglr": {}}"#, &registry()).expect("parses");
		assert_eq!(config, Configuration::default());
	}

	#[test]
	fn test_missing_sections_are_empty() {
		let config = parse(r#"{"togglr": {"audit": true}}"#, &registry()).expect("parses");
		assert!(config.audit);
		assert!(!config.auto_create);
		assert!(config.features.is_empty());
		assert!(config.roles.is_empty());
	}

	#[test]
	fn test_feature_with_typed_property() {
		let config = parse(
			r#"{"togglr": {"features": [{
				"uid": "flag-A",
				"enable": true,
				"properties": [
					{"name": "threshold", "type": "int", "value": "10", "fixedValues": [5, 10, 15]}
				]
			}]}}"#,
			&registry(),
		)
		.expect("parses");

		let feature = &config.features["flag-A"];
		assert!(feature.enabled);
		let prop = &feature.properties["threshold"];
		assert_eq!(prop.kind(), KIND_INT);
		assert_eq!(prop.value(), &PropertyValue::Int(10));
	}

	#[test]
	fn test_role_missing_permissions_is_fatal() {
		let err =
			parse(r#"{"togglr": {"roles": [{"name": "admin"}]}}"#, &registry()).unwrap_err();
		match err {
			Error::MissingField { entity, field } => {
				assert_eq!(entity, "role");
				assert_eq!(field, "permissions");
			}
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn test_property_missing_value_is_fatal() {
		let err = parse(
			r#"{"togglr": {"properties": [{"name": "a"}]}}"#,
			&registry(),
		)
		.unwrap_err();
		match err {
			Error::MissingField { entity, field } => {
				assert_eq!(entity, "property");
				assert_eq!(field, "value");
			}
			other => panic!("unexpected error: {:?}", other),
		}
	}

	#[test]
	fn test_unknown_property_type_aborts_parse() {
		let err = parse(
			r#"{"togglr": {"properties": [{"name": "a", "type": "not.a.real.Type", "value": "1"}]}}"#,
			&registry(),
		)
		.unwrap_err();
		assert!(matches!(err, Error::PropertyType { .. }));
		assert!(err.to_string().contains("not.a.real.Type"));
	}

	#[test]
	fn test_strategy_requires_class() {
		let err = parse(
			r#"{"togglr": {"features": [{"uid": "f", "toggleStrategies": [{"properties": []}]}]}}"#,
			&registry(),
		)
		.unwrap_err();
		assert!(matches!(
			err,
			Error::MissingField { entity: "toggle strategy", field: "class" }
		));
	}

	#[test]
	fn test_feature_acl() {
		let config = parse(
			r#"{"togglr": {"features": [{
				"uid": "f",
				"permissions": [{"name": "FEATURE_TOGGLE", "roles": ["ops"], "users": ["alice"]}]
			}]}}"#,
			&registry(),
		)
		.expect("parses");

		let grantees = config.features["f"].acl.grantees("FEATURE_TOGGLE").expect("entry");
		assert!(grantees.roles.contains("ops"));
		assert!(grantees.users.contains("alice"));
	}
}

// vim: ts=4
