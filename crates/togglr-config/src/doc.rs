//! Serde document structures and their mapping to the domain model.
//!
//! These structs mirror the wire format; mandatory fields are `Option` so
//! that their absence surfaces as a `MissingField` error naming the field
//! instead of an opaque deserializer message. Store adapters reuse the
//! property/strategy/ACL docs for their JSON columns, so row hydration and
//! document parsing share one type-resolution path.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use togglr_types::access::{Acl, Grantees};
use togglr_types::feature::ToggleStrategy;
use togglr_types::prelude::*;
use togglr_types::property::{KIND_STR, Property, PropertyRegistry};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DocumentRoot {
	pub togglr: ConfigDoc,
}

#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigDoc {
	pub audit: Option<bool>,
	pub autocreate: Option<bool>,
	pub roles: Option<Vec<RoleDoc>>,
	pub users: Option<Vec<UserDoc>>,
	pub properties: Option<Vec<PropertyDoc>>,
	pub features: Option<Vec<FeatureDoc>>,
}

#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RoleDoc {
	pub name: Option<Box<str>>,
	pub permissions: Option<Vec<Box<str>>>,
}

#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UserDoc {
	pub uid: Option<Box<str>>,
	pub firstname: Option<Box<str>>,
	pub lastname: Option<Box<str>>,
	pub description: Option<Box<str>>,
	pub roles: Option<Vec<Box<str>>>,
	pub permissions: Option<Vec<Box<str>>>,
}

#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PropertyDoc {
	pub name: Option<Box<str>>,
	/// Scalar: JSON string, number, or boolean
	pub value: Option<serde_json::Value>,
	#[serde(rename = "type")]
	pub typ: Option<Box<str>>,
	pub description: Option<Box<str>>,
	#[serde(rename = "fixedValues")]
	pub fixed_values: Option<Vec<serde_json::Value>>,
}

#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FeatureDoc {
	pub uid: Option<Box<str>>,
	pub enable: Option<bool>,
	pub description: Option<Box<str>>,
	#[serde(rename = "groupName")]
	pub group_name: Option<Box<str>>,
	pub properties: Option<Vec<PropertyDoc>>,
	#[serde(rename = "toggleStrategies")]
	pub toggle_strategies: Option<Vec<StrategyDoc>>,
	pub permissions: Option<Vec<AclEntryDoc>>,
}

#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StrategyDoc {
	pub class: Option<Box<str>>,
	pub properties: Option<Vec<PropertyDoc>>,
}

#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AclEntryDoc {
	pub name: Option<Box<str>>,
	pub roles: Option<Vec<Box<str>>>,
	pub users: Option<Vec<Box<str>>>,
}

/// Canonicalize a scalar document value to the raw string a kind factory
/// consumes.
pub fn scalar_to_raw(value: &serde_json::Value) -> TgResult<Box<str>> {
	match value {
		serde_json::Value::String(s) => Ok(s.as_str().into()),
		serde_json::Value::Number(n) => Ok(n.to_string().into()),
		serde_json::Value::Bool(b) => Ok(b.to_string().into()),
		other => Err(Error::Parse(format!("property value must be a scalar, got {}", other).into())),
	}
}

pub fn property_from_doc(registry: &PropertyRegistry, doc: &PropertyDoc) -> TgResult<Property> {
	let name = doc
		.name
		.as_deref()
		.ok_or(Error::MissingField { entity: "property", field: "name" })?;
	let value = doc
		.value
		.as_ref()
		.ok_or(Error::MissingField { entity: "property", field: "value" })?;
	let raw = scalar_to_raw(value)?;
	let kind = doc.typ.as_deref().unwrap_or(KIND_STR);

	let mut property = match &doc.fixed_values {
		Some(fixed) if !fixed.is_empty() => {
			let raw_fixed =
				fixed.iter().map(scalar_to_raw).collect::<TgResult<Vec<_>>>()?;
			Property::build_with_fixed(registry, name, kind, &raw, raw_fixed)?
		}
		_ => Property::build(registry, name, kind, &raw)?,
	};
	property.description = doc.description.clone();
	Ok(property)
}

pub fn property_to_doc(property: &Property) -> PropertyDoc {
	PropertyDoc {
		name: Some(property.uid().into()),
		value: Some(serde_json::Value::String(property.canonical().into_string())),
		typ: Some(property.kind().into()),
		description: property.description.clone(),
		fixed_values: property.fixed_values().map(|set| {
			set.iter()
				.map(|v| serde_json::Value::String(v.canonical().into_string()))
				.collect()
		}),
	}
}

pub fn strategy_from_doc(
	registry: &PropertyRegistry,
	feature_uid: &str,
	doc: &StrategyDoc,
) -> TgResult<ToggleStrategy> {
	let class = doc
		.class
		.as_deref()
		.ok_or(Error::MissingField { entity: "toggle strategy", field: "class" })?;
	let mut strategy = ToggleStrategy::new(feature_uid, class);
	for prop_doc in doc.properties.iter().flatten() {
		let property = property_from_doc(registry, prop_doc)?;
		strategy.properties.insert(property.uid().into(), property);
	}
	Ok(strategy)
}

pub fn strategy_to_doc(strategy: &ToggleStrategy) -> StrategyDoc {
	let mut props: Vec<_> = strategy.properties.values().collect();
	props.sort_by(|a, b| a.uid().cmp(b.uid()));
	StrategyDoc {
		class: Some(strategy.kind.clone()),
		properties: Some(props.into_iter().map(property_to_doc).collect()),
	}
}

pub fn acl_from_docs(docs: &[AclEntryDoc]) -> TgResult<Acl> {
	let mut acl = Acl::default();
	for entry in docs {
		let name = entry
			.name
			.as_deref()
			.ok_or(Error::MissingField { entity: "permission", field: "name" })?;
		let grantees = acl.permissions.entry(name.into()).or_insert_with(Grantees::default);
		for role in entry.roles.iter().flatten() {
			grantees.roles.insert(role.clone());
		}
		for user in entry.users.iter().flatten() {
			grantees.users.insert(user.clone());
		}
	}
	Ok(acl)
}

pub fn acl_to_docs(acl: &Acl) -> Vec<AclEntryDoc> {
	acl.permissions
		.iter()
		.map(|(name, grantees)| AclEntryDoc {
			name: Some(name.clone()),
			roles: if grantees.roles.is_empty() {
				None
			} else {
				Some(grantees.roles.iter().cloned().collect())
			},
			users: if grantees.users.is_empty() {
				None
			} else {
				Some(grantees.users.iter().cloned().collect())
			},
		})
		.collect()
}

// vim: ts=4
