//! Features and their toggle-strategy bindings.

use std::collections::HashMap;

use crate::access::Acl;
use crate::property::Property;

/// A named capability with a static enabled flag and optional pluggable
/// toggle logic. The uid is immutable once set.
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
	uid: Box<str>,
	pub enabled: bool,
	pub description: Option<Box<str>>,
	pub group: Option<Box<str>>,
	/// Feature-local properties, keyed by uid
	pub properties: HashMap<Box<str>, Property>,
	/// Ordered list; combining their decisions is the caller's policy
	pub toggle_strategies: Vec<ToggleStrategy>,
	pub acl: Acl,
}

impl Feature {
	pub fn new(uid: &str) -> Self {
		Self {
			uid: uid.into(),
			enabled: false,
			description: None,
			group: None,
			properties: HashMap::new(),
			toggle_strategies: Vec::new(),
			acl: Acl::default(),
		}
	}

	pub fn uid(&self) -> &str {
		&self.uid
	}

	pub fn enable(mut self) -> Self {
		self.enabled = true;
		self
	}

	pub fn with_group(mut self, group: &str) -> Self {
		self.group = Some(group.into());
		self
	}

	pub fn with_property(mut self, property: Property) -> Self {
		self.properties.insert(property.uid().into(), property);
		self
	}

	pub fn with_strategy(mut self, strategy: ToggleStrategy) -> Self {
		self.toggle_strategies.push(strategy);
		self
	}

	pub fn in_group(&self, group: &str) -> bool {
		self.group.as_deref() == Some(group)
	}
}

/// A toggle-strategy binding: a feature, a strategy kind, and the property
/// bag configuring it. This is a binding, not an evaluator — evaluation is
/// a pure function of `(bag, context)` living with the strategy registry.
#[derive(Clone, Debug, PartialEq)]
pub struct ToggleStrategy {
	/// Owner reference; the feature owns the strategy
	pub feature_uid: Box<str>,
	/// Strategy identifier resolved by the strategy registry
	pub kind: Box<str>,
	pub properties: HashMap<Box<str>, Property>,
}

impl ToggleStrategy {
	pub fn new(feature_uid: &str, kind: &str) -> Self {
		Self { feature_uid: feature_uid.into(), kind: kind.into(), properties: HashMap::new() }
	}

	pub fn with_property(mut self, property: Property) -> Self {
		self.properties.insert(property.uid().into(), property);
		self
	}
}

// vim: ts=4
