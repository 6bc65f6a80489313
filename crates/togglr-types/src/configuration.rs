//! The root configuration aggregate.

use std::collections::HashMap;

use crate::access::{Role, User};
use crate::feature::Feature;
use crate::property::Property;

/// Root aggregate built by the codec or assembled from repositories. Has no
/// persistence of its own; equality is by value, which is what the
/// round-trip contract compares.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Configuration {
	pub audit: bool,
	pub auto_create: bool,
	pub roles: HashMap<Box<str>, Role>,
	pub users: HashMap<Box<str>, User>,
	/// Global properties, independent of any feature
	pub properties: HashMap<Box<str>, Property>,
	pub features: HashMap<Box<str>, Feature>,
}

impl Configuration {
	pub fn add_role(&mut self, role: Role) {
		self.roles.insert(role.uid.clone(), role);
	}

	pub fn add_user(&mut self, user: User) {
		self.users.insert(user.uid.clone(), user);
	}

	pub fn add_property(&mut self, property: Property) {
		self.properties.insert(property.uid().into(), property);
	}

	pub fn add_feature(&mut self, feature: Feature) {
		self.features.insert(feature.uid().into(), feature);
	}
}

// vim: ts=4
