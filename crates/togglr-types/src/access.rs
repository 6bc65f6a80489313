//! Users, roles, and per-feature access-control lists.
//!
//! Permissions are opaque, totally-ordered string tokens; there is no
//! hierarchy and no partial grant. Grantee ids in an [`Acl`] are not checked
//! against the actual role/user tables: a dangling id simply never grants.

use std::collections::{BTreeMap, BTreeSet};

/// A named set of granted permissions
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Role {
	pub uid: Box<str>,
	pub permissions: BTreeSet<Box<str>>,
}

impl Role {
	pub fn new(uid: &str) -> Self {
		Self { uid: uid.into(), permissions: BTreeSet::new() }
	}

	pub fn grant(mut self, permission: &str) -> Self {
		self.permissions.insert(permission.into());
		self
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct User {
	pub uid: Box<str>,
	pub first_name: Option<Box<str>>,
	pub last_name: Option<Box<str>>,
	pub description: Option<Box<str>>,
	/// Uids of roles assigned to this user
	pub roles: BTreeSet<Box<str>>,
	/// Direct permission grants, independent of any role
	pub permissions: BTreeSet<Box<str>>,
}

impl User {
	pub fn new(uid: &str) -> Self {
		Self { uid: uid.into(), ..Self::default() }
	}

	pub fn with_role(mut self, role_uid: &str) -> Self {
		self.roles.insert(role_uid.into());
		self
	}

	pub fn grant(mut self, permission: &str) -> Self {
		self.permissions.insert(permission.into());
		self
	}
}

/// Users and roles allowed a single permission
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grantees {
	pub users: BTreeSet<Box<str>>,
	pub roles: BTreeSet<Box<str>>,
}

impl Grantees {
	pub fn is_empty(&self) -> bool {
		self.users.is_empty() && self.roles.is_empty()
	}
}

/// Per-feature mapping from permission to its grantees
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Acl {
	pub permissions: BTreeMap<Box<str>, Grantees>,
}

impl Acl {
	pub fn is_empty(&self) -> bool {
		self.permissions.is_empty()
	}

	pub fn grant_user(&mut self, permission: &str, user_uid: &str) {
		self.permissions.entry(permission.into()).or_default().users.insert(user_uid.into());
	}

	pub fn grant_role(&mut self, permission: &str, role_uid: &str) {
		self.permissions.entry(permission.into()).or_default().roles.insert(role_uid.into());
	}

	pub fn grantees(&self, permission: &str) -> Option<&Grantees> {
		self.permissions.get(permission)
	}
}

// vim: ts=4
