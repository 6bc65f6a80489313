//! Permission grant resolution.
//!
//! Resolution order for `(user, permission, feature ACL)`:
//! 1. direct grant on the user
//! 2. grant on any of the user's roles
//! 3. the feature ACL lists the user's uid or one of their role uids
//! 4. denied
//!
//! Permissions are opaque tokens; dangling grantee ids never grant and
//! never error.

use std::collections::HashMap;

use togglr_types::access::{Acl, Role, User};
use togglr_types::prelude::*;

// Default permission tokens the hub checks on protected operations. The
// token set itself is externally defined; these are just the names the hub
// uses when nothing else is configured.
pub const FEATURE_CREATE: &str = "FEATURE_CREATE";
pub const FEATURE_UPDATE: &str = "FEATURE_UPDATE";
pub const FEATURE_DELETE: &str = "FEATURE_DELETE";
pub const FEATURE_TOGGLE: &str = "FEATURE_TOGGLE";
pub const PROPERTY_EDIT: &str = "PROPERTY_EDIT";
pub const ROLE_ADMIN: &str = "ROLE_ADMIN";
pub const USER_ADMIN: &str = "USER_ADMIN";

/// The four-step grant resolution. `roles` maps role uid to the role; a
/// role uid without an entry simply contributes nothing.
pub fn is_granted(
	user: &User,
	roles: &HashMap<Box<str>, Role>,
	permission: &str,
	acl: &Acl,
) -> bool {
	if user.permissions.contains(permission) {
		return true;
	}
	if user
		.roles
		.iter()
		.filter_map(|uid| roles.get(uid))
		.any(|role| role.permissions.contains(permission))
	{
		return true;
	}
	if let Some(grantees) = acl.grantees(permission) {
		if grantees.users.contains(&user.uid) {
			return true;
		}
		if user.roles.iter().any(|uid| grantees.roles.contains(uid)) {
			return true;
		}
	}
	false
}

/// The acting user together with the resolved role table, as seen by the
/// hub when it guards a mutation.
#[derive(Clone, Debug)]
pub struct SecurityContext {
	pub user: User,
	pub roles: HashMap<Box<str>, Role>,
}

impl SecurityContext {
	pub fn new(user: User) -> Self {
		Self { user, roles: HashMap::new() }
	}

	pub fn with_role(mut self, role: Role) -> Self {
		self.roles.insert(role.uid.clone(), role);
		self
	}

	/// `PermissionDenied` before the mutation is attempted
	pub fn check(&self, permission: &str, acl: &Acl) -> TgResult<()> {
		if is_granted(&self.user, &self.roles, permission, acl) {
			Ok(())
		} else {
			warn!(user = %self.user.uid, permission, "permission denied");
			Err(Error::PermissionDenied { permission: permission.into() })
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_direct_grant() {
		let user = User::new("alice").grant("P");
		assert!(is_granted(&user, &HashMap::new(), "P", &Acl::default()));
		assert!(!is_granted(&user, &HashMap::new(), "Q", &Acl::default()));
	}

	#[test]
	fn test_role_grant_with_empty_acl() {
		let user = User::new("alice").with_role("ops");
		let mut roles = HashMap::new();
		roles.insert(Box::from("ops"), Role::new("ops").grant("P"));

		assert!(is_granted(&user, &roles, "P", &Acl::default()));
	}

	#[test]
	fn test_acl_grant_by_user_and_role() {
		let user = User::new("alice").with_role("ops");
		let roles = HashMap::new();

		let mut acl = Acl::default();
		acl.grant_user("P", "alice");
		assert!(is_granted(&user, &roles, "P", &acl));

		let mut acl = Acl::default();
		acl.grant_role("P", "ops");
		assert!(is_granted(&user, &roles, "P", &acl));
	}

	#[test]
	fn test_denied_when_nothing_matches() {
		let user = User::new("bob").with_role("viewer");
		let mut roles = HashMap::new();
		roles.insert(Box::from("viewer"), Role::new("viewer").grant("OTHER"));

		let mut acl = Acl::default();
		acl.grant_user("P", "alice");
		acl.grant_role("P", "ops");

		assert!(!is_granted(&user, &roles, "P", &acl));
	}

	#[test]
	fn test_dangling_role_uid_never_grants() {
		let user = User::new("bob").with_role("gone");
		let mut acl = Acl::default();
		acl.grant_role("P", "also-gone");

		assert!(!is_granted(&user, &HashMap::new(), "P", &acl));
	}
}

// vim: ts=4
