//! Configuration → document.
//!
//! The export mirrors the parse order: flags, roles, users, global
//! properties, features. Collections are emitted sorted by uid so exports
//! are deterministic; re-parsing an export yields a Configuration equal by
//! value to the original.

use togglr_types::access::{Role, User};
use togglr_types::configuration::Configuration;
use togglr_types::feature::Feature;
use togglr_types::prelude::*;

use crate::doc::{self, ConfigDoc, DocumentRoot, FeatureDoc, RoleDoc, UserDoc};

pub fn export(config: &Configuration) -> TgResult<String> {
	let mut roles: Vec<&Role> = config.roles.values().collect();
	roles.sort_by(|a, b| a.uid.cmp(&b.uid));

	let mut users: Vec<&User> = config.users.values().collect();
	users.sort_by(|a, b| a.uid.cmp(&b.uid));

	let mut properties: Vec<_> = config.properties.values().collect();
	properties.sort_by(|a, b| a.uid().cmp(b.uid()));

	let mut features: Vec<&Feature> = config.features.values().collect();
	features.sort_by(|a, b| a.uid().cmp(b.uid()));

	let doc = ConfigDoc {
		audit: Some(config.audit),
		autocreate: Some(config.auto_create),
		roles: non_empty(roles.into_iter().map(role_doc).collect()),
		users: non_empty(users.into_iter().map(user_doc).collect()),
		properties: non_empty(properties.into_iter().map(doc::property_to_doc).collect()),
		features: non_empty(features.into_iter().map(feature_doc).collect()),
	};

	Ok(serde_json::to_string_pretty(&DocumentRoot { togglr: doc })?)
}

fn non_empty<D>(items: Vec<D>) -> Option<Vec<D>> {
	if items.is_empty() { None } else { Some(items) }
}

fn role_doc(role: &Role) -> RoleDoc {
	RoleDoc {
		name: Some(role.uid.clone()),
		permissions: Some(role.permissions.iter().cloned().collect()),
	}
}

fn user_doc(user: &User) -> UserDoc {
	UserDoc {
		uid: Some(user.uid.clone()),
		firstname: user.first_name.clone(),
		lastname: user.last_name.clone(),
		description: user.description.clone(),
		roles: if user.roles.is_empty() {
			None
		} else {
			Some(user.roles.iter().cloned().collect())
		},
		permissions: if user.permissions.is_empty() {
			None
		} else {
			Some(user.permissions.iter().cloned().collect())
		},
	}
}

fn feature_doc(feature: &Feature) -> FeatureDoc {
	let mut props: Vec<_> = feature.properties.values().collect();
	props.sort_by(|a, b| a.uid().cmp(b.uid()));

	FeatureDoc {
		uid: Some(feature.uid().into()),
		enable: Some(feature.enabled),
		description: feature.description.clone(),
		group_name: feature.group.clone(),
		properties: if props.is_empty() {
			None
		} else {
			Some(props.into_iter().map(doc::property_to_doc).collect())
		},
		toggle_strategies: if feature.toggle_strategies.is_empty() {
			None
		} else {
			Some(feature.toggle_strategies.iter().map(doc::strategy_to_doc).collect())
		},
		permissions: if feature.acl.is_empty() {
			None
		} else {
			Some(doc::acl_to_docs(&feature.acl))
		},
	}
}

// vim: ts=4
