//! Audit events and the pluggable sink they are appended to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventAction {
	Create,
	Update,
	Delete,
	ToggleOn,
	ToggleOff,
	AddToGroup,
	RemoveFromGroup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventScope {
	Feature,
	FeatureGroup,
	Property,
	Role,
	User,
}

impl std::fmt::Display for EventScope {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			EventScope::Feature => "feature",
			EventScope::FeatureGroup => "feature group",
			EventScope::Property => "property",
			EventScope::Role => "role",
			EventScope::User => "user",
		};
		write!(f, "{}", s)
	}
}

/// Immutable record of a mutating action. Appended to a sink after the
/// mutation succeeds; never mutated or deleted afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
	pub action: EventAction,
	pub scope: EventScope,
	#[serde(rename = "entityRef")]
	pub entity_ref: Box<str>,
	pub timestamp: Timestamp,
}

impl Event {
	pub fn new(action: EventAction, scope: EventScope, entity_ref: &str) -> Self {
		Self { action, scope, entity_ref: entity_ref.into(), timestamp: now() }
	}
}

/// Destination for audit events. Append may fail independently of the
/// mutation that produced the event.
#[async_trait]
pub trait AuditSink: Debug + Send + Sync {
	async fn append(&self, event: Event) -> TgResult<()>;
}

// vim: ts=4
