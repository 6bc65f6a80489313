//! Toggle-strategy evaluation.
//!
//! A `ToggleStrategy` binds a feature to a strategy kind and its property
//! bag; the evaluator for a kind lives here. Evaluation is a pure function
//! of `(bag, context)` — the evaluation time is part of the context, so the
//! same bag and context always yield the same decision.

use std::collections::HashMap;
use std::sync::Arc;

use togglr_types::feature::Feature;
use togglr_types::prelude::*;
use togglr_types::property::{Property, PropertyValue};

/// Opaque execution context: string attributes plus the evaluation instant.
#[derive(Clone, Debug)]
pub struct EvalContext {
	attrs: HashMap<Box<str>, Box<str>>,
	pub now: Timestamp,
}

impl EvalContext {
	pub fn new() -> Self {
		Self { attrs: HashMap::new(), now: now() }
	}

	/// A context pinned to a given instant, for reproducible decisions
	pub fn at(now: Timestamp) -> Self {
		Self { attrs: HashMap::new(), now }
	}

	pub fn with(mut self, key: &str, value: &str) -> Self {
		self.attrs.insert(key.into(), value.into());
		self
	}

	pub fn get(&self, key: &str) -> Option<&str> {
		self.attrs.get(key).map(AsRef::as_ref)
	}
}

impl Default for EvalContext {
	fn default() -> Self {
		Self::new()
	}
}

pub trait StrategyEvaluator: Send + Sync {
	fn evaluate(&self, bag: &HashMap<Box<str>, Property>, ctx: &EvalContext) -> bool;
}

/// How the decisions of a feature's strategies combine into one effective
/// toggle decision. Never defaulted; the caller picks one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyPolicy {
	AllMustPass,
	AnyMayPass,
}

/// Maps strategy kind names to evaluators. A kind with no evaluator never
/// fires; it is logged at warn and decides `false`.
pub struct StrategyRegistry {
	evaluators: HashMap<Box<str>, Arc<dyn StrategyEvaluator>>,
}

impl std::fmt::Debug for StrategyRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("StrategyRegistry")
			.field("kinds", &self.evaluators.keys().collect::<Vec<_>>())
			.finish()
	}
}

impl StrategyRegistry {
	pub fn empty() -> Self {
		Self { evaluators: HashMap::new() }
	}

	pub fn register(&mut self, kind: &str, evaluator: Arc<dyn StrategyEvaluator>) {
		self.evaluators.insert(kind.into(), evaluator);
	}

	pub fn evaluate(
		&self,
		kind: &str,
		bag: &HashMap<Box<str>, Property>,
		ctx: &EvalContext,
	) -> bool {
		match self.evaluators.get(kind) {
			Some(evaluator) => evaluator.evaluate(bag, ctx),
			None => {
				warn!(kind, "no evaluator registered for strategy kind");
				false
			}
		}
	}
}

impl Default for StrategyRegistry {
	fn default() -> Self {
		let mut reg = Self::empty();
		reg.register("releaseDate", Arc::new(ReleaseDate));
		reg.register("clientFilter", Arc::new(ClientFilter));
		reg
	}
}

/// Effective decision over a feature's strategies. A feature with no
/// strategies is governed by its `enabled` flag alone, so the empty list
/// decides `true` under either policy.
pub fn decide(
	feature: &Feature,
	registry: &StrategyRegistry,
	ctx: &EvalContext,
	policy: StrategyPolicy,
) -> bool {
	if feature.toggle_strategies.is_empty() {
		return true;
	}
	let mut decisions = feature
		.toggle_strategies
		.iter()
		.map(|s| registry.evaluate(&s.kind, &s.properties, ctx));
	match policy {
		StrategyPolicy::AllMustPass => decisions.all(|d| d),
		StrategyPolicy::AnyMayPass => decisions.any(|d| d),
	}
}

// Built-in evaluators //
//*********************//

/// Fires once the context instant reaches the `date` property
#[derive(Debug)]
pub struct ReleaseDate;

impl StrategyEvaluator for ReleaseDate {
	fn evaluate(&self, bag: &HashMap<Box<str>, Property>, ctx: &EvalContext) -> bool {
		match bag.get("date").map(Property::value) {
			Some(PropertyValue::Date(date)) => ctx.now.0 >= date.timestamp(),
			_ => false,
		}
	}
}

/// Fires when the context's `clientId` attribute appears in the
/// comma-separated `grantedClients` property
#[derive(Debug)]
pub struct ClientFilter;

impl StrategyEvaluator for ClientFilter {
	fn evaluate(&self, bag: &HashMap<Box<str>, Property>, ctx: &EvalContext) -> bool {
		let Some(granted) = bag.get("grantedClients").map(Property::canonical) else {
			return false;
		};
		let Some(client) = ctx.get("clientId") else {
			return false;
		};
		granted.split(',').any(|c| c.trim() == client)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use togglr_types::feature::ToggleStrategy;
	use togglr_types::property::PropertyRegistry;

	fn date_strategy(feature: &str, date: &str) -> ToggleStrategy {
		let reg = PropertyRegistry::default();
		ToggleStrategy::new(feature, "releaseDate")
			.with_property(Property::build(&reg, "date", "date", date).expect("builds"))
	}

	#[test]
	fn test_release_date() {
		let feature = Feature::new("f").enable().with_strategy(date_strategy("f", "2026-01-01T00:00:00Z"));
		let registry = StrategyRegistry::default();

		let before = EvalContext::at(Timestamp(1_700_000_000));
		assert!(!decide(&feature, &registry, &before, StrategyPolicy::AllMustPass));

		let after = EvalContext::at(Timestamp(1_800_000_000));
		assert!(decide(&feature, &registry, &after, StrategyPolicy::AllMustPass));
	}

	#[test]
	fn test_client_filter() {
		let reg = PropertyRegistry::default();
		let feature = Feature::new("f").with_strategy(
			ToggleStrategy::new("f", "clientFilter").with_property(
				Property::build(&reg, "grantedClients", "string", "alice, bob").expect("builds"),
			),
		);
		let registry = StrategyRegistry::default();

		let ctx = EvalContext::new().with("clientId", "bob");
		assert!(decide(&feature, &registry, &ctx, StrategyPolicy::AllMustPass));

		let ctx = EvalContext::new().with("clientId", "mallory");
		assert!(!decide(&feature, &registry, &ctx, StrategyPolicy::AllMustPass));
	}

	#[test]
	fn test_policy_combination() {
		let feature = Feature::new("f")
			.with_strategy(date_strategy("f", "2000-01-01T00:00:00Z"))
			.with_strategy(date_strategy("f", "2999-01-01T00:00:00Z"));
		let registry = StrategyRegistry::default();
		let ctx = EvalContext::at(Timestamp(1_700_000_000));

		assert!(!decide(&feature, &registry, &ctx, StrategyPolicy::AllMustPass));
		assert!(decide(&feature, &registry, &ctx, StrategyPolicy::AnyMayPass));
	}

	#[test]
	fn test_empty_strategy_list_passes() {
		let feature = Feature::new("f");
		let registry = StrategyRegistry::default();
		let ctx = EvalContext::new();

		assert!(decide(&feature, &registry, &ctx, StrategyPolicy::AllMustPass));
		assert!(decide(&feature, &registry, &ctx, StrategyPolicy::AnyMayPass));
	}

	#[test]
	fn test_unknown_kind_decides_false() {
		let feature = Feature::new("f").with_strategy(ToggleStrategy::new("f", "nope"));
		let registry = StrategyRegistry::default();

		assert!(!decide(&feature, &registry, &EvalContext::new(), StrategyPolicy::AnyMayPass));
	}

	#[test]
	fn test_same_inputs_same_decision() {
		let feature = Feature::new("f").with_strategy(date_strategy("f", "2026-01-01T00:00:00Z"));
		let registry = StrategyRegistry::default();
		let ctx = EvalContext::at(Timestamp(1_800_000_000));

		let first = decide(&feature, &registry, &ctx, StrategyPolicy::AllMustPass);
		for _ in 0..10 {
			assert_eq!(decide(&feature, &registry, &ctx, StrategyPolicy::AllMustPass), first);
		}
	}
}

// vim: ts=4
