//! Typed, validated configuration properties.
//!
//! Every property kind is constructible from `(uid, raw string)` and exposes
//! a canonical string form the kind factory can re-parse to the same value.
//! Kinds are resolved dynamically by name through a closed registry: a short
//! alias (e.g. `"int"`) maps to a canonical kind name; an identifier with no
//! alias entry is treated as a canonical kind name directly.

use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};

use crate::prelude::*;

// Canonical kind names //
//**********************//
pub const KIND_STR: &str = "togglr.property.Str";
pub const KIND_INT: &str = "togglr.property.Int";
pub const KIND_FLOAT: &str = "togglr.property.Float";
pub const KIND_BOOL: &str = "togglr.property.Bool";
pub const KIND_DATE: &str = "togglr.property.Date";
pub const KIND_LOG_LEVEL: &str = "togglr.property.LogLevel";

/// Log verbosity levels, for `logLevel` properties
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
	Trace,
	Debug,
	Info,
	Warn,
	Error,
	Fatal,
}

impl std::fmt::Display for LogLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			LogLevel::Trace => "TRACE",
			LogLevel::Debug => "DEBUG",
			LogLevel::Info => "INFO",
			LogLevel::Warn => "WARN",
			LogLevel::Error => "ERROR",
			LogLevel::Fatal => "FATAL",
		};
		write!(f, "{}", s)
	}
}

impl std::str::FromStr for LogLevel {
	type Err = Error;

	fn from_str(s: &str) -> TgResult<Self> {
		match s.trim().to_ascii_uppercase().as_str() {
			"TRACE" => Ok(LogLevel::Trace),
			"DEBUG" => Ok(LogLevel::Debug),
			"INFO" => Ok(LogLevel::Info),
			"WARN" => Ok(LogLevel::Warn),
			"ERROR" => Ok(LogLevel::Error),
			"FATAL" => Ok(LogLevel::Fatal),
			_ => Err(Error::Parse(format!("no such log level: '{}'", s).into())),
		}
	}
}

// PropertyValue //
//***************//
/// A typed property value. `Custom` carries the canonical string of an
/// externally registered kind; its factory owns all validation.
#[derive(Clone, Debug)]
pub enum PropertyValue {
	Str(Box<str>),
	Int(i64),
	Float(f64),
	Bool(bool),
	Date(DateTime<Utc>),
	LogLevel(LogLevel),
	Custom(Box<str>),
}

impl PropertyValue {
	/// Canonical string form. Re-parsing this through the owning kind
	/// factory yields a value equal to `self`.
	pub fn canonical(&self) -> Box<str> {
		match self {
			PropertyValue::Str(s) => s.clone(),
			PropertyValue::Int(i) => i.to_string().into(),
			PropertyValue::Float(v) => v.to_string().into(),
			PropertyValue::Bool(b) => b.to_string().into(),
			PropertyValue::Date(d) => d.to_rfc3339_opts(SecondsFormat::Secs, true).into(),
			PropertyValue::LogLevel(l) => l.to_string().into(),
			PropertyValue::Custom(s) => s.clone(),
		}
	}

	fn rank(&self) -> u8 {
		match self {
			PropertyValue::Str(_) => 0,
			PropertyValue::Int(_) => 1,
			PropertyValue::Float(_) => 2,
			PropertyValue::Bool(_) => 3,
			PropertyValue::Date(_) => 4,
			PropertyValue::LogLevel(_) => 5,
			PropertyValue::Custom(_) => 6,
		}
	}
}

impl std::fmt::Display for PropertyValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.canonical())
	}
}

// Equality and ordering go through the canonical form so that floats stay
// total and sets of any kind behave consistently.
impl PartialEq for PropertyValue {
	fn eq(&self, other: &Self) -> bool {
		self.rank() == other.rank() && self.canonical() == other.canonical()
	}
}

impl Eq for PropertyValue {}

impl PartialOrd for PropertyValue {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for PropertyValue {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		(self.rank(), self.canonical()).cmp(&(other.rank(), other.canonical()))
	}
}

impl Hash for PropertyValue {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.rank().hash(state);
		self.canonical().hash(state);
	}
}

// PropertyRegistry //
//******************//
type KindFactory = Box<dyn Fn(&str) -> TgResult<PropertyValue> + Send + Sync>;

/// Closed registry mapping canonical kind names to factory functions, plus
/// an alias table for short identifiers used in serialized documents.
///
/// The registry is handed to codecs and adapters at construction time;
/// there is no implicit global.
pub struct PropertyRegistry {
	kinds: HashMap<Box<str>, KindFactory>,
	aliases: HashMap<Box<str>, Box<str>>,
}

impl std::fmt::Debug for PropertyRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PropertyRegistry")
			.field("kinds", &self.kinds.keys().collect::<Vec<_>>())
			.field("aliases", &self.aliases)
			.finish()
	}
}

impl PropertyRegistry {
	/// A registry with no kinds at all. Useful for fully custom setups.
	pub fn empty() -> Self {
		Self { kinds: HashMap::new(), aliases: HashMap::new() }
	}

	pub fn register<F>(&mut self, canonical: &str, factory: F)
	where
		F: Fn(&str) -> TgResult<PropertyValue> + Send + Sync + 'static,
	{
		self.kinds.insert(canonical.into(), Box::new(factory));
	}

	pub fn register_alias(&mut self, alias: &str, canonical: &str) {
		self.aliases.insert(alias.into(), canonical.into());
	}

	/// Resolve a kind identifier: alias lookup first, on miss the
	/// identifier is the canonical name itself.
	pub fn resolve<'a>(&'a self, ident: &'a str) -> &'a str {
		self.aliases.get(ident).map_or(ident, |c| c.as_ref())
	}

	/// Build a value of the kind named by `ident` from its raw string.
	/// Returns the canonical kind name along with the value.
	pub fn build_value(&self, ident: &str, raw: &str) -> TgResult<(Box<str>, PropertyValue)> {
		let canonical = self.resolve(ident);
		match self.kinds.get(canonical) {
			Some(factory) => {
				let value = factory(raw).map_err(|err| Error::PropertyType {
					kind: canonical.into(),
					source: Box::new(err),
				})?;
				Ok((canonical.into(), value))
			}
			None => Err(Error::PropertyType {
				kind: ident.into(),
				source: Box::new(Error::Parse(
					format!("no property kind registered under '{}'", canonical).into(),
				)),
			}),
		}
	}
}

impl Default for PropertyRegistry {
	fn default() -> Self {
		let mut reg = Self::empty();

		reg.register(KIND_STR, |raw| Ok(PropertyValue::Str(raw.into())));
		reg.register(KIND_INT, |raw| {
			raw.trim()
				.parse::<i64>()
				.map(PropertyValue::Int)
				.map_err(|err| Error::Parse(format!("not an integer: '{}' ({})", raw, err).into()))
		});
		reg.register(KIND_FLOAT, |raw| {
			raw.trim()
				.parse::<f64>()
				.map(PropertyValue::Float)
				.map_err(|err| Error::Parse(format!("not a number: '{}' ({})", raw, err).into()))
		});
		reg.register(KIND_BOOL, |raw| match raw.trim().to_ascii_lowercase().as_str() {
			"true" => Ok(PropertyValue::Bool(true)),
			"false" => Ok(PropertyValue::Bool(false)),
			_ => Err(Error::Parse(format!("not a boolean: '{}'", raw).into())),
		});
		reg.register(KIND_DATE, |raw| {
			DateTime::parse_from_rfc3339(raw.trim())
				.map(|d| PropertyValue::Date(d.with_timezone(&Utc)))
				.map_err(|err| Error::Parse(format!("not an RFC3339 date: '{}' ({})", raw, err).into()))
		});
		reg.register(KIND_LOG_LEVEL, |raw| raw.parse().map(PropertyValue::LogLevel));

		for (alias, canonical) in [
			("string", KIND_STR),
			("str", KIND_STR),
			("int", KIND_INT),
			("integer", KIND_INT),
			("long", KIND_INT),
			("short", KIND_INT),
			("byte", KIND_INT),
			("double", KIND_FLOAT),
			("float", KIND_FLOAT),
			("bigDecimal", KIND_FLOAT),
			("boolean", KIND_BOOL),
			("bool", KIND_BOOL),
			("date", KIND_DATE),
			("logLevel", KIND_LOG_LEVEL),
			("loglevel", KIND_LOG_LEVEL),
		] {
			reg.register_alias(alias, canonical);
		}

		reg
	}
}

// Property //
//**********//
/// A named, typed, optionally value-constrained configuration entry.
///
/// Invariant: when `fixed_values` is declared and non-empty, `value` is a
/// member of it. The check runs at construction and on every in-place
/// update; a violating property is never handed to a caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Property {
	uid: Box<str>,
	kind: Box<str>,
	value: PropertyValue,
	pub description: Option<Box<str>>,
	fixed_values: Option<BTreeSet<PropertyValue>>,
}

impl Property {
	/// Build a property of the kind named by `kind_ident` (alias or
	/// canonical name) from its raw string value.
	pub fn build(
		registry: &PropertyRegistry,
		uid: &str,
		kind_ident: &str,
		raw: &str,
	) -> TgResult<Self> {
		let (kind, value) = registry.build_value(kind_ident, raw)?;
		Ok(Self { uid: uid.into(), kind, value, description: None, fixed_values: None })
	}

	/// Build a property constrained to a fixed set of allowed values. Each
	/// fixed value goes through the same kind factory as the value itself.
	pub fn build_with_fixed<I, S>(
		registry: &PropertyRegistry,
		uid: &str,
		kind_ident: &str,
		raw: &str,
		fixed: I,
	) -> TgResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let (kind, value) = registry.build_value(kind_ident, raw)?;
		let mut set = BTreeSet::new();
		for raw_fixed in fixed {
			let (_, fixed_value) = registry.build_value(&kind, raw_fixed.as_ref())?;
			set.insert(fixed_value);
		}
		let fixed_values = if set.is_empty() { None } else { Some(set) };
		if let Some(set) = &fixed_values {
			check_fixed(uid, &value, set)?;
		}
		Ok(Self { uid: uid.into(), kind, value, description: None, fixed_values })
	}

	pub fn uid(&self) -> &str {
		&self.uid
	}

	/// Canonical kind name this property was built with
	pub fn kind(&self) -> &str {
		&self.kind
	}

	pub fn value(&self) -> &PropertyValue {
		&self.value
	}

	/// Canonical string form of the current value
	pub fn canonical(&self) -> Box<str> {
		self.value.canonical()
	}

	pub fn fixed_values(&self) -> Option<&BTreeSet<PropertyValue>> {
		self.fixed_values.as_ref()
	}

	pub fn with_description(mut self, description: &str) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Validated in-place update from a raw string, without reconstruction.
	/// The raw value goes through the property's own kind factory and the
	/// fixed-value check before the stored value changes.
	pub fn set_from_str(&mut self, registry: &PropertyRegistry, raw: &str) -> TgResult<()> {
		let (_, value) = registry.build_value(&self.kind, raw)?;
		if let Some(set) = &self.fixed_values {
			check_fixed(&self.uid, &value, set)?;
		}
		self.value = value;
		Ok(())
	}
}

fn check_fixed(uid: &str, value: &PropertyValue, set: &BTreeSet<PropertyValue>) -> TgResult<()> {
	if set.contains(value) {
		Ok(())
	} else {
		let allowed =
			set.iter().map(|v| v.canonical().into_string()).collect::<Vec<_>>().join(", ");
		Err(Error::InvalidPropertyValue {
			uid: uid.into(),
			value: value.canonical(),
			allowed: allowed.into(),
		})
	}
}


// vim: ts=4
