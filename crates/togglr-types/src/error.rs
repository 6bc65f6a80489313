//! Error types shared across the togglr workspace.

pub type TgResult<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Malformed document or missing mandatory field. Aborts the entire parse.
	#[error("parse error: {entity} is missing mandatory field '{field}'")]
	MissingField { entity: &'static str, field: &'static str },

	#[error("parse error: {0}")]
	Parse(Box<str>),

	/// Unknown or non-constructible property kind. Carries the attempted
	/// kind name and the underlying cause.
	#[error("cannot build property of kind '{kind}'")]
	PropertyType {
		kind: Box<str>,
		#[source]
		source: Box<Error>,
	},

	/// Value outside a declared fixed-value set. Raised at construction,
	/// before the property is handed to any caller.
	#[error("invalid value '{value}' for property '{uid}', allowed: [{allowed}]")]
	InvalidPropertyValue { uid: Box<str>, value: Box<str>, allowed: Box<str> },

	#[error("{scope} '{uid}' does not exist")]
	NotFound { scope: &'static str, uid: Box<str> },

	#[error("permission '{permission}' denied")]
	PermissionDenied { permission: Box<str> },

	/// Backend communication failure. Wraps the cause; no guarantee beyond
	/// the backend's own commit state.
	#[error("store error: {0}")]
	Db(Box<str>),

	/// Audit sink failure, surfaced only by strict emitters.
	#[error("audit sink error: {0}")]
	Audit(Box<str>),

	#[error(transparent)]
	Json(#[from] serde_json::Error),
}

impl Error {
	pub fn not_found(scope: &'static str, uid: &str) -> Self {
		Error::NotFound { scope, uid: uid.into() }
	}
}

// vim: ts=4
