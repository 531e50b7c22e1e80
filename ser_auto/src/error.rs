//! Error types.

use thiserror::Error;

use crate::archive::ScalarKind;

/// Result type for save and load operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by archives while writing or reading a value.
#[derive(Error, Debug)]
pub enum Error {
	/// Underlying stream failed
	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	/// JSON document could not be parsed or written
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// XML document could not be parsed
	#[error("XML error: {0}")]
	Xml(#[from] roxmltree::Error),

	/// Value in input does not have the type the reader expected
	#[error("Type mismatch: expected {expected}, found {found}")]
	TypeMismatch { expected: ScalarKind, found: String },

	/// Input ran out of values inside the current node
	#[error("Unexpected end of input")]
	UnexpectedEnd,

	/// Back-reference to a shared object which has not been read yet
	#[error("Unknown shared reference id {0}")]
	UnknownSharedRef(u32),

	/// Back-reference resolves to an object of a different type
	#[error("Shared reference id {0} refers to a value of another type")]
	SharedTypeMismatch(u32),

	/// Value is well-typed but out of range or otherwise unusable
	#[error("Invalid value: {0}")]
	InvalidValue(String),

	/// String data is not valid UTF-8
	#[error("Invalid UTF-8 in string data")]
	InvalidUtf8,
}

impl Error {
	pub(crate) fn mismatch(expected: ScalarKind, found: impl Into<String>) -> Self {
		Error::TypeMismatch {
			expected,
			found: found.into(),
		}
	}
}

/// Errors raised when a type's shape exceeds its configured limits.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
	/// Type declares as many fields as the limit allows, or more
	#[error("`{type_name}` has {count} fields, limit is fewer than {max}")]
	TooManyFields {
		type_name: &'static str,
		count: usize,
		max: usize,
	},

	/// A field name is as long as the limit allows, or longer
	#[error("Field `{name}` of `{type_name}` is {len} bytes long, limit is fewer than {max}")]
	IdentifierTooLong {
		type_name: &'static str,
		name: &'static str,
		len: usize,
		max: usize,
	},
}
