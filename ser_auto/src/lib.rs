//! Reflection-driven serialization.
//!
//! Types describe their structure once, via `#[derive(Reflect)]`: their fields,
//! and which other reflected types they extend (bases). The library caches that
//! shape per type, and walks it to save or load any value to one of several
//! archive formats: compact binary, JSON, or XML.
//!
//! ```ignore
//! use ser_auto::{load_json, to_json, Reflect};
//!
//! #[derive(Reflect, Default)]
//! struct Config {
//! 	message: String,
//! }
//!
//! let json = to_json(&Config { message: "JelloWorld!".to_string() })?;
//! let config: Config = load_json(&json)?;
//! ```

#[cfg(feature = "derive")]
pub use ser_auto_derive::Reflect;

mod archive;
pub use archive::{InputArchive, OutputArchive, Scalar, ScalarKind, ROOT_NAME, SHARED_DATA};

mod archives;
pub use archives::*;

mod cache;
pub use cache::{descriptor_for, get_by_type_id, try_descriptor_for};

mod descriptor;
pub use descriptor::{BaseType, Limits, TypeDescriptor, MAX_FIELDS, MAX_IDENTIFIER_LEN};

mod error;
pub use error::{Error, Result, ShapeError};

mod impls;

mod persist;
pub use persist::Persist;

mod reflect;
pub use reflect::{out_of_range, Reflect, Shape};

mod registry;
pub use registry::{LoadRegistry, Lookup, SaveRegistry};

mod traverse;
pub use traverse::{load, load_object, save, save_object};

/// Save `value` to an archive of any format, under root name `"value0"`,
/// and finish the archive.
pub fn to_archive<A: OutputArchive, T: Persist + ?Sized>(value: &T, ar: &mut A) -> Result<()> {
	value.save(ar, Some(ROOT_NAME))?;
	ar.finish()
}

/// Load `value` from an archive of any format.
pub fn from_archive<A: InputArchive, T: Persist + ?Sized>(value: &mut T, ar: &mut A) -> Result<()> {
	value.load(ar)
}
