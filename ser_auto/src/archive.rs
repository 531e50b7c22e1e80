//! Archive traits, implemented by each wire format.
//!
//! An archive is a writer ([`OutputArchive`]) or reader ([`InputArchive`]) for
//! one format, scoped to one save or load call. Values drive the archive
//! through these methods, via their [`Persist`](crate::Persist) impls.
//!
//! Output is a tree of nodes. Each node is either a scalar, an object
//! (a sequence of named values), a sequence (of unnamed values), or a shared
//! reference (which contains its target's data only on first occurrence).
//!
//! Input is read positionally, in the same order it was written.
//! Names are not consulted on read.

use std::{borrow::Cow, fmt};

use crate::{LoadRegistry, Result, SaveRegistry};

/// Name given to a shared reference's data inside its node.
pub const SHARED_DATA: &str = "data";

/// Name given to root value by convenience functions.
pub const ROOT_NAME: &str = "value0";

/// Scalar value, as written to or read from an archive.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar<'a> {
	Bool(bool),
	I8(i8),
	I16(i16),
	I32(i32),
	I64(i64),
	U8(u8),
	U16(u16),
	U32(u32),
	U64(u64),
	F32(f32),
	F64(f64),
	Char(char),
	Str(Cow<'a, str>),
}

impl Scalar<'_> {
	pub fn kind(&self) -> ScalarKind {
		match self {
			Scalar::Bool(_) => ScalarKind::Bool,
			Scalar::I8(_) => ScalarKind::I8,
			Scalar::I16(_) => ScalarKind::I16,
			Scalar::I32(_) => ScalarKind::I32,
			Scalar::I64(_) => ScalarKind::I64,
			Scalar::U8(_) => ScalarKind::U8,
			Scalar::U16(_) => ScalarKind::U16,
			Scalar::U32(_) => ScalarKind::U32,
			Scalar::U64(_) => ScalarKind::U64,
			Scalar::F32(_) => ScalarKind::F32,
			Scalar::F64(_) => ScalarKind::F64,
			Scalar::Char(_) => ScalarKind::Char,
			Scalar::Str(_) => ScalarKind::Str,
		}
	}
}

/// Type of a [`Scalar`], passed to [`InputArchive::read_scalar`] so
/// formats which don't record types know what to read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ScalarKind {
	Bool,
	I8,
	I16,
	I32,
	I64,
	U8,
	U16,
	U32,
	U64,
	F32,
	F64,
	Char,
	Str,
}

impl ScalarKind {
	pub fn name(self) -> &'static str {
		match self {
			ScalarKind::Bool => "bool",
			ScalarKind::I8 => "i8",
			ScalarKind::I16 => "i16",
			ScalarKind::I32 => "i32",
			ScalarKind::I64 => "i64",
			ScalarKind::U8 => "u8",
			ScalarKind::U16 => "u16",
			ScalarKind::U32 => "u32",
			ScalarKind::U64 => "u64",
			ScalarKind::F32 => "f32",
			ScalarKind::F64 => "f64",
			ScalarKind::Char => "char",
			ScalarKind::Str => "string",
		}
	}
}

impl fmt::Display for ScalarKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Writer half of a wire format.
///
/// `name` is `None` for items of a sequence. Self-describing formats persist
/// names, others may ignore them.
pub trait OutputArchive {
	/// Write a scalar value.
	fn write_scalar(&mut self, name: Option<&str>, value: Scalar<'_>) -> Result<()>;

	/// Open an object node. Values written until matching [`end`](OutputArchive::end)
	/// are its members.
	fn begin_object(&mut self, name: Option<&str>) -> Result<()>;

	/// Open a sequence node of `len` items.
	fn begin_seq(&mut self, name: Option<&str>, len: usize) -> Result<()>;

	/// Open a shared reference node for object `id`.
	/// Target's data follows only if this is the first occurrence of `id`.
	fn begin_shared(&mut self, name: Option<&str>, id: u32) -> Result<()>;

	/// Close the most recently opened node.
	fn end(&mut self) -> Result<()>;

	/// Registry of shared objects written so far.
	fn saved_refs(&mut self) -> &mut SaveRegistry;

	/// Flush all output to the underlying stream.
	///
	/// Output is not guaranteed to be complete until this is called.
	/// Dropping an archive without calling `finish` discards any unwritten output.
	fn finish(&mut self) -> Result<()>;
}

/// Reader half of a wire format.
pub trait InputArchive {
	/// Read next value, which must be a scalar of type `kind`.
	fn read_scalar(&mut self, kind: ScalarKind) -> Result<Scalar<'static>>;

	/// Enter next value, which must be an object node.
	fn begin_object(&mut self) -> Result<()>;

	/// Enter next value, which must be a sequence node. Returns its length.
	fn begin_seq(&mut self) -> Result<usize>;

	/// Enter next value, which must be a shared reference node. Returns its ID.
	fn begin_shared(&mut self) -> Result<u32>;

	/// Leave the most recently entered node.
	fn end(&mut self) -> Result<()>;

	/// Registry of shared objects read so far.
	fn loaded_refs(&mut self) -> &mut LoadRegistry;

	/// Bytes consumed so far, for formats which read their input as they go.
	/// `None` for formats which parse the whole document up front.
	fn bytes_read(&self) -> Option<u64> {
		None
	}
}
