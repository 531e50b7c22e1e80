//! Compact binary format.
//!
//! Not self-describing: no names or type tags are written, so meaning comes
//! from order alone. All numbers are little-endian.
//!
//! * Integers and floats: native width.
//! * `bool`: 1 byte, 0 or 1.
//! * `char`: `u32` code point.
//! * Strings: `u64` length in bytes, then UTF-8 bytes.
//! * Sequences: `u64` length, then items.
//! * Objects: members only, no framing.
//! * Shared references: `u32` ID, then target's data on first occurrence.

use std::{
	borrow::Cow,
	io::{self, Read, Write},
};

use byteorder::{LittleEndian as LE, ReadBytesExt, WriteBytesExt};
use tracing::trace;

use crate::{
	Error, InputArchive, LoadRegistry, OutputArchive, Persist, Result, SaveRegistry, Scalar,
	ScalarKind, ROOT_NAME,
};

/// Binary writer.
pub struct BinaryOutputArchive<W: Write> {
	writer: W,
	refs: SaveRegistry,
}

impl<W: Write> BinaryOutputArchive<W> {
	pub fn new(writer: W) -> Self {
		trace!("opened binary output archive");
		Self {
			writer,
			refs: SaveRegistry::new(),
		}
	}

	/// Consume archive and return the underlying writer.
	pub fn into_inner(self) -> W {
		self.writer
	}

	fn write_len(&mut self, len: usize) -> Result<()> {
		self.writer.write_u64::<LE>(len as u64)?;
		Ok(())
	}
}

impl<W: Write> OutputArchive for BinaryOutputArchive<W> {
	fn write_scalar(&mut self, _name: Option<&str>, value: Scalar<'_>) -> Result<()> {
		let w = &mut self.writer;
		match value {
			Scalar::Bool(v) => w.write_u8(v as u8)?,
			Scalar::I8(v) => w.write_i8(v)?,
			Scalar::I16(v) => w.write_i16::<LE>(v)?,
			Scalar::I32(v) => w.write_i32::<LE>(v)?,
			Scalar::I64(v) => w.write_i64::<LE>(v)?,
			Scalar::U8(v) => w.write_u8(v)?,
			Scalar::U16(v) => w.write_u16::<LE>(v)?,
			Scalar::U32(v) => w.write_u32::<LE>(v)?,
			Scalar::U64(v) => w.write_u64::<LE>(v)?,
			Scalar::F32(v) => w.write_f32::<LE>(v)?,
			Scalar::F64(v) => w.write_f64::<LE>(v)?,
			Scalar::Char(v) => w.write_u32::<LE>(v as u32)?,
			Scalar::Str(v) => {
				w.write_u64::<LE>(v.len() as u64)?;
				w.write_all(v.as_bytes())?;
			}
		}
		Ok(())
	}

	#[inline]
	fn begin_object(&mut self, _name: Option<&str>) -> Result<()> {
		Ok(())
	}

	#[inline]
	fn begin_seq(&mut self, _name: Option<&str>, len: usize) -> Result<()> {
		self.write_len(len)
	}

	#[inline]
	fn begin_shared(&mut self, _name: Option<&str>, id: u32) -> Result<()> {
		self.writer.write_u32::<LE>(id)?;
		Ok(())
	}

	#[inline]
	fn end(&mut self) -> Result<()> {
		Ok(())
	}

	fn saved_refs(&mut self) -> &mut SaveRegistry {
		&mut self.refs
	}

	fn finish(&mut self) -> Result<()> {
		self.writer.flush()?;
		trace!(shared = self.refs.len(), "finished binary output archive");
		Ok(())
	}
}

/// Reader which counts bytes read through it.
struct Counted<R: Read> {
	inner: R,
	count: u64,
}

impl<R: Read> Read for Counted<R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		let len = self.inner.read(buf)?;
		self.count += len as u64;
		Ok(len)
	}
}

/// Binary reader.
pub struct BinaryInputArchive<R: Read> {
	reader: Counted<R>,
	refs: LoadRegistry,
}

impl<R: Read> BinaryInputArchive<R> {
	pub fn new(reader: R) -> Self {
		trace!("opened binary input archive");
		Self {
			reader: Counted {
				inner: reader,
				count: 0,
			},
			refs: LoadRegistry::new(),
		}
	}

	/// Consume archive and return the underlying reader.
	pub fn into_inner(self) -> R {
		self.reader.inner
	}

	fn read_len(&mut self) -> Result<usize> {
		let len = self.reader.read_u64::<LE>().map_err(eof_to_end)?;
		usize::try_from(len).map_err(|_| Error::InvalidValue(format!("length {len} too large")))
	}

	fn read_string(&mut self) -> Result<String> {
		let len = self.read_len()?;
		// Read via `take` so a corrupt length can't trigger a huge allocation
		let mut bytes = Vec::new();
		(&mut self.reader)
			.take(len as u64)
			.read_to_end(&mut bytes)?;
		if bytes.len() != len {
			return Err(Error::UnexpectedEnd);
		}
		String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)
	}
}

impl<R: Read> InputArchive for BinaryInputArchive<R> {
	fn read_scalar(&mut self, kind: ScalarKind) -> Result<Scalar<'static>> {
		if kind == ScalarKind::Str {
			return Ok(Scalar::Str(Cow::Owned(self.read_string()?)));
		}

		let r = &mut self.reader;
		let value = match kind {
			ScalarKind::Bool => match r.read_u8().map_err(eof_to_end)? {
				0 => Scalar::Bool(false),
				1 => Scalar::Bool(true),
				byte => return Err(Error::InvalidValue(format!("{byte} is not a bool"))),
			},
			ScalarKind::I8 => Scalar::I8(r.read_i8().map_err(eof_to_end)?),
			ScalarKind::I16 => Scalar::I16(r.read_i16::<LE>().map_err(eof_to_end)?),
			ScalarKind::I32 => Scalar::I32(r.read_i32::<LE>().map_err(eof_to_end)?),
			ScalarKind::I64 => Scalar::I64(r.read_i64::<LE>().map_err(eof_to_end)?),
			ScalarKind::U8 => Scalar::U8(r.read_u8().map_err(eof_to_end)?),
			ScalarKind::U16 => Scalar::U16(r.read_u16::<LE>().map_err(eof_to_end)?),
			ScalarKind::U32 => Scalar::U32(r.read_u32::<LE>().map_err(eof_to_end)?),
			ScalarKind::U64 => Scalar::U64(r.read_u64::<LE>().map_err(eof_to_end)?),
			ScalarKind::F32 => Scalar::F32(r.read_f32::<LE>().map_err(eof_to_end)?),
			ScalarKind::F64 => Scalar::F64(r.read_f64::<LE>().map_err(eof_to_end)?),
			ScalarKind::Char => {
				let code = r.read_u32::<LE>().map_err(eof_to_end)?;
				let c = char::from_u32(code)
					.ok_or_else(|| Error::InvalidValue(format!("{code:#x} is not a char")))?;
				Scalar::Char(c)
			}
			ScalarKind::Str => unreachable!(),
		};
		Ok(value)
	}

	#[inline]
	fn begin_object(&mut self) -> Result<()> {
		Ok(())
	}

	#[inline]
	fn begin_seq(&mut self) -> Result<usize> {
		self.read_len()
	}

	#[inline]
	fn begin_shared(&mut self) -> Result<u32> {
		Ok(self.reader.read_u32::<LE>().map_err(eof_to_end)?)
	}

	#[inline]
	fn end(&mut self) -> Result<()> {
		Ok(())
	}

	fn loaded_refs(&mut self) -> &mut LoadRegistry {
		&mut self.refs
	}

	#[inline]
	fn bytes_read(&self) -> Option<u64> {
		Some(self.reader.count)
	}
}

fn eof_to_end(err: io::Error) -> Error {
	match err.kind() {
		io::ErrorKind::UnexpectedEof => Error::UnexpectedEnd,
		_ => Error::Io(err),
	}
}

/// Write `value` in binary format to `writer`.
pub fn to_binary_writer<T: Persist + ?Sized, W: Write>(value: &T, writer: W) -> Result<()> {
	let mut ar = BinaryOutputArchive::new(writer);
	value.save(&mut ar, Some(ROOT_NAME))?;
	ar.finish()
}

/// Serialize `value` in binary format.
pub fn to_binary<T: Persist + ?Sized>(value: &T) -> Result<Vec<u8>> {
	let mut out = Vec::new();
	to_binary_writer(value, &mut out)?;
	Ok(out)
}

/// Read binary data from `reader` into `value`.
///
/// On error, `value` may have been partly overwritten.
/// Use [`load_binary`] to avoid that.
pub fn from_binary_reader<T: Persist + ?Sized, R: Read>(value: &mut T, reader: R) -> Result<()> {
	let mut ar = BinaryInputArchive::new(reader);
	value.load(&mut ar)
}

/// Read binary data from `bytes` into `value`.
///
/// `bytes` must hold exactly one value. Anything left over is an error.
///
/// On error, `value` may have been partly overwritten.
/// Use [`load_binary`] to avoid that.
pub fn from_binary<T: Persist + ?Sized>(value: &mut T, bytes: &[u8]) -> Result<()> {
	let mut ar = BinaryInputArchive::new(bytes);
	value.load(&mut ar)?;
	let rest = ar.into_inner();
	if !rest.is_empty() {
		return Err(Error::InvalidValue(format!(
			"{} bytes left over after value",
			rest.len()
		)));
	}
	Ok(())
}

/// Deserialize a new `T` from binary data.
pub fn load_binary<T: Persist + Default>(bytes: &[u8]) -> Result<T> {
	let mut value = T::default();
	from_binary(&mut value, bytes)?;
	Ok(value)
}
