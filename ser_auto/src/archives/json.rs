//! JSON format.
//!
//! Each object node is a JSON object, with members in the order written.
//! Sequences are arrays. Shared references are objects `{"id": 1, "data": ...}`
//! on first occurrence, and `{"id": 1}` after that. The document is an object
//! holding the root value, by default under key `"value0"`.
//!
//! Documents are held as a tree of [`JsonNode`]s rather than `serde_json::Value`
//! so that objects may contain duplicate keys, which arise when a base and a
//! derived type have fields of the same name.
//!
//! Non-finite floats, which JSON can't represent, are written as the strings
//! `"NaN"`, `"inf"` and `"-inf"`.
//!
//! Arrays and objects nest at most [`JSON_MAX_DEPTH`] deep, counting the
//! document object. Writing deeper fails, so anything written can be read.

use std::{
	borrow::Cow,
	fmt,
	io::{Read, Write},
};

use serde::{
	de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor},
	ser::{SerializeMap, SerializeSeq},
	Deserialize, Deserializer, Serialize, Serializer,
};
use tracing::trace;

use super::cursor::Cursor;
use crate::{
	Error, InputArchive, LoadRegistry, OutputArchive, Persist, Result, SaveRegistry, Scalar,
	ScalarKind, ROOT_NAME, SHARED_DATA,
};

/// Key of shared reference's ID within its object.
const SHARED_ID: &str = "id";

/// Deepest nesting of arrays and objects in a JSON document, document object included.
pub const JSON_MAX_DEPTH: usize = 256;

/// A JSON value which keeps object members in order, duplicates included.
#[derive(Clone, Debug, PartialEq)]
pub enum JsonNode {
	Null,
	Bool(bool),
	I64(i64),
	U64(u64),
	F64(f64),
	Str(String),
	Array(Vec<JsonNode>),
	Object(Vec<(String, JsonNode)>),
}

impl JsonNode {
	fn describe(&self) -> &'static str {
		match self {
			JsonNode::Null => "null",
			JsonNode::Bool(_) => "boolean",
			JsonNode::I64(_) | JsonNode::U64(_) => "integer",
			JsonNode::F64(_) => "number",
			JsonNode::Str(_) => "string",
			JsonNode::Array(_) => "array",
			JsonNode::Object(_) => "object",
		}
	}
}

impl Serialize for JsonNode {
	fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
		match self {
			JsonNode::Null => serializer.serialize_unit(),
			JsonNode::Bool(v) => serializer.serialize_bool(*v),
			JsonNode::I64(v) => serializer.serialize_i64(*v),
			JsonNode::U64(v) => serializer.serialize_u64(*v),
			JsonNode::F64(v) => serializer.serialize_f64(*v),
			JsonNode::Str(v) => serializer.serialize_str(v),
			JsonNode::Array(items) => {
				let mut seq = serializer.serialize_seq(Some(items.len()))?;
				for item in items {
					seq.serialize_element(item)?;
				}
				seq.end()
			}
			JsonNode::Object(members) => {
				let mut map = serializer.serialize_map(Some(members.len()))?;
				for (key, value) in members {
					map.serialize_entry(key, value)?;
				}
				map.end()
			}
		}
	}
}

impl<'de> Deserialize<'de> for JsonNode {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
		JsonNodeSeed {
			depth: JSON_MAX_DEPTH,
		}
		.deserialize(deserializer)
	}
}

/// Deserializes a [`JsonNode`] containing at most `depth` levels of arrays and objects.
#[derive(Clone, Copy)]
struct JsonNodeSeed {
	depth: usize,
}

impl<'de> DeserializeSeed<'de> for JsonNodeSeed {
	type Value = JsonNode;

	fn deserialize<D: Deserializer<'de>>(
		self,
		deserializer: D,
	) -> std::result::Result<JsonNode, D::Error> {
		deserializer.deserialize_any(JsonNodeVisitor { depth: self.depth })
	}
}

struct JsonNodeVisitor {
	depth: usize,
}

impl JsonNodeVisitor {
	/// Seed for members of the array or object being visited.
	fn members<E: de::Error>(&self) -> std::result::Result<JsonNodeSeed, E> {
		match self.depth.checked_sub(1) {
			Some(depth) => Ok(JsonNodeSeed { depth }),
			None => Err(E::custom(format_args!(
				"arrays and objects nested more than {JSON_MAX_DEPTH} deep"
			))),
		}
	}
}

impl<'de> Visitor<'de> for JsonNodeVisitor {
	type Value = JsonNode;

	fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str("any JSON value")
	}

	fn visit_unit<E: de::Error>(self) -> std::result::Result<JsonNode, E> {
		Ok(JsonNode::Null)
	}

	fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<JsonNode, E> {
		Ok(JsonNode::Bool(v))
	}

	fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<JsonNode, E> {
		Ok(JsonNode::I64(v))
	}

	fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<JsonNode, E> {
		Ok(JsonNode::U64(v))
	}

	fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<JsonNode, E> {
		Ok(JsonNode::F64(v))
	}

	fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<JsonNode, E> {
		Ok(JsonNode::Str(v.to_string()))
	}

	fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<JsonNode, E> {
		Ok(JsonNode::Str(v))
	}

	fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<JsonNode, A::Error> {
		let seed = self.members()?;
		let mut items = Vec::new();
		while let Some(item) = seq.next_element_seed(seed)? {
			items.push(item);
		}
		Ok(JsonNode::Array(items))
	}

	fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<JsonNode, A::Error> {
		let seed = self.members()?;
		let mut members = Vec::new();
		while let Some(key) = map.next_key::<String>()? {
			members.push((key, map.next_value_seed(seed)?));
		}
		Ok(JsonNode::Object(members))
	}
}

/// Options for [`JsonOutputArchive`].
#[derive(Copy, Clone, Debug)]
pub struct JsonOptions {
	/// Indent output. Default: `true`.
	pub pretty: bool,
}

impl Default for JsonOptions {
	fn default() -> Self {
		Self { pretty: true }
	}
}

/// A node being built: an object's members, or a sequence's items.
enum OpenNode {
	Object(Vec<(String, JsonNode)>),
	Array(Vec<JsonNode>),
}

impl OpenNode {
	fn push(&mut self, name: Option<&str>, node: JsonNode) {
		match self {
			OpenNode::Object(members) => {
				// Unnamed values inside an object get positional names
				let name = match name {
					Some(name) => name.to_string(),
					None => format!("value{}", members.len()),
				};
				members.push((name, node));
			}
			OpenNode::Array(items) => items.push(node),
		}
	}

	fn into_node(self) -> JsonNode {
		match self {
			OpenNode::Object(members) => JsonNode::Object(members),
			OpenNode::Array(items) => JsonNode::Array(items),
		}
	}
}

/// JSON writer.
///
/// The document is built in memory and written to `writer` by
/// [`finish`](OutputArchive::finish).
pub struct JsonOutputArchive<W: Write> {
	writer: W,
	options: JsonOptions,
	// Bottom entry is the document itself. Each open node holds its own name.
	stack: Vec<(Option<String>, OpenNode)>,
	refs: SaveRegistry,
}

impl<W: Write> JsonOutputArchive<W> {
	pub fn new(writer: W) -> Self {
		Self::with_options(writer, JsonOptions::default())
	}

	pub fn with_options(writer: W, options: JsonOptions) -> Self {
		trace!("opened JSON output archive");
		Self {
			writer,
			options,
			stack: vec![(None, OpenNode::Object(Vec::new()))],
			refs: SaveRegistry::new(),
		}
	}

	fn push(&mut self, name: Option<&str>, node: JsonNode) {
		if let Some((_, open)) = self.stack.last_mut() {
			open.push(name, node);
		}
	}

	fn open(&mut self, name: Option<&str>, node: OpenNode) -> Result<()> {
		if self.stack.len() >= JSON_MAX_DEPTH {
			return Err(Error::InvalidValue(format!(
				"arrays and objects nested more than {JSON_MAX_DEPTH} deep"
			)));
		}
		self.stack.push((name.map(str::to_string), node));
		Ok(())
	}
}

impl<W: Write> OutputArchive for JsonOutputArchive<W> {
	fn write_scalar(&mut self, name: Option<&str>, value: Scalar<'_>) -> Result<()> {
		let node = match value {
			Scalar::Bool(v) => JsonNode::Bool(v),
			Scalar::I8(v) => JsonNode::I64(v.into()),
			Scalar::I16(v) => JsonNode::I64(v.into()),
			Scalar::I32(v) => JsonNode::I64(v.into()),
			Scalar::I64(v) => JsonNode::I64(v),
			Scalar::U8(v) => JsonNode::U64(v.into()),
			Scalar::U16(v) => JsonNode::U64(v.into()),
			Scalar::U32(v) => JsonNode::U64(v.into()),
			Scalar::U64(v) => JsonNode::U64(v),
			Scalar::F32(v) => float_node(v.into()),
			Scalar::F64(v) => float_node(v),
			Scalar::Char(v) => JsonNode::Str(v.to_string()),
			Scalar::Str(v) => JsonNode::Str(v.into_owned()),
		};
		self.push(name, node);
		Ok(())
	}

	fn begin_object(&mut self, name: Option<&str>) -> Result<()> {
		self.open(name, OpenNode::Object(Vec::new()))
	}

	fn begin_seq(&mut self, name: Option<&str>, len: usize) -> Result<()> {
		self.open(name, OpenNode::Array(Vec::with_capacity(len)))
	}

	fn begin_shared(&mut self, name: Option<&str>, id: u32) -> Result<()> {
		self.open(
			name,
			OpenNode::Object(vec![(SHARED_ID.to_string(), JsonNode::U64(id.into()))]),
		)
	}

	fn end(&mut self) -> Result<()> {
		// Never pop the document itself
		if self.stack.len() < 2 {
			return Err(Error::InvalidValue("`end` without matching `begin`".to_string()));
		}
		if let Some((name, open)) = self.stack.pop() {
			self.push(name.as_deref(), open.into_node());
		}
		Ok(())
	}

	fn saved_refs(&mut self) -> &mut SaveRegistry {
		&mut self.refs
	}

	fn finish(&mut self) -> Result<()> {
		if self.stack.len() != 1 {
			return Err(Error::InvalidValue(format!(
				"{} nodes left open",
				self.stack.len() - 1
			)));
		}
		let document = match self.stack.pop() {
			Some((_, open)) => open.into_node(),
			None => return Ok(()),
		};
		// Leave archive ready for further use
		self.stack.push((None, OpenNode::Object(Vec::new())));

		if self.options.pretty {
			serde_json::to_writer_pretty(&mut self.writer, &document)?;
		} else {
			serde_json::to_writer(&mut self.writer, &document)?;
		}
		self.writer.flush()?;
		trace!(shared = self.refs.len(), "finished JSON output archive");
		Ok(())
	}
}

fn float_node(v: f64) -> JsonNode {
	if v.is_finite() {
		JsonNode::F64(v)
	} else if v.is_nan() {
		JsonNode::Str("NaN".to_string())
	} else if v > 0.0 {
		JsonNode::Str("inf".to_string())
	} else {
		JsonNode::Str("-inf".to_string())
	}
}

/// JSON reader.
///
/// Whole document is parsed when archive is created, so syntax errors are
/// reported before any value is loaded.
pub struct JsonInputArchive {
	cursor: Cursor<JsonNode>,
	refs: LoadRegistry,
}

impl JsonInputArchive {
	/// Parse JSON document from `reader`.
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		Self::from_document(parse_document(serde_json::Deserializer::from_reader(reader))?)
	}

	/// Parse JSON document from `json`.
	pub fn from_str(json: &str) -> Result<Self> {
		Self::from_document(parse_document(serde_json::Deserializer::from_str(json))?)
	}

	fn from_document(document: JsonNode) -> Result<Self> {
		let members = match document {
			JsonNode::Object(members) => members,
			other => {
				return Err(Error::InvalidValue(format!(
					"JSON document must be an object, found {}",
					other.describe()
				)))
			}
		};
		trace!(roots = members.len(), "opened JSON input archive");
		Ok(Self {
			cursor: Cursor::new(values(members)),
			refs: LoadRegistry::new(),
		})
	}
}

fn parse_document<'de, R: serde_json::de::Read<'de>>(
	mut deserializer: serde_json::Deserializer<R>,
) -> Result<JsonNode> {
	// `JsonNodeSeed` limits depth instead, in step with the writer
	deserializer.disable_recursion_limit();
	let document = JsonNode::deserialize(&mut deserializer)?;
	deserializer.end()?;
	Ok(document)
}

fn values(members: Vec<(String, JsonNode)>) -> Vec<JsonNode> {
	members.into_iter().map(|(_, value)| value).collect()
}

impl InputArchive for JsonInputArchive {
	fn read_scalar(&mut self, kind: ScalarKind) -> Result<Scalar<'static>> {
		let node = self.cursor.next()?;
		scalar_from_node(node, kind)
	}

	fn begin_object(&mut self) -> Result<()> {
		match self.cursor.next()? {
			JsonNode::Object(members) => {
				self.cursor.enter(values(members));
				Ok(())
			}
			other => Err(Error::InvalidValue(format!(
				"expected object, found {}",
				other.describe()
			))),
		}
	}

	fn begin_seq(&mut self) -> Result<usize> {
		match self.cursor.next()? {
			JsonNode::Array(items) => {
				let len = items.len();
				self.cursor.enter(items);
				Ok(len)
			}
			other => Err(Error::InvalidValue(format!(
				"expected array, found {}",
				other.describe()
			))),
		}
	}

	fn begin_shared(&mut self) -> Result<u32> {
		match self.cursor.next()? {
			JsonNode::Object(members) => {
				let mut values = values(members);
				if values.is_empty() {
					return Err(Error::InvalidValue("shared reference has no id".to_string()));
				}
				let id = match scalar_from_node(values.remove(0), ScalarKind::U32)? {
					Scalar::U32(id) => id,
					other => return Err(Error::mismatch(ScalarKind::U32, other.kind().name())),
				};
				self.cursor.enter(values);
				Ok(id)
			}
			other => Err(Error::InvalidValue(format!(
				"expected shared reference object, found {}",
				other.describe()
			))),
		}
	}

	fn end(&mut self) -> Result<()> {
		self.cursor.leave()
	}

	fn loaded_refs(&mut self) -> &mut LoadRegistry {
		&mut self.refs
	}
}

fn scalar_from_node(node: JsonNode, kind: ScalarKind) -> Result<Scalar<'static>> {
	macro_rules! int {
		($variant:ident, $ty:ty) => {{
			let value = match node {
				JsonNode::I64(v) => <$ty>::try_from(v).ok(),
				JsonNode::U64(v) => <$ty>::try_from(v).ok(),
				other => return Err(Error::mismatch(kind, other.describe())),
			};
			value
				.map(Scalar::$variant)
				.ok_or_else(|| Error::InvalidValue(format!("integer out of range for {}", kind)))
		}};
	}

	match kind {
		ScalarKind::Bool => match node {
			JsonNode::Bool(v) => Ok(Scalar::Bool(v)),
			other => Err(Error::mismatch(kind, other.describe())),
		},
		ScalarKind::I8 => int!(I8, i8),
		ScalarKind::I16 => int!(I16, i16),
		ScalarKind::I32 => int!(I32, i32),
		ScalarKind::I64 => int!(I64, i64),
		ScalarKind::U8 => int!(U8, u8),
		ScalarKind::U16 => int!(U16, u16),
		ScalarKind::U32 => int!(U32, u32),
		ScalarKind::U64 => int!(U64, u64),
		ScalarKind::F32 => float_from_node(node, kind).map(|v| Scalar::F32(v as f32)),
		ScalarKind::F64 => float_from_node(node, kind).map(Scalar::F64),
		ScalarKind::Char => match node {
			JsonNode::Str(s) => {
				let mut chars = s.chars();
				match (chars.next(), chars.next()) {
					(Some(c), None) => Ok(Scalar::Char(c)),
					_ => Err(Error::InvalidValue(format!("`{s}` is not a single char"))),
				}
			}
			other => Err(Error::mismatch(kind, other.describe())),
		},
		ScalarKind::Str => match node {
			JsonNode::Str(s) => Ok(Scalar::Str(Cow::Owned(s))),
			other => Err(Error::mismatch(kind, other.describe())),
		},
	}
}

fn float_from_node(node: JsonNode, kind: ScalarKind) -> Result<f64> {
	match node {
		JsonNode::F64(v) => Ok(v),
		JsonNode::I64(v) => Ok(v as f64),
		JsonNode::U64(v) => Ok(v as f64),
		JsonNode::Str(s) => match s.as_str() {
			"NaN" => Ok(f64::NAN),
			"inf" => Ok(f64::INFINITY),
			"-inf" => Ok(f64::NEG_INFINITY),
			_ => Err(Error::mismatch(kind, "string")),
		},
		other => Err(Error::mismatch(kind, other.describe())),
	}
}

/// Write `value` as JSON to `writer`, under root name `"value0"`.
pub fn to_json_writer<T: Persist + ?Sized, W: Write>(value: &T, writer: W) -> Result<()> {
	to_json_writer_named(ROOT_NAME, value, writer)
}

/// Write `value` as JSON to `writer`, under root name `name`.
pub fn to_json_writer_named<T: Persist + ?Sized, W: Write>(
	name: &str,
	value: &T,
	writer: W,
) -> Result<()> {
	let mut ar = JsonOutputArchive::new(writer);
	value.save(&mut ar, Some(name))?;
	ar.finish()
}

/// Serialize `value` to a JSON string, under root name `"value0"`.
pub fn to_json<T: Persist + ?Sized>(value: &T) -> Result<String> {
	to_json_named(ROOT_NAME, value)
}

/// Serialize `value` to a JSON string, under root name `name`.
pub fn to_json_named<T: Persist + ?Sized>(name: &str, value: &T) -> Result<String> {
	let mut out = Vec::new();
	to_json_writer_named(name, value, &mut out)?;
	// `serde_json` only produces valid UTF-8
	String::from_utf8(out).map_err(|_| Error::InvalidUtf8)
}

/// Read JSON from `reader` into `value`.
///
/// Root value's name is ignored. Input is parsed before `value` is touched,
/// so a syntax error leaves `value` unchanged. A type error part way through
/// may leave it partly overwritten; use [`load_json`] to avoid that.
pub fn from_json_reader<T: Persist + ?Sized, R: Read>(value: &mut T, reader: R) -> Result<()> {
	let mut ar = JsonInputArchive::from_reader(reader)?;
	value.load(&mut ar)
}

/// Read JSON string into `value`. See [`from_json_reader`].
pub fn from_json<T: Persist + ?Sized>(value: &mut T, json: &str) -> Result<()> {
	let mut ar = JsonInputArchive::from_str(json)?;
	value.load(&mut ar)
}

/// Deserialize a new `T` from a JSON string.
pub fn load_json<T: Persist + Default>(json: &str) -> Result<T> {
	let mut value = T::default();
	from_json(&mut value, json)?;
	Ok(value)
}
