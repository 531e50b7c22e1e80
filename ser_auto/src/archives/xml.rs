//! XML format.
//!
//! Each value is an element named after its field, inside a `<ser_auto>`
//! document element. Scalars are the element's text. Sequence items are
//! `<value>` elements, and the sequence element carries a `size` attribute.
//! Shared references carry an `id` attribute, and contain a `<data>` element
//! on first occurrence only.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <ser_auto>
//! 	<value0>
//! 		<foo>1</foo>
//! 		<bar>PLEH!</bar>
//! 	</value0>
//! </ser_auto>
//! ```

use std::{
	borrow::Cow,
	fmt::Write as _,
	io::{Read, Write},
	mem,
	str::FromStr,
};

use roxmltree::{Document, Node};
use tracing::trace;

use super::cursor::Cursor;
use crate::{
	Error, InputArchive, LoadRegistry, OutputArchive, Persist, Result, SaveRegistry, Scalar,
	ScalarKind, ROOT_NAME,
};

/// Name of document element.
const DOCUMENT: &str = "ser_auto";
/// Name of elements for sequence items.
const ITEM: &str = "value";

/// Options for [`XmlOutputArchive`].
#[derive(Copy, Clone, Debug)]
pub struct XmlOptions {
	/// Put each element on its own line, indented with tabs. Default: `true`.
	pub indent: bool,
}

impl Default for XmlOptions {
	fn default() -> Self {
		Self { indent: true }
	}
}

/// XML writer.
///
/// Output is buffered, and written to `writer` by
/// [`finish`](OutputArchive::finish).
pub struct XmlOutputArchive<W: Write> {
	writer: W,
	options: XmlOptions,
	out: String,
	// Open elements: name, and whether any child has been written yet
	open: Vec<(String, bool)>,
	refs: SaveRegistry,
}

impl<W: Write> XmlOutputArchive<W> {
	pub fn new(writer: W) -> Self {
		Self::with_options(writer, XmlOptions::default())
	}

	pub fn with_options(writer: W, options: XmlOptions) -> Self {
		trace!("opened XML output archive");
		let mut ar = Self {
			writer,
			options,
			out: String::new(),
			open: Vec::new(),
			refs: SaveRegistry::new(),
		};
		ar.start_document();
		ar
	}

	fn start_document(&mut self) {
		self.out.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
		self.out.push_str("\n<");
		self.out.push_str(DOCUMENT);
		self.out.push('>');
		self.open.push((DOCUMENT.to_string(), false));
	}

	fn newline(&mut self) {
		if self.options.indent {
			self.out.push('\n');
			for _ in 0..self.open.len() {
				self.out.push('\t');
			}
		}
	}

	/// Write start tag of a child of current element.
	fn start_tag(&mut self, name: Option<&str>, attr: Option<(&str, usize)>) -> Result<String> {
		let name = match name {
			Some(name) if is_valid_name(name) => name,
			Some(name) => {
				return Err(Error::InvalidValue(format!(
					"`{name}` is not a valid XML element name"
				)))
			}
			None => ITEM,
		};
		if let Some((_, has_children)) = self.open.last_mut() {
			*has_children = true;
		}
		self.newline();
		self.out.push('<');
		self.out.push_str(name);
		if let Some((key, value)) = attr {
			// Writing to a `String` can't fail
			let _ = write!(self.out, r#" {key}="{value}""#);
		}
		self.out.push('>');
		Ok(name.to_string())
	}

	fn open_element(&mut self, name: Option<&str>, attr: Option<(&str, usize)>) -> Result<()> {
		let name = self.start_tag(name, attr)?;
		self.open.push((name, false));
		Ok(())
	}

	/// Write escaped `text` and end tag of leaf element `name`.
	fn finish_text(&mut self, text: &str, name: &str) -> Result<()> {
		escape_into(&mut self.out, text)?;
		self.out.push_str("</");
		self.out.push_str(name);
		self.out.push('>');
		Ok(())
	}

	fn close_element(&mut self) -> Result<()> {
		let (name, has_children) = self
			.open
			.pop()
			.ok_or_else(|| Error::InvalidValue("`end` without matching `begin`".to_string()))?;
		if has_children {
			self.newline();
		}
		self.out.push_str("</");
		self.out.push_str(&name);
		self.out.push('>');
		Ok(())
	}
}

impl<W: Write> OutputArchive for XmlOutputArchive<W> {
	fn write_scalar(&mut self, name: Option<&str>, value: Scalar<'_>) -> Result<()> {
		let name = self.start_tag(name, None)?;
		// Writing to a `String` can't fail
		let _ = match value {
			Scalar::Bool(v) => write!(self.out, "{v}"),
			Scalar::I8(v) => write!(self.out, "{v}"),
			Scalar::I16(v) => write!(self.out, "{v}"),
			Scalar::I32(v) => write!(self.out, "{v}"),
			Scalar::I64(v) => write!(self.out, "{v}"),
			Scalar::U8(v) => write!(self.out, "{v}"),
			Scalar::U16(v) => write!(self.out, "{v}"),
			Scalar::U32(v) => write!(self.out, "{v}"),
			Scalar::U64(v) => write!(self.out, "{v}"),
			// `Display` for floats is shortest round-trippable form, and `NaN` / `inf` / `-inf`
			// for non-finite values, all of which `FromStr` accepts
			Scalar::F32(v) => write!(self.out, "{v}"),
			Scalar::F64(v) => write!(self.out, "{v}"),
			Scalar::Char(v) => return self.finish_text(v.encode_utf8(&mut [0; 4]), &name),
			Scalar::Str(v) => return self.finish_text(&v, &name),
		};
		self.out.push_str("</");
		self.out.push_str(&name);
		self.out.push('>');
		Ok(())
	}

	fn begin_object(&mut self, name: Option<&str>) -> Result<()> {
		self.open_element(name, None)
	}

	fn begin_seq(&mut self, name: Option<&str>, len: usize) -> Result<()> {
		self.open_element(name, Some(("size", len)))
	}

	fn begin_shared(&mut self, name: Option<&str>, id: u32) -> Result<()> {
		self.open_element(name, Some(("id", id as usize)))
	}

	fn end(&mut self) -> Result<()> {
		// Never close the document element
		if self.open.len() < 2 {
			return Err(Error::InvalidValue("`end` without matching `begin`".to_string()));
		}
		self.close_element()
	}

	fn saved_refs(&mut self) -> &mut SaveRegistry {
		&mut self.refs
	}

	fn finish(&mut self) -> Result<()> {
		if self.open.len() != 1 {
			return Err(Error::InvalidValue(format!(
				"{} elements left open",
				self.open.len() - 1
			)));
		}
		self.close_element()?;
		self.out.push('\n');

		self.writer.write_all(self.out.as_bytes())?;
		self.writer.flush()?;
		trace!(
			bytes = self.out.len(),
			shared = self.refs.len(),
			"finished XML output archive"
		);

		// Leave archive ready for further use
		self.out.clear();
		self.start_document();
		Ok(())
	}
}

/// Whether `name` can be written as an element name.
///
/// Colons are excluded, as readers treat them as namespace prefixes.
fn is_valid_name(name: &str) -> bool {
	fn is_name_char(c: char, first: bool) -> bool {
		c.is_alphabetic() || c == '_' || (!first && (c.is_ascii_digit() || c == '-' || c == '.'))
	}

	let mut chars = name.chars();
	match chars.next() {
		Some(c) if is_name_char(c, true) => chars.all(|c| is_name_char(c, false)),
		_ => false,
	}
}

/// Whether XML 1.0 can carry `c` at all, literally or as a character reference.
fn is_xml_char(c: char) -> bool {
	!matches!(
		c,
		'\0'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{fffe}' | '\u{ffff}'
	)
}

/// Append `s` to `out`, escaping markup characters.
///
/// Carriage returns and other control characters are written as character
/// references, so they survive parsing unchanged. Characters XML can't carry
/// at all are an error.
fn escape_into(out: &mut String, s: &str) -> Result<()> {
	for c in s.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&apos;"),
			'\n' | '\t' => out.push(c),
			c if !is_xml_char(c) => {
				return Err(Error::InvalidValue(format!(
					"character {c:?} can't be represented in XML"
				)))
			}
			c if c.is_control() => {
				let _ = write!(out, "&#{};", c as u32);
			}
			c => out.push(c),
		}
	}
	Ok(())
}

/// Element of a parsed document.
struct Element {
	name: String,
	size: Option<String>,
	id: Option<String>,
	/// Text content. Only kept for elements with no child elements.
	text: String,
	/// Indexes of child elements in the arena
	children: Vec<usize>,
}

impl Element {
	fn new(node: Node<'_, '_>) -> Self {
		let is_leaf = !node.children().any(|child| child.is_element());
		let text = if is_leaf {
			node
				.children()
				.filter(|child| child.is_text())
				.filter_map(|child| child.text())
				.collect()
		} else {
			String::new()
		};
		Self {
			name: node.tag_name().name().to_string(),
			size: node.attribute("size").map(str::to_string),
			id: node.attribute("id").map(str::to_string),
			text,
			children: Vec::new(),
		}
	}
}

/// Copy `root` and all elements below it into a flat arena, in document order.
/// `root` is at index 0.
///
/// Walks with an explicit stack, so deeply nested documents can't overflow
/// the call stack.
fn flatten(root: Node<'_, '_>) -> Vec<Element> {
	let mut elements: Vec<Element> = Vec::new();
	let mut pending: Vec<(Node<'_, '_>, Option<usize>)> = vec![(root, None)];
	while let Some((node, parent)) = pending.pop() {
		let index = elements.len();
		elements.push(Element::new(node));
		if let Some(parent) = parent {
			elements[parent].children.push(index);
		}

		// Push in reverse, so children are popped in document order
		let children: Vec<Node> = node.children().filter(Node::is_element).collect();
		pending.extend(children.into_iter().rev().map(|child| (child, Some(index))));
	}
	elements
}

/// XML reader.
///
/// Whole document is parsed when archive is created, so syntax errors are
/// reported before any value is loaded.
pub struct XmlInputArchive {
	elements: Vec<Element>,
	cursor: Cursor<usize>,
	refs: LoadRegistry,
}

impl XmlInputArchive {
	/// Parse XML document from `reader`.
	pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
		let mut bytes = Vec::new();
		reader.read_to_end(&mut bytes)?;
		let xml = String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8)?;
		Self::from_str(&xml)
	}

	/// Parse XML document from `xml`.
	pub fn from_str(xml: &str) -> Result<Self> {
		let xml = xml.strip_prefix('\u{feff}').unwrap_or(xml);
		let document = Document::parse(xml)?;
		let root = document.root_element();
		if root.tag_name().name() != DOCUMENT {
			return Err(Error::InvalidValue(format!(
				"expected document element `<{DOCUMENT}>`, found `<{}>`",
				root.tag_name().name()
			)));
		}

		let mut elements = flatten(root);
		let roots = mem::take(&mut elements[0].children);
		trace!(
			roots = roots.len(),
			elements = elements.len(),
			"opened XML input archive"
		);
		Ok(Self {
			elements,
			cursor: Cursor::new(roots),
			refs: LoadRegistry::new(),
		})
	}

	/// Take next element, and enter it. Returns the element and its number of children.
	fn enter_next(&mut self) -> Result<(&Element, usize)> {
		let index = self.cursor.next()?;
		let children = mem::take(&mut self.elements[index].children);
		let len = children.len();
		self.cursor.enter(children);
		Ok((&self.elements[index], len))
	}

	/// Take text of next element, checking it's a leaf.
	fn next_text(&mut self, kind: ScalarKind) -> Result<String> {
		let index = self.cursor.next()?;
		let element = &mut self.elements[index];
		if !element.children.is_empty() {
			return Err(Error::mismatch(
				kind,
				format!("element `<{}>` with children", element.name),
			));
		}
		Ok(mem::take(&mut element.text))
	}
}

impl InputArchive for XmlInputArchive {
	fn read_scalar(&mut self, kind: ScalarKind) -> Result<Scalar<'static>> {
		let text = self.next_text(kind)?;
		let value = match kind {
			ScalarKind::Bool => Scalar::Bool(parse_text(&text, kind)?),
			ScalarKind::I8 => Scalar::I8(parse_text(&text, kind)?),
			ScalarKind::I16 => Scalar::I16(parse_text(&text, kind)?),
			ScalarKind::I32 => Scalar::I32(parse_text(&text, kind)?),
			ScalarKind::I64 => Scalar::I64(parse_text(&text, kind)?),
			ScalarKind::U8 => Scalar::U8(parse_text(&text, kind)?),
			ScalarKind::U16 => Scalar::U16(parse_text(&text, kind)?),
			ScalarKind::U32 => Scalar::U32(parse_text(&text, kind)?),
			ScalarKind::U64 => Scalar::U64(parse_text(&text, kind)?),
			ScalarKind::F32 => Scalar::F32(parse_text(&text, kind)?),
			ScalarKind::F64 => Scalar::F64(parse_text(&text, kind)?),
			ScalarKind::Char => {
				let mut chars = text.chars();
				match (chars.next(), chars.next()) {
					(Some(c), None) => Scalar::Char(c),
					_ => return Err(Error::InvalidValue(format!("`{text}` is not a single char"))),
				}
			}
			ScalarKind::Str => Scalar::Str(Cow::Owned(text)),
		};
		Ok(value)
	}

	fn begin_object(&mut self) -> Result<()> {
		self.enter_next()?;
		Ok(())
	}

	fn begin_seq(&mut self) -> Result<usize> {
		let (element, len) = self.enter_next()?;
		if let Some(size) = &element.size {
			let size = parse_text::<usize>(size, ScalarKind::U64)?;
			if size != len {
				return Err(Error::InvalidValue(format!(
					"sequence `<{}>` has size {size} but {len} items",
					element.name
				)));
			}
		}
		Ok(len)
	}

	fn begin_shared(&mut self) -> Result<u32> {
		let (element, _) = self.enter_next()?;
		match &element.id {
			Some(id) => parse_text::<u32>(id, ScalarKind::U32),
			None => Err(Error::InvalidValue(format!(
				"shared reference `<{}>` has no id",
				element.name
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

fn parse_text<T: FromStr>(text: &str, kind: ScalarKind) -> Result<T> {
	// Scalars are never written with surrounding whitespace, but hand-edited files may have it
	let trimmed = text.trim();
	trimmed.parse().map_err(|_| Error::mismatch(kind, format!("`{trimmed}`")))
}

/// Write `value` as XML to `writer`, under root name `"value0"`.
pub fn to_xml_writer<T: Persist + ?Sized, W: Write>(value: &T, writer: W) -> Result<()> {
	to_xml_writer_named(ROOT_NAME, value, writer)
}

/// Write `value` as XML to `writer`, under root name `name`.
pub fn to_xml_writer_named<T: Persist + ?Sized, W: Write>(
	name: &str,
	value: &T,
	writer: W,
) -> Result<()> {
	let mut ar = XmlOutputArchive::new(writer);
	value.save(&mut ar, Some(name))?;
	ar.finish()
}

/// Serialize `value` to an XML string, under root name `"value0"`.
pub fn to_xml<T: Persist + ?Sized>(value: &T) -> Result<String> {
	to_xml_named(ROOT_NAME, value)
}

/// Serialize `value` to an XML string, under root name `name`.
pub fn to_xml_named<T: Persist + ?Sized>(name: &str, value: &T) -> Result<String> {
	let mut out = Vec::new();
	to_xml_writer_named(name, value, &mut out)?;
	String::from_utf8(out).map_err(|_| Error::InvalidUtf8)
}

/// Read XML from `reader` into `value`.
///
/// Root element's name is ignored. Input is parsed before `value` is touched,
/// so a syntax error leaves `value` unchanged. A type error part way through
/// may leave it partly overwritten; use [`load_xml`] to avoid that.
pub fn from_xml_reader<T: Persist + ?Sized, R: Read>(value: &mut T, reader: R) -> Result<()> {
	let mut ar = XmlInputArchive::from_reader(reader)?;
	value.load(&mut ar)
}

/// Read XML string into `value`. See [`from_xml_reader`].
pub fn from_xml<T: Persist + ?Sized>(value: &mut T, xml: &str) -> Result<()> {
	let mut ar = XmlInputArchive::from_str(xml)?;
	value.load(&mut ar)
}

/// Deserialize a new `T` from an XML string.
pub fn load_xml<T: Persist + Default>(xml: &str) -> Result<T> {
	let mut value = T::default();
	from_xml(&mut value, xml)?;
	Ok(value)
}
