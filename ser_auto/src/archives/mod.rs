//! Wire formats.

mod binary;
mod cursor;
mod json;
mod xml;

pub use binary::{
	from_binary, from_binary_reader, load_binary, to_binary, to_binary_writer, BinaryInputArchive,
	BinaryOutputArchive,
};
pub use json::{
	from_json, from_json_reader, load_json, to_json, to_json_named, to_json_writer,
	to_json_writer_named, JsonInputArchive, JsonNode, JsonOptions, JsonOutputArchive, JSON_MAX_DEPTH,
};
pub use xml::{
	from_xml, from_xml_reader, load_xml, to_xml, to_xml_named, to_xml_writer, to_xml_writer_named,
	XmlInputArchive, XmlOptions, XmlOutputArchive,
};
