use std::vec;

use tracing::warn;

use crate::{Error, Result};

/// Positional reader over a parsed document tree.
///
/// Holds one iterator per entered node. Values are taken from the innermost
/// node in order, regardless of their names.
pub(crate) struct Cursor<N> {
	stack: Vec<vec::IntoIter<N>>,
}

impl<N> Cursor<N> {
	/// Create cursor positioned at first of `nodes`.
	pub fn new(nodes: Vec<N>) -> Self {
		Self {
			stack: vec![nodes.into_iter()],
		}
	}

	/// Take next value in current node.
	pub fn next(&mut self) -> Result<N> {
		self
			.stack
			.last_mut()
			.and_then(Iterator::next)
			.ok_or(Error::UnexpectedEnd)
	}

	/// Enter a node with children `nodes`.
	pub fn enter(&mut self, nodes: Vec<N>) {
		self.stack.push(nodes.into_iter());
	}

	/// Leave current node. Any values in it not yet read are skipped.
	pub fn leave(&mut self) -> Result<()> {
		// Never pop the document's top level
		if self.stack.len() < 2 {
			return Err(Error::UnexpectedEnd);
		}
		if let Some(rest) = self.stack.pop() {
			let skipped = rest.len();
			if skipped > 0 {
				warn!(skipped, "skipped unread values at end of node");
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reads_in_order_across_nodes() {
		let mut cursor = Cursor::new(vec![1, 2]);
		assert_eq!(cursor.next().unwrap(), 1);
		cursor.enter(vec![10, 11]);
		assert_eq!(cursor.next().unwrap(), 10);
		cursor.leave().unwrap();
		assert_eq!(cursor.next().unwrap(), 2);
		assert!(matches!(cursor.next(), Err(Error::UnexpectedEnd)));
	}

	#[test]
	fn exhausted_node_reports_end() {
		let mut cursor = Cursor::new(vec![1]);
		cursor.enter(vec![]);
		assert!(matches!(cursor.next(), Err(Error::UnexpectedEnd)));
		cursor.leave().unwrap();
		assert!(matches!(cursor.leave(), Err(Error::UnexpectedEnd)));
	}
}
