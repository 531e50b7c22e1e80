//! Shared-reference registries.
//!
//! Each archive owns one, for the duration of one save or load. IDs are
//! assigned from 1, in the order shared objects are first written, so the
//! reader can tell a first occurrence (the next unseen ID) from a
//! back-reference (an ID already seen) without any extra flag in the output.

use std::{any::Any, collections::HashMap};

use tracing::trace;

use crate::{Error, Result};

/// Tracks shared objects written by an [`OutputArchive`](crate::OutputArchive),
/// keyed by address of their allocation.
#[derive(Default, Debug)]
pub struct SaveRegistry {
	ids: HashMap<usize, u32>,
}

impl SaveRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register object at `addr`.
	///
	/// Returns its ID, and `true` if this is the first time it's been seen.
	pub fn register(&mut self, addr: usize) -> (u32, bool) {
		let next_id = self.ids.len() as u32 + 1;
		match self.ids.get(&addr) {
			Some(&id) => (id, false),
			None => {
				self.ids.insert(addr, next_id);
				trace!(id = next_id, "registered shared object");
				(next_id, true)
			}
		}
	}

	pub fn len(&self) -> usize {
		self.ids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.ids.is_empty()
	}
}

/// Result of looking up a shared object ID in a [`LoadRegistry`].
pub enum Lookup<P> {
	/// Object was read earlier. Contains a new handle to it.
	Known(P),
	/// First occurrence. Caller must read the object's data and then call
	/// [`LoadRegistry::complete`].
	New,
}

/// Tracks shared objects read by an [`InputArchive`](crate::InputArchive).
///
/// Stores a handle (e.g. an `Rc<T>`) to each object, indexed by `id - 1`.
/// Slot is `None` while the object's own data is being read.
#[derive(Default)]
pub struct LoadRegistry {
	objects: Vec<Option<Box<dyn Any>>>,
}

impl LoadRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Look up shared object `id`, expecting a handle of type `P`.
	pub fn lookup<P: Any + Clone>(&mut self, id: u32) -> Result<Lookup<P>> {
		let index = (id as usize).checked_sub(1).ok_or(Error::UnknownSharedRef(id))?;
		if index == self.objects.len() {
			self.objects.push(None);
			return Ok(Lookup::New);
		}

		match self.objects.get(index) {
			Some(Some(object)) => object
				.downcast_ref::<P>()
				.cloned()
				.map(Lookup::Known)
				.ok_or(Error::SharedTypeMismatch(id)),
			// Out of range, or refers to an object which is still being read (a cycle)
			_ => Err(Error::UnknownSharedRef(id)),
		}
	}

	/// Store handle for object `id`, after its data has been read.
	pub fn complete<P: Any>(&mut self, id: u32, handle: P) {
		let index = id as usize - 1;
		debug_assert!(self.objects[index].is_none());
		self.objects[index] = Some(Box::new(handle));
	}

	pub fn len(&self) -> usize {
		self.objects.len()
	}

	pub fn is_empty(&self) -> bool {
		self.objects.is_empty()
	}
}
