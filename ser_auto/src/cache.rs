//! Process-wide store of type descriptors.
//!
//! Descriptors are built on first request and leaked, so references to them
//! are `&'static`. The map is append-only. Construction happens while holding
//! the write lock, so each type's descriptor is built at most once, even when
//! several threads ask for it at the same time.

use std::{any::TypeId, collections::HashMap, sync::OnceLock};

use parking_lot::RwLock;
use tracing::debug;

use crate::{ShapeError, Shape, TypeDescriptor};

type DescriptorMap = HashMap<TypeId, &'static TypeDescriptor>;

fn cache() -> &'static RwLock<DescriptorMap> {
	static CACHE: OnceLock<RwLock<DescriptorMap>> = OnceLock::new();
	CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Get descriptor for `T`, building it on first use.
///
/// A type whose shape exceeds its limits fails to compile when this is
/// instantiated for it.
pub fn descriptor_for<T: Shape>() -> &'static TypeDescriptor {
	// Ensure (at compile time) that shape is within limits
	let _ = T::ASSERT_WITHIN_LIMITS;

	match try_descriptor_for::<T>() {
		Ok(descriptor) => descriptor,
		// Unreachable unless `Shape` impl's runtime data disagrees with its consts
		Err(err) => panic!("{err}"),
	}
}

/// Get descriptor for `T`, building it on first use, checking limits at runtime.
///
/// On failure nothing is stored, and the next call will try again.
pub fn try_descriptor_for<T: Shape>() -> Result<&'static TypeDescriptor, ShapeError> {
	let type_id = TypeId::of::<T>();
	if let Some(descriptor) = get_by_type_id(type_id) {
		return Ok(descriptor);
	}

	let mut map = cache().write();
	// Another thread may have built it while we waited for the lock
	if let Some(descriptor) = map.get(&type_id) {
		return Ok(*descriptor);
	}

	let descriptor = TypeDescriptor::of::<T>()?;
	debug!(
		type_name = descriptor.type_name(),
		fields = descriptor.field_count(),
		bases = descriptor.base_count(),
		"built type descriptor"
	);
	let descriptor: &'static TypeDescriptor = Box::leak(Box::new(descriptor));
	map.insert(type_id, descriptor);
	Ok(descriptor)
}

/// Get descriptor for type with ID `type_id`, if it has been built already.
pub fn get_by_type_id(type_id: TypeId) -> Option<&'static TypeDescriptor> {
	cache().read().get(&type_id).copied()
}
