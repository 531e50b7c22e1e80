//! Walk an aggregate's shape, saving or loading each field.
//!
//! Bases come first, each flattened in turn (its own bases before its own
//! fields), then the type's direct fields, all in declaration order. Save and
//! load walk in exactly the same order, so a reader sees values in the order
//! they were written.

use crate::{InputArchive, OutputArchive, Reflect, Result};

/// Save all fields of `value`, including those of its bases, into the
/// currently open node of `ar`.
pub fn save(ar: &mut dyn OutputArchive, value: &dyn Reflect) -> Result<()> {
	let descriptor = value.descriptor();

	for (index, base) in descriptor.bases().iter().enumerate() {
		let base_value = value.base(index);
		debug_assert_eq!(base_value.descriptor().type_id(), base.type_id());
		save(ar, base_value)?;
	}

	for (ordinal, name) in descriptor.field_names().iter().copied().enumerate() {
		value.field(ordinal).save(ar, Some(name))?;
	}

	Ok(())
}

/// Load all fields of `value`, including those of its bases, from the
/// currently entered node of `ar`.
pub fn load(ar: &mut dyn InputArchive, value: &mut dyn Reflect) -> Result<()> {
	let descriptor = value.descriptor();

	for (index, base) in descriptor.bases().iter().enumerate() {
		let base_value = value.base_mut(index);
		debug_assert_eq!(base_value.descriptor().type_id(), base.type_id());
		load(ar, base_value)?;
	}

	for ordinal in 0..descriptor.field_count() {
		value.field_mut(ordinal).load(ar)?;
	}

	Ok(())
}

/// Save `value` as one object node named `name`.
///
/// Used by derived [`Persist`](crate::Persist) impls.
pub fn save_object(ar: &mut dyn OutputArchive, name: Option<&str>, value: &dyn Reflect) -> Result<()> {
	ar.begin_object(name)?;
	save(ar, value)?;
	ar.end()
}

/// Load `value` from one object node.
///
/// Used by derived [`Persist`](crate::Persist) impls.
pub fn load_object(ar: &mut dyn InputArchive, value: &mut dyn Reflect) -> Result<()> {
	ar.begin_object()?;
	load(ar, value)?;
	ar.end()
}
