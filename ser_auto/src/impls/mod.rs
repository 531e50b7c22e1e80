//! `Persist` impls for std types.

#[cfg(feature = "num_bigint")]
mod bigint;
mod other;
mod primitives;
mod ptrs;

use crate::{Error, InputArchive, Result};

/// Most sequence items accepted when none of them has read any input.
/// Such items don't bound the length, so a bogus length could loop for ever.
const MAX_EMPTY_ITEMS: usize = 1 << 20;

/// Fail if `loaded` items of a sequence have been read since input position
/// `start` without consuming any input, and there are too many of them.
fn check_progress(ar: &dyn InputArchive, start: Option<u64>, loaded: usize) -> Result<()> {
	if loaded > MAX_EMPTY_ITEMS && start.is_some() && ar.bytes_read() == start {
		return Err(Error::InvalidValue(format!(
			"sequence has more than {MAX_EMPTY_ITEMS} items which occupy no input"
		)));
	}
	Ok(())
}
