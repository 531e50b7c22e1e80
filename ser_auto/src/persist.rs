use crate::{InputArchive, OutputArchive, Result};

/// Trait for types which can be saved to and loaded from an archive.
///
/// Implemented for primitives, strings, std containers and shared pointers,
/// and for aggregates by [`#[derive(Reflect)]`](crate::Reflect).
///
/// Loading is in place: `load` overwrites `self` with the value read.
pub trait Persist {
	/// Write this value to archive, under `name`.
	///
	/// `name` is `None` when value is an item of a sequence.
	fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()>;

	/// Read this value from archive.
	fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()>;
}
