use std::any::Any;

use crate::{BaseType, Limits, Persist, TypeDescriptor};

/// Static structural shape of a type: the input from which its
/// [`TypeDescriptor`] is built.
///
/// Implemented by [`#[derive(Reflect)]`](crate::Reflect). Only fields the type
/// exposes here take part in serialization.
pub trait Shape: Reflect + Sized {
	/// Names of direct fields, in declaration order.
	const FIELD_NAMES: &'static [&'static str];

	/// Bounds this type's shape is checked against.
	const LIMITS: Limits = Limits::DEFAULT;

	/// Fails compilation if shape exceeds `LIMITS`.
	///
	/// Not evaluated just by being present. [`descriptor_for`] references it,
	/// so any type which is traversed is checked.
	///
	/// ```
	/// # use ser_auto::{to_json, Reflect};
	/// #[derive(Reflect)]
	/// #[ser_limits(max_fields = 4, max_identifier_len = 5)]
	/// struct Fits {
	/// 	a: u8,
	/// 	b: u8,
	/// 	long: u8,
	/// }
	///
	/// to_json(&Fits { a: 1, b: 2, long: 3 }).unwrap();
	/// ```
	///
	/// Too many fields:
	///
	/// ```compile_fail
	/// # use ser_auto::{to_json, Reflect};
	/// #[derive(Reflect)]
	/// #[ser_limits(max_fields = 3)]
	/// struct TooMany {
	/// 	a: u8,
	/// 	b: u8,
	/// 	c: u8,
	/// }
	///
	/// to_json(&TooMany { a: 1, b: 2, c: 3 }).unwrap();
	/// ```
	///
	/// A field name too long:
	///
	/// ```compile_fail
	/// # use ser_auto::{to_json, Reflect};
	/// #[derive(Reflect)]
	/// #[ser_limits(max_identifier_len = 5)]
	/// struct LongName {
	/// 	a: u8,
	/// 	longer: u8,
	/// }
	///
	/// to_json(&LongName { a: 1, longer: 2 }).unwrap();
	/// ```
	///
	/// [`descriptor_for`]: crate::descriptor_for
	const ASSERT_WITHIN_LIMITS: () = assert!(
		Self::LIMITS.allows(Self::FIELD_NAMES),
		"type has too many fields, or a field name which is too long"
	);

	/// Direct bases, in declaration order.
	fn base_types() -> Vec<BaseType>;
}

/// Type-erased access to the fields and bases of an aggregate.
///
/// Ordinals index into the [`TypeDescriptor`] returned by `descriptor()`.
/// Passing an out-of-range ordinal is a bug in the caller, and panics.
pub trait Reflect: Any {
	/// Get (building on first use) this type's descriptor.
	fn descriptor(&self) -> &'static TypeDescriptor;

	/// Get reference to field at `ordinal`.
	fn field(&self, ordinal: usize) -> &dyn Persist;

	/// Get mutable reference to field at `ordinal`.
	fn field_mut(&mut self, ordinal: usize) -> &mut dyn Persist;

	/// Get this value viewed as its base at `index`.
	fn base(&self, index: usize) -> &dyn Reflect;

	/// Get this value viewed as its base at `index`, mutably.
	fn base_mut(&mut self, index: usize) -> &mut dyn Reflect;
}

/// Panic for an ordinal outside the type's descriptor.
/// Called from derived `Reflect` impls.
#[doc(hidden)]
#[cold]
#[track_caller]
pub fn out_of_range(type_name: &str, what: &str, ordinal: usize) -> ! {
	panic!("{what} ordinal {ordinal} out of range for `{type_name}`")
}
