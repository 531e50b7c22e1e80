//! Structural shape of a type.

use std::{
	any::{self, TypeId},
	fmt,
};

use crate::{cache::descriptor_for, ShapeError, Shape};

/// Maximum number of direct fields a type may declare, by default.
/// A type must have *fewer* fields than this.
pub const MAX_FIELDS: usize = 256;

/// Maximum length in bytes of a field name, by default.
/// Names must be *shorter* than this.
pub const MAX_IDENTIFIER_LEN: usize = 256;

/// Bounds enforced when a [`TypeDescriptor`] is constructed.
///
/// Override per type with `#[ser_limits(max_fields = 8, max_identifier_len = 32)]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Limits {
	pub max_fields: usize,
	pub max_identifier_len: usize,
}

impl Limits {
	pub const DEFAULT: Limits = Limits {
		max_fields: MAX_FIELDS,
		max_identifier_len: MAX_IDENTIFIER_LEN,
	};

	/// Check field names against these limits.
	pub fn check(&self, type_name: &'static str, field_names: &[&'static str]) -> Result<(), ShapeError> {
		if field_names.len() >= self.max_fields {
			return Err(ShapeError::TooManyFields {
				type_name,
				count: field_names.len(),
				max: self.max_fields,
			});
		}

		match field_names
			.iter()
			.copied()
			.find(|name| name.len() >= self.max_identifier_len)
		{
			Some(name) => Err(ShapeError::IdentifierTooLong {
				type_name,
				name,
				len: name.len(),
				max: self.max_identifier_len,
			}),
			None => Ok(()),
		}
	}

	/// `const` version of [`check`](Limits::check), for compile-time assertions.
	pub const fn allows(&self, field_names: &[&str]) -> bool {
		if field_names.len() >= self.max_fields {
			return false;
		}
		let mut index = 0;
		while index < field_names.len() {
			if field_names[index].len() >= self.max_identifier_len {
				return false;
			}
			index += 1;
		}
		true
	}
}

impl Default for Limits {
	fn default() -> Self {
		Self::DEFAULT
	}
}

/// A direct base of a type, as reported by its [`Shape`].
///
/// The base's own descriptor is not built until first requested.
#[derive(Copy, Clone)]
pub struct BaseType {
	type_id: TypeId,
	type_name: &'static str,
	descriptor: fn() -> &'static TypeDescriptor,
}

impl BaseType {
	/// Create `BaseType` for base type `B`.
	pub fn of<B: Shape>() -> Self {
		Self {
			type_id: TypeId::of::<B>(),
			type_name: any::type_name::<B>(),
			descriptor: descriptor_for::<B>,
		}
	}

	#[inline]
	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	#[inline]
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Get (building on first use) the base type's descriptor.
	#[inline]
	pub fn descriptor(&self) -> &'static TypeDescriptor {
		(self.descriptor)()
	}
}

impl fmt::Debug for BaseType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("BaseType").field(&self.type_name).finish()
	}
}

/// Cached structural shape of one type: its direct fields and direct bases,
/// both in declaration order.
///
/// Obtained from [`descriptor_for`]. Immutable, and lives for the rest of the process.
#[derive(Debug)]
pub struct TypeDescriptor {
	type_id: TypeId,
	type_name: &'static str,
	field_names: Vec<&'static str>,
	bases: Vec<BaseType>,
	limits: Limits,
}

impl TypeDescriptor {
	/// Build descriptor, validating field names against `limits`.
	///
	/// No descriptor is produced if validation fails.
	pub fn new(
		type_id: TypeId,
		type_name: &'static str,
		field_names: &[&'static str],
		bases: Vec<BaseType>,
		limits: Limits,
	) -> Result<Self, ShapeError> {
		limits.check(type_name, field_names)?;
		Ok(Self {
			type_id,
			type_name,
			field_names: field_names.to_vec(),
			bases,
			limits,
		})
	}

	/// Build descriptor from a type's [`Shape`].
	pub fn of<T: Shape>() -> Result<Self, ShapeError> {
		Self::new(
			TypeId::of::<T>(),
			any::type_name::<T>(),
			T::FIELD_NAMES,
			T::base_types(),
			T::LIMITS,
		)
	}

	#[inline]
	pub fn type_id(&self) -> TypeId {
		self.type_id
	}

	#[inline]
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	/// Names of direct fields, indexed by field ordinal.
	#[inline]
	pub fn field_names(&self) -> &[&'static str] {
		&self.field_names
	}

	/// Name of field at `ordinal`.
	///
	/// # Panics
	///
	/// Panics if `ordinal >= field_count()`.
	#[inline]
	pub fn field_name(&self, ordinal: usize) -> &'static str {
		self.field_names[ordinal]
	}

	#[inline]
	pub fn field_count(&self) -> usize {
		self.field_names.len()
	}

	#[inline]
	pub fn bases(&self) -> &[BaseType] {
		&self.bases
	}

	/// Identities of direct bases, in declaration order.
	pub fn base_type_ids(&self) -> impl Iterator<Item = TypeId> + '_ {
		self.bases.iter().map(BaseType::type_id)
	}

	#[inline]
	pub fn base_count(&self) -> usize {
		self.bases.len()
	}

	#[inline]
	pub fn limits(&self) -> Limits {
		self.limits
	}

	/// `true` if serializing this type writes no fields at all,
	/// including fields inherited from bases.
	pub fn is_empty(&self) -> bool {
		self.field_count() == 0 && self.bases.iter().all(|base| base.descriptor().is_empty())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn limits_reject_field_count_at_max() {
		let limits = Limits {
			max_fields: 2,
			max_identifier_len: 8,
		};
		assert_eq!(limits.check("T", &["a"]), Ok(()));
		assert_eq!(
			limits.check("T", &["a", "b"]),
			Err(ShapeError::TooManyFields {
				type_name: "T",
				count: 2,
				max: 2
			})
		);
		assert!(limits.allows(&["a"]));
		assert!(!limits.allows(&["a", "b"]));
	}

	#[test]
	fn limits_reject_identifier_at_max() {
		let limits = Limits {
			max_fields: 8,
			max_identifier_len: 4,
		};
		assert_eq!(limits.check("T", &["abc"]), Ok(()));
		assert_eq!(
			limits.check("T", &["abc", "abcd"]),
			Err(ShapeError::IdentifierTooLong {
				type_name: "T",
				name: "abcd",
				len: 4,
				max: 4
			})
		);
		assert!(!limits.allows(&["abc", "abcd"]));
	}

	#[test]
	fn new_keeps_declaration_order() {
		let descriptor = TypeDescriptor::new(
			TypeId::of::<u8>(),
			"T",
			&["zed", "alpha", "mid"],
			vec![],
			Limits::DEFAULT,
		)
		.unwrap();
		assert_eq!(descriptor.field_names(), &["zed", "alpha", "mid"]);
		assert_eq!(descriptor.field_count(), 3);
		assert_eq!(descriptor.base_count(), 0);
		assert_eq!(descriptor.field_name(1), "alpha");
		assert!(!descriptor.is_empty());
	}

	#[test]
	fn empty_descriptor() {
		let descriptor =
			TypeDescriptor::new(TypeId::of::<()>(), "E", &[], vec![], Limits::DEFAULT).unwrap();
		assert_eq!(descriptor.field_count(), 0);
		assert!(descriptor.is_empty());
	}
}
