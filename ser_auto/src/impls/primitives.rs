use std::{borrow::Cow, num};

use crate::{Error, InputArchive, OutputArchive, Persist, Result, Scalar, ScalarKind};

macro_rules! impl_primitive {
	($ty:ty, $variant:ident) => {
		impl Persist for $ty {
			#[inline]
			fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()> {
				ar.write_scalar(name, Scalar::$variant(*self))
			}

			fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()> {
				match ar.read_scalar(ScalarKind::$variant)? {
					Scalar::$variant(value) => {
						*self = value;
						Ok(())
					}
					other => Err(Error::mismatch(ScalarKind::$variant, other.kind().name())),
				}
			}
		}
	};
}

impl_primitive!(u8, U8);
impl_primitive!(u16, U16);
impl_primitive!(u32, U32);
impl_primitive!(u64, U64);

impl_primitive!(i8, I8);
impl_primitive!(i16, I16);
impl_primitive!(i32, I32);
impl_primitive!(i64, I64);

impl_primitive!(f32, F32);
impl_primitive!(f64, F64);

impl_primitive!(bool, Bool);
impl_primitive!(char, Char);

// Pointer-sized integers are stored as 64 bit, so output is the same on all platforms
macro_rules! impl_pointer_sized {
	($ty:ty, $wide:ty) => {
		impl Persist for $ty {
			#[inline]
			fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()> {
				(*self as $wide).save(ar, name)
			}

			fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()> {
				let mut wide: $wide = 0;
				wide.load(ar)?;
				*self = <$ty>::try_from(wide).map_err(|_| {
					Error::InvalidValue(format!("{} out of range for {}", wide, stringify!($ty)))
				})?;
				Ok(())
			}
		}
	};
}

impl_pointer_sized!(usize, u64);
impl_pointer_sized!(isize, i64);

macro_rules! impl_non_zero {
	($ty:ty, $inner:ty) => {
		impl Persist for $ty {
			#[inline]
			fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()> {
				self.get().save(ar, name)
			}

			fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()> {
				let mut inner: $inner = 0;
				inner.load(ar)?;
				*self = <$ty>::new(inner)
					.ok_or_else(|| Error::InvalidValue(format!("zero for {}", stringify!($ty))))?;
				Ok(())
			}
		}
	};
}

impl_non_zero!(num::NonZeroU8, u8);
impl_non_zero!(num::NonZeroU16, u16);
impl_non_zero!(num::NonZeroU32, u32);
impl_non_zero!(num::NonZeroU64, u64);
impl_non_zero!(num::NonZeroUsize, usize);

impl_non_zero!(num::NonZeroI8, i8);
impl_non_zero!(num::NonZeroI16, i16);
impl_non_zero!(num::NonZeroI32, i32);
impl_non_zero!(num::NonZeroI64, i64);
impl_non_zero!(num::NonZeroIsize, isize);

impl Persist for String {
	#[inline]
	fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()> {
		ar.write_scalar(name, Scalar::Str(Cow::Borrowed(self)))
	}

	fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()> {
		match ar.read_scalar(ScalarKind::Str)? {
			Scalar::Str(value) => {
				*self = value.into_owned();
				Ok(())
			}
			other => Err(Error::mismatch(ScalarKind::Str, other.kind().name())),
		}
	}
}

// Unit carries no data, so occupies no position in output
impl Persist for () {
	#[inline(always)]
	fn save(&self, _ar: &mut dyn OutputArchive, _name: Option<&str>) -> Result<()> {
		Ok(())
	}

	#[inline(always)]
	fn load(&mut self, _ar: &mut dyn InputArchive) -> Result<()> {
		Ok(())
	}
}
