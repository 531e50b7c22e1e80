use std::borrow::Cow;

use num_bigint::{BigInt, BigUint};

use crate::{Error, InputArchive, OutputArchive, Persist, Result, Scalar};

// Big integers are stored as decimal strings. That's exact in every format,
// and reads naturally in JSON and XML.
macro_rules! impl_bigint {
	($ty:ty) => {
		impl Persist for $ty {
			fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()> {
				ar.write_scalar(name, Scalar::Str(Cow::Owned(self.to_string())))
			}

			fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()> {
				let mut digits = String::new();
				digits.load(ar)?;
				*self = digits.parse::<$ty>().map_err(|err| {
					Error::InvalidValue(format!("`{}` is not a {}: {}", digits, stringify!($ty), err))
				})?;
				Ok(())
			}
		}
	};
}

impl_bigint!(BigUint);
impl_bigint!(BigInt);
