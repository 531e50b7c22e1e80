use std::{cell::RefCell, collections::BTreeMap};

use super::check_progress;
use crate::{Error, InputArchive, OutputArchive, Persist, Result};

impl<T: Persist + Default> Persist for Option<T> {
	fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()> {
		ar.begin_object(name)?;
		self.is_some().save(ar, Some("present"))?;
		if let Some(value) = self {
			value.save(ar, Some("value"))?;
		}
		ar.end()
	}

	fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()> {
		ar.begin_object()?;
		let mut present = false;
		present.load(ar)?;
		if present {
			self.get_or_insert_with(T::default).load(ar)?;
		} else {
			*self = None;
		}
		ar.end()
	}
}

impl<T: Persist> Persist for RefCell<T> {
	#[inline]
	fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()> {
		self.borrow().save(ar, name)
	}

	#[inline]
	fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()> {
		self.get_mut().load(ar)
	}
}

impl<T: Persist, const N: usize> Persist for [T; N] {
	fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()> {
		ar.begin_seq(name, N)?;
		for value in self {
			value.save(ar, None)?;
		}
		ar.end()
	}

	fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()> {
		let len = ar.begin_seq()?;
		if len != N {
			return Err(Error::InvalidValue(format!(
				"expected array of {N} items, found {len}"
			)));
		}
		for value in self {
			value.load(ar)?;
		}
		ar.end()
	}
}

impl<K, V> Persist for BTreeMap<K, V>
where
	K: Persist + Default + Ord,
	V: Persist + Default,
{
	fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()> {
		ar.begin_seq(name, self.len())?;
		for (key, value) in self {
			ar.begin_object(None)?;
			key.save(ar, Some("key"))?;
			value.save(ar, Some("value"))?;
			ar.end()?;
		}
		ar.end()
	}

	fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()> {
		let len = ar.begin_seq()?;
		self.clear();
		let start = ar.bytes_read();
		for loaded in 1..=len {
			let mut key = K::default();
			let mut value = V::default();
			ar.begin_object()?;
			key.load(ar)?;
			value.load(ar)?;
			ar.end()?;
			self.insert(key, value);
			check_progress(&*ar, start, loaded)?;
		}
		ar.end()
	}
}

macro_rules! impl_tuple {
	($($ty:ident $index:tt $name:literal),+) => {
		impl<$($ty: Persist),+> Persist for ($($ty,)+) {
			fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()> {
				ar.begin_object(name)?;
				$(self.$index.save(ar, Some($name))?;)+
				ar.end()
			}

			fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()> {
				ar.begin_object()?;
				$(self.$index.load(ar)?;)+
				ar.end()
			}
		}
	};
}

impl_tuple!(A 0 "value0", B 1 "value1");
impl_tuple!(A 0 "value0", B 1 "value1", C 2 "value2");
impl_tuple!(A 0 "value0", B 1 "value1", C 2 "value2", D 3 "value3");
