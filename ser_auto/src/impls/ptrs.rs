use std::{rc::Rc, sync::Arc};

use super::check_progress;
use crate::{InputArchive, Lookup, OutputArchive, Persist, Result, SHARED_DATA};

// Only allocate up front for this many items, in case length read from input is bogus
const MAX_PREALLOCATE: usize = 4096;

impl<T: Persist + ?Sized> Persist for Box<T> {
	#[inline]
	fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()> {
		(**self).save(ar, name)
	}

	#[inline]
	fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()> {
		(**self).load(ar)
	}
}

impl<T: Persist + Default> Persist for Vec<T> {
	fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()> {
		ar.begin_seq(name, self.len())?;
		for value in self {
			value.save(ar, None)?;
		}
		ar.end()
	}

	fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()> {
		let len = ar.begin_seq()?;
		self.clear();
		self.reserve(len.min(MAX_PREALLOCATE));
		let start = ar.bytes_read();
		for _ in 0..len {
			let mut value = T::default();
			value.load(ar)?;
			self.push(value);
			check_progress(&*ar, start, self.len())?;
		}
		ar.end()
	}
}

/// Shared pointers are written once per allocation. Later occurrences of the
/// same allocation write only its ID, and load as clones of the first.
macro_rules! impl_shared {
	($ptr:ident) => {
		impl<T: Persist + Default + 'static> Persist for $ptr<T> {
			fn save(&self, ar: &mut dyn OutputArchive, name: Option<&str>) -> Result<()> {
				let addr = $ptr::as_ptr(self) as *const () as usize;
				let (id, first) = ar.saved_refs().register(addr);
				ar.begin_shared(name, id)?;
				if first {
					(**self).save(ar, Some(SHARED_DATA))?;
				}
				ar.end()
			}

			fn load(&mut self, ar: &mut dyn InputArchive) -> Result<()> {
				let id = ar.begin_shared()?;
				*self = match ar.loaded_refs().lookup::<$ptr<T>>(id)? {
					Lookup::Known(ptr) => ptr,
					Lookup::New => {
						let mut value = T::default();
						value.load(ar)?;
						let ptr = $ptr::new(value);
						ar.loaded_refs().complete(id, ptr.clone());
						ptr
					}
				};
				ar.end()
			}
		}
	};
}

impl_shared!(Rc);
impl_shared!(Arc);
