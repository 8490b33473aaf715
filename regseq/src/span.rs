use core::{ptr, slice};

use super::error::{check_elements, Error};

/// The immutable data range of a node, shared by both layouts.
///
/// `beg` is never null for a node. A ring root carries a null span in the
/// same position, which is how a walk tells the root apart from a node.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub(crate) struct Span {
  beg: *const u8,
  end: *const u8,
}

// SAFETY: the range is never written through.
unsafe impl Send for Span {}
// SAFETY: see above.
unsafe impl Sync for Span {}

impl Span {
  pub(crate) const NULL: Self = Self {
    beg: ptr::null(),
    end: ptr::null(),
  };

  #[inline]
  pub(crate) const fn new<T>(data: &'static [T]) -> Self {
    let range = data.as_ptr_range();
    Self {
      beg: range.start.cast(),
      end: range.end.cast(),
    }
  }

  #[inline]
  pub(crate) const fn from_ref<T>(data: &'static T) -> Self {
    Self::new(slice::from_ref(data))
  }

  #[inline]
  pub(crate) const fn from_raw_parts(beg: *const u8, end: *const u8) -> Self {
    Self { beg, end }
  }

  #[inline]
  pub(crate) fn try_from_raw_parts(beg: *const u8, end: *const u8) -> Result<Self, Error> {
    if beg.is_null() || end < beg {
      return Err(Error::inverted_range(beg, end));
    }

    Ok(Self::from_raw_parts(beg, end))
  }

  #[inline]
  pub(crate) fn is_null(&self) -> bool {
    self.beg.is_null()
  }

  #[inline]
  pub(crate) const fn beg(&self) -> *const u8 {
    self.beg
  }

  #[inline]
  pub(crate) fn size(&self) -> usize {
    self.end as usize - self.beg as usize
  }

  /// # Safety
  /// Every byte in the range must be initialized.
  #[inline]
  pub(crate) unsafe fn as_bytes(&self) -> &'static [u8] {
    slice::from_raw_parts(self.beg, self.size())
  }

  /// # Safety
  /// The range must hold initialized, valid values of `T`.
  pub(crate) unsafe fn try_as_slice<T>(&self) -> Result<&'static [T], Error> {
    let len = check_elements::<T>(self.beg as usize, self.size())?;
    Ok(slice::from_raw_parts(self.beg.cast::<T>(), len))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::tests::BYTES;

  #[test]
  fn test_null_span() {
    assert!(Span::NULL.is_null());
    assert_eq!(Span::NULL.size(), 0);
    assert!(!Span::new(&BYTES[..0]).is_null());
    assert!(!Span::from_ref(&BYTES[7]).is_null());
  }

  #[test]
  fn test_try_from_raw_parts() {
    let beg = BYTES.as_ptr();
    let span = Span::try_from_raw_parts(beg, unsafe { beg.add(3) }).unwrap();
    assert_eq!(span.size(), 3);
    assert_eq!(unsafe { span.as_bytes() }, &[0, 1, 2]);

    assert!(Span::try_from_raw_parts(ptr::null(), beg).is_err());
    assert_eq!(
      Span::try_from_raw_parts(unsafe { beg.add(3) }, beg).unwrap_err(),
      Error::inverted_range(unsafe { beg.add(3) }, beg)
    );
  }
}
