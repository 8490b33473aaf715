/// An error returned when a data range cannot be described by, or viewed
/// through, a node.
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub enum Error {
  /// The end of the range lies before its beginning
  InvertedRange {
    /// The address of the first byte
    beg: usize,
    /// The address one past the last byte
    end: usize,
  },

  /// The range does not start at an address aligned for the element type
  Misaligned {
    /// The address of the first byte
    addr: usize,
    /// The alignment required by the element type
    align: usize,
  },

  /// The range length is not a whole number of elements
  Truncated {
    /// The byte length of the range
    size: usize,
    /// The size of one element
    elem: usize,
  },
}

impl Error {
  #[inline]
  pub(crate) fn inverted_range(beg: *const u8, end: *const u8) -> Self {
    Self::InvertedRange {
      beg: beg as usize,
      end: end as usize,
    }
  }

  #[inline]
  pub(crate) const fn misaligned(addr: usize, align: usize) -> Self {
    Self::Misaligned { addr, align }
  }

  #[inline]
  pub(crate) const fn truncated(size: usize, elem: usize) -> Self {
    Self::Truncated { size, elem }
  }
}

impl core::fmt::Display for Error {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::InvertedRange { beg, end } => write!(
        f,
        "Invalid range: end {:#x} is before beginning {:#x}",
        end, beg
      ),
      Self::Misaligned { addr, align } => write!(
        f,
        "Misaligned range: address {:#x} is not aligned to {} bytes",
        addr, align
      ),
      Self::Truncated { size, elem } => write!(
        f,
        "Truncated range: {} bytes is not a multiple of the element size {}",
        size, elem
      ),
    }
  }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Checks that `size` bytes at `addr` form a whole, aligned `[T]`, returning
/// the element count.
pub(crate) fn check_elements<T>(addr: usize, size: usize) -> Result<usize, Error> {
  let elem = core::mem::size_of::<T>();
  let align = core::mem::align_of::<T>();

  if addr % align != 0 {
    return Err(Error::misaligned(addr, align));
  }

  if elem == 0 {
    return Ok(0);
  }

  if size % elem != 0 {
    return Err(Error::truncated(size, elem));
  }

  Ok(size / elem)
}
