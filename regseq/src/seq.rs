use core::{fmt, iter::FusedIterator, ptr};

use super::{
  common::{AtomicPtr, Ordering},
  error::Error,
  span::Span,
};

/// A contiguous data range contributed to a [`Root`].
///
/// One node exists per contributing range. The range is fixed when the node
/// is constructed; only the `next` pointer is written afterwards, once, by
/// [`Root::link`] and by the link of the following node.
#[repr(C)]
pub struct Node {
  next: AtomicPtr<Node>,
  span: Span,
}

impl Node {
  const_fn! {
    /// Creates an unlinked node covering the memory of `data`.
    ///
    /// # Example
    ///
    /// ```
    /// use regseq::Node;
    ///
    /// static VALUES: [u32; 3] = [1, 2, 3];
    /// static NODE: Node = Node::new(&VALUES);
    ///
    /// assert_eq!(NODE.size(), 12);
    /// ```
    #[inline]
    pub fn new<T>(data: &'static [T]) -> Self {
      Self::with_span(Span::new(data))
    }
  }

  const_fn! {
    /// Creates an unlinked node covering the memory of a single value.
    #[inline]
    pub fn from_ref<T>(data: &'static T) -> Self {
      Self::with_span(Span::from_ref(data))
    }
  }

  const_fn! {
    /// Creates an unlinked node from a pair of boundary pointers, typically
    /// the start and stop symbols of a linker section.
    ///
    /// # Safety
    /// - `beg` must be non-null and `end` must not be before `beg`.
    /// - Both pointers must belong to the same allocation, which must stay
    ///   valid and unmodified for the rest of the program.
    #[inline]
    pub unsafe fn from_raw_parts(beg: *const u8, end: *const u8) -> Self {
      Self::with_span(Span::from_raw_parts(beg, end))
    }
  }

  /// Like [`Node::from_raw_parts`], but rejects a null `beg` or an inverted range.
  ///
  /// # Safety
  /// Both pointers must belong to the same allocation, which must stay valid
  /// and unmodified for the rest of the program.
  pub unsafe fn try_from_raw_parts(beg: *const u8, end: *const u8) -> Result<Self, Error> {
    Span::try_from_raw_parts(beg, end).map(Self::with_span)
  }

  const_fn! {
    #[inline]
    fn with_span(span: Span) -> Self {
      Self {
        next: AtomicPtr::new(ptr::null_mut()),
        span,
      }
    }
  }

  /// Returns the node linked after this one, or `None` if this node is the
  /// last one observed.
  #[inline]
  pub fn next(&self) -> Option<&'static Node> {
    // SAFETY: only `&'static Node`s are ever stored into a link pointer.
    unsafe { self.next.load(Ordering::Acquire).as_ref() }
  }

  /// Returns a pointer to the first byte of the data range.
  #[inline]
  pub const fn data(&self) -> *const u8 {
    self.span.beg()
  }

  /// Returns the length of the data range in bytes.
  #[inline]
  pub fn size(&self) -> usize {
    self.span.size()
  }

  /// Returns the data range as bytes.
  ///
  /// # Safety
  /// Every byte in the range must be initialized, so the range must not
  /// cover padding.
  #[inline]
  pub unsafe fn as_bytes(&self) -> &'static [u8] {
    self.span.as_bytes()
  }

  /// Returns the data range as a slice of `T`.
  ///
  /// Fails when the range is misaligned for `T` or is not a whole number of
  /// `T`s. The length of a zero-sized `T` cannot be recovered from a byte
  /// range, so the slice is then empty.
  ///
  /// # Safety
  /// The range must hold initialized, valid values of `T`.
  #[inline]
  pub unsafe fn try_as_slice<T>(&self) -> Result<&'static [T], Error> {
    self.span.try_as_slice()
  }

  #[inline]
  fn as_ptr(&'static self) -> *mut Node {
    self as *const Node as *mut Node
  }
}

impl fmt::Debug for Node {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Node")
      .field("data", &self.data())
      .field("size", &self.size())
      .field("next", &self.next.load(Ordering::Acquire))
      .finish()
  }
}

/// The anchor of one registration sequence.
///
/// A root is a fixed-size descriptor meant to live in a `static`. Nodes are
/// appended with [`Root::link`] and read back in link order with
/// [`Root::iter`] or with [`Root::begin`] and [`Node::next`]. Any number of
/// readers may walk the sequence while a link is in progress.
///
/// # Example
///
/// ```
/// use regseq::{Node, Root};
///
/// static ROOT: Root = Root::new();
/// static A: Node = Node::new(b"abcd");
/// static B: Node = Node::new(b"ef");
///
/// ROOT.link(&A);
/// ROOT.link(&B);
///
/// let sizes: Vec<usize> = ROOT.iter().map(Node::size).collect();
/// assert_eq!(sizes, [4, 2]);
/// ```
#[repr(C)]
pub struct Root {
  head: AtomicPtr<Node>,
  tail: AtomicPtr<Node>,
}

impl Root {
  const_fn! {
    /// Creates an empty root.
    #[inline]
    pub fn new() -> Self {
      Self {
        head: AtomicPtr::new(ptr::null_mut()),
        tail: AtomicPtr::new(ptr::null_mut()),
      }
    }
  }

  /// Appends `node` to the sequence.
  ///
  /// The node becomes visible to readers at a single release store. A reader
  /// that reaches it through an acquire load of the link pointer also sees
  /// its data range.
  ///
  /// Calls on the same root must be serialized by the caller: static
  /// initializers of one image run one after another, and anything else needs
  /// an external lock. A node must be linked at most once, into one root.
  /// Breaking either rule loses nodes or creates cycles; it never causes a
  /// data race. Calls on different roots are independent.
  pub fn link(&self, node: &'static Node) {
    let tail = self.tail.load(Ordering::Relaxed);
    debug_assert!(
      node.next.load(Ordering::Relaxed).is_null() && !ptr::eq(tail, node),
      "node is already linked"
    );

    node.next.store(ptr::null_mut(), Ordering::Relaxed);

    // SAFETY: `tail` is null or a `&'static Node` stored by a previous link.
    let slot = match unsafe { tail.as_ref() } {
      Some(tail) => &tail.next,
      None => &self.head,
    };
    slot.store(node.as_ptr(), Ordering::Release);

    self.tail.store(node.as_ptr(), Ordering::Relaxed);

    #[cfg(feature = "tracing")]
    tracing::trace!(
      root = ?(self as *const Root),
      node = ?(node as *const Node),
      size = node.size(),
      "link node"
    );
  }

  /// Returns the first node, or `None` if the sequence is empty.
  #[inline]
  pub fn begin(&self) -> Option<&'static Node> {
    // SAFETY: only `&'static Node`s are ever stored into `head`.
    unsafe { self.head.load(Ordering::Acquire).as_ref() }
  }

  /// Returns the value [`Node::next`] yields after the last node.
  #[inline]
  pub const fn end(&self) -> Option<&'static Node> {
    None
  }

  /// Returns an iterator over the nodes linked so far, in link order.
  #[inline]
  pub fn iter(&self) -> Iter {
    Iter { next: self.begin() }
  }

  /// Returns `true` if no node has been linked yet.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.begin().is_none()
  }

  /// Counts the nodes currently reachable from the root.
  #[inline]
  pub fn len(&self) -> usize {
    self.iter().count()
  }
}

impl Default for Root {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Debug for Root {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl IntoIterator for &Root {
  type Item = &'static Node;
  type IntoIter = Iter;

  #[inline]
  fn into_iter(self) -> Iter {
    self.iter()
  }
}

/// Forward iterator over the nodes of a [`Root`].
///
/// Created by [`Root::iter`]. Nodes linked while the iterator is alive are
/// yielded if the walk has not passed the old tail yet.
#[derive(Debug, Clone)]
pub struct Iter {
  next: Option<&'static Node>,
}

impl Iterator for Iter {
  type Item = &'static Node;

  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    let node = self.next?;
    self.next = node.next();
    Some(node)
  }
}

impl FusedIterator for Iter {}

#[cfg(test)]
mod tests;
