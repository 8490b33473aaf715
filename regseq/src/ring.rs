use core::{fmt, iter::FusedIterator, ptr};

use super::{
  common::{AtomicPtr, Ordering},
  error::Error,
  span::Span,
};

/// The pair of ring pointers shared by the root and every node.
///
/// A null pointer denotes the link that holds it, so a freshly constructed
/// link is a ring of one.
#[repr(C)]
struct Link {
  next: AtomicPtr<Link>,
  prev: AtomicPtr<Link>,
}

impl fmt::Debug for Link {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Link")
      .field("next", &self.next.load(Ordering::Acquire))
      .field("prev", &self.prev.load(Ordering::Acquire))
      .finish()
  }
}

impl Link {
  const_fn! {
    #[inline]
    fn new() -> Self {
      Self {
        next: AtomicPtr::new(ptr::null_mut()),
        prev: AtomicPtr::new(ptr::null_mut()),
      }
    }
  }

  #[inline]
  fn as_ptr(&self) -> *mut Link {
    self as *const Link as *mut Link
  }

  #[inline]
  fn resolve(&self, ptr: *mut Link) -> &Link {
    if ptr.is_null() {
      self
    } else {
      // SAFETY: only pointers to `'static` links are stored in a link.
      unsafe { &*ptr }
    }
  }

  #[inline]
  fn load_next(&self) -> &Link {
    self.resolve(self.next.load(Ordering::Acquire))
  }

  #[inline]
  fn load_prev(&self) -> &Link {
    self.resolve(self.prev.load(Ordering::Acquire))
  }

  /// Returns the node holding this link, or `None` if a root holds it.
  #[inline]
  fn node(&self) -> Option<&'static Node> {
    let node = (self as *const Link).cast::<Node>();
    // SAFETY: every link is the first field of a `'static` `Node` or `Root`.
    // Both are `#[repr(C)]` with a `Span` right after the link, and only the
    // span of a root is null.
    unsafe {
      if (*node).span.is_null() {
        None
      } else {
        Some(&*node)
      }
    }
  }

  /// Finds the forward predecessor of `self`, returning it together with
  /// the number of forward steps taken.
  ///
  /// `prev` only records the tail observed when `self` was linked. When
  /// `self` is the root it may also point at a node whose forward link is not
  /// published yet. Walk forward from the predecessor of that candidate until
  /// either the candidate or `self` shows up.
  fn reconcile_prev(&self) -> (&Link, usize) {
    let candidate = self.load_prev();
    let mut cursor = candidate.load_prev();
    let mut steps = 0;

    loop {
      steps += 1;
      let next = cursor.load_next();

      if ptr::eq(next, candidate) {
        return (candidate, steps);
      }

      if ptr::eq(next, self) {
        #[cfg(feature = "tracing")]
        tracing::trace!(
          link = ?(self as *const Link),
          skipped = ?(candidate as *const Link),
          steps,
          "skip half-linked node"
        );
        return (cursor, steps);
      }

      cursor = next;
    }
  }
}

/// A contiguous data range contributed to a ring [`Root`].
///
/// A node shares its layout with [`Root`]: a link followed by the data range.
/// The range of a node is never null, while the range of a root always is.
#[repr(C)]
pub struct Node {
  link: Link,
  span: Span,
}

impl Node {
  const_fn! {
    /// Creates an unlinked node covering the memory of `data`.
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
    /// Creates an unlinked node from a pair of boundary pointers.
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
        link: Link::new(),
        span,
      }
    }
  }

  /// Returns the node linked after this one, or `None` if this node is the
  /// last one observed or is not linked.
  #[inline]
  pub fn next(&self) -> Option<&'static Node> {
    self.other(self.link.load_next())
  }

  /// Returns the node linked before this one, or `None` if this node is the
  /// first one or is not linked.
  ///
  /// Only nodes that are reachable forward are returned.
  #[inline]
  pub fn prev(&self) -> Option<&'static Node> {
    self.other(self.link.reconcile_prev().0)
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
  /// Every byte in the range must be initialized.
  #[inline]
  pub unsafe fn as_bytes(&self) -> &'static [u8] {
    self.span.as_bytes()
  }

  /// Returns the data range as a slice of `T`.
  ///
  /// # Safety
  /// The range must hold initialized, valid values of `T`.
  #[inline]
  pub unsafe fn try_as_slice<T>(&self) -> Result<&'static [T], Error> {
    self.span.try_as_slice()
  }

  /// An unlinked node is a ring of one, which must not be reported as its
  /// own neighbour.
  #[inline]
  fn other(&self, link: &Link) -> Option<&'static Node> {
    link.node().filter(|node| !ptr::eq(*node, self))
  }
}

impl fmt::Debug for Node {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Node")
      .field("data", &self.data())
      .field("size", &self.size())
      .field("link", &self.link)
      .finish()
  }
}

/// The anchor of a ring-shaped registration sequence.
///
/// The root is itself a link: its `next` is the first node and its `prev` the
/// last one. Nodes are walked forward with [`Root::begin`] and
/// [`Node::next`], and backward with [`Root::last`] and [`Node::prev`]. Every
/// walk stops at the first root it reaches, whichever root that is.
///
/// # Example
///
/// ```
/// use regseq::ring::{Node, Root};
///
/// static ROOT: Root = Root::new();
/// static A: Node = Node::new(b"abcd");
/// static B: Node = Node::new(b"ef");
///
/// ROOT.link(&A);
/// ROOT.link(&B);
///
/// let sizes: Vec<usize> = ROOT.iter().rev().map(Node::size).collect();
/// assert_eq!(sizes, [2, 4]);
/// assert_eq!(B.prev().map(Node::size), Some(4));
/// ```
#[repr(C)]
pub struct Root {
  link: Link,
  /// Always null.
  span: Span,
}

impl Root {
  const_fn! {
    /// Creates an empty root.
    #[inline]
    pub fn new() -> Self {
      Self {
        link: Link::new(),
        span: Span::NULL,
      }
    }
  }

  /// Appends `node` to the ring.
  ///
  /// The node is published twice: first into `root.prev`, which makes it
  /// reachable backward only, then into the old tail's `next`, which makes
  /// it reachable forward. Reverse walks ignore it until the second store.
  ///
  /// The same rules as [`seq::Root::link`](crate::seq::Root::link) apply:
  /// calls on one root must be serialized by the caller, and a node is
  /// linked at most once.
  pub fn link(&'static self, node: &'static Node) {
    let root = &self.link;
    debug_assert!(
      node.link.next.load(Ordering::Relaxed).is_null(),
      "node is already linked"
    );

    // Only the single writer stores into `root.prev`.
    let prev = root.resolve(root.prev.load(Ordering::Relaxed));

    node.link.next.store(root.as_ptr(), Ordering::Relaxed);
    node.link.prev.store(prev.as_ptr(), Ordering::Relaxed);

    root.prev.store(node.link.as_ptr(), Ordering::Release);
    prev.next.store(node.link.as_ptr(), Ordering::Release);

    #[cfg(feature = "tracing")]
    tracing::trace!(
      root = ?(self as *const Root),
      node = ?(node as *const Node),
      size = node.size(),
      "link node"
    );
  }

  /// Returns the first node, or `None` if the ring is empty.
  #[inline]
  pub fn begin(&self) -> Option<&'static Node> {
    self.link.load_next().node()
  }

  /// Returns the value [`Node::next`] yields after the last node.
  #[inline]
  pub const fn end(&self) -> Option<&'static Node> {
    None
  }

  /// Returns the last forward-reachable node, or `None` if the ring is empty.
  #[inline]
  pub fn last(&self) -> Option<&'static Node> {
    self.link.reconcile_prev().0.node()
  }

  /// Returns a double-ended iterator over the linked nodes.
  #[inline]
  pub fn iter(&self) -> Iter<'_> {
    Iter {
      front: self.link.load_next(),
      back: &self.link,
    }
  }

  /// Returns `true` if no node is forward-reachable yet.
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

impl fmt::Debug for Root {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<'a> IntoIterator for &'a Root {
  type Item = &'static Node;
  type IntoIter = Iter<'a>;

  #[inline]
  fn into_iter(self) -> Iter<'a> {
    self.iter()
  }
}

/// Double-ended iterator over the nodes of a ring [`Root`].
///
/// The two ends never cross: the iterator stops once they meet.
#[derive(Clone)]
pub struct Iter<'a> {
  /// Next link to yield from the front.
  front: &'a Link,
  /// Last link yielded from the back, the root initially.
  back: &'a Link,
}

impl fmt::Debug for Iter<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Iter")
      .field("front", &(self.front as *const Link))
      .field("back", &(self.back as *const Link))
      .finish()
  }
}

impl Iterator for Iter<'_> {
  type Item = &'static Node;

  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    if ptr::eq(self.front, self.back) {
      return None;
    }

    let node = self.front.node()?;
    self.front = self.front.load_next();
    Some(node)
  }
}

impl DoubleEndedIterator for Iter<'_> {
  #[inline]
  fn next_back(&mut self) -> Option<Self::Item> {
    if ptr::eq(self.front, self.back) {
      return None;
    }

    let prev = self.back.reconcile_prev().0;
    let node = prev.node()?;
    self.back = prev;
    Some(node)
  }
}

impl FusedIterator for Iter<'_> {}
