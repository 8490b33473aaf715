use core::{
  fmt,
  iter::{FlatMap, FusedIterator},
  marker::PhantomData,
  mem, slice,
};

use super::seq::{self, Node, Root};

/// A typed contribution to a [`Registry`]: a node over a `&'static [T]`.
#[repr(transparent)]
pub struct Entry<T: 'static> {
  node: Node,
  _marker: PhantomData<&'static [T]>,
}

impl<T: 'static> Entry<T> {
  const_fn! {
    /// Creates an entry contributing every element of `items`.
    ///
    /// # Panics
    /// Panics (at compile time in a `static`) if `T` is zero-sized.
    #[inline]
    pub fn new(items: &'static [T]) -> Self {
      assert!(
        mem::size_of::<T>() != 0,
        "zero-sized types cannot be registered"
      );
      Self {
        node: Node::new(items),
        _marker: PhantomData,
      }
    }
  }

  const_fn! {
    /// Creates an entry contributing a single element.
    #[inline]
    pub fn from_ref(item: &'static T) -> Self {
      Self::new(slice::from_ref(item))
    }
  }

  /// Returns the elements this entry contributes.
  #[inline]
  pub fn items(&self) -> &'static [T] {
    // SAFETY: the node was built from a `&'static [T]` of a non-zero-sized `T`.
    unsafe {
      slice::from_raw_parts(
        self.node.data().cast::<T>(),
        self.node.size() / mem::size_of::<T>(),
      )
    }
  }

  #[inline]
  fn from_node(node: &'static Node) -> &'static Self {
    // SAFETY: `Entry` is a transparent wrapper. A registry links only the
    // nodes of `Entry<T>`s, and neither its root nor the nodes of its entries
    // are handed out, so no other node can be linked after them.
    unsafe { &*(node as *const Node).cast::<Self>() }
  }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Entry<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.items()).finish()
  }
}

/// A typed registration sequence.
///
/// Every [`Entry`] linked into the registry contributes its elements; the
/// registry yields all of them in link order.
///
/// # Example
///
/// ```
/// use regseq::{Entry, Registry};
///
/// static PRIMES: Registry<u32> = Registry::new();
/// static SMALL: Entry<u32> = Entry::new(&[2, 3, 5]);
/// static SEVEN: Entry<u32> = Entry::from_ref(&7);
///
/// PRIMES.link(&SMALL);
/// PRIMES.link(&SEVEN);
///
/// assert_eq!(PRIMES.iter().copied().collect::<Vec<_>>(), [2, 3, 5, 7]);
/// ```
pub struct Registry<T: 'static> {
  root: Root,
  _marker: PhantomData<&'static T>,
}

impl<T: 'static> Registry<T> {
  const_fn! {
    /// Creates an empty registry.
    #[inline]
    pub fn new() -> Self {
      Self {
        root: Root::new(),
        _marker: PhantomData,
      }
    }
  }

  /// Appends `entry` to the registry.
  ///
  /// Follows the rules of [`Root::link`]: calls are serialized by the
  /// caller and an entry is linked at most once.
  ///
  /// Only entries of the registry's element type can be linked; an untyped
  /// node is rejected:
  ///
  /// ```compile_fail
  /// use regseq::{Node, Registry};
  ///
  /// static WORDS: Registry<&str> = Registry::new();
  /// static RAW: Node = Node::new(&[0x10usize, 64]);
  ///
  /// WORDS.link(&RAW);
  /// ```
  #[inline]
  pub fn link(&self, entry: &'static Entry<T>) {
    self.root.link(&entry.node);
  }

  /// Returns an iterator over the linked entries, in link order.
  #[inline]
  pub fn entries(&self) -> Entries<T> {
    Entries {
      nodes: self.root.iter(),
      _marker: PhantomData,
    }
  }

  /// Returns an iterator over the elements of all linked entries.
  #[inline]
  pub fn iter(&self) -> Items<T> {
    Items {
      inner: self
        .entries()
        .flat_map(Entry::<T>::items as fn(&'static Entry<T>) -> &'static [T]),
    }
  }

  /// Returns the number of elements currently registered.
  #[inline]
  pub fn len(&self) -> usize {
    self.entries().map(|e| e.items().len()).sum()
  }

  /// Returns `true` if no element is registered.
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.entries().all(|e| e.items().is_empty())
  }
}

impl<T: 'static> Default for Registry<T> {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl<T: fmt::Debug + 'static> fmt::Debug for Registry<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<T: 'static> IntoIterator for &Registry<T> {
  type Item = &'static T;
  type IntoIter = Items<T>;

  #[inline]
  fn into_iter(self) -> Items<T> {
    self.iter()
  }
}

/// Iterator over the entries of a [`Registry`].
pub struct Entries<T: 'static> {
  nodes: seq::Iter,
  _marker: PhantomData<&'static T>,
}

impl<T: 'static> Iterator for Entries<T> {
  type Item = &'static Entry<T>;

  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    self.nodes.next().map(Entry::<T>::from_node)
  }
}

impl<T: 'static> FusedIterator for Entries<T> {}

/// Iterator over the elements of a [`Registry`].
pub struct Items<T: 'static> {
  inner: FlatMap<Entries<T>, &'static [T], fn(&'static Entry<T>) -> &'static [T]>,
}

impl<T: 'static> Iterator for Items<T> {
  type Item = &'static T;

  #[inline]
  fn next(&mut self) -> Option<Self::Item> {
    self.inner.next()
  }
}

impl<T: 'static> FusedIterator for Items<T> {}
