/// Registers elements into a static [`Registry`](crate::Registry) before
/// `main` runs.
///
/// Each invocation emits one static [`Entry`](crate::Entry) holding the
/// elements and one initializer that links it. Initializers of one image run
/// one after another, which serializes the links into a registry. The order
/// of entries from different invocations follows the order in which the
/// loader runs initializers.
///
/// ```ignore
/// use regseq::{register, Registry};
///
/// static HOOKS: Registry<fn() -> u32> = Registry::new();
///
/// fn answer() -> u32 {
///   42
/// }
///
/// register!(HOOKS: fn() -> u32 => answer);
/// register!(HOOKS: fn() -> u32 => [answer, answer]);
///
/// assert_eq!(HOOKS.len(), 3);
/// ```
#[macro_export]
#[cfg_attr(docsrs, doc(cfg(feature = "ctor")))]
macro_rules! register {
  ($registry:path: $ty:ty => [$($item:expr),* $(,)?]) => {
    const _: () = {
      const ITEMS: &[$ty] = &[$($item),*];
      static ENTRY: $crate::Entry<$ty> = $crate::Entry::new(ITEMS);

      #[$crate::__private::ctor::ctor]
      fn register() {
        $registry.link(&ENTRY);
      }
    };
  };
  ($registry:path: $ty:ty => $item:expr) => {
    $crate::register!($registry: $ty => [$item]);
  };
}
