#![doc = include_str!("../README.md")]
#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![cfg_attr(docsrs, allow(unused_attributes))]
#![deny(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

/// Defines a `const fn`, or a plain `fn` when the `loom` feature swaps in
/// loom atomics (which cannot be constructed in const contexts).
macro_rules! const_fn {
  ($(#[$meta:meta])* $vis:vis unsafe fn $($rest:tt)*) => {
    #[cfg(not(feature = "loom"))]
    $(#[$meta])*
    $vis const unsafe fn $($rest)*

    #[cfg(feature = "loom")]
    $(#[$meta])*
    $vis unsafe fn $($rest)*
  };
  ($(#[$meta:meta])* $vis:vis fn $($rest:tt)*) => {
    #[cfg(not(feature = "loom"))]
    $(#[$meta])*
    $vis const fn $($rest)*

    #[cfg(feature = "loom")]
    $(#[$meta])*
    $vis fn $($rest)*
  };
}

mod error;
pub use error::*;

/// Append-only registration sequence with a `head`/`tail` root.
///
/// This is the current layout: readers only walk forward, and the only
/// publication point of a link is a single release store.
pub mod seq;

/// Ring-shaped registration sequence supporting reverse iteration.
///
/// The root closes the list into a ring. Each node records the tail it
/// observed when it was linked, and [`ring::Node::prev`] reconciles that hint
/// against the authoritative forward chain.
pub mod ring;

mod span;

mod registry;
pub use registry::*;

#[cfg(feature = "abi")]
#[cfg_attr(docsrs, doc(cfg(feature = "abi")))]
pub mod abi;

#[cfg(feature = "ctor")]
mod macros;

pub use seq::{Node, Root};

/// Items used by exported macros. Not public API.
#[cfg(feature = "ctor")]
#[doc(hidden)]
pub mod __private {
  pub use ctor;
}

mod common {
  #[cfg(not(feature = "loom"))]
  pub(crate) use core::sync::atomic::*;

  #[cfg(feature = "loom")]
  pub(crate) use loom::sync::atomic::*;
}
