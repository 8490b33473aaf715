//! C ABI for code generators and C callers.
//!
//! The layout is the one of [`seq::Root`](crate::seq::Root) (`{ head, tail }`)
//! and [`seq::Node`](crate::seq::Node) (`{ next, data_beg, data_end }`), both
//! `#[repr(C)]`. A generator emits one root per sequence, one node per contributing range,
//! and one initializer per node calling [`__regseq_link`].
//!
//! ```c
//! regseq_ptr_t regseq_begin(regseq_t seq);
//! regseq_ptr_t regseq_end(regseq_t seq);
//! regseq_ptr_t regseq_next(regseq_ptr_t ptr);
//! void* regseq_data(regseq_ptr_t ptr);
//! size_t regseq_size(regseq_ptr_t ptr);
//! ```
//!
//! The ring layout of [`ring`] is exported under a `regseq_ring_` prefix.
//! There, a root and a node are both `{ next, prev, data_beg, data_end }`;
//! the data pointers of a root stay null, and a null `next` or `prev` refers
//! to the object holding it, so a zero-initialized object is an empty root or
//! an unlinked node. Unlike the seq layout, `regseq_ring_prev` walks backward.
//!
//! ```c
//! void __regseq_ring_link(regseq_ring_t root, regseq_ring_ptr_t ptr);
//! regseq_ring_ptr_t regseq_ring_begin(regseq_ring_t root);
//! regseq_ring_ptr_t regseq_ring_end(regseq_ring_t root);
//! regseq_ring_ptr_t regseq_ring_last(regseq_ring_t root);
//! regseq_ring_ptr_t regseq_ring_next(regseq_ring_ptr_t ptr);
//! regseq_ring_ptr_t regseq_ring_prev(regseq_ring_ptr_t ptr);
//! void* regseq_ring_data(regseq_ring_ptr_t ptr);
//! size_t regseq_ring_size(regseq_ring_ptr_t ptr);
//! ```

use core::{ffi::c_void, ptr};

use super::{
  ring,
  seq::{Node, Root},
};

#[inline]
fn as_ptr<N>(node: Option<&'static N>) -> *const N {
  node.map_or(ptr::null(), |n| n as *const N)
}

/// Links `node` as the new tail of `root`.
///
/// # Safety
/// Both pointers must be valid for the rest of the program and `node` must
/// not have been linked before. Calls on the same root must be serialized.
#[no_mangle]
pub unsafe extern "C" fn __regseq_link(root: *const Root, node: *const Node) {
  debug_assert!(!root.is_null() && !node.is_null());
  (*root).link(&*node);
}

/// Returns the first node of `seq`, or null if it is empty.
///
/// # Safety
/// `seq` must point to a live root.
#[no_mangle]
pub unsafe extern "C" fn regseq_begin(seq: *const Root) -> *const Node {
  debug_assert!(!seq.is_null());
  as_ptr((*seq).begin())
}

/// Returns the end marker of `seq`, which is null.
#[no_mangle]
pub extern "C" fn regseq_end(_seq: *const Root) -> *const Node {
  ptr::null()
}

/// Returns the node after `ptr`, or null if `ptr` is the last one.
///
/// # Safety
/// `ptr` must point to a linked node.
#[no_mangle]
pub unsafe extern "C" fn regseq_next(ptr: *const Node) -> *const Node {
  debug_assert!(!ptr.is_null());
  as_ptr((*ptr).next())
}

/// Returns the first byte of the data range of `ptr`.
///
/// # Safety
/// `ptr` must point to a live node.
#[no_mangle]
pub unsafe extern "C" fn regseq_data(ptr: *const Node) -> *mut c_void {
  debug_assert!(!ptr.is_null());
  (*ptr).data().cast_mut().cast()
}

/// Returns the size in bytes of the data range of `ptr`.
///
/// # Safety
/// `ptr` must point to a live node.
#[no_mangle]
pub unsafe extern "C" fn regseq_size(ptr: *const Node) -> usize {
  debug_assert!(!ptr.is_null());
  (*ptr).size()
}

/// Links `node` as the new tail of the ring `root`.
///
/// # Safety
/// Both pointers must be valid for the rest of the program and `node` must
/// not have been linked before. Calls on the same root must be serialized.
#[no_mangle]
pub unsafe extern "C" fn __regseq_ring_link(root: *const ring::Root, node: *const ring::Node) {
  debug_assert!(!root.is_null() && !node.is_null());
  (*root).link(&*node);
}

/// Returns the first node of `root`, or null if it is empty.
///
/// # Safety
/// `root` must point to a live ring root.
#[no_mangle]
pub unsafe extern "C" fn regseq_ring_begin(root: *const ring::Root) -> *const ring::Node {
  debug_assert!(!root.is_null());
  as_ptr((*root).begin())
}

/// Returns the end marker of `root`, which is null.
#[no_mangle]
pub extern "C" fn regseq_ring_end(_root: *const ring::Root) -> *const ring::Node {
  ptr::null()
}

/// Returns the last node of `root`, or null if it is empty.
///
/// # Safety
/// `root` must point to a live ring root.
#[no_mangle]
pub unsafe extern "C" fn regseq_ring_last(root: *const ring::Root) -> *const ring::Node {
  debug_assert!(!root.is_null());
  as_ptr((*root).last())
}

/// Returns the node after `ptr`, or null if `ptr` is the last one.
///
/// # Safety
/// `ptr` must point to a live ring node.
#[no_mangle]
pub unsafe extern "C" fn regseq_ring_next(ptr: *const ring::Node) -> *const ring::Node {
  debug_assert!(!ptr.is_null());
  as_ptr((*ptr).next())
}

/// Returns the node before `ptr`, or null if `ptr` is the first one.
///
/// # Safety
/// `ptr` must point to a live ring node.
#[no_mangle]
pub unsafe extern "C" fn regseq_ring_prev(ptr: *const ring::Node) -> *const ring::Node {
  debug_assert!(!ptr.is_null());
  as_ptr((*ptr).prev())
}

/// Returns the first byte of the data range of `ptr`.
///
/// # Safety
/// `ptr` must point to a live ring node.
#[no_mangle]
pub unsafe extern "C" fn regseq_ring_data(ptr: *const ring::Node) -> *mut c_void {
  debug_assert!(!ptr.is_null());
  (*ptr).data().cast_mut().cast()
}

/// Returns the size in bytes of the data range of `ptr`.
///
/// # Safety
/// `ptr` must point to a live ring node.
#[no_mangle]
pub unsafe extern "C" fn regseq_ring_size(ptr: *const ring::Node) -> usize {
  debug_assert!(!ptr.is_null());
  (*ptr).size()
}
