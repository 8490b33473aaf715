use super::*;
use crate::tests::{leak, offset, run, BYTES};

use std::vec::Vec;

fn abc() -> (&'static Root, [&'static Node; 3]) {
  let root = leak(Root::new());
  let a = leak(Node::new(&BYTES[0..4]));
  let b = leak(Node::new(&BYTES[4..10]));
  let c = leak(Node::new(&BYTES[10..11]));
  root.link(a);
  root.link(b);
  root.link(c);
  (root, [a, b, c])
}

#[test]
fn test_empty() {
  run(|| {
    let root = leak(Root::new());
    assert_eq!(root.begin().map(|n| n as *const Node), None);
    assert!(root.begin().is_none() && root.end().is_none());
    assert!(root.is_empty());
    assert_eq!(root.len(), 0);
    assert_eq!(root.iter().count(), 0);
  });
}

#[test]
fn test_link_abc() {
  run(|| {
    let (root, nodes) = abc();

    let walked: Vec<_> = root.iter().collect();
    assert_eq!(walked.len(), 3);
    for (walked, node) in walked.iter().zip(nodes) {
      assert!(ptr::eq(*walked, node));
    }

    let sizes: Vec<_> = root.iter().map(Node::size).collect();
    assert_eq!(sizes, [4, 6, 1]);

    let offsets: Vec<_> = root.iter().map(|n| offset(n.data())).collect();
    assert_eq!(offsets, [0, 4, 10]);

    assert!(!root.is_empty());
    assert_eq!(root.len(), 3);
  });
}

#[test]
fn test_manual_walk() {
  run(|| {
    let (root, [a, b, c]) = abc();

    let mut cur = root.begin();
    let mut seen = Vec::new();
    while let Some(node) = cur {
      seen.push(node as *const Node);
      cur = node.next();
    }
    assert_eq!(cur.is_none(), root.end().is_none());
    assert_eq!(
      seen,
      [a as *const Node, b as *const Node, c as *const Node]
    );
    assert!(c.next().is_none());
  });
}

#[test]
fn test_link_order_many() {
  run(|| {
    let root = leak(Root::new());
    for i in 0..64 {
      root.link(leak(Node::new(&BYTES[i..i + 1])));
    }

    let offsets: Vec<_> = root.iter().map(|n| offset(n.data())).collect();
    assert_eq!(offsets, (0..64).collect::<Vec<_>>());
    assert!(root.iter().all(|n| n.size() == 1));
  });
}

#[test]
fn test_iterator_survives_link() {
  run(|| {
    let (root, [_, b, c]) = abc();

    let mut iter = root.iter();
    iter.next();
    assert!(ptr::eq(iter.next().unwrap(), b));

    let d = leak(Node::new(&BYTES[11..20]));
    root.link(d);

    assert!(ptr::eq(iter.next().unwrap(), c));
    assert!(ptr::eq(iter.next().unwrap(), d));
    assert!(iter.next().is_none());

    let sizes: Vec<_> = root.iter().map(Node::size).collect();
    assert_eq!(sizes, [4, 6, 1, 9]);
  });
}

#[test]
fn test_exhausted_iterator_stays_exhausted() {
  run(|| {
    let (root, _) = abc();
    let mut iter = root.iter();
    assert_eq!(iter.by_ref().count(), 3);

    root.link(leak(Node::new(&BYTES[11..12])));
    assert!(iter.next().is_none());
    assert_eq!(root.len(), 4);
  });
}

#[test]
fn test_accessors() {
  static VALUES: [u32; 3] = [7, 8, 9];
  static ONE: u64 = 42;

  run(|| {
    let node = leak(Node::new(&VALUES));
    assert_eq!(node.size(), 12);
    assert_eq!(node.data(), VALUES.as_ptr().cast());
    assert_eq!(unsafe { node.try_as_slice::<u32>() }, Ok(&VALUES[..]));
    assert_eq!(
      unsafe { node.try_as_slice::<u64>() }.unwrap_err(),
      Error::truncated(12, 8)
    );

    let one = leak(Node::from_ref(&ONE));
    assert_eq!(one.size(), 8);
    assert_eq!(unsafe { one.try_as_slice::<u64>() }, Ok(&[42u64][..]));

    let bytes = leak(Node::new(&BYTES[3..6]));
    assert_eq!(unsafe { bytes.as_bytes() }, &[3, 4, 5]);

    let empty = leak(Node::new(&BYTES[5..5]));
    assert_eq!(empty.size(), 0);
    assert_eq!(unsafe { empty.as_bytes() }, &[] as &[u8]);
  });
}

#[test]
fn test_misaligned_slice() {
  static VALUES: [u32; 4] = [1, 2, 3, 4];

  run(|| {
    let beg = VALUES.as_ptr().cast::<u8>();
    let node = unsafe { Node::from_raw_parts(beg.add(1), beg.add(9)) };
    assert_eq!(
      unsafe { node.try_as_slice::<u32>() }.unwrap_err(),
      Error::misaligned(beg as usize + 1, 4)
    );
  });
}

#[test]
fn test_try_from_raw_parts() {
  run(|| {
    let beg = BYTES.as_ptr();
    let node = unsafe { Node::try_from_raw_parts(beg.add(2), beg.add(7)) }.unwrap();
    assert_eq!(node.size(), 5);
    assert_eq!(offset(node.data()), 2);

    let err = unsafe { Node::try_from_raw_parts(beg.add(7), beg.add(2)) }.unwrap_err();
    assert_eq!(
      err,
      Error::InvertedRange {
        beg: beg as usize + 7,
        end: beg as usize + 2,
      }
    );

    assert!(unsafe { Node::try_from_raw_parts(ptr::null(), ptr::null()) }.is_err());
  });
}

#[test]
fn test_debug() {
  run(|| {
    let (root, [a, ..]) = abc();
    let out = std::format!("{a:?}");
    assert!(out.starts_with("Node { data: "));
    assert!(out.contains("size: 4"));
    assert_eq!(std::format!("{root:?}").matches("Node {").count(), 3);
  });
}

#[test]
#[cfg(not(feature = "loom"))]
fn test_static_root() {
  static ROOT: Root = Root::new();
  static A: Node = Node::new(b"abcd");
  static B: Node = Node::from_ref(&0u16);

  ROOT.link(&A);
  ROOT.link(&B);

  let sizes: Vec<_> = (&ROOT).into_iter().map(Node::size).collect();
  assert_eq!(sizes, [4, 2]);
}

#[test]
#[cfg(all(debug_assertions, not(feature = "loom")))]
#[should_panic(expected = "node is already linked")]
fn test_double_link_panics() {
  let root = leak(Root::new());
  let a = leak(Node::new(&BYTES[0..4]));
  root.link(a);
  root.link(a);
}

/// Readers must always see a prefix `0..k` of the nodes, in order, with intact
/// data ranges, while a single writer keeps linking.
#[test]
#[cfg(not(feature = "loom"))]
#[cfg_attr(miri, ignore)]
fn test_concurrent_prefix_snapshot() {
  use rand::Rng;
  use std::sync::atomic::AtomicBool;

  crate::tests::init_tracing();

  const READERS: usize = 4;

  let root = leak(Root::new());
  let nodes: Vec<&'static Node> = (0..BYTES.len())
    .map(|i| &*leak(Node::new(&BYTES[i..i + 1])))
    .collect();
  let done = AtomicBool::new(false);

  crossbeam_utils::thread::scope(|s| {
    let wg = wg::WaitGroup::new();

    for _ in 0..READERS {
      let t = wg.add(1);
      let done = &done;
      s.spawn(move |_| {
        let mut last_len = 0;
        loop {
          let finished = done.load(Ordering::Acquire);
          let mut len = 0;
          for (i, node) in root.iter().enumerate() {
            assert_eq!(offset(node.data()), i);
            assert_eq!(node.size(), 1);
            assert_eq!(unsafe { node.as_bytes() }, &[i as u8]);
            len = i + 1;
          }
          assert!(len >= last_len, "the sequence shrank");
          last_len = len;
          if finished {
            break;
          }
        }
        assert_eq!(last_len, BYTES.len());
        t.done();
      });
    }

    s.spawn(|_| {
      let mut rng = rand::rng();
      let mut nodes = nodes.iter();
      loop {
        let batch = rng.random_range(1..=8);
        let mut linked = 0;
        for node in nodes.by_ref().take(batch).copied() {
          root.link(node);
          linked += 1;
        }
        if linked < batch {
          break;
        }
        std::thread::yield_now();
      }
      done.store(true, Ordering::Release);
    });

    wg.wait();
  })
  .unwrap();

  assert_eq!(root.len(), BYTES.len());
}

#[test]
#[cfg(feature = "loom")]
fn test_loom_link_while_reading() {
  loom::model(|| {
    let root = leak(Root::new());
    let a = leak(Node::new(&BYTES[0..4]));
    let b = leak(Node::new(&BYTES[4..10]));
    let c = leak(Node::new(&BYTES[10..11]));
    root.link(a);

    let writer = loom::thread::spawn(move || {
      root.link(b);
      root.link(c);
    });

    let sizes: Vec<_> = root.iter().map(Node::size).collect();
    assert!(
      [&[4][..], &[4, 6], &[4, 6, 1]].contains(&sizes.as_slice()),
      "{sizes:?}"
    );

    writer.join().unwrap();
    assert_eq!(root.len(), 3);
  });
}
