use proptest::prelude::*;
use rbuf::{GrowableArray, INLINE_CAPACITY, SsoString};

proptest! {
  #[test]
  fn pushes_count_and_keep_order(values in prop::collection::vec(any::<i32>(), 0..200)) {
    let mut arr = GrowableArray::new();
    for (i, value) in values.iter().enumerate() {
      arr.push(*value).unwrap();
      prop_assert_eq!(arr.len(), i + 1);
      prop_assert!(arr.capacity() >= arr.len());
    }
    prop_assert_eq!(arr.as_slice(), &values[..]);
  }

  #[test]
  fn insert_then_remove_is_identity(
    values in prop::collection::vec(any::<u16>(), 0..64),
    index in any::<prop::sample::Index>(),
    elem in any::<u16>(),
  ) {
    let mut arr = GrowableArray::from_slice(&values).unwrap();
    let at = index.index(values.len() + 1);

    arr.insert(at, elem).unwrap();
    prop_assert_eq!(arr.remove(at), Ok(elem));
    prop_assert_eq!(arr.as_slice(), &values[..]);
  }

  #[test]
  fn fit_twice_matches_fit_once(
    values in prop::collection::vec(any::<u8>(), 0..64),
    extra in 0usize..256,
  ) {
    let mut arr = GrowableArray::from_slice(&values).unwrap();
    arr.reserve(values.len() + extra).unwrap();

    arr.fit().unwrap();
    let once = arr.capacity();
    arr.fit().unwrap();

    prop_assert_eq!(arr.capacity(), once);
    prop_assert_eq!(once, values.len());
    prop_assert_eq!(arr.as_slice(), &values[..]);
  }

  #[test]
  fn appends_match_concatenation(
    chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..24), 0..12),
  ) {
    let mut s = SsoString::new();
    let mut expected = Vec::new();
    for chunk in &chunks {
      s.append(chunk).unwrap();
      expected.extend_from_slice(chunk);

      prop_assert_eq!(s.as_bytes(), &expected[..]);
      prop_assert_eq!(s.as_bytes_with_nul()[s.len()], 0);
      prop_assert_eq!(s.is_inline(), expected.len() < INLINE_CAPACITY);
    }
  }

  #[test]
  fn fit_preserves_contents(bytes in prop::collection::vec(any::<u8>(), 0..64), keep in 0usize..64) {
    let mut s = SsoString::from_bytes(&bytes).unwrap();
    let keep = keep.min(bytes.len());
    s.resize(keep, 0).unwrap();

    s.fit().unwrap();

    prop_assert_eq!(s.as_bytes(), &bytes[..keep]);
    prop_assert_eq!(s.as_bytes_with_nul()[keep], 0);
    if bytes.len() >= INLINE_CAPACITY && keep >= INLINE_CAPACITY {
      prop_assert!(!s.is_inline());
    } else {
      prop_assert!(s.is_inline());
    }
  }

  #[test]
  fn compare_matches_slice_ordering(
    a in prop::collection::vec(any::<u8>(), 0..40),
    b in prop::collection::vec(any::<u8>(), 0..40),
  ) {
    let left = SsoString::from_bytes(&a).unwrap();
    let right = SsoString::from_bytes(&b).unwrap();
    prop_assert_eq!(left.compare(&right), a.cmp(&b));
    prop_assert_eq!(left.compare_bytes(&b), a.cmp(&b));
  }
}
