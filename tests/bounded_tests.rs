use rbuf::{BufError, bounded};

#[test]
fn test_fourth_push_exceeds_capacity() {
  let mut slots = [0u16; 3];
  let mut len = 0;

  for value in [10, 20, 30] {
    bounded::push(&mut slots, &mut len, value).unwrap();
  }
  let result = bounded::push(&mut slots, &mut len, 40);

  assert_eq!(
    result,
    Err(BufError::CapacityExceeded {
      required: 4,
      capacity: 3
    })
  );
  assert_eq!(len, 3);
  assert_eq!(bounded::as_slice(&slots, len), &[10, 20, 30]);
}

#[test]
fn test_static_block_matches_growable_behaviour() {
  let mut slots = [0i32; 5];
  let mut len = 0;
  for value in 1..=5 {
    bounded::push(&mut slots, &mut len, value).unwrap();
  }

  bounded::remove(&mut slots, &mut len, 2).unwrap();

  assert_eq!(len, 4);
  assert_eq!(bounded::as_slice(&slots, len), &[1, 2, 4, 5]);
}

#[test]
fn test_insert_when_full_is_rejected_before_index_check() {
  let mut slots = [1, 2];
  let mut len = 2;
  assert!(matches!(
    bounded::insert(&mut slots, &mut len, 5, 0),
    Err(BufError::CapacityExceeded { .. })
  ));
  assert_eq!(slots, [1, 2]);
}

#[test]
fn test_insert_remove_round_trip() {
  let mut slots = [0u8; 8];
  let mut len = 0;
  bounded::copy_from(&mut slots, &mut len, b"abcdef").unwrap();

  bounded::insert(&mut slots, &mut len, 3, b'X').unwrap();
  assert_eq!(bounded::as_slice(&slots, len), b"abcXdef");
  bounded::remove(&mut slots, &mut len, 3).unwrap();
  assert_eq!(bounded::as_slice(&slots, len), b"abcdef");
}

#[test]
fn test_pop_and_clear() {
  let mut slots = [0u32; 4];
  let mut len = 0;
  bounded::push(&mut slots, &mut len, 8).unwrap();

  assert_eq!(bounded::pop(&slots, &mut len), Ok(&8));
  assert_eq!(bounded::pop(&slots, &mut len), Err(BufError::LengthUnderflow));

  bounded::push(&mut slots, &mut len, 9).unwrap();
  bounded::clear(&mut len);
  assert_eq!(len, 0);
}

#[test]
fn test_zero_capacity_storage() {
  let mut slots: [u8; 0] = [];
  let mut len = 0;
  assert!(bounded::push(&mut slots, &mut len, 1).is_err());
  assert_eq!(
    bounded::remove(&mut slots, &mut len, 0),
    Err(BufError::LengthUnderflow)
  );
}
