/// Rounds a byte count up to the next multiple of the machine word.
///
/// The libc host requests whole words from `malloc` and `posix_memalign`.
///
/// # Examples
///
/// ```rust
/// use rbuf::align;
///
/// match std::mem::size_of::<usize>() {
///     8 => assert_eq!(align!(13), 16), // 64 bit machine.
///     4 => assert_eq!(align!(11), 12), // 32 bit machine.
///     _ => {},
/// };
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    ($value + ::core::mem::size_of::<usize>() - 1) & !(::core::mem::size_of::<usize>() - 1)
  };
}
