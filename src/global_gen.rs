//! Default generator and entry point functions.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync;

use crate::{Error, SequenceSource, SequentialGenerator, Uuid};
use inner::GlobalGenInner;

/// Returns the lock handle of process-wide global generator, creating one if none exists.
fn lock_global_gen() -> sync::MutexGuard<'static, GlobalGenInner> {
    static G: sync::OnceLock<sync::Mutex<GlobalGenInner>> = sync::OnceLock::new();
    G.get_or_init(Default::default)
        .lock()
        .expect("sequential_uuids: could not lock global generator")
}

/// Generates a sequential UUID from the next value of `source`.
///
/// `block_size` consecutive sequence values share one prefix, and prefixes
/// wrap around to zero after `block_count` blocks. With the reference
/// parameters below, the prefix cycles roughly every 4 billion values.
///
/// This function employs a process-wide generator and leaves every non-prefix
/// bit random. On Unix, it resets the generator when the process ID changes
/// (i.e., upon process forks) to prevent repeated random suffixes across
/// processes. Use [`SequentialGenerator`] directly to control the random
/// number generator or to mark values with RFC 4122 version 4 bits.
///
/// # Examples
///
/// ```rust
/// use sequential_uuids::{uuid_sequence, SequenceSource};
///
/// struct InMemorySequence(i64);
///
/// impl SequenceSource for InMemorySequence {
///     fn next_value(&mut self) -> i64 {
///         self.0 += 1;
///         self.0
///     }
/// }
///
/// let mut seq = InMemorySequence(0);
/// let uuid = uuid_sequence(&mut seq, 65546, 65536)?;
/// println!("{}", uuid); // e.g., "0000b2ce-6c13-a0d4-bccf-37d222820f6f"
/// # Ok::<(), sequential_uuids::Error>(())
/// ```
pub fn uuid_sequence(
    source: &mut impl SequenceSource,
    block_size: i32,
    block_count: i32,
) -> Result<Uuid, Error> {
    lock_global_gen()
        .get_mut()
        .from_sequence(source, block_size, block_count)
}

/// Generates a sequential UUID from the current time.
///
/// Values generated within `interval_length` seconds of each other share one
/// prefix, and prefixes wrap around to zero after `interval_count` intervals.
/// With the reference parameters below, the prefix cycles roughly every 45
/// days.
///
/// This function employs a process-wide generator and leaves every non-prefix
/// bit random. On Unix, it resets the generator when the process ID changes
/// (i.e., upon process forks) to prevent repeated random suffixes across
/// processes. Use [`SequentialGenerator`] directly to control the random
/// number generator or to mark values with RFC 4122 version 4 bits.
///
/// # Examples
///
/// ```rust
/// let uuid = sequential_uuids::uuid_time(60, 65536)?;
/// println!("{}", uuid); // e.g., "94154afb-33c0-4e7d-9a10-075cde385106"
/// println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
/// # Ok::<(), sequential_uuids::Error>(())
/// ```
pub fn uuid_time(interval_length: i32, interval_count: i32) -> Result<Uuid, Error> {
    lock_global_gen()
        .get_mut()
        .from_clock(interval_length, interval_count)
}

mod inner {
    use rand::rngs::adapter::ReseedingRng;
    use rand::rngs::OsRng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Core;

    use crate::SequentialGenerator;

    /// The type alias for the random number generator of the global generator.
    ///
    /// The global generator currently employs [`ChaCha12Core`] with [`ReseedingRng`] wrapper to
    /// emulate the strategy used by [`rand::rngs::ThreadRng`].
    pub type GlobalGenRng = ReseedingRng<ChaCha12Core, OsRng>;

    /// A thin wrapper to reset the state when the process ID changes (i.e., upon Unix forks).
    #[derive(Debug)]
    pub struct GlobalGenInner {
        #[cfg(unix)]
        pid: u32,
        generator: SequentialGenerator<GlobalGenRng>,
    }

    impl Default for GlobalGenInner {
        fn default() -> Self {
            let prng = ChaCha12Core::from_rng(OsRng)
                .expect("sequential_uuids: could not initialize global generator");
            Self {
                #[cfg(unix)]
                pid: std::process::id(),
                generator: SequentialGenerator::new(ReseedingRng::new(prng, 1024 * 64, OsRng)),
            }
        }
    }

    impl GlobalGenInner {
        /// Returns a mutable reference to the inner [`SequentialGenerator`] instance, reseting
        /// the generator state on Unix if the process ID has changed.
        pub fn get_mut(&mut self) -> &mut SequentialGenerator<GlobalGenRng> {
            #[cfg(unix)]
            if self.pid != std::process::id() {
                *self = Default::default();
            }
            &mut self.generator
        }
    }
}
