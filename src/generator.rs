//! Sequential UUID generator and related types.

#[cfg(not(feature = "std"))]
use core as std;

use std::fmt;

use rand::RngCore;

use crate::Uuid;

/// A source of monotonically increasing counter values, such as a database
/// sequence.
///
/// The generator reads one value per identifier and assumes the provider
/// hands out distinct, non-decreasing values across all callers; persistence
/// and serialization of the counter are the provider's concern. Values follow
/// the database sequence convention of starting at 1.
///
/// # Examples
///
/// ```rust
/// use sequential_uuids::SequenceSource;
///
/// struct InMemorySequence(i64);
///
/// impl SequenceSource for InMemorySequence {
///     fn next_value(&mut self) -> i64 {
///         self.0 += 1;
///         self.0
///     }
/// }
/// ```
pub trait SequenceSource {
    /// Returns the next value of the underlying sequence.
    fn next_value(&mut self) -> i64;
}

/// Error generating a sequential UUID.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// A divisor or bucket count argument was less than one. The message
    /// names the offending parameter.
    InvalidParameter(&'static str),

    /// The secure random source could not supply the requested bytes.
    RandomSourceFailure(rand::Error),

    /// The system clock could not be read as seconds since the Unix epoch.
    ClockFailure,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameter(message) => f.write_str(message),
            Error::RandomSourceFailure(_) => f.write_str("could not generate random values"),
            Error::ClockFailure => f.write_str("could not read the system clock"),
        }
    }
}

impl From<rand::Error> for Error {
    fn from(src: rand::Error) -> Self {
        Error::RandomSourceFailure(src)
    }
}

#[cfg(feature = "std")]
#[cfg_attr(docsrs, doc(cfg(feature = "std")))]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::RandomSourceFailure(src) => Some(src),
            _ => None,
        }
    }
}

/// Represents a sequential UUID generator that owns the random number
/// generator used for the suffix bytes.
///
/// Each generated value starts from a monotonic input (a sequence counter or
/// the wall clock, depending on the method called), which is grouped into
/// buckets of `divisor` consecutive inputs. The bucket index, reduced to the
/// smallest whole number of bytes that can represent `bucket_count` buckets,
/// becomes the big-endian prefix of the value; every remaining byte is drawn
/// from the random number generator. Values whose inputs fall into the same
/// bucket therefore share their prefix bytes and differ in the rest.
///
/// The generator holds no state between calls, so a single instance behind a
/// lock and independent per-thread instances behave the same, as long as the
/// counter source hands out distinct values across threads.
///
/// # Examples
///
/// ```rust
/// use rand::rngs::OsRng;
/// use sequential_uuids::SequentialGenerator;
///
/// let mut g = SequentialGenerator::new(OsRng);
/// println!("{}", g.from_unix_time(1_700_000_000, 60, 65536)?);
/// # Ok::<(), sequential_uuids::Error>(())
/// ```
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct SequentialGenerator<R> {
    stamp_version: bool,

    /// Random number generator used for the suffix bytes.
    rng: R,
}

impl<R: RngCore> SequentialGenerator<R> {
    /// Creates a generator that leaves every non-prefix bit random.
    pub const fn new(rng: R) -> Self {
        Self {
            stamp_version: false,
            rng,
        }
    }

    /// Creates a generator that marks each value as an RFC 4122 version 4
    /// (pseudorandom) UUID by overwriting the four version bits and two
    /// variant bits.
    ///
    /// Stamping costs six bits of randomness but keeps the output acceptable
    /// to consumers that validate UUID version and variant fields.
    pub const fn with_v4_bits(rng: R) -> Self {
        Self {
            stamp_version: true,
            rng,
        }
    }

    /// Generates a new identifier from the next value of `source`.
    ///
    /// `block_size` is the number of consecutive sequence values that share
    /// one prefix, and `block_count` is the number of blocks before prefixes
    /// wrap around to zero. With `block_size = 65546` and `block_count =
    /// 65536` the prefix cycles roughly every 4 billion values; lowering
    /// `block_size` to 256 shortens the cycle to 16M values.
    pub fn from_sequence(
        &mut self,
        source: &mut impl SequenceSource,
        block_size: i32,
        block_count: i32,
    ) -> Result<Uuid, Error> {
        if block_size < 1 {
            return Err(Error::InvalidParameter(
                "block size must be a positive integer",
            ));
        }
        if block_count < 1 {
            return Err(Error::InvalidParameter(
                "number of blocks must be a positive integer",
            ));
        }

        // sequences start at 1
        self.generate_core(source.next_value() - 1, block_size, block_count)
    }

    /// Generates a new identifier from a Unix timestamp in seconds.
    ///
    /// `interval_length` is the number of seconds during which generated
    /// values share one prefix, and `interval_count` is the number of
    /// intervals before prefixes wrap around to zero. With `interval_length
    /// = 60` and `interval_count = 65536` the prefix cycles roughly every 45
    /// days.
    pub fn from_unix_time(
        &mut self,
        unix_ts_secs: i64,
        interval_length: i32,
        interval_count: i32,
    ) -> Result<Uuid, Error> {
        check_interval_params(interval_length, interval_count)?;
        self.generate_core(unix_ts_secs, interval_length, interval_count)
    }

    /// Generates a new identifier from the current time, as
    /// [`from_unix_time`](Self::from_unix_time) does from a given timestamp.
    ///
    /// Fails with [`Error::ClockFailure`] if the system clock reads before
    /// the Unix epoch. Arguments are validated before the clock is read.
    #[cfg(feature = "std")]
    #[cfg_attr(docsrs, doc(cfg(feature = "std")))]
    pub fn from_clock(
        &mut self,
        interval_length: i32,
        interval_count: i32,
    ) -> Result<Uuid, Error> {
        use std::time;

        check_interval_params(interval_length, interval_count)?;
        let unix_ts_secs = time::SystemTime::now()
            .duration_since(time::UNIX_EPOCH)
            .map_err(|_| Error::ClockFailure)?
            .as_secs() as i64;
        self.generate_core(unix_ts_secs, interval_length, interval_count)
    }

    /// Generates a new identifier from a raw monotonic `value`.
    ///
    /// This is the low-level primitive behind the mode-specific methods: the
    /// bucket index `value / divisor` (truncated toward zero), reduced modulo
    /// `256^prefix_length(bucket_count)`, becomes the prefix. The reduction
    /// is the wraparound point: once the monotonic source advances past the
    /// representable range, prefixes repeat from zero.
    ///
    /// `value` is expected to be non-negative; a negative value wraps through
    /// the prefix reduction like any other out-of-range bucket index.
    pub fn generate_core(
        &mut self,
        value: i64,
        divisor: i32,
        bucket_count: i32,
    ) -> Result<Uuid, Error> {
        if divisor < 1 {
            return Err(Error::InvalidParameter(
                "divisor must be a positive integer",
            ));
        }
        if bucket_count < 1 {
            return Err(Error::InvalidParameter(
                "bucket count must be a positive integer",
            ));
        }

        let prefix_len = prefix_length(bucket_count);
        let mut bytes = [0u8; 16];
        self.rng.try_fill_bytes(&mut bytes[prefix_len..])?;
        write_prefix(&mut bytes, value / divisor as i64, prefix_len);
        if self.stamp_version {
            stamp_v4(&mut bytes);
        }
        Ok(Uuid::from(bytes))
    }
}

fn check_interval_params(interval_length: i32, interval_count: i32) -> Result<(), Error> {
    if interval_length < 1 {
        return Err(Error::InvalidParameter(
            "length of interval must be a positive integer",
        ));
    }
    if interval_count < 1 {
        return Err(Error::InvalidParameter(
            "number of intervals must be a positive integer",
        ));
    }
    Ok(())
}

/// Returns the number of whole bytes needed to distinguish `bucket_count`
/// buckets: 0 for a single bucket, up to 4 for `i32::MAX`.
const fn prefix_length(bucket_count: i32) -> usize {
    let mut remaining = bucket_count as u64;
    let mut len = 0;
    while remaining > 1 {
        remaining = (remaining + 255) / 256;
        len += 1;
    }
    len
}

/// Writes the low `len` bytes of `block` into the head of `bytes` in
/// big-endian byte order.
fn write_prefix(bytes: &mut [u8; 16], block: i64, len: usize) {
    // shifting a u64 by the full 64-bit width is not defined, so cap the mask
    let mask = if len >= 8 {
        u64::MAX
    } else {
        (1u64 << (len * 8)) - 1
    };
    let prefix = (block as u64) & mask;
    bytes[..len].copy_from_slice(&prefix.to_be_bytes()[8 - len..]);
}

/// Overwrites the version and variant fields to mark `bytes` as an RFC 4122
/// version 4 (pseudorandom) UUID.
fn stamp_v4(bytes: &mut [u8; 16]) {
    bytes[6] = (bytes[6] & 0x0f) | 0x40; /* time_hi_and_version */
    bytes[8] = (bytes[8] & 0x3f) | 0x80; /* clock_seq_hi_and_reserved */
}

#[cfg(test)]
mod tests {
    use super::{prefix_length, Error, SequenceSource, SequentialGenerator};
    use crate::Variant;

    /// Fills every requested byte with a fixed pattern.
    struct FixedRng(u8);

    impl rand::RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            u32::from_ne_bytes([self.0; 4])
        }

        fn next_u64(&mut self) -> u64 {
            u64::from_ne_bytes([self.0; 8])
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(self.0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    /// Refuses to produce any bytes.
    struct BrokenRng;

    impl rand::RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            unimplemented!()
        }

        fn next_u64(&mut self) -> u64 {
            unimplemented!()
        }

        fn fill_bytes(&mut self, _: &mut [u8]) {
            unimplemented!()
        }

        fn try_fill_bytes(&mut self, _: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source unavailable"))
        }
    }

    /// Counts up from zero, recording how many values were handed out.
    struct StubSequence(i64);

    impl SequenceSource for StubSequence {
        fn next_value(&mut self) -> i64 {
            self.0 += 1;
            self.0
        }
    }

    /// Resolves prefix width to whole bytes
    #[test]
    fn resolves_prefix_width_to_whole_bytes() {
        let cases = [
            (1, 0),
            (2, 1),
            (255, 1),
            (256, 1),
            (257, 2),
            (65_535, 2),
            (65_536, 2),
            (65_537, 3),
            (16_777_216, 3),
            (16_777_217, 4),
            (i32::MAX, 4),
        ];
        for (bucket_count, expected) in cases {
            assert_eq!(
                prefix_length(bucket_count),
                expected,
                "bucket count {}",
                bucket_count
            );
        }

        let mut prev = 0;
        for bucket_count in 1..100_000 {
            let len = prefix_length(bucket_count);
            assert!(len >= prev, "bucket count {}", bucket_count);
            prev = len;
        }
    }

    /// Encodes the block of a counter value in the prefix bytes
    #[test]
    fn encodes_the_block_of_a_counter_value_in_the_prefix_bytes() {
        let mut g = SequentialGenerator::new(FixedRng(0xab));

        // 5000000 / 65546 = 76
        let e = g.generate_core(5_000_000, 65_546, 65_536).unwrap();
        assert_eq!(e.as_bytes()[..2], [0x00u8, 0x4c]);
        assert!(e.as_bytes()[2..].iter().all(|&b| b == 0xab));

        // 1700000000 / 60 = 28333333, low 16 bits 0x9415
        let e = g.from_unix_time(1_700_000_000, 60, 65_536).unwrap();
        assert_eq!(e.as_bytes()[..2], [0x94u8, 0x15]);
        assert!(e.as_bytes()[2..].iter().all(|&b| b == 0xab));
    }

    /// Shares prefix bytes within a block and differs in the suffix
    #[test]
    fn shares_prefix_bytes_within_a_block_and_differs_in_the_suffix() {
        let mut g = SequentialGenerator::new(rand::thread_rng());
        let a = g.generate_core(5_000_000, 65_546, 65_536).unwrap();
        let b = g.generate_core(5_000_001, 65_546, 65_536).unwrap();
        assert_eq!(a.as_bytes()[..2], b.as_bytes()[..2]);
        assert_ne!(a.as_bytes()[2..], b.as_bytes()[2..]);

        // last value of the block and first value of the next
        let c = g.generate_core(76 * 65_546 + 65_545, 65_546, 65_536).unwrap();
        let d = g.generate_core(77 * 65_546, 65_546, 65_536).unwrap();
        assert_eq!(a.as_bytes()[..2], c.as_bytes()[..2]);
        assert_eq!(d.as_bytes()[..2], [0x00u8, 0x4d]);
    }

    /// Wraps prefixes around past the representable range
    #[test]
    fn wraps_prefixes_around_past_the_representable_range() {
        let mut g = SequentialGenerator::new(rand::thread_rng());

        let start = g.generate_core(0, 1, 256).unwrap();
        let wrapped = g.generate_core(256, 1, 256).unwrap();
        assert_eq!(start.as_bytes()[0], 0);
        assert_eq!(wrapped.as_bytes()[0], 0);

        let e = g.generate_core(65_536 + 0x1234, 1, 65_536).unwrap();
        assert_eq!(e.as_bytes()[..2], [0x12u8, 0x34]);
    }

    /// Subtracts one from sequence values before grouping
    #[test]
    fn subtracts_one_from_sequence_values_before_grouping() {
        let mut g = SequentialGenerator::new(FixedRng(0x5a));

        let mut seq = StubSequence(0);
        let e = g.from_sequence(&mut seq, 65_546, 65_536).unwrap();
        assert_eq!(e.as_bytes()[..2], [0x00u8, 0x00]);

        let mut seq = StubSequence(5_000_000);
        let e = g.from_sequence(&mut seq, 65_546, 65_536).unwrap();
        assert_eq!(e.as_bytes()[..2], [0x00u8, 0x4c]);
    }

    /// Leaves the whole value random when one bucket is requested
    #[test]
    fn leaves_the_whole_value_random_when_one_bucket_is_requested() {
        let mut g = SequentialGenerator::new(FixedRng(0xc7));
        let e = g.generate_core(5_000_000, 65_546, 1).unwrap();
        assert!(e.as_bytes().iter().all(|&b| b == 0xc7));
    }

    /// Stamps version and variant bits in stamped mode only
    #[test]
    fn stamps_version_and_variant_bits_in_stamped_mode_only() {
        for fill in [0x00, 0x55, 0xab, 0xff] {
            let mut g = SequentialGenerator::with_v4_bits(FixedRng(fill));
            let e = g.generate_core(5_000_000, 65_546, 65_536).unwrap();
            assert_eq!(e.as_bytes()[6] & 0xf0, 0x40);
            assert_eq!(e.as_bytes()[8] & 0xc0, 0x80);
            assert_eq!(e.as_bytes()[6] & 0x0f, fill & 0x0f);
            assert_eq!(e.as_bytes()[8] & 0x3f, fill & 0x3f);
            assert_eq!(e.variant(), Variant::Var10);
            assert_eq!(e.version(), Some(4));

            let mut g = SequentialGenerator::new(FixedRng(fill));
            let e = g.generate_core(5_000_000, 65_546, 65_536).unwrap();
            assert_eq!(e.as_bytes()[6], fill);
            assert_eq!(e.as_bytes()[8], fill);
        }
    }

    /// Rejects non-positive parameters without reading the sequence
    #[test]
    fn rejects_non_positive_parameters_without_reading_the_sequence() {
        let mut g = SequentialGenerator::new(rand::thread_rng());
        let mut seq = StubSequence(0);

        for (block_size, block_count) in [(0, 65_536), (-1, 65_536), (65_546, 0), (65_546, -1)] {
            assert!(matches!(
                g.from_sequence(&mut seq, block_size, block_count),
                Err(Error::InvalidParameter(_))
            ));
        }
        assert_eq!(seq.0, 0);

        for (interval_length, interval_count) in [(0, 65_536), (-60, 65_536), (60, 0), (60, -1)] {
            assert!(matches!(
                g.from_unix_time(1_700_000_000, interval_length, interval_count),
                Err(Error::InvalidParameter(_))
            ));
            #[cfg(feature = "std")]
            assert!(matches!(
                g.from_clock(interval_length, interval_count),
                Err(Error::InvalidParameter(_))
            ));
        }

        assert!(matches!(
            g.generate_core(0, 0, 1),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            g.generate_core(0, 1, 0),
            Err(Error::InvalidParameter(_))
        ));
    }

    /// Surfaces random source failure instead of a partial value
    #[test]
    fn surfaces_random_source_failure_instead_of_a_partial_value() {
        let mut g = SequentialGenerator::new(BrokenRng);
        assert!(matches!(
            g.generate_core(5_000_000, 65_546, 65_536),
            Err(Error::RandomSourceFailure(_))
        ));
    }
}
