//! Generators of sequential UUID values derived from a sequence counter or
//! the current time
//!
//! ```rust
//! use sequential_uuids::uuid_time;
//!
//! let uuid = uuid_time(60, 65536)?;
//! println!("{}", uuid); // e.g. "94154afb-33c0-4e7d-9a10-075cde385106"
//! println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
//! # Ok::<(), sequential_uuids::Error>(())
//! ```
//!
//! Fully random UUIDs scatter writes across the whole key space of an index,
//! which hurts locality once the index outgrows memory. The generators in
//! this crate keep a short deterministic prefix that follows a monotonic
//! source, so values generated close together land close together in the
//! index, while the remaining bits stay cryptographically random and
//! unguessable.
//!
//! # Field and bit layout
//!
//! This implementation produces identifiers with the following layout:
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |            prefix             |             rand              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             rand                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             rand                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                             rand                              |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! Where:
//!
//! - The `prefix` field holds the current bucket index of the monotonic
//!   source, big-endian. Its width is the smallest whole number of bytes
//!   that can represent the requested number of buckets (two bytes with the
//!   reference parameters shown above, zero bytes when a single bucket is
//!   requested, at most eight).
//! - Every remaining `rand` bit is filled from a cryptographically strong
//!   random number generator.
//! - In the optional stamped mode, the four version bits of byte 6 and the
//!   two high bits of byte 8 are overwritten afterwards to mark the value as
//!   an RFC 4122 version 4 (pseudorandom) UUID.
//!
//! The bucket index is the monotonic input divided by a caller-supplied
//! divisor, reduced modulo the representable prefix range. Once the source
//! advances past that range, prefixes wrap around and restart from zero;
//! callers size the parameters so the wraparound period is long enough for
//! their workload.
//!
//! # Generation modes
//!
//! Sequence mode groups counter values into blocks ([`uuid_sequence`],
//! [`SequentialGenerator::from_sequence`]); the counter is read from a
//! caller-provided [`SequenceSource`], typically backed by a database
//! sequence. Time mode groups wall-clock seconds into intervals
//! ([`uuid_time`], [`SequentialGenerator::from_clock`]):
//!
//! ```rust
//! use rand::rngs::OsRng;
//! use sequential_uuids::SequentialGenerator;
//!
//! // values generated within the same minute share their first two bytes
//! let mut g = SequentialGenerator::new(OsRng);
//! let uuid = g.from_clock(60, 65536)?;
//! # Ok::<(), sequential_uuids::Error>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod id;
pub use id::{ParseError, Uuid, Variant};

mod generator;
pub use generator::{Error, SequenceSource, SequentialGenerator};

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{uuid_sequence, uuid_time};
