//! Crate-wide error type.

use crate::record::TimeOrdering;
use thiserror::Error;

/// All the ways an operation on this crate's collections, persistence framing, or
/// search/query primitives can fail.
#[derive(Debug, Error)]
pub enum Error {
    /// An append under `Enforcement::ThrowIfWrong` would have broken the
    /// monotonic-time invariant.
    #[error("append at index {index} would break time ordering ({ordering:?})")]
    SortingViolation {
        /// The index the offending record would have occupied.
        index: usize,
        /// The ordering that was found between the previous record and the new one.
        ordering: TimeOrdering,
    },

    /// A container or persister signature failed validation on read.
    #[error("invalid signature: {reason}")]
    InvalidSignature {
        /// What specifically was wrong with the signature.
        reason: String,
    },

    /// The stream's container or persister version exceeds what this build can read.
    #[error("stream version {found} is newer than the maximum supported version {max}")]
    NewerVersion {
        /// The version declared in the stream.
        found: u16,
        /// The maximum version this build knows how to read.
        max: u16,
    },

    /// No persister is registered for the target collection's concrete type.
    #[error("no persister registered for {type_name}")]
    NoPersister {
        /// The Rust type name of the collection that has no persister.
        type_name: &'static str,
    },

    /// A persister with a case-insensitively equal signature is already registered.
    #[error("a persister with signature {signature:?} is already registered")]
    ConflictingPersister {
        /// The conflicting signature.
        signature: String,
    },

    /// A read was attempted into a target collection that is marked read-only.
    #[error("cannot read into a read-only container")]
    ReadonlyContainer,

    /// A read was attempted into a target collection that already has records.
    #[error("cannot read into a non-empty container (has {len} records)")]
    NotEmptyContainer {
        /// The number of records already present.
        len: usize,
    },

    /// The declared metadata length was out of `[0, 55]`, or the stream ended early.
    #[error("invalid metadata: {reason}")]
    InvalidMetadata {
        /// What was wrong with the metadata framing.
        reason: String,
    },

    /// An index or range argument was out of bounds for the target collection.
    #[error("index {index} out of range for length {len}")]
    OutOfRange {
        /// The offending index.
        index: usize,
        /// The collection's length at the time of the call.
        len: usize,
    },

    /// A value failed a domain constraint at construction time.
    #[error("invalid value for field {field}: {reason}")]
    InvalidValue {
        /// The name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A record of an unexpected variant was supplied to an operation that requires
    /// a specific one.
    #[error("unexpected record type: expected {expected}, found {found}")]
    UnexpectedType {
        /// The type name that was expected.
        expected: &'static str,
        /// The type name that was actually supplied.
        found: &'static str,
    },

    /// Wraps an I/O failure from the chunked byte source/sink.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, Error>;
