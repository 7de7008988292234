//! Growable contiguous storage built from a raw uninitialized buffer.
//!
//! Talus implements a dynamic sequence container from first principles —
//! no `Vec` underneath — with explicit control over where allocation ends
//! and element lifetime begins.
//!
//! # Architecture
//!
//! ```text
//! Sequence<T> (element lifetime: construct / destroy / relocate)
//! └── RawStorage<T> (one owned allocation, `capacity` vacant slots)
//! ```
//!
//! [`RawStorage`] owns a single untyped block sized for `capacity` slots
//! of `T` and never constructs or destroys an element. [`Sequence`] layers
//! a live-element count on top: the first `len` slots are constructed
//! objects, the rest raw memory. Growth allocates a fresh block, relocates
//! the live range with a bitwise move, and swaps the blocks in O(1).
//!
//! # Unwinding guarantees
//!
//! Element code (clone, default construction, the `*_with` closures) may
//! panic. Each mutating method documents whether it is *strong* (a panic
//! leaves the sequence untouched, nothing leaks) or *basic* (the sequence
//! stays valid but partially updated). The tiers are deliberately
//! non-uniform; see the per-method docs on [`Sequence`].
//!
//! # Single-threaded by design
//!
//! A sequence and its storage have exactly one owner. `Send` and `Sync`
//! follow the element type, but no internal synchronisation exists —
//! concurrent mutation requires external locking, as with any `&mut` API.
//!
//! # `unsafe` policy
//!
//! `unsafe` is confined to [`raw`] and [`seq`]; every unsafe block carries
//! a `// SAFETY:` comment naming the invariant it relies on.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod error;
pub mod raw;
pub mod seq;

// Public re-exports for the primary API surface.
pub use error::StorageError;
pub use raw::RawStorage;
pub use seq::Sequence;
