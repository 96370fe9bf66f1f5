//! containers
//!
//! The three container kinds the harness manages.
//!
//! # Modules
//!
//! - [`list`] - Doubly linked list over a shared node pool
//! - [`hash`] - Separate-chaining hash table with list buckets
//! - [`bitmap`] - Fixed-length bit array
//!
//! # Ownership
//!
//! Lists and hash tables never hold payloads directly. A [`list::NodePool`]
//! owns every node, and containers coordinate stable node keys into it.
//! Moving a node between containers sharing a pool is a relink, never a
//! copy. Every operation validates its inputs before touching any link, so
//! a returned error means nothing changed.

pub mod bitmap;
pub mod hash;
pub mod list;

pub use bitmap::Bitmap;
pub use hash::HashTable;
pub use list::{List, NodeKey, NodePool, Position};

use thiserror::Error;

/// Errors from container operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("position {pos} is out of range for {len} element(s)")]
    OutOfRange { pos: usize, len: usize },

    #[error("invalid position")]
    InvalidPosition,

    #[error("node allocation failed: pool limit of {limit} node(s) reached")]
    Full { limit: usize },

    #[error("bit index {idx} is out of range for a bitmap of {size} bit(s)")]
    BitIndex { idx: usize, size: usize },

    #[error("bit range {start}+{cnt} exceeds a bitmap of {size} bit(s)")]
    BitRange { start: usize, cnt: usize, size: usize },

    #[error("could not allocate a bitmap of {bits} bit(s)")]
    Alloc { bits: usize },
}
