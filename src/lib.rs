//! Bosk is an in-memory, ordered, copy-on-write B-tree with a pluggable
//! per-node augmentation.
//!
//! The tree stores items with a total order and maintains a user-chosen
//! monoidal summary at every node, which makes augmented queries (order
//! statistics, for instance) run in logarithmic time alongside the usual
//! ordered-set operations.
//!
//! Cloning a tree is O(1): the clone shares every node with the original, and
//! each handle behaves as a fully independent tree. The first write through a
//! shared node replaces it with a private copy (copy-on-write, tracked by
//! per-node reference counts), so neither handle ever observes the other's
//! mutations. Clones may be read, and independently written, from other
//! threads; writes to a single handle are serialized by Rust's `&mut`
//! borrows.
//!
//! In order to maintain a custom summary, implement the [`Augment`] trait,
//! defined in the [`augment`] module; [`NoAug`] (no summary, a plain ordered
//! set) and [`SubtreeCount`] (subtree sizes, an order-statistic tree) are
//! provided.
//!
//! Overall, the operations you get (every one in logarithmic time unless
//! noted) are:
//! * Insert, delete and look up items: [`AugBTree::set`],
//!   [`AugBTree::delete`], [`AugBTree::get`]
//! * Clone the whole tree in O(1): [`AugBTree::clone`]
//! * Walk the items in either direction from any position, with a [`Cursor`]
//! * Seek by order statistic when the augmentation tracks sizes:
//!   [`Cursor::seek_nth`]

pub mod augment;
pub mod cursor;
mod node;
pub mod tree;

pub use augment::*;
pub use cursor::{Cursor, Iter};
pub use tree::*;
