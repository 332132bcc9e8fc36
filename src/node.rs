//! The B-tree node and its structural primitives.
//!
//! Nodes are shared between tree handles through [`Arc`]; a node whose strong
//! count is 1 is exclusively owned by a single parent link (or a single tree
//! root) and may be mutated in place. Every slot on a write path goes through
//! [`Arc::make_mut`] first, which clones a shared node (bumping each child's
//! count) before handing out mutable access. Writers on one handle are
//! serialized by the `&mut` borrow of the tree, so readers of other handles
//! never observe a shared node mid-mutation.

use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::augment::{Augment, NodeView};

/// The tree degree. A node stores at most `2 * DEGREE - 1` items, and every
/// node except the root stores at least `DEGREE - 1`.
pub(crate) const DEGREE: usize = 16;
pub(crate) const MAX_ITEMS: usize = 2 * DEGREE - 1;
pub(crate) const MIN_ITEMS: usize = DEGREE - 1;
pub(crate) const MAX_CHILDREN: usize = MAX_ITEMS + 1;

pub(crate) type NodePtr<T, A> = Arc<Node<T, A>>;

/// A single node: an ordered run of items, an optional run of children
/// (one more child than items), and the subtree summary.
///
/// Leaves and internal nodes share this one type, distinguished by the `leaf`
/// flag; a leaf's `children` is simply empty. Cloning a node value-copies the
/// items and the summary and shares the children, which is exactly the
/// copy-on-write clone: each child's reference count rises by one.
#[derive(Clone)]
pub(crate) struct Node<T, A> {
    pub(crate) leaf: bool,
    pub(crate) aug: A,
    pub(crate) items: ArrayVec<T, MAX_ITEMS>,
    pub(crate) children: ArrayVec<NodePtr<T, A>, MAX_CHILDREN>,
}

impl<T, A: Default> Node<T, A> {
    pub(crate) fn new_leaf() -> Self {
        Node {
            leaf: true,
            aug: A::default(),
            items: ArrayVec::new(),
            children: ArrayVec::new(),
        }
    }

    pub(crate) fn new_internal() -> Self {
        Node {
            leaf: false,
            aug: A::default(),
            items: ArrayVec::new(),
            children: ArrayVec::new(),
        }
    }
}

impl<T, A> Node<T, A> {
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.items.len() == MAX_ITEMS
    }

    pub(crate) fn view(&self) -> NodeView<'_, T, A> {
        NodeView::new(self.leaf, &self.items, &self.children)
    }
}

impl<T: Ord, A> Node<T, A> {
    /// Binary search over the live items. Returns the position of `item`, or
    /// the position it would be inserted at, along with whether it was found.
    pub(crate) fn find(&self, item: &T) -> (usize, bool) {
        match self.items.binary_search(item) {
            Ok(i) => (i, true),
            Err(i) => (i, false),
        }
    }
}

impl<T, A> Node<T, A> {
    /// Inserts `item` at position `i`, and `child` as its right child.
    /// The node must not be full.
    pub(crate) fn insert_at(&mut self, i: usize, item: T, child: Option<NodePtr<T, A>>) {
        debug_assert!(!self.is_full());
        self.items.insert(i, item);
        if let Some(child) = child {
            self.children.insert(i + 1, child);
        }
    }

    /// Removes the item at position `i` and, for internal nodes, its right
    /// child. The inverse of [`Node::insert_at`].
    pub(crate) fn remove_at(&mut self, i: usize) -> (T, Option<NodePtr<T, A>>) {
        let item = self.items.remove(i);
        let child = if self.leaf {
            None
        } else {
            Some(self.children.remove(i + 1))
        };
        (item, child)
    }

    pub(crate) fn push_back(&mut self, item: T, child: Option<NodePtr<T, A>>) {
        self.items.push(item);
        if let Some(child) = child {
            self.children.push(child);
        }
    }

    pub(crate) fn push_front(&mut self, item: T, child: Option<NodePtr<T, A>>) {
        self.items.insert(0, item);
        if let Some(child) = child {
            self.children.insert(0, child);
        }
    }

    pub(crate) fn pop_back(&mut self) -> (T, Option<NodePtr<T, A>>) {
        let child = if self.leaf { None } else { self.children.pop() };
        let item = self.items.pop().expect("pop_back on an empty node");
        (item, child)
    }

    pub(crate) fn pop_front(&mut self) -> (T, Option<NodePtr<T, A>>) {
        let child = if self.leaf {
            None
        } else {
            Some(self.children.remove(0))
        };
        (self.items.remove(0), child)
    }
}

impl<T, A: Augment<T>> Node<T, A> {
    /// Recomputes this node's summary from scratch.
    pub(crate) fn refresh_aug(&mut self) {
        let view = NodeView::new(self.leaf, &self.items, &self.children);
        self.aug.update(view);
    }

    /// Fires the insertion hook for the item now stored at position `i`.
    pub(crate) fn aug_inserted_at(&mut self, i: usize, moved: Option<&A>) -> bool {
        let view = NodeView::new(self.leaf, &self.items, &self.children);
        self.aug.update_on_insert(&self.items[i], view, moved)
    }

    /// Fires the insertion hook for an item that entered this node's subtree
    /// but is not stored in the node itself.
    pub(crate) fn aug_inserted(&mut self, item: &T, moved: Option<&A>) -> bool {
        let view = NodeView::new(self.leaf, &self.items, &self.children);
        self.aug.update_on_insert(item, view, moved)
    }

    /// Fires the removal hook for an item that left this node's subtree.
    pub(crate) fn aug_removed(&mut self, item: &T, moved: Option<&A>) -> bool {
        let view = NodeView::new(self.leaf, &self.items, &self.children);
        self.aug.update_on_removal(item, view, moved)
    }

    /// Splits the node at `mid`: items and children above `mid` move into a
    /// fresh right sibling, and the item at `mid` is returned as the
    /// separator. Both halves get a full summary recompute; after a bulk move
    /// like this, incremental accounting would not be any cheaper.
    pub(crate) fn split(&mut self, mid: usize) -> (T, NodePtr<T, A>) {
        let mut right = if self.leaf {
            Node::new_leaf()
        } else {
            Node::new_internal()
        };
        right.items.extend(self.items.drain(mid + 1..));
        if !self.leaf {
            right.children.extend(self.children.drain(mid + 1..));
        }
        let separator = self.items.pop().expect("split of an empty node");
        self.refresh_aug();
        right.refresh_aug();
        (separator, Arc::new(right))
    }
}
