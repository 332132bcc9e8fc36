//! The tree handle: a root pointer and an item count.
//!
//! Cloning a handle is O(1) and gives a logically independent tree that
//! physically shares every node with the original. Mutation through either
//! handle discovers shared nodes along its write path and replaces them with
//! private copies, so the other handle never observes a change.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::augment::{Augment, NoAug, SubtreeCount};
use crate::cursor::{Cursor, Iter};
use crate::node::{Node, NodePtr, MAX_ITEMS, MIN_ITEMS};

/// An ordered, copy-on-write B-tree with a pluggable per-node augmentation.
///
/// Items are stored in sorted order with no duplicates; inserting an item
/// equal to a stored one replaces it in place. The `A` parameter chooses the
/// summary maintained at every node: [`NoAug`] for a plain ordered set, or
/// [`SubtreeCount`] for order statistics.
///
/// All mutating operations take `&mut self`; clones of a tree may be read
/// (and independently mutated) from other threads, since a node shared
/// between handles is never written in place.
///
/// ```
/// use bosk::AugBTree;
///
/// let mut tree: AugBTree<i32> = AugBTree::new();
/// tree.set(2);
/// tree.set(1);
/// tree.set(3);
///
/// let snapshot = tree.clone();
/// tree.delete(&2);
///
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 3]);
/// assert_eq!(snapshot.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
/// ```
pub struct AugBTree<T, A = NoAug> {
    root: Option<NodePtr<T, A>>,
    len: usize,
}

/// A plain ordered set: no per-node summary is maintained.
pub type PlainBTree<T> = AugBTree<T, NoAug>;

/// An order-statistic tree: every node carries its subtree item count, and
/// [`Cursor::seek_nth`] finds the k-th smallest item in logarithmic time.
pub type CountedBTree<T> = AugBTree<T, SubtreeCount>;

// The derived clone implementation would require `T: Clone` and `A: Clone`,
// which is unnecessary: only the root pointer is copied.
impl<T, A> Clone for AugBTree<T, A> {
    fn clone(&self) -> Self {
        AugBTree {
            root: self.root.clone(),
            len: self.len,
        }
    }
}

impl<T: Ord + Clone, A: Augment<T>> AugBTree<T, A> {
    /// Creates an empty tree.
    pub fn new() -> Self {
        AugBTree { root: None, len: 0 }
    }

    /// The number of items in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops every item, leaving the tree empty. Nodes shared with other
    /// handles survive under those handles.
    pub fn reset(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// The number of levels in the tree: 0 when empty, 1 for a lone leaf.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut node = self.root.as_deref();
        while let Some(n) = node {
            height += 1;
            node = n.children.first().map(|c| &**c);
        }
        height
    }

    /// Returns the stored item equal to `item`, if any.
    pub fn get(&self, item: &T) -> Option<&T> {
        let mut node = self.root.as_deref()?;
        loop {
            let (i, found) = node.find(item);
            if found {
                return Some(&node.items[i]);
            }
            if node.leaf {
                return None;
            }
            node = &*node.children[i];
        }
    }

    /// Whether an item equal to `item` is stored in the tree.
    pub fn contains(&self, item: &T) -> bool {
        self.get(item).is_some()
    }

    /// Inserts `item`. An equal item already in the tree is replaced in
    /// place and the length does not change.
    ///
    /// Replacement does not refresh any summaries: an augmentation that
    /// depends on item identity, and not just on which keys are present,
    /// must be refreshed by the caller.
    pub fn set(&mut self, item: T) {
        if self.root.is_none() {
            self.root = Some(Arc::new(Node::new_leaf()));
        }
        if self.root.as_deref().map_or(false, Node::is_full) {
            // Split the root preemptively: the old root becomes the left
            // child of a fresh one-item root.
            let mut left = self.root.take().expect("root was just checked");
            let (separator, right) = Arc::make_mut(&mut left).split(MAX_ITEMS / 2);
            let mut new_root = Node::new_internal();
            new_root.items.push(separator);
            new_root.children.push(left);
            new_root.children.push(right);
            new_root.refresh_aug();
            self.root = Some(Arc::new(new_root));
        }
        let key = item.clone();
        let root = Arc::make_mut(self.root.as_mut().expect("root was just installed"));
        if root.insert(item, &key).0.is_none() {
            self.len += 1;
        }
    }

    /// Removes the item equal to `item`, if present.
    pub fn delete(&mut self, item: &T) {
        let root_arc = match self.root.as_mut() {
            None => return,
            Some(root) => root,
        };
        let root = Arc::make_mut(root_arc);
        if root.remove(item).0.is_some() {
            self.len -= 1;
        }
        if root.items.is_empty() {
            // An emptied leaf clears the tree; an internal root with no items
            // has exactly one child left, which is promoted in its place.
            let promoted = if root.leaf { None } else { root.children.pop() };
            self.root = promoted;
        }
    }

    /// A cursor positioned at the root. Use [`Cursor::first`],
    /// [`Cursor::seek_ge`] and friends to land on an item.
    pub fn cursor(&self) -> Cursor<'_, T, A> {
        Cursor::new(self.root.as_deref())
    }

    /// Iterates over the items in ascending order.
    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter::new(self.cursor())
    }

    /// Checks that every structural and summary invariant holds, panicking
    /// otherwise. Quadratic-ish and intended for tests and debugging.
    pub fn assert_invariants(&self)
    where
        T: fmt::Debug,
        A: PartialEq + fmt::Debug,
    {
        let mut total = 0;
        let mut leaf_depth = None;
        if let Some(root) = self.root.as_deref() {
            assert!(!root.items.is_empty(), "non-empty tree with an empty root");
            check_node(root, 0, None, None, true, &mut total, &mut leaf_depth);
        }
        assert_eq!(total, self.len, "tree length out of sync with its nodes");
    }
}

impl<T: Ord + Clone, A: Augment<T>> Default for AugBTree<T, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord + Clone, A: Augment<T>> FromIterator<T> for AugBTree<T, A> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = AugBTree::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord + Clone, A: Augment<T>> Extend<T> for AugBTree<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.set(item);
        }
    }
}

impl<'a, T: Ord + Clone, A: Augment<T>> IntoIterator for &'a AugBTree<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Renders the tree recursively: `;` for an empty tree, a leaf as its
/// comma-separated items, and an internal node as each child in parentheses
/// between the separators, `(left)item(right)`.
impl<T: fmt::Display, A> fmt::Display for AugBTree<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root.as_deref() {
            None => f.write_str(";"),
            Some(root) => fmt_node(root, f),
        }
    }
}

impl<T: fmt::Debug, A: fmt::Debug> fmt::Debug for AugBTree<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AugBTree")
            .field("len", &self.len)
            .field("items", &DebugItems(self))
            .finish()
    }
}

struct DebugItems<'a, T, A>(&'a AugBTree<T, A>);

impl<T: fmt::Debug, A: fmt::Debug> fmt::Debug for DebugItems<'_, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        if let Some(root) = self.0.root.as_deref() {
            debug_items(root, &mut list);
        }
        list.finish()
    }
}

fn debug_items<T: fmt::Debug, A: fmt::Debug>(
    node: &Node<T, A>,
    list: &mut fmt::DebugList<'_, '_>,
) {
    if node.leaf {
        list.entries(node.items.iter());
        return;
    }
    for (i, item) in node.items.iter().enumerate() {
        debug_items(&node.children[i], list);
        list.entry(item);
    }
    debug_items(&node.children[node.items.len()], list);
}

fn fmt_node<T: fmt::Display, A>(node: &Node<T, A>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if node.leaf {
        for (i, item) in node.items.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", item)?;
        }
        return Ok(());
    }
    for (i, item) in node.items.iter().enumerate() {
        f.write_str("(")?;
        fmt_node(&node.children[i], f)?;
        write!(f, "){}", item)?;
    }
    f.write_str("(")?;
    fmt_node(&node.children[node.items.len()], f)?;
    f.write_str(")")
}

fn check_node<T, A>(
    node: &Node<T, A>,
    depth: usize,
    lower: Option<&T>,
    upper: Option<&T>,
    is_root: bool,
    total: &mut usize,
    leaf_depth: &mut Option<usize>,
) where
    T: Ord + Clone + fmt::Debug,
    A: Augment<T> + PartialEq + fmt::Debug,
{
    assert!(node.items.len() <= MAX_ITEMS, "overfull node");
    if !is_root {
        assert!(node.items.len() >= MIN_ITEMS, "underfull non-root node");
    }
    for pair in node.items.windows(2) {
        assert!(pair[0] < pair[1], "items out of order: {:?}", pair);
    }
    if let (Some(low), Some(first)) = (lower, node.items.first()) {
        assert!(low < first, "item below its lower bound: {:?}", first);
    }
    if let (Some(high), Some(last)) = (upper, node.items.last()) {
        assert!(last < high, "item above its upper bound: {:?}", last);
    }

    if node.leaf {
        assert!(node.children.is_empty(), "leaf with children");
        match *leaf_depth {
            None => *leaf_depth = Some(depth),
            Some(expected) => assert_eq!(expected, depth, "leaves at unequal depths"),
        }
    } else {
        assert_eq!(
            node.children.len(),
            node.items.len() + 1,
            "internal node child count"
        );
        for i in 0..node.children.len() {
            let low = if i == 0 { lower } else { Some(&node.items[i - 1]) };
            let high = node.items.get(i).or(upper);
            check_node(
                &node.children[i],
                depth + 1,
                low,
                high,
                false,
                total,
                leaf_depth,
            );
        }
    }

    // The children were verified first, so a fresh recompute over their
    // stored summaries is a trustworthy reference value.
    let mut fresh = A::default();
    fresh.update(node.view());
    assert!(
        fresh == node.aug,
        "stale summary: stored {:?}, recomputed {:?}",
        node.aug,
        fresh
    );

    *total += node.items.len();
}

impl<T: Ord + Clone, A: Augment<T>> Node<T, A> {
    /// Recursive insertion into a node that is not full.
    ///
    /// Returns the item that was replaced, if any, and whether this node's
    /// summary changed (so that the caller can skip refreshing its own
    /// summary when nothing below it moved).
    ///
    /// `key` is a copy of `item`, kept by the caller so the summary hooks on
    /// the path can refer to the inserted item after it has moved down into
    /// the subtree.
    pub(crate) fn insert(&mut self, item: T, key: &T) -> (Option<T>, bool) {
        debug_assert!(!self.is_full());
        let (mut i, found) = self.find(key);
        if found {
            // Equal-item overwrite: replace in place, summaries untouched.
            return (Some(std::mem::replace(&mut self.items[i], item)), false);
        }
        if self.leaf {
            self.items.insert(i, item);
            let changed = self.aug_inserted_at(i, None);
            return (None, changed);
        }
        if self.children[i].is_full() {
            // Split the full child before descending; the separator moves up
            // into this node and the insertion re-decides which half it
            // belongs to.
            let (separator, right) = Arc::make_mut(&mut self.children[i]).split(MAX_ITEMS / 2);
            self.insert_at(i, separator, Some(right));
            match key.cmp(&self.items[i]) {
                Ordering::Less => {}
                Ordering::Greater => i += 1,
                Ordering::Equal => {
                    return (Some(std::mem::replace(&mut self.items[i], item)), false);
                }
            }
        }
        let (replaced, child_changed) = Arc::make_mut(&mut self.children[i]).insert(item, key);
        let changed = if child_changed {
            self.aug_inserted(key, None)
        } else {
            false
        };
        (replaced, changed)
    }

    /// Recursive removal. Returns the removed item, if found, and whether
    /// this node's summary changed.
    pub(crate) fn remove(&mut self, key: &T) -> (Option<T>, bool) {
        loop {
            let (i, found) = self.find(key);
            if self.leaf {
                if !found {
                    return (None, false);
                }
                let (item, _) = self.remove_at(i);
                let changed = self.aug_removed(&item, None);
                return (Some(item), changed);
            }
            if self.children[i].len() <= MIN_ITEMS {
                // The child we are about to enter (or steal the predecessor
                // from) cannot afford to shrink. Rebalancing may move the
                // target item into a different slot, so re-run the search.
                self.rebalance_or_merge(i);
                continue;
            }
            if found {
                // Replace the separator with the greatest item of its left
                // subtree, which shrinks by one.
                let (predecessor, _) = Arc::make_mut(&mut self.children[i]).remove_max();
                let item = std::mem::replace(&mut self.items[i], predecessor);
                let changed = self.aug_removed(&item, None);
                return (Some(item), changed);
            }
            let (removed, child_changed) = Arc::make_mut(&mut self.children[i]).remove(key);
            let changed = if child_changed {
                self.aug_removed(key, None)
            } else {
                false
            };
            return (removed, changed);
        }
    }

    /// Removes the greatest item of this subtree. The node must hold more
    /// than `MIN_ITEMS` items (the caller rebalances first).
    fn remove_max(&mut self) -> (T, bool) {
        if self.leaf {
            let (item, _) = self.pop_back();
            let changed = self.aug_removed(&item, None);
            return (item, changed);
        }
        if self.children[self.len()].len() <= MIN_ITEMS {
            self.rebalance_or_merge(self.len());
        }
        // A merge may have shortened this node, so re-read the last index.
        let last = self.len();
        let (item, child_changed) = Arc::make_mut(&mut self.children[last]).remove_max();
        let changed = if child_changed {
            self.aug_removed(&item, None)
        } else {
            false
        };
        (item, changed)
    }

    /// Grows child `i`, which sits at `MIN_ITEMS` and must be able to lose
    /// one: either a rotation through the adjacent separator, or a merge
    /// with a sibling. This node's own summary is not refreshed here, since its
    /// subtree still holds the same items, and the caller fires the removal
    /// hook after the retry.
    fn rebalance_or_merge(&mut self, i: usize) {
        if i > 0 && self.children[i - 1].len() > MIN_ITEMS {
            // Rotate right: the left sibling's last item replaces the
            // separator, which drops into the front of child `i` together
            // with the sibling's last child.
            let left = Arc::make_mut(&mut self.children[i - 1]);
            let (item, grandchild) = left.pop_back();
            let moved = grandchild.as_ref().map(|g| g.aug.clone());
            left.aug_removed(&item, moved.as_ref());
            let separator = std::mem::replace(&mut self.items[i - 1], item);
            let child = Arc::make_mut(&mut self.children[i]);
            child.push_front(separator, grandchild);
            child.aug_inserted_at(0, moved.as_ref());
        } else if i < self.len() && self.children[i + 1].len() > MIN_ITEMS {
            // Rotate left, the mirror image.
            let right = Arc::make_mut(&mut self.children[i + 1]);
            let (item, grandchild) = right.pop_front();
            let moved = grandchild.as_ref().map(|g| g.aug.clone());
            right.aug_removed(&item, moved.as_ref());
            let separator = std::mem::replace(&mut self.items[i], item);
            let child = Arc::make_mut(&mut self.children[i]);
            let end = child.len();
            child.push_back(separator, grandchild);
            child.aug_inserted_at(end, moved.as_ref());
        } else {
            // Both siblings are at the minimum: merge. Clamp so that both
            // `i` and `i + 1` exist, then absorb the separator and the whole
            // right sibling into child `i`.
            debug_assert!(!self.items.is_empty());
            let i = i.min(self.len() - 1);
            let (separator, right) = self.remove_at(i);
            let right = right.expect("internal node without a right child");
            // Unwrapping releases only the sibling itself; its children move
            // under child `i` with their reference counts untouched.
            let right = match Arc::try_unwrap(right) {
                Ok(node) => node,
                Err(shared) => (*shared).clone(),
            };
            let moved = right.aug.clone();
            let child = Arc::make_mut(&mut self.children[i]);
            let separator_at = child.len();
            child.items.push(separator);
            child.items.extend(right.items);
            child.children.extend(right.children);
            child.aug_inserted_at(separator_at, Some(&moved));
        }
    }
}
