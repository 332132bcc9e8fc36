//! A module for examples of possible instantiations of [`Augment`].
//!
//! Hopefully also some useful common ones.

use super::*;

// Each struct is packaged into its own internal module,
// mostly in order to reduce clutter.

pub use no_aug::*;
mod no_aug {
    use super::*;

    /// Augmentation placeholder for when no per-node summary is needed,
    /// turning the tree into a plain ordered set.
    #[derive(PartialEq, Eq, Clone, Copy, Hash, Debug, Default, PartialOrd, Ord)]
    pub struct NoAug;

    impl<T> Augment<T> for NoAug {
        fn update(&mut self, _node: NodeView<'_, T, Self>) {}

        fn update_on_insert(
            &mut self,
            _item: &T,
            _node: NodeView<'_, T, Self>,
            _moved: Option<&Self>,
        ) -> bool {
            false
        }

        fn update_on_removal(
            &mut self,
            _item: &T,
            _node: NodeView<'_, T, Self>,
            _moved: Option<&Self>,
        ) -> bool {
            false
        }
    }
}

pub use subtree_count::*;
mod subtree_count {
    use super::*;

    /// Storing the size of a subtree. This is the order-statistic
    /// augmentation: a cursor over a tree carrying it can seek to the k-th
    /// smallest item in logarithmic time.
    #[derive(PartialEq, Eq, Clone, Copy, Hash, Debug, Default)]
    pub struct SubtreeCount {
        /// The number of items in the subtree.
        pub count: usize,
    }

    impl<T> Augment<T> for SubtreeCount {
        fn update(&mut self, node: NodeView<'_, T, Self>) {
            let mut count = node.len();
            if !node.is_leaf() {
                for i in 0..=node.len() {
                    count += node.child_aug(i).count;
                }
            }
            self.count = count;
        }

        fn update_on_insert(
            &mut self,
            _item: &T,
            _node: NodeView<'_, T, Self>,
            moved: Option<&Self>,
        ) -> bool {
            self.count += 1 + moved.map_or(0, |m| m.count);
            true
        }

        fn update_on_removal(
            &mut self,
            _item: &T,
            _node: NodeView<'_, T, Self>,
            moved: Option<&Self>,
        ) -> bool {
            self.count -= 1 + moved.map_or(0, |m| m.count);
            true
        }
    }

    impl<T> SizedAugment<T> for SubtreeCount {
        fn size(&self) -> usize {
            self.count
        }
    }
}
