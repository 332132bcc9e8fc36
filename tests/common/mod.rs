#![allow(dead_code)] // each test binary uses its own slice of these helpers

use bosk::augment::Augment;
use bosk::AugBTree;
use std::fmt::Debug;

/// Collects the tree's items in ascending order through the cursor.
pub fn in_order<T, A>(tree: &AugBTree<T, A>) -> Vec<T>
where
    T: Ord + Clone,
    A: Augment<T>,
{
    tree.iter().cloned().collect()
}

/// Collects the tree's items in descending order by walking the cursor
/// backwards from the last item.
pub fn in_reverse_order<T, A>(tree: &AugBTree<T, A>) -> Vec<T>
where
    T: Ord + Clone,
    A: Augment<T>,
{
    let mut items = Vec::with_capacity(tree.len());
    let mut cursor = tree.cursor();
    cursor.last();
    while let Some(item) = cursor.cur() {
        items.push(item.clone());
        cursor.prev();
    }
    items
}

/// Full consistency sweep: structural invariants, summary freshness, and the
/// in-order traversal matching `expected`.
pub fn check_against<T, A>(tree: &AugBTree<T, A>, expected: &[T])
where
    T: Ord + Clone + Debug,
    A: Augment<T> + PartialEq + Debug,
{
    tree.assert_invariants();
    assert_eq!(tree.len(), expected.len());
    assert_eq!(in_order(tree), expected);
    let mut reversed = expected.to_vec();
    reversed.reverse();
    assert_eq!(in_reverse_order(tree), reversed);
}

/// The number of items stored in the root node, recovered from the rendered
/// tree: root items are exactly the maximal character runs sitting at
/// parenthesis depth zero (commas separate items within a leaf root).
pub fn root_item_count(rendered: &str) -> usize {
    if rendered == ";" {
        return 0;
    }
    let mut depth = 0usize;
    let mut count = 0;
    let mut in_item = false;
    for c in rendered.chars() {
        match c {
            '(' => {
                depth += 1;
                in_item = false;
            }
            ')' => depth -= 1,
            ',' if depth == 0 => in_item = false,
            _ if depth == 0 => {
                if !in_item {
                    count += 1;
                    in_item = true;
                }
            }
            _ => {}
        }
    }
    count
}
