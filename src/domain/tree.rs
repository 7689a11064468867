//! Adjacency-list helpers shared by the region and category trees.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

/// A row that points at its parent through a nullable id.
pub trait TreeItem {
    fn id(&self) -> Uuid;
    fn parent_id(&self) -> Option<Uuid>;
}

/// Group a flat list into `(item, children)` nodes.
///
/// Items whose parent is missing from the list are treated as roots.
/// Input order is preserved among siblings.
pub fn build_forest<T, N, F>(items: Vec<T>, make: F) -> Vec<N>
where
    T: TreeItem,
    F: Fn(T, Vec<N>) -> N + Copy,
{
    let ids: HashSet<Uuid> = items.iter().map(TreeItem::id).collect();
    let mut by_parent: HashMap<Option<Uuid>, Vec<T>> = HashMap::new();

    for item in items {
        let parent = item.parent_id().filter(|p| ids.contains(p));
        by_parent.entry(parent).or_default().push(item);
    }

    attach(None, &mut by_parent, make)
}

fn attach<T, N, F>(parent: Option<Uuid>, by_parent: &mut HashMap<Option<Uuid>, Vec<T>>, make: F) -> Vec<N>
where
    T: TreeItem,
    F: Fn(T, Vec<N>) -> N + Copy,
{
    let siblings = by_parent.remove(&parent).unwrap_or_default();
    siblings
        .into_iter()
        .map(|item| {
            let children = attach(Some(item.id()), by_parent, make);
            make(item, children)
        })
        .collect()
}

/// Ids of every descendant of `root` (excluding `root`).
pub fn descendants<T: TreeItem>(items: &[T], root: Uuid) -> HashSet<Uuid> {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for item in items {
        if let Some(parent) = item.parent_id() {
            children.entry(parent).or_default().push(item.id());
        }
    }

    let mut found = HashSet::new();
    let mut stack = vec![root];
    while let Some(current) = stack.pop() {
        if let Some(kids) = children.get(&current) {
            for kid in kids {
                if found.insert(*kid) {
                    stack.push(*kid);
                }
            }
        }
    }
    found
}
