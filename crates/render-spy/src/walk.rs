//! Logical tree traversal
//!
//! Depth-first pre-order over the tree as the test author thinks of it: a
//! component invocation with a recorded output is followed by that output,
//! anything else by its declared children. Holes are never yielded and lists
//! are flattened in place.
//!
//! A [`Walk`] owns its stack and borrows the store only for the duration of
//! each step, so a fresh walk can be started at any time and nothing is
//! computed until it is consumed.

use crate::store::SpyStore;
use render_spy_vdom::{normalize_children, Node};
use std::cell::RefCell;

/// Lazy pre-order iterator over the logical tree
pub struct Walk<'a> {
    store: &'a RefCell<SpyStore>,
    stack: Vec<Node>,
}

impl<'a> Walk<'a> {
    /// Walk `root` and everything below it
    #[must_use]
    pub fn new(store: &'a RefCell<SpyStore>, root: &Node) -> Self {
        Self {
            store,
            stack: vec![root.clone()],
        }
    }

    /// Walk below `root`, excluding `root` itself
    ///
    /// A list root has no node of its own; its items are all yielded.
    #[must_use]
    pub fn descendants(store: &'a RefCell<SpyStore>, root: &Node) -> Self {
        let mut walk = Self::new(store, root);
        if !matches!(root, Node::List(_)) {
            walk.next();
        }
        walk
    }

    /// Concatenated walks over several roots, in order
    #[must_use]
    pub fn walk_all(store: &'a RefCell<SpyStore>, roots: &[Node]) -> Self {
        Self {
            store,
            stack: roots.iter().rev().cloned().collect(),
        }
    }

    fn push_all(&mut self, nodes: Vec<Node>) {
        self.stack.extend(nodes.into_iter().rev());
    }
}

impl Iterator for Walk<'_> {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        while let Some(node) = self.stack.pop() {
            match &node {
                Node::Empty => continue,
                Node::List(items) => {
                    self.push_all(items.clone());
                    continue;
                }
                Node::Element(vnode) => {
                    let recorded = vnode
                        .is_component()
                        .then(|| self.store.borrow().recording(vnode.id()))
                        .flatten();
                    match recorded {
                        Some(Node::List(items)) => self.push_all(items),
                        Some(output) => self.stack.push(output),
                        None => self.push_all(normalize_children(vnode.children())),
                    }
                }
                Node::Text(_) | Node::Number(_) | Node::Bool(_) => {}
            }
            return Some(node);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use render_spy_vdom::{h, ComponentDef, VNode};

    fn names(walk: Walk<'_>) -> Vec<String> {
        walk.map(|n| match n {
            Node::Element(v) => v.name().to_string(),
            other => other.primitive_text().unwrap_or_default(),
        })
        .collect()
    }

    #[test]
    fn declared_children_in_pre_order() {
        let store = RefCell::new(SpyStore::new());
        let tree: Node = h("div")
            .child(h("p").child("a"))
            .child(Node::Empty)
            .child(vec![h("b"), h("i")])
            .into();
        assert_eq!(names(Walk::new(&store, &tree)), vec!["div", "p", "a", "b", "i"]);
    }

    #[test]
    fn recorded_output_replaces_declared_children() {
        let store = RefCell::new(SpyStore::new());
        let def = ComponentDef::function("Wrapper", |_| Node::Empty);
        let invocation = VNode::component(&def).child(h("declared"));
        store
            .borrow_mut()
            .record(invocation.id(), Node::list(vec![h("x"), h("y")]));

        let tree: Node = invocation.into();
        assert_eq!(names(Walk::new(&store, &tree)), vec!["Wrapper", "x", "y"]);
    }

    #[test]
    fn unrecorded_components_fall_back_to_children() {
        let store = RefCell::new(SpyStore::new());
        let def = ComponentDef::function("Lazy", |_| Node::Empty);
        let tree: Node = VNode::component(&def).child("inner").into();
        assert_eq!(names(Walk::new(&store, &tree)), vec!["Lazy", "inner"]);
    }

    #[test]
    fn recorded_booleans_are_yielded() {
        let store = RefCell::new(SpyStore::new());
        let def = ComponentDef::function("Flag", |_| Node::Empty);
        let invocation = VNode::component(&def);
        store.borrow_mut().record(invocation.id(), Node::Bool(true));
        assert_eq!(names(Walk::new(&store, &invocation.into())), vec!["Flag", "true"]);
    }

    #[test]
    fn descendants_skip_the_root() {
        let store = RefCell::new(SpyStore::new());
        let tree: Node = h("ul").child(h("li")).into();
        assert_eq!(names(Walk::descendants(&store, &tree)), vec!["li"]);

        let list = Node::list(vec![h("a"), h("b")]);
        assert_eq!(names(Walk::descendants(&store, &list)), vec!["a", "b"]);
    }

    #[test]
    fn walks_are_restartable() {
        let store = RefCell::new(SpyStore::new());
        let roots: Vec<Node> = vec![h("a").child("1").into(), h("b").into()];
        let first = names(Walk::walk_all(&store, &roots));
        let second = names(Walk::walk_all(&store, &roots));
        assert_eq!(first, vec!["a", "1", "b"]);
        assert_eq!(first, second);
    }
}
