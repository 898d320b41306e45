//! Reconciliation and mount points
//!
//! Children are matched by key when present, otherwise by position. A
//! matched component keeps its instance only when the definition identity
//! is unchanged; anything else is unmounted and mounted afresh.

use crate::component::{ComponentDef, ComponentKind, ConstructFn, RenderCx};
use crate::instance::{InstanceCell, InstanceHandle, InstanceId};
use crate::node::{normalize_children, Key, Node, NodeType, VNode};
use crate::props::State;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// Committed tree
pub(crate) enum Mounted {
    Empty,
    Leaf(Node),
    Element { vnode: VNode, children: Vec<Mounted> },
    List(Vec<Mounted>),
    Function { vnode: VNode, rendered: Box<Mounted> },
    Instance(InstanceHandle),
}

impl Mounted {
    fn key(&self) -> Option<Key> {
        match self {
            Self::Element { vnode, .. } | Self::Function { vnode, .. } => vnode.key().cloned(),
            Self::Instance(handle) => handle.key(),
            Self::Empty | Self::Leaf(_) | Self::List(_) => None,
        }
    }

    fn snapshot(&self) -> Node {
        match self {
            Self::Empty => Node::Empty,
            Self::Leaf(leaf) => leaf.clone(),
            Self::Element { vnode, children } => {
                Node::Element(vnode.with_children(children.iter().map(Self::snapshot).collect()))
            }
            Self::List(items) => Node::List(items.iter().map(Self::snapshot).collect()),
            Self::Function { rendered, .. } => rendered.snapshot(),
            Self::Instance(handle) => handle.0.rendered.borrow().snapshot(),
        }
    }
}

fn same_component(prev: &VNode, def: &ComponentDef, next: &VNode) -> bool {
    prev.component_def() == Some(def) && prev.key() == next.key()
}

fn unmount(mounted: Mounted) {
    match mounted {
        Mounted::Element { children, .. } | Mounted::List(children) => {
            children.into_iter().for_each(unmount);
        }
        Mounted::Function { rendered, .. } => unmount(*rendered),
        Mounted::Instance(handle) => {
            handle.0.mounted.set(false);
            handle.0.pending.borrow_mut().clear();
            let child = handle.0.rendered.replace(Mounted::Empty);
            unmount(child);
        }
        Mounted::Empty | Mounted::Leaf(_) => {}
    }
}

pub(crate) fn reconcile(old: Mounted, node: Node, depth: usize) -> Mounted {
    match node {
        Node::Empty | Node::Bool(_) => {
            unmount(old);
            Mounted::Empty
        }
        leaf @ (Node::Text(_) | Node::Number(_)) => {
            unmount(old);
            Mounted::Leaf(leaf)
        }
        Node::List(items) => {
            let olds = match old {
                Mounted::List(olds) => olds,
                other => {
                    unmount(other);
                    Vec::new()
                }
            };
            Mounted::List(reconcile_children(olds, items, depth))
        }
        Node::Element(vnode) => reconcile_vnode(old, vnode, depth),
    }
}

fn reconcile_vnode(old: Mounted, vnode: VNode, depth: usize) -> Mounted {
    match vnode.node_type().clone() {
        NodeType::Tag(tag) => {
            let olds = match old {
                Mounted::Element { vnode: prev, children }
                    if prev.tag() == Some(tag.as_str()) && prev.key() == vnode.key() =>
                {
                    children
                }
                other => {
                    unmount(other);
                    Vec::new()
                }
            };
            let children = reconcile_children(olds, normalize_children(vnode.children()), depth + 1);
            Mounted::Element { vnode, children }
        }
        NodeType::Component(def) => match def.kind().clone() {
            ComponentKind::Function(render) => {
                let previous = match old {
                    Mounted::Function { vnode: prev, rendered } if same_component(&prev, &def, &vnode) => {
                        *rendered
                    }
                    other => {
                        unmount(other);
                        Mounted::Empty
                    }
                };
                let state = State::new();
                let output = render(&RenderCx::detached(&vnode, &state));
                let rendered = Box::new(reconcile(previous, output, depth + 1));
                Mounted::Function { vnode, rendered }
            }
            ComponentKind::Stateful(construct) => match old {
                Mounted::Instance(handle)
                    if handle.def() == &def && handle.key().as_ref() == vnode.key() =>
                {
                    update(&handle, vnode);
                    Mounted::Instance(handle)
                }
                other => {
                    unmount(other);
                    Mounted::Instance(mount(&def, &construct, vnode, depth))
                }
            },
        },
    }
}

fn reconcile_children(olds: Vec<Mounted>, news: Vec<Node>, depth: usize) -> Vec<Mounted> {
    let mut keyed: HashMap<Key, Mounted> = HashMap::new();
    let mut positional: Vec<Option<Mounted>> = Vec::with_capacity(olds.len());
    for old in olds {
        match old.key() {
            Some(key) => {
                if let Some(duplicate) = keyed.insert(key, old) {
                    unmount(duplicate);
                }
                positional.push(None);
            }
            None => positional.push(Some(old)),
        }
    }

    let out = news
        .into_iter()
        .enumerate()
        .map(|(i, node)| {
            let old = match node.as_vnode().and_then(VNode::key) {
                Some(key) => keyed.remove(key),
                None => positional.get_mut(i).and_then(Option::take),
            };
            reconcile(old.unwrap_or(Mounted::Empty), node, depth)
        })
        .collect();

    keyed.into_values().for_each(unmount);
    positional.into_iter().flatten().for_each(unmount);
    out
}

fn mount(def: &ComponentDef, construct: &Rc<ConstructFn>, vnode: VNode, depth: usize) -> InstanceHandle {
    let id = InstanceId::next();
    let empty = State::new();
    let component = construct(&RenderCx::constructing(&vnode, &empty, id));
    let state = component.initial_state(vnode.props());

    let handle = InstanceHandle(Rc::new(InstanceCell {
        id,
        def: def.clone(),
        depth,
        component: RefCell::new(component),
        vnode: RefCell::new(vnode),
        state: RefCell::new(state),
        pending: RefCell::new(Vec::new()),
        rendered: RefCell::new(Mounted::Empty),
        mounted: Cell::new(true),
        queued: Cell::new(false),
        renders: Cell::new(0),
    }));
    tracing::trace!(component = %def.name(), ?id, "mounted instance");

    let output = render_instance(&handle);
    let child = reconcile(Mounted::Empty, output, depth + 1);
    *handle.0.rendered.borrow_mut() = child;
    handle
}

fn update(handle: &InstanceHandle, vnode: VNode) {
    *handle.0.vnode.borrow_mut() = vnode.clone();
    {
        let state = handle.0.state.borrow();
        let cx = RenderCx::for_instance(&vnode, &state, handle);
        handle.0.component.borrow_mut().will_receive_props(&cx);
    }
    rerender(handle);
}

fn render_instance(handle: &InstanceHandle) -> Node {
    let cell = &handle.0;
    cell.apply_pending();
    let vnode = cell.vnode.borrow().clone();
    let state = cell.state.borrow();
    let component = cell.component.borrow();
    let output = component.render(&RenderCx::for_instance(&vnode, &state, handle));
    cell.renders.set(cell.renders.get() + 1);
    output
}

/// Re-render an instance in place against its current node and state
pub(crate) fn rerender(handle: &InstanceHandle) {
    let output = render_instance(handle);
    let previous = handle.0.rendered.replace(Mounted::Empty);
    let next = reconcile(previous, output, handle.0.depth + 1);
    *handle.0.rendered.borrow_mut() = next;
}

/// Mount point for a tree
///
/// Rendering into the same root again reconciles against the previous
/// tree, so components at unchanged positions are updated, not remounted.
pub struct Root {
    tree: RefCell<Mounted>,
}

impl Root {
    /// Create an empty mount point
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            tree: RefCell::new(Mounted::Empty),
        }
    }

    /// Render `node` into this root synchronously
    pub fn render(&self, node: impl Into<Node>) {
        let previous = self.tree.replace(Mounted::Empty);
        let next = reconcile(previous, node.into(), 0);
        *self.tree.borrow_mut() = next;
    }

    /// Committed output with every component expanded
    #[must_use]
    pub fn snapshot(&self) -> Node {
        self.tree.borrow().snapshot()
    }

    /// Unmount everything
    pub fn clear(&self) {
        let previous = self.tree.replace(Mounted::Empty);
        unmount(previous);
    }
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Root {
    fn drop(&mut self) {
        self.clear();
    }
}
