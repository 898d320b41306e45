//! Query results
//!
//! A [`FindWrapper`] is an immutable, ordered set of nodes captured at a
//! store revision. Every query returns a new wrapper; mutations (events,
//! state changes) flush the host afterwards. Operating on a wrapper captured
//! before the latest recorded render is allowed but reported according to
//! the context's [`StalePolicy`].

use crate::config::StalePolicy;
use crate::context::ContextShared;
use crate::error::{SpyError, SpyResult};
use crate::store::SpyStore;
use crate::walk::Walk;
use render_spy_select::{to_where, IntoSelector};
use render_spy_vdom::{
    flush, normalize_children, to_jsx_string, EventHandler, InstanceHandle, Node, PropValue,
    Props, SerializeOptions, State, StatePatch,
};
use std::fmt::{self, Debug, Display, Formatter};
use std::rc::Rc;

/// Revision a wrapper was captured at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Snapshot {
    /// Always current (the context's own root result)
    Live,

    /// Captured at this store revision
    At(u64),
}

/// Ordered query result over a render context
#[derive(Clone)]
pub struct FindWrapper {
    shared: Rc<ContextShared>,
    nodes: Rc<[Node]>,
    revision: Snapshot,
}

impl FindWrapper {
    pub(crate) fn live(shared: Rc<ContextShared>, nodes: Vec<Node>) -> Self {
        Self {
            shared,
            nodes: nodes.into(),
            revision: Snapshot::Live,
        }
    }

    fn derive(&self, nodes: Vec<Node>) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
            nodes: nodes.into(),
            revision: Snapshot::At(self.shared.revision()),
        }
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if no node was captured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Capture revision
    #[inline]
    #[must_use]
    pub fn revision(&self) -> Snapshot {
        self.revision
    }

    /// Check whether renders were recorded after this wrapper was captured
    #[must_use]
    pub fn is_stale(&self) -> bool {
        match self.revision {
            Snapshot::Live => false,
            Snapshot::At(captured) => captured != self.shared.revision(),
        }
    }

    /// Captured nodes
    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Captured node by index
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    fn verify(&self, method: &'static str) -> SpyResult<()> {
        let Snapshot::At(captured) = self.revision else {
            return Ok(());
        };
        let current = self.shared.revision();
        if captured == current {
            return Ok(());
        }
        match self.shared.config.stale_policy {
            StalePolicy::Warn => {
                tracing::warn!(method, captured, current, "render-spy: operation on a stale find() result");
                Ok(())
            }
            StalePolicy::Error => Err(SpyError::Stale {
                method,
                captured,
                current,
            }),
            StalePolicy::Ignore => Ok(()),
        }
    }

    fn single(&self, method: &'static str) -> SpyResult<&Node> {
        match &*self.nodes {
            [node] => Ok(node),
            nodes => Err(SpyError::NotSingle {
                method,
                len: nodes.len(),
            }),
        }
    }

    /// One-node result at `index`
    ///
    /// # Errors
    ///
    /// [`SpyError::IndexOutOfRange`] past the end.
    pub fn at(&self, index: usize) -> SpyResult<Self> {
        let node = self.nodes.get(index).ok_or(SpyError::IndexOutOfRange {
            method: "at",
            index,
            len: self.len(),
        })?;
        self.verify("at")?;
        Ok(self.derive(vec![node.clone()]))
    }

    /// First node
    ///
    /// # Errors
    ///
    /// [`SpyError::Empty`] on an empty result.
    pub fn first(&self) -> SpyResult<Self> {
        if self.is_empty() {
            return Err(SpyError::Empty { method: "first" });
        }
        self.at(0)
    }

    /// Last node
    ///
    /// # Errors
    ///
    /// [`SpyError::Empty`] on an empty result.
    pub fn last(&self) -> SpyResult<Self> {
        if self.is_empty() {
            return Err(SpyError::Empty { method: "last" });
        }
        self.at(self.len() - 1)
    }

    /// Every matching node below the held nodes, in document order
    ///
    /// # Errors
    ///
    /// [`SpyError::Selector`] for malformed selector text.
    pub fn find(&self, selector: impl IntoSelector) -> SpyResult<Self> {
        self.verify("find")?;
        let predicate = to_where(selector)?;
        let found: Vec<Node> = self
            .nodes
            .iter()
            .flat_map(|root| Walk::descendants(&self.shared.store, root))
            .filter(|node| predicate.matches(node))
            .collect();
        tracing::trace!(matches = found.len(), "find");
        Ok(self.derive(found))
    }

    /// Held nodes that match
    ///
    /// # Errors
    ///
    /// [`SpyError::Selector`] for malformed selector text.
    pub fn filter(&self, selector: impl IntoSelector) -> SpyResult<Self> {
        self.verify("filter")?;
        let predicate = to_where(selector)?;
        let kept = self.nodes.iter().filter(|node| predicate.matches(node)).cloned().collect();
        Ok(self.derive(kept))
    }

    /// Declared children of the single held node
    ///
    /// # Errors
    ///
    /// [`SpyError::NotSingle`] unless exactly one node is held.
    pub fn children(&self) -> SpyResult<Self> {
        self.verify("children")?;
        let node = self.single("children")?;
        let children = node
            .as_vnode()
            .map(|v| normalize_children(v.children()))
            .unwrap_or_default();
        Ok(self.derive(children))
    }

    /// Declared child at `index`
    ///
    /// # Errors
    ///
    /// As [`FindWrapper::children`] and [`FindWrapper::at`].
    pub fn child_at(&self, index: usize) -> SpyResult<Self> {
        self.children()?.at(index)
    }

    /// Property of the single held node
    ///
    /// `"children"` yields the declared children as a list node.
    ///
    /// # Errors
    ///
    /// [`SpyError::NotSingle`] unless exactly one node is held.
    pub fn attr(&self, name: &str) -> SpyResult<Option<PropValue>> {
        let node = self.single("attr")?;
        self.verify("attr")?;
        let Some(vnode) = node.as_vnode() else {
            return Ok(None);
        };
        if name == "children" {
            return Ok(Some(PropValue::Node(Node::List(vnode.children().to_vec()))));
        }
        Ok(vnode.attr(name).cloned())
    }

    /// Copy of the single held node's properties
    ///
    /// # Errors
    ///
    /// [`SpyError::NotSingle`] unless exactly one node is held.
    pub fn attrs(&self) -> SpyResult<Props> {
        let node = self.single("attrs")?;
        self.verify("attrs")?;
        Ok(node.as_vnode().map(|v| v.props().clone()).unwrap_or_default())
    }

    /// Concatenated text, numbers and booleans below the held nodes
    ///
    /// # Errors
    ///
    /// [`SpyError::Stale`] under the strict policy.
    pub fn text(&self) -> SpyResult<String> {
        self.verify("text")?;
        Ok(Walk::walk_all(&self.shared.store, &self.nodes)
            .filter_map(|node| node.primitive_text())
            .collect())
    }

    /// Check whether any node in the held subtrees renders like `vdom`
    ///
    /// # Errors
    ///
    /// [`SpyError::Stale`] under the strict policy.
    pub fn contains(&self, vdom: impl Into<Node>) -> SpyResult<bool> {
        self.verify("contains")?;
        let options = SerializeOptions::default();
        let target = to_jsx_string(&vdom.into(), &options);
        let walked: Vec<Node> = Walk::walk_all(&self.shared.store, &self.nodes).collect();
        Ok(walked.iter().any(|node| to_jsx_string(node, &options) == target))
    }

    /// Check for at least one node
    ///
    /// # Errors
    ///
    /// [`SpyError::Stale`] under the strict policy.
    pub fn exists(&self) -> SpyResult<bool> {
        self.verify("exists")?;
        Ok(!self.is_empty())
    }

    /// Invoke the `on<event>` (or `on<event>Capture`) handler of every held
    /// node, then flush
    ///
    /// Property names match case-insensitively; the first match per node is
    /// used and nodes without one are skipped.
    ///
    /// # Errors
    ///
    /// [`SpyError::NotAHandler`] when the matched property is not a handler;
    /// no handler runs in that case.
    pub fn simulate(&self, event: &str, args: &[PropValue]) -> SpyResult<()> {
        self.verify("simulate")?;
        let bubble = format!("on{}", event.to_lowercase());
        let capture = format!("{bubble}capture");

        let mut handlers: Vec<EventHandler> = Vec::new();
        for vnode in self.nodes.iter().filter_map(Node::as_vnode) {
            let matched = vnode.props().iter().find(|(name, _)| {
                let name = name.to_lowercase();
                name == bubble || name == capture
            });
            match matched {
                Some((_, PropValue::Handler(handler))) => handlers.push(handler.clone()),
                Some((name, _)) => {
                    return Err(SpyError::NotAHandler {
                        prop: name.to_string(),
                    })
                }
                None => {}
            }
        }

        tracing::debug!(event, handlers = handlers.len(), "simulate");
        for handler in &handlers {
            handler.call(args);
        }
        flush();
        Ok(())
    }

    /// Live instance rendering the single held node
    ///
    /// # Errors
    ///
    /// [`SpyError::NotSingle`] unless exactly one node is held;
    /// [`SpyError::NoInstance`] unless it is a rendered stateful component.
    pub fn component(&self) -> SpyResult<InstanceHandle> {
        let node = self.single("component")?;
        self.verify("component")?;
        let vnode = node.as_vnode().ok_or_else(|| SpyError::NoInstance {
            name: node.primitive_text().unwrap_or_default(),
        })?;
        self.shared
            .store
            .borrow()
            .live_instance(vnode.id())
            .ok_or_else(|| SpyError::NoInstance {
                name: vnode.name().to_string(),
            })
    }

    /// Stage a state change on the single held instance, then flush
    ///
    /// # Errors
    ///
    /// As [`FindWrapper::component`].
    pub fn set_state(&self, patch: impl Into<StatePatch>) -> SpyResult<()> {
        let instance = self.component()?;
        instance.set_state(patch);
        flush();
        Ok(())
    }

    /// State of the single held instance
    ///
    /// # Errors
    ///
    /// As [`FindWrapper::component`].
    pub fn state(&self) -> SpyResult<State> {
        Ok(self.component()?.state())
    }

    /// One state entry of the single held instance
    ///
    /// # Errors
    ///
    /// As [`FindWrapper::component`].
    pub fn state_value(&self, key: &str) -> SpyResult<Option<PropValue>> {
        Ok(self.component()?.state_value(key))
    }

    /// What the single held component rendered, nested components resolved
    ///
    /// # Errors
    ///
    /// [`SpyError::NotSingle`] unless exactly one node is held;
    /// [`SpyError::NotAComponent`] unless it is a component invocation.
    pub fn output(&self) -> SpyResult<Node> {
        let node = self.single("output")?;
        if !node.is_component() {
            return Err(SpyError::NotAComponent { method: "output" });
        }
        self.verify("output")?;
        Ok(resolve(&self.shared.store.borrow(), node))
    }

    /// Apply `f` to a one-node wrapper per held node
    ///
    /// # Errors
    ///
    /// [`SpyError::Stale`] under the strict policy.
    pub fn map<T>(&self, mut f: impl FnMut(Self, usize) -> T) -> SpyResult<Vec<T>> {
        self.verify("map")?;
        Ok(self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| f(self.derive(vec![node.clone()]), index))
            .collect())
    }
}

/// Follow recordings until a non-recorded node, then resolve its children
fn resolve(store: &SpyStore, node: &Node) -> Node {
    let mut current = node.clone();
    while let Some(recorded) = current
        .as_vnode()
        .filter(|v| v.is_component())
        .and_then(|v| store.recording(v.id()))
    {
        current = recorded;
    }
    match current {
        Node::Element(vnode) => {
            let children = normalize_children(vnode.children())
                .iter()
                .map(|child| resolve(store, child))
                .collect();
            Node::Element(vnode.with_children(children))
        }
        Node::List(items) => Node::List(items.iter().map(|item| resolve(store, item)).collect()),
        other => other,
    }
}

#[allow(clippy::float_cmp)]
fn falsy_literal(node: &Node) -> Option<serde_json::Value> {
    match node {
        Node::Empty => Some(serde_json::Value::Null),
        Node::Bool(false) => Some(serde_json::Value::Bool(false)),
        Node::Text(s) if s.is_empty() => Some(serde_json::Value::String(String::new())),
        Node::Number(n) if n.is_nan() => Some(serde_json::Value::Null),
        Node::Number(n) if *n == 0.0 => Some(serde_json::Value::from(0)),
        _ => None,
    }
}

impl Display for FindWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Err(err) = self.verify("to_string") {
            tracing::warn!(%err, "render-spy: printing a stale find() result");
        }
        write!(f, "render-spy ({} nodes)", self.len())?;
        if self.is_empty() {
            return Ok(());
        }

        let resolved: Vec<Node> = {
            let store = self.shared.store.borrow();
            self.nodes
                .iter()
                .map(|node| {
                    if node.is_component() {
                        resolve(&store, node)
                    } else {
                        node.clone()
                    }
                })
                .collect()
        };
        let rendered: Vec<String> = resolved
            .iter()
            .map(|node| match falsy_literal(node) {
                Some(literal) => format!("{{{literal}}}"),
                None => to_jsx_string(node, &self.shared.config.to_string),
            })
            .collect();
        write!(f, "\n-------\n{}\n", rendered.join("\n"))
    }
}

impl Debug for FindWrapper {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FindWrapper")
            .field("revision", &self.revision)
            .field("nodes", &self.nodes)
            .finish()
    }
}
