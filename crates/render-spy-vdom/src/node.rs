//! Virtual nodes
//!
//! Provides [`Node`] (anything that can appear in a tree) and [`VNode`]
//! (an element or component invocation). `VNode` is an immutable, cheaply
//! cloned handle; every constructed node carries a process-unique [`NodeId`]
//! so identity survives cloning of the handle.

use crate::component::ComponentDef;
use crate::props::{EventHandler, PropValue, Props};
use std::fmt::{self, Debug, Display, Formatter};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a constructed node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value
    #[inline]
    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Reconciliation key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    /// Key text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Self(i.to_string())
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Self(i.to_string())
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Self(i.to_string())
    }
}

/// What a [`VNode`] instantiates
#[derive(Debug, Clone, PartialEq)]
pub enum NodeType {
    /// Primitive element (`div`, `span`, ...)
    Tag(String),

    /// Component invocation
    Component(ComponentDef),
}

impl NodeType {
    /// Tag name or component display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Tag(tag) => tag,
            Self::Component(def) => def.name(),
        }
    }
}

/// Anything that can occupy a position in a tree
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    /// Hole (`null`/`undefined`)
    #[default]
    Empty,

    /// Text leaf
    Text(String),

    /// Numeric leaf
    Number(f64),

    /// Boolean leaf (dropped by children normalization)
    Bool(bool),

    /// Fragment-like ordered list
    List(Vec<Node>),

    /// Element or component invocation
    Element(VNode),
}

impl Node {
    /// Text node
    #[inline]
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// List node
    #[inline]
    #[must_use]
    pub fn list<T: Into<Node>>(items: impl IntoIterator<Item = T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Check for a hole
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Element handle, if any
    #[inline]
    #[must_use]
    pub fn as_vnode(&self) -> Option<&VNode> {
        match self {
            Self::Element(v) => Some(v),
            _ => None,
        }
    }

    /// Check whether this is a component invocation
    #[inline]
    #[must_use]
    pub fn is_component(&self) -> bool {
        self.as_vnode().is_some_and(VNode::is_component)
    }

    /// Text contributed by a primitive leaf
    #[must_use]
    pub fn primitive_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => Some(n.to_string()),
            Self::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

impl From<VNode> for Node {
    fn from(v: VNode) -> Self {
        Self::Element(v)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&String> for Node {
    fn from(s: &String) -> Self {
        Self::Text(s.clone())
    }
}

impl From<i32> for Node {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Node {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<usize> for Node {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: usize) -> Self {
        Self::Number(n as f64)
    }
}

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(items: Vec<T>) -> Self {
        Self::list(items)
    }
}

#[derive(Clone)]
struct VNodeData {
    id: NodeId,
    node_type: NodeType,
    props: Props,
    children: Vec<Node>,
    key: Option<Key>,
}

/// Immutable element or component invocation
///
/// Equality is structural (type, props, children, key); use [`VNode::id`]
/// or [`VNode::ptr_eq`] for identity.
#[derive(Clone)]
pub struct VNode(Rc<VNodeData>);

/// Primitive element shorthand
#[inline]
#[must_use]
pub fn h(tag: &str) -> VNode {
    VNode::element(tag)
}

impl VNode {
    fn from_type(node_type: NodeType) -> Self {
        Self(Rc::new(VNodeData {
            id: NodeId::next(),
            node_type,
            props: Props::new(),
            children: Vec::new(),
            key: None,
        }))
    }

    /// Primitive element
    #[inline]
    #[must_use]
    pub fn element(tag: &str) -> Self {
        Self::from_type(NodeType::Tag(tag.to_string()))
    }

    /// Component invocation
    #[inline]
    #[must_use]
    pub fn component(def: &ComponentDef) -> Self {
        Self::from_type(NodeType::Component(def.clone()))
    }

    // Builders run on a uniquely owned handle; a shared one is copied under a
    // fresh id so identity is never duplicated.
    fn edit(self, f: impl FnOnce(&mut VNodeData)) -> Self {
        let mut data = match Rc::try_unwrap(self.0) {
            Ok(data) => data,
            Err(shared) => {
                let mut data = (*shared).clone();
                data.id = NodeId::next();
                data
            }
        };
        f(&mut data);
        Self(Rc::new(data))
    }

    /// Set a property
    #[must_use]
    pub fn prop(self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        let (name, value) = (name.into(), value.into());
        self.edit(|d| d.props.insert(name, value))
    }

    /// Merge a property map
    #[must_use]
    pub fn with_props(self, props: &Props) -> Self {
        self.edit(|d| d.props.merge(props))
    }

    /// Set the reconciliation key
    #[must_use]
    pub fn with_key(self, key: impl Into<Key>) -> Self {
        let key = key.into();
        self.edit(|d| d.key = Some(key))
    }

    /// Append a child
    #[must_use]
    pub fn child(self, child: impl Into<Node>) -> Self {
        let child = child.into();
        self.edit(|d| d.children.push(child))
    }

    /// Append several children
    #[must_use]
    pub fn append_children<T: Into<Node>>(self, children: impl IntoIterator<Item = T>) -> Self {
        let children: Vec<Node> = children.into_iter().map(Into::into).collect();
        self.edit(|d| d.children.extend(children))
    }

    /// Attach an event handler as `on<Event>`
    #[must_use]
    pub fn on(self, event: &str, f: impl Fn(&[PropValue]) + 'static) -> Self {
        let mut name = String::from("on");
        let mut chars = event.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
        self.prop(name, EventHandler::new(f))
    }

    /// Clone with the same type, props and key but replaced children
    ///
    /// The clone is a distinct node with its own id.
    #[must_use]
    pub fn with_children(&self, children: Vec<Node>) -> Self {
        Self(Rc::new(VNodeData {
            id: NodeId::next(),
            node_type: self.0.node_type.clone(),
            props: self.0.props.clone(),
            children,
            key: self.0.key.clone(),
        }))
    }

    /// Node identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.0.id
    }

    /// Check handle identity
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Node type
    #[inline]
    #[must_use]
    pub fn node_type(&self) -> &NodeType {
        &self.0.node_type
    }

    /// Tag name or component display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.node_type.name()
    }

    /// Tag name, for primitive elements
    #[inline]
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        match &self.0.node_type {
            NodeType::Tag(tag) => Some(tag),
            NodeType::Component(_) => None,
        }
    }

    /// Component definition, for component invocations
    #[inline]
    #[must_use]
    pub fn component_def(&self) -> Option<&ComponentDef> {
        match &self.0.node_type {
            NodeType::Component(def) => Some(def),
            NodeType::Tag(_) => None,
        }
    }

    /// Check whether this is a component invocation
    #[inline]
    #[must_use]
    pub fn is_component(&self) -> bool {
        matches!(self.0.node_type, NodeType::Component(_))
    }

    /// Property map (children are kept separately)
    #[inline]
    #[must_use]
    pub fn props(&self) -> &Props {
        &self.0.props
    }

    /// Look up a single property
    #[inline]
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&PropValue> {
        self.0.props.get(name)
    }

    /// Declared children, as authored
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.0.children
    }

    /// Reconciliation key
    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        self.0.key.as_ref()
    }
}

impl PartialEq for VNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.0.node_type == other.0.node_type
                && self.0.key == other.0.key
                && self.0.props == other.0.props
                && self.0.children == other.0.children)
    }
}

impl Debug for VNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("VNode");
        s.field("type", &self.name());
        if let Some(key) = &self.0.key {
            s.field("key", key);
        }
        s.field("props", &self.0.props)
            .field("children", &self.0.children)
            .finish()
    }
}

/// Flatten any children representation into an ordered sequence
///
/// Nested lists are flattened in order; holes and booleans are dropped.
#[must_use]
pub fn normalize_children(children: &[Node]) -> Vec<Node> {
    fn push(out: &mut Vec<Node>, node: &Node) {
        match node {
            Node::Empty | Node::Bool(_) => {}
            Node::List(items) => items.iter().for_each(|n| push(out, n)),
            other => out.push(other.clone()),
        }
    }

    let mut out = Vec::with_capacity(children.len());
    children.iter().for_each(|n| push(&mut out, n));
    out
}
