//! Property maps and property values
//!
//! Provides [`Props`] (insertion-ordered attribute map), [`PropValue`] and
//! [`EventHandler`]. Component state reuses the same representation.

use crate::component::ComponentDef;
use crate::node::{Node, VNode};
use indexmap::IndexMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::rc::Rc;

/// Callable event handler stored as a property value
///
/// Handlers compare by identity: two handlers are equal only when they
/// share the same allocation.
#[derive(Clone)]
pub struct EventHandler(Rc<dyn Fn(&[PropValue])>);

impl EventHandler {
    /// Wrap a closure
    #[inline]
    #[must_use]
    pub fn new(f: impl Fn(&[PropValue]) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the handler
    #[inline]
    pub fn call(&self, args: &[PropValue]) {
        (self.0)(args);
    }
}

impl PartialEq for EventHandler {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for EventHandler {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("EventHandler")
    }
}

/// A single property value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropValue {
    /// Explicit null
    #[default]
    Null,

    /// Boolean flag
    Bool(bool),

    /// Integer
    Int(i64),

    /// Floating point number
    Float(f64),

    /// String
    Str(String),

    /// Ordered list of values
    List(Vec<PropValue>),

    /// Node passed through props (render props, slots)
    Node(Node),

    /// Event handler
    Handler(EventHandler),

    /// Component definition reference
    Component(ComponentDef),
}

impl PropValue {
    /// String content, if this is a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an integer
    #[inline]
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric content as float (integers widen)
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// List content
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[PropValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Node content
    #[inline]
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Handler content
    #[inline]
    #[must_use]
    pub fn as_handler(&self) -> Option<&EventHandler> {
        match self {
            Self::Handler(h) => Some(h),
            _ => None,
        }
    }

    /// Component content
    #[inline]
    #[must_use]
    pub fn as_component(&self) -> Option<&ComponentDef> {
        match self {
            Self::Component(c) => Some(c),
            _ => None,
        }
    }

    /// Check for explicit null
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Textual form used by selectors and serialization
impl Display for PropValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Node(_) => f.write_str("[Node]"),
            Self::Handler(_) => f.write_str("[Function]"),
            Self::Component(def) => f.write_str(def.name()),
        }
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for PropValue {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<i64> for PropValue {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<usize> for PropValue {
    fn from(i: usize) -> Self {
        Self::Int(i64::try_from(i).unwrap_or(i64::MAX))
    }
}

impl From<f64> for PropValue {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Node> for PropValue {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<VNode> for PropValue {
    fn from(vnode: VNode) -> Self {
        Self::Node(Node::Element(vnode))
    }
}

impl From<EventHandler> for PropValue {
    fn from(h: EventHandler) -> Self {
        Self::Handler(h)
    }
}

impl From<ComponentDef> for PropValue {
    fn from(def: ComponentDef) -> Self {
        Self::Component(def)
    }
}

impl<T: Into<PropValue>> From<Vec<T>> for PropValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Insertion-ordered property map
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props(IndexMap<String, PropValue>);

/// Component state shares the property map representation
pub type State = Props;

impl Props {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[inline]
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a value, keeping the original position on replace
    #[inline]
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<PropValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Look up a value
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name)
    }

    /// Remove a value, preserving the order of the rest
    #[inline]
    pub fn remove(&mut self, name: &str) -> Option<PropValue> {
        self.0.shift_remove(name)
    }

    /// Check for a key
    #[inline]
    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Shallow merge: every entry of `other` overwrites ours
    pub fn merge(&mut self, other: &Props) {
        for (k, v) in other.iter() {
            self.insert(k, v.clone());
        }
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Pending state change
#[derive(Clone)]
pub enum StatePatch {
    /// Shallow-merge these entries
    Merge(Props),

    /// Compute entries from the state at apply time
    Update(Rc<dyn Fn(&State) -> Props>),
}

impl StatePatch {
    /// Functional patch evaluated at flush time
    #[inline]
    #[must_use]
    pub fn update(f: impl Fn(&State) -> Props + 'static) -> Self {
        Self::Update(Rc::new(f))
    }

    /// Apply to a state in place
    pub fn apply(&self, state: &mut State) {
        match self {
            Self::Merge(entries) => state.merge(entries),
            Self::Update(f) => {
                let entries = f(state);
                state.merge(&entries);
            }
        }
    }
}

impl From<Props> for StatePatch {
    fn from(entries: Props) -> Self {
        Self::Merge(entries)
    }
}

impl Debug for StatePatch {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge(entries) => f.debug_tuple("Merge").field(entries).finish(),
            Self::Update(_) => f.write_str("Update(..)"),
        }
    }
}
