//! Component definitions and the render context handed to them
//!
//! A [`ComponentDef`] is either a plain render function or a stateful
//! constructor producing a [`Component`]. Definitions compare by identity:
//! the reconciler treats two invocations as the same component only when
//! their definitions share a [`ComponentId`].

use crate::instance::{InstanceHandle, InstanceId, Updater};
use crate::node::{Node, VNode};
use crate::props::{PropValue, Props, State};
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a component definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(u64);

impl ComponentId {
    fn next() -> Self {
        Self(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Function component body
pub type RenderFn = dyn Fn(&RenderCx<'_>) -> Node;

/// Stateful component constructor
pub type ConstructFn = dyn Fn(&RenderCx<'_>) -> Box<dyn Component>;

/// Shape of a component definition
#[derive(Clone)]
pub enum ComponentKind {
    /// Props in, node out
    Function(Rc<RenderFn>),

    /// Constructed once per mounted position, then updated in place
    Stateful(Rc<ConstructFn>),
}

/// Stateful component behavior
///
/// Instances are created by the definition's constructor, receive
/// [`Component::will_receive_props`] when their parent re-renders them, and
/// are rendered against host-owned state.
pub trait Component {
    /// State installed right after construction
    fn initial_state(&self, _props: &Props) -> State {
        State::new()
    }

    /// Called before an update with the incoming node
    fn will_receive_props(&mut self, _cx: &RenderCx<'_>) {}

    /// Produce output for the current props and state
    fn render(&self, cx: &RenderCx<'_>) -> Node;
}

struct DefData {
    id: ComponentId,
    name: String,
    kind: ComponentKind,
    origin: Option<ComponentDef>,
}

/// Component definition handle
#[derive(Clone)]
pub struct ComponentDef(Rc<DefData>);

impl ComponentDef {
    fn build(name: &str, kind: ComponentKind, origin: Option<ComponentDef>) -> Self {
        Self(Rc::new(DefData {
            id: ComponentId::next(),
            name: name.to_string(),
            kind,
            origin,
        }))
    }

    /// Function component
    #[must_use]
    pub fn function(name: &str, render: impl Fn(&RenderCx<'_>) -> Node + 'static) -> Self {
        Self::build(name, ComponentKind::Function(Rc::new(render)), None)
    }

    /// Stateful component
    #[must_use]
    pub fn stateful<C, F>(name: &str, construct: F) -> Self
    where
        C: Component + 'static,
        F: Fn(&RenderCx<'_>) -> C + 'static,
    {
        let construct: Rc<ConstructFn> = Rc::new(move |cx| Box::new(construct(cx)));
        Self::build(name, ComponentKind::Stateful(construct), None)
    }

    /// Definition standing in for `origin`
    ///
    /// The result is marked as a spy and reports `origin`'s name.
    #[must_use]
    pub fn spy_of(origin: &ComponentDef, kind: ComponentKind) -> Self {
        Self::build(origin.name(), kind, Some(origin.clone()))
    }

    /// Definition identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.0.id
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Definition shape
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &ComponentKind {
        &self.0.kind
    }

    /// Check for the stateful shape
    #[inline]
    #[must_use]
    pub fn is_stateful(&self) -> bool {
        matches!(self.0.kind, ComponentKind::Stateful(_))
    }

    /// Check the spy marker
    #[inline]
    #[must_use]
    pub fn is_spy(&self) -> bool {
        self.0.origin.is_some()
    }

    /// Definition this spy stands in for
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Option<&ComponentDef> {
        self.0.origin.as_ref()
    }
}

impl PartialEq for ComponentDef {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for ComponentDef {}

impl Debug for ComponentDef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ComponentDef");
        s.field("name", &self.0.name)
            .field("stateful", &self.is_stateful());
        if self.is_spy() {
            s.field("spy", &true);
        }
        s.finish()
    }
}

/// Everything a component sees while rendering
pub struct RenderCx<'a> {
    vnode: &'a VNode,
    state: &'a State,
    instance_id: Option<InstanceId>,
    instance: Option<&'a InstanceHandle>,
}

impl<'a> RenderCx<'a> {
    /// Context for a function component or a detached render
    #[inline]
    #[must_use]
    pub fn detached(vnode: &'a VNode, state: &'a State) -> Self {
        Self {
            vnode,
            state,
            instance_id: None,
            instance: None,
        }
    }

    pub(crate) fn constructing(vnode: &'a VNode, state: &'a State, id: InstanceId) -> Self {
        Self {
            vnode,
            state,
            instance_id: Some(id),
            instance: None,
        }
    }

    pub(crate) fn for_instance(
        vnode: &'a VNode,
        state: &'a State,
        instance: &'a InstanceHandle,
    ) -> Self {
        Self {
            vnode,
            state,
            instance_id: Some(instance.id()),
            instance: Some(instance),
        }
    }

    /// Same instance and state presented with a different node
    #[inline]
    #[must_use]
    pub fn with_vnode<'b>(&'b self, vnode: &'b VNode) -> RenderCx<'b> {
        RenderCx {
            vnode,
            state: self.state,
            instance_id: self.instance_id,
            instance: self.instance,
        }
    }

    /// Node being rendered
    #[inline]
    #[must_use]
    pub fn vnode(&self) -> &VNode {
        self.vnode
    }

    /// Incoming props
    #[inline]
    #[must_use]
    pub fn props(&self) -> &Props {
        self.vnode.props()
    }

    /// Single prop lookup
    #[inline]
    #[must_use]
    pub fn prop(&self, name: &str) -> Option<&PropValue> {
        self.vnode.attr(name)
    }

    /// Declared children passed by the parent
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Node] {
        self.vnode.children()
    }

    /// Current state (empty for function components)
    #[inline]
    #[must_use]
    pub fn state(&self) -> &State {
        self.state
    }

    /// Id of the stateful instance being constructed or rendered
    #[inline]
    #[must_use]
    pub fn instance_id(&self) -> Option<InstanceId> {
        self.instance_id
    }

    /// Handle of the stateful instance being rendered
    #[inline]
    #[must_use]
    pub fn instance(&self) -> Option<&InstanceHandle> {
        self.instance
    }

    /// State updater for the instance being rendered
    #[inline]
    #[must_use]
    pub fn updater(&self) -> Option<Updater> {
        self.instance.map(InstanceHandle::updater)
    }
}
