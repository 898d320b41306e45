//! Identity and revision store
//!
//! Per-context bookkeeping shared by the spies (writers) and the query
//! wrappers (readers). Recorded outputs are keyed by the [`NodeId`] of the
//! original component invocation; every record bumps the revision.

use render_spy_vdom::{ComponentDef, ComponentId, InstanceHandle, InstanceId, Node, NodeId, VNode};
use std::collections::HashMap;

/// Which spy flavor a memoized definition belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpyKind {
    /// Records output and keeps descending
    Recursive,

    /// Placeholder past the depth bound
    Noop,
}

/// Original invocation and nesting depth a spied node stands for
#[derive(Debug, Clone)]
pub struct SpyKey {
    /// The node as authored, before wrapping
    pub node: VNode,

    /// Component nesting depth of the invocation
    pub depth: usize,
}

/// Per-context spy state
#[derive(Debug, Default)]
pub struct SpyStore {
    recordings: HashMap<NodeId, Node>,
    root: Option<Node>,
    pairings: HashMap<NodeId, SpyKey>,
    instance_keys: HashMap<InstanceId, SpyKey>,
    live_instances: HashMap<NodeId, InstanceHandle>,
    spies: HashMap<(ComponentId, SpyKind), ComponentDef>,
    revision: u64,
}

impl SpyStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current revision
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Record the most recent output of an original invocation
    pub fn record(&mut self, original: NodeId, output: Node) {
        self.recordings.insert(original, output);
        self.revision += 1;
        tracing::trace!(node = original.as_u64(), revision = self.revision, "recorded render output");
    }

    /// Record the tree handed to `render`
    pub fn record_root(&mut self, vdom: Node) {
        self.root = Some(vdom);
        self.revision += 1;
        tracing::trace!(revision = self.revision, "recorded root");
    }

    /// Most recent output of an original invocation
    #[must_use]
    pub fn recording(&self, original: NodeId) -> Option<Node> {
        self.recordings.get(&original).cloned()
    }

    /// Tree last handed to `render`
    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    /// Number of recorded outputs
    #[inline]
    #[must_use]
    pub fn recording_count(&self) -> usize {
        self.recordings.len()
    }

    /// Remember what a freshly built spied node stands for
    pub fn pair(&mut self, spied: NodeId, key: SpyKey) {
        self.pairings.insert(spied, key);
    }

    /// Spy key of a spied node
    #[must_use]
    pub fn pairing(&self, spied: NodeId) -> Option<SpyKey> {
        self.pairings.get(&spied).cloned()
    }

    /// Remove and return the spy key of a spied node
    ///
    /// Spies call this once the key is bound, so spent invocations do not
    /// keep their original trees alive.
    pub fn take_pairing(&mut self, spied: NodeId) -> Option<SpyKey> {
        self.pairings.remove(&spied)
    }

    /// Number of spied nodes not yet rendered
    #[inline]
    #[must_use]
    pub fn pairing_count(&self) -> usize {
        self.pairings.len()
    }

    /// Bind a stateful instance to its current spy key
    pub fn bind_instance(&mut self, instance: InstanceId, key: SpyKey) {
        self.instance_keys.insert(instance, key);
    }

    /// Current spy key of a stateful instance
    #[must_use]
    pub fn instance_key(&self, instance: InstanceId) -> Option<SpyKey> {
        self.instance_keys.get(&instance).cloned()
    }

    /// Register the instance rendering an original invocation
    pub fn register_instance(&mut self, original: NodeId, instance: InstanceHandle) {
        self.live_instances.insert(original, instance);
    }

    /// Instance last registered for an original invocation
    #[must_use]
    pub fn live_instance(&self, original: NodeId) -> Option<InstanceHandle> {
        self.live_instances.get(&original).cloned()
    }

    /// Memoized spy for a definition
    #[must_use]
    pub fn spy(&self, original: ComponentId, kind: SpyKind) -> Option<ComponentDef> {
        self.spies.get(&(original, kind)).cloned()
    }

    /// Memoize a spy
    pub fn insert_spy(&mut self, original: ComponentId, kind: SpyKind, spy: ComponentDef) {
        self.spies.insert((original, kind), spy);
    }

    /// Number of memoized spies of one kind
    #[must_use]
    pub fn spy_count(&self, kind: SpyKind) -> usize {
        self.spies.keys().filter(|(_, k)| *k == kind).count()
    }
}
