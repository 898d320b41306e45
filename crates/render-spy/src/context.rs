//! Render contexts
//!
//! A [`RenderContext`] owns an isolated spy store and a hidden mount point.
//! The mount point holds a single tree holder component; each `render`
//! hands the spied tree to the holder as new state and flushes, so repeated
//! renders reconcile against the previous tree instead of remounting it.

use crate::config::RenderConfig;
use crate::error::{SpyError, SpyResult};
use crate::spy::{self, spy_walk};
use crate::store::SpyStore;
use crate::wrapper::FindWrapper;
use render_spy_vdom::{
    flush, Component, ComponentDef, Node, PropValue, Props, RenderCx, Root, Updater, VNode,
};
use std::cell::RefCell;
use std::ops::Deref;
use std::rc::Rc;

const TREE_STATE_KEY: &str = "vdom";

/// State shared between a context, its spies and its query results
pub(crate) struct ContextShared {
    pub(crate) store: RefCell<SpyStore>,
    pub(crate) config: RenderConfig,
    pub(crate) placeholder: ComponentDef,
}

impl ContextShared {
    pub(crate) fn new(config: RenderConfig) -> Rc<Self> {
        Rc::new(Self {
            store: RefCell::new(SpyStore::new()),
            config,
            placeholder: spy::placeholder(),
        })
    }

    pub(crate) fn revision(&self) -> u64 {
        self.store.borrow().revision()
    }
}

type UpdaterSlot = Rc<RefCell<Option<Updater>>>;

/// Re-renders whatever tree it was last handed
struct TreeHolder {
    slot: UpdaterSlot,
}

impl Component for TreeHolder {
    fn render(&self, cx: &RenderCx<'_>) -> Node {
        if self.slot.borrow().is_none() {
            *self.slot.borrow_mut() = cx.updater();
        }
        cx.state()
            .get(TREE_STATE_KEY)
            .and_then(PropValue::as_node)
            .cloned()
            .unwrap_or_default()
    }
}

/// Isolated render scope; dereferences to the root query result
pub struct RenderContext {
    shared: Rc<ContextShared>,
    mount: Root,
    holder: UpdaterSlot,
    root: FindWrapper,
}

impl RenderContext {
    /// Create a context with an empty mounted tree holder
    ///
    /// # Errors
    ///
    /// Returns [`SpyError::RootDetached`] if the holder did not mount.
    pub fn new(config: RenderConfig) -> SpyResult<Self> {
        let shared = ContextShared::new(config);
        let holder: UpdaterSlot = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&holder);
        let holder_def = ComponentDef::stateful("RenderSpyRoot", move |_| TreeHolder {
            slot: Rc::clone(&slot),
        });

        let mount = Root::new();
        mount.render(VNode::component(&holder_def));
        if holder.borrow().is_none() {
            return Err(SpyError::RootDetached);
        }
        tracing::debug!(depth = ?shared.config.depth, "created render context");

        let root = FindWrapper::live(Rc::clone(&shared), Vec::new());
        Ok(Self {
            shared,
            mount,
            holder,
            root,
        })
    }

    /// Render `vdom` into this context's root
    ///
    /// The context then wraps exactly `vdom`.
    ///
    /// # Errors
    ///
    /// Returns [`SpyError::RootDetached`] if the tree holder is no longer
    /// mounted.
    pub fn render(&mut self, vdom: impl Into<Node>) -> SpyResult<&Self> {
        let vdom = vdom.into();
        self.shared.store.borrow_mut().record_root(vdom.clone());
        let spied = spy_walk(&self.shared, &vdom, 0);

        let accepted = self
            .holder
            .borrow()
            .as_ref()
            .is_some_and(|updater| updater.set_state(Props::new().with(TREE_STATE_KEY, spied)));
        if !accepted {
            return Err(SpyError::RootDetached);
        }
        let rendered = flush();
        tracing::debug!(rendered, revision = self.shared.revision(), "render pass complete");

        self.root = FindWrapper::live(Rc::clone(&self.shared), vec![vdom]);
        Ok(self)
    }

    /// Synchronously flush pending state changes
    pub fn rerender(&self) {
        flush();
    }

    /// Configuration this context was created with
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.shared.config
    }

    /// Current store revision
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.shared.revision()
    }

    /// Tree last handed to [`RenderContext::render`]
    #[must_use]
    pub fn root_vdom(&self) -> Option<Node> {
        self.shared.store.borrow().root().cloned()
    }

    /// Committed host tree, components expanded
    #[must_use]
    pub fn mounted(&self) -> Node {
        self.mount.snapshot()
    }

    /// Root query result
    #[inline]
    #[must_use]
    pub fn wrapper(&self) -> &FindWrapper {
        &self.root
    }
}

impl Deref for RenderContext {
    type Target = FindWrapper;

    fn deref(&self) -> &FindWrapper {
        &self.root
    }
}

impl std::fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderContext")
            .field("config", &self.shared.config)
            .field("revision", &self.revision())
            .field("nodes", &self.root.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use render_spy_vdom::h;

    #[test]
    fn new_context_is_empty() {
        let context = RenderContext::new(RenderConfig::new()).expect("context");
        assert_eq!(context.len(), 0);
        assert!(!context.exists().expect("exists"));
        assert_eq!(context.mounted(), Node::Empty);
    }

    #[test]
    fn render_mounts_spied_tree() {
        let greeting = ComponentDef::function("Greeting", |cx| {
            h("p").child(cx.prop("name").map(ToString::to_string)).into()
        });
        let mut context = RenderContext::new(RenderConfig::new()).expect("context");
        context
            .render(h("main").child(VNode::component(&greeting).prop("name", "Ada")))
            .expect("render");

        let expected: Node = h("main").child(h("p").child("Ada")).into();
        assert_eq!(context.mounted(), expected);
        assert_eq!(context.len(), 1);
        assert!(context.root_vdom().is_some());
    }

    #[test]
    fn contexts_are_isolated() {
        let item = ComponentDef::function("Item", |_| h("li").into());
        let mut a = RenderContext::new(RenderConfig::new()).expect("context");
        let b = RenderContext::new(RenderConfig::new()).expect("context");
        a.render(VNode::component(&item)).expect("render");

        assert!(a.revision() > 0);
        assert_eq!(b.revision(), 0);
    }
}
