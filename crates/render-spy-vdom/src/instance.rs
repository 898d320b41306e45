//! Stateful component instances and the update queue
//!
//! State changes are staged on the instance and the instance is queued; the
//! queue is drained by [`flush`], which re-renders dirty instances parents
//! first. Nothing renders until `flush` runs.

use crate::component::{Component, ComponentDef};
use crate::node::{Key, VNode};
use crate::props::{PropValue, State, StatePatch};
use crate::reconcile::{self, Mounted};
use std::cell::{Cell, RefCell};
use std::fmt::{self, Debug, Formatter};
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_INSTANCE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static DIRTY: RefCell<Vec<Weak<InstanceCell>>> = const { RefCell::new(Vec::new()) };
}

/// Identity of a mounted stateful instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    pub(crate) fn next() -> Self {
        Self(NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

pub(crate) struct InstanceCell {
    pub(crate) id: InstanceId,
    pub(crate) def: ComponentDef,
    pub(crate) depth: usize,
    pub(crate) component: RefCell<Box<dyn Component>>,
    pub(crate) vnode: RefCell<VNode>,
    pub(crate) state: RefCell<State>,
    pub(crate) pending: RefCell<Vec<StatePatch>>,
    pub(crate) rendered: RefCell<Mounted>,
    pub(crate) mounted: Cell<bool>,
    pub(crate) queued: Cell<bool>,
    pub(crate) renders: Cell<u64>,
}

impl InstanceCell {
    fn enqueue(self: &Rc<Self>, patch: StatePatch) -> bool {
        if !self.mounted.get() {
            tracing::debug!(component = %self.def.name(), "ignoring state change on unmounted instance");
            return false;
        }
        self.pending.borrow_mut().push(patch);
        if !self.queued.replace(true) {
            DIRTY.with(|q| q.borrow_mut().push(Rc::downgrade(self)));
        }
        true
    }

    pub(crate) fn apply_pending(&self) {
        let patches: Vec<StatePatch> = self.pending.borrow_mut().drain(..).collect();
        if patches.is_empty() {
            return;
        }
        let mut state = self.state.borrow_mut();
        for patch in &patches {
            patch.apply(&mut state);
        }
    }
}

/// Handle to a mounted stateful instance
#[derive(Clone)]
pub struct InstanceHandle(pub(crate) Rc<InstanceCell>);

impl InstanceHandle {
    /// Instance identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.0.id
    }

    /// Definition this instance was constructed from
    #[inline]
    #[must_use]
    pub fn def(&self) -> &ComponentDef {
        &self.0.def
    }

    /// Display name of the definition
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        self.0.def.name()
    }

    /// Key of the node this instance currently renders
    #[must_use]
    pub fn key(&self) -> Option<Key> {
        self.0.vnode.borrow().key().cloned()
    }

    /// Node this instance currently renders
    #[must_use]
    pub fn vnode(&self) -> VNode {
        self.0.vnode.borrow().clone()
    }

    /// Committed state (staged changes excluded)
    #[must_use]
    pub fn state(&self) -> State {
        self.0.state.borrow().clone()
    }

    /// Single committed state entry
    #[must_use]
    pub fn state_value(&self, key: &str) -> Option<PropValue> {
        self.0.state.borrow().get(key).cloned()
    }

    /// Stage a state change; it applies on the next [`flush`]
    ///
    /// Returns `false` when the instance is no longer mounted.
    pub fn set_state(&self, patch: impl Into<StatePatch>) -> bool {
        self.0.enqueue(patch.into())
    }

    /// Whether the instance is still in a tree
    #[inline]
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.0.mounted.get()
    }

    /// Number of completed renders
    #[inline]
    #[must_use]
    pub fn render_count(&self) -> u64 {
        self.0.renders.get()
    }

    /// Weak updater suitable for capture in event handlers
    #[inline]
    #[must_use]
    pub fn updater(&self) -> Updater {
        Updater(Rc::downgrade(&self.0))
    }

    /// Check handle identity
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for InstanceHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHandle")
            .field("id", &self.0.id)
            .field("component", &self.0.def.name())
            .field("mounted", &self.0.mounted.get())
            .finish()
    }
}

/// State updater that does not keep its instance alive
#[derive(Clone)]
pub struct Updater(Weak<InstanceCell>);

impl Updater {
    /// Stage a state change; `false` if the instance is gone or unmounted
    pub fn set_state(&self, patch: impl Into<StatePatch>) -> bool {
        self.0
            .upgrade()
            .is_some_and(|cell| cell.enqueue(patch.into()))
    }

    /// Stage a functional state change
    pub fn update(&self, f: impl Fn(&State) -> crate::props::Props + 'static) -> bool {
        self.set_state(StatePatch::update(f))
    }
}

impl Debug for Updater {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("Updater")
    }
}

/// Number of instances waiting for a flush on this thread
#[must_use]
pub fn pending_updates() -> usize {
    DIRTY.with(|q| q.borrow().len())
}

/// Apply staged state changes and re-render dirty instances
///
/// Parents render before children; a child updated by its parent's
/// re-render is not rendered a second time. Returns the number of
/// instances re-rendered.
pub fn flush() -> usize {
    let mut rendered = 0;
    loop {
        let mut batch: Vec<Rc<InstanceCell>> = DIRTY.with(|q| {
            q.borrow_mut()
                .drain(..)
                .filter_map(|weak| weak.upgrade())
                .collect()
        });
        if batch.is_empty() {
            break;
        }
        batch.sort_by_key(|cell| cell.depth);
        // drained cells must be requeueable even if a render below unwinds
        for cell in &batch {
            cell.queued.set(false);
        }

        for cell in batch {
            if cell.mounted.get() && !cell.pending.borrow().is_empty() {
                reconcile::rerender(&InstanceHandle(cell));
                rendered += 1;
            }
        }
    }
    tracing::trace!(rendered, "flushed pending updates");
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::RenderCx;
    use crate::node::{h, Node};
    use crate::props::Props;
    use crate::reconcile::Root;
    use std::panic::{self, AssertUnwindSafe};

    struct Fragile {
        seen: Rc<RefCell<Vec<InstanceHandle>>>,
    }

    impl Component for Fragile {
        fn render(&self, cx: &RenderCx<'_>) -> Node {
            if let Some(instance) = cx.instance() {
                if !self.seen.borrow().iter().any(|seen| seen.ptr_eq(instance)) {
                    self.seen.borrow_mut().push(instance.clone());
                }
            }
            if cx.state().get("boom").and_then(PropValue::as_bool).unwrap_or(false) {
                panic!("fragile render");
            }
            let count = cx.state().get("count").and_then(PropValue::as_int).unwrap_or(0);
            h("span").child(count).into()
        }
    }

    #[test]
    fn updates_apply_only_on_flush() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let def = {
            let seen = Rc::clone(&seen);
            ComponentDef::stateful("Fragile", move |_| Fragile { seen: Rc::clone(&seen) })
        };
        let root = Root::new();
        root.render(VNode::component(&def));
        let instance = seen.borrow()[0].clone();

        assert!(instance.set_state(Props::new().with("count", 3)));
        assert_eq!(pending_updates(), 1);
        assert_eq!(instance.state_value("count"), None);

        assert_eq!(flush(), 1);
        assert_eq!(pending_updates(), 0);
        assert_eq!(instance.state_value("count"), Some(PropValue::Int(3)));
        assert_eq!(instance.render_count(), 2);
    }

    #[test]
    fn panicking_render_leaves_batch_requeueable() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let def = {
            let seen = Rc::clone(&seen);
            ComponentDef::stateful("Fragile", move |_| Fragile { seen: Rc::clone(&seen) })
        };
        let root = Root::new();
        root.render(
            h("div")
                .child(VNode::component(&def).with_key("a"))
                .child(VNode::component(&def).with_key("b")),
        );
        let (a, b) = {
            let seen = seen.borrow();
            (seen[0].clone(), seen[1].clone())
        };

        a.set_state(Props::new().with("boom", true));
        b.set_state(Props::new().with("count", 1));
        assert!(panic::catch_unwind(AssertUnwindSafe(flush)).is_err());

        b.set_state(Props::new().with("count", 2));
        assert_eq!(pending_updates(), 1);
        assert_eq!(flush(), 1);
        assert_eq!(b.state_value("count"), Some(PropValue::Int(2)));
    }
}
