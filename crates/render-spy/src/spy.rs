//! Spy factory
//!
//! [`spy_walk`] rewrites a tree so that every component invocation goes
//! through a spy. A recursive spy renders the original, records the output
//! against the original invocation and returns the output rewritten one
//! level deeper. Past the depth bound the invocation is replaced by a noop
//! spy that renders a placeholder and never calls the original.
//!
//! Spies hold only a weak reference to their context; once the context is
//! gone they fall back to plain delegation.

use crate::context::ContextShared;
use crate::store::{SpyKey, SpyKind};
use render_spy_vdom::{
    normalize_children, Component, ComponentDef, ComponentKind, ConstructFn, Node, Props,
    RenderCx, RenderFn, State, VNode,
};
use std::rc::{Rc, Weak};

/// Display name of the placeholder rendered past the depth bound
pub const NOOP_SPY_NAME: &str = "NoopSpy";

/// Placeholder definition; renders nothing
#[must_use]
pub fn placeholder() -> ComponentDef {
    ComponentDef::function(NOOP_SPY_NAME, |_| Node::Empty)
}

/// Rewrite `node` so its component invocations are spied at `depth`
pub(crate) fn spy_walk(shared: &Rc<ContextShared>, node: &Node, depth: usize) -> Node {
    match node {
        Node::Element(vnode) => match vnode.component_def() {
            Some(def) if !def.is_spy() => Node::Element(wrap(shared, vnode, def, depth)),
            Some(_) => node.clone(),
            None if vnode.children().is_empty() => node.clone(),
            None => {
                let children = normalize_children(vnode.children())
                    .iter()
                    .map(|child| spy_walk(shared, child, depth))
                    .collect();
                Node::Element(vnode.with_children(children))
            }
        },
        Node::List(items) => Node::List(items.iter().map(|item| spy_walk(shared, item, depth)).collect()),
        other => other.clone(),
    }
}

fn wrap(shared: &Rc<ContextShared>, original: &VNode, def: &ComponentDef, depth: usize) -> VNode {
    let spy = spy_for(shared, def, depth);
    let spied = VNode::component(&spy)
        .with_props(original.props())
        .append_children(original.children().iter().cloned());
    let spied = match original.key() {
        Some(key) => spied.with_key(key.clone()),
        None => spied,
    };
    // noop spies never look their invocation up
    if !shared.config.is_beyond_depth(depth) {
        shared.store.borrow_mut().pair(
            spied.id(),
            SpyKey {
                node: original.clone(),
                depth,
            },
        );
    }
    spied
}

fn spy_for(shared: &Rc<ContextShared>, def: &ComponentDef, depth: usize) -> ComponentDef {
    let kind = if shared.config.is_beyond_depth(depth) {
        SpyKind::Noop
    } else {
        SpyKind::Recursive
    };
    if let Some(spy) = shared.store.borrow().spy(def.id(), kind) {
        return spy;
    }

    let spy = match kind {
        SpyKind::Noop => noop_spy(def, &shared.placeholder),
        SpyKind::Recursive => match def.kind() {
            ComponentKind::Function(render) => function_spy(Rc::downgrade(shared), def, Rc::clone(render)),
            ComponentKind::Stateful(construct) => {
                stateful_spy(Rc::downgrade(shared), def, Rc::clone(construct))
            }
        },
    };
    tracing::debug!(component = %def.name(), ?kind, depth, "created spy");
    shared.store.borrow_mut().insert_spy(def.id(), kind, spy.clone());
    spy
}

fn noop_spy(origin: &ComponentDef, placeholder: &ComponentDef) -> ComponentDef {
    let (component, placeholder) = (origin.clone(), placeholder.clone());
    let render: Rc<RenderFn> = Rc::new(move |cx: &RenderCx<'_>| {
        tracing::trace!(component = %component.name(), "rendering placeholder");
        VNode::component(&placeholder)
            .prop("component", component.clone())
            .with_props(cx.props())
            .append_children(cx.children().iter().cloned())
            .into()
    });
    ComponentDef::spy_of(origin, ComponentKind::Function(render))
}

fn function_spy(context: Weak<ContextShared>, origin: &ComponentDef, render: Rc<RenderFn>) -> ComponentDef {
    let spy: Rc<RenderFn> = Rc::new(move |cx: &RenderCx<'_>| {
        let Some(shared) = context.upgrade() else {
            return render(cx);
        };
        let key = shared.store.borrow_mut().take_pairing(cx.vnode().id());
        let Some(key) = key else {
            return render(cx);
        };
        let output = render(&cx.with_vnode(&key.node));
        record_and_walk(&shared, &key, output)
    });
    ComponentDef::spy_of(origin, ComponentKind::Function(spy))
}

fn stateful_spy(
    context: Weak<ContextShared>,
    origin: &ComponentDef,
    construct: Rc<ConstructFn>,
) -> ComponentDef {
    let spy: Rc<ConstructFn> = Rc::new(move |cx: &RenderCx<'_>| {
        let inner = match context.upgrade() {
            Some(shared) => {
                let key = shared.store.borrow_mut().take_pairing(cx.vnode().id());
                match key {
                    Some(key) => {
                        let inner = construct(&cx.with_vnode(&key.node));
                        if let Some(id) = cx.instance_id() {
                            shared.store.borrow_mut().bind_instance(id, key);
                        }
                        inner
                    }
                    None => construct(cx),
                }
            }
            None => construct(cx),
        };
        Box::new(SpiedComponent {
            context: Weak::clone(&context),
            inner,
        }) as Box<dyn Component>
    });
    ComponentDef::spy_of(origin, ComponentKind::Stateful(spy))
}

fn record_and_walk(shared: &Rc<ContextShared>, key: &SpyKey, output: Node) -> Node {
    shared.store.borrow_mut().record(key.node.id(), output.clone());
    spy_walk(shared, &output, key.depth + 1)
}

/// Stateful instance standing in for the original
///
/// Keeps the instance's spy key current across prop updates and records
/// every render.
struct SpiedComponent {
    context: Weak<ContextShared>,
    inner: Box<dyn Component>,
}

impl Component for SpiedComponent {
    fn initial_state(&self, props: &Props) -> State {
        self.inner.initial_state(props)
    }

    fn will_receive_props(&mut self, cx: &RenderCx<'_>) {
        let key = self.context.upgrade().and_then(|shared| {
            let key = shared.store.borrow_mut().take_pairing(cx.vnode().id())?;
            if let Some(id) = cx.instance_id() {
                shared.store.borrow_mut().bind_instance(id, key.clone());
            }
            Some(key)
        });
        match key {
            Some(key) => self.inner.will_receive_props(&cx.with_vnode(&key.node)),
            None => self.inner.will_receive_props(cx),
        }
    }

    fn render(&self, cx: &RenderCx<'_>) -> Node {
        let Some(shared) = self.context.upgrade() else {
            return self.inner.render(cx);
        };
        let key = cx
            .instance_id()
            .and_then(|id| shared.store.borrow().instance_key(id));
        let Some(key) = key else {
            return self.inner.render(cx);
        };
        if let Some(instance) = cx.instance() {
            shared
                .store
                .borrow_mut()
                .register_instance(key.node.id(), instance.clone());
        }
        let output = self.inner.render(&cx.with_vnode(&key.node));
        record_and_walk(&shared, &key, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderConfig;
    use render_spy_vdom::{h, PropValue, Root};

    fn item() -> ComponentDef {
        ComponentDef::function("Item", |cx| {
            h("li").child(cx.prop("value").map(ToString::to_string)).into()
        })
    }

    #[test]
    fn components_are_wrapped_and_paired() {
        let shared = ContextShared::new(RenderConfig::new());
        let def = item();
        let original = VNode::component(&def).prop("value", 1).with_key("a");
        let tree: Node = h("ul").child(original.clone()).into();

        let walked = spy_walk(&shared, &tree, 0);
        let ul = walked.as_vnode().expect("element");
        let spied = ul.children()[0].as_vnode().expect("spied child");

        assert!(spied.component_def().is_some_and(ComponentDef::is_spy));
        assert_eq!(spied.name(), "Item");
        assert_eq!(spied.key(), original.key());
        assert_eq!(spied.props(), original.props());

        let key = shared.store.borrow().pairing(spied.id()).expect("paired");
        assert!(key.node.ptr_eq(&original));
        assert_eq!(key.depth, 0);
    }

    #[test]
    fn spies_are_memoized() {
        let shared = ContextShared::new(RenderConfig::new());
        let def = item();
        let a = spy_walk(&shared, &VNode::component(&def).into(), 0);
        let b = spy_walk(&shared, &VNode::component(&def).into(), 3);

        let spy = |n: &Node| n.as_vnode().and_then(VNode::component_def).cloned();
        assert_eq!(spy(&a), spy(&b));
        assert_eq!(shared.store.borrow().spy_count(SpyKind::Recursive), 1);
    }

    #[test]
    fn spied_nodes_are_not_rewrapped() {
        let shared = ContextShared::new(RenderConfig::new());
        let once = spy_walk(&shared, &VNode::component(&item()).into(), 0);
        let twice = spy_walk(&shared, &once, 0);
        assert_eq!(once.as_vnode().map(VNode::id), twice.as_vnode().map(VNode::id));
    }

    #[test]
    fn beyond_depth_uses_noop_spy() {
        let shared = ContextShared::new(RenderConfig::shallow());
        let def = item();
        let walked = spy_walk(&shared, &VNode::component(&def).prop("value", 7).into(), 1);
        let vnode = walked.as_vnode().expect("element");
        let spy = vnode.component_def().expect("component");

        let ComponentKind::Function(render) = spy.kind() else {
            panic!("noop spies are function components");
        };
        let state = State::new();
        let out = render(&RenderCx::detached(vnode, &state));
        let out = out.as_vnode().expect("placeholder");
        assert_eq!(out.name(), NOOP_SPY_NAME);
        assert_eq!(out.attr("component"), Some(&PropValue::from(def.clone())));
        assert_eq!(out.attr("value"), Some(&PropValue::Int(7)));
        assert_eq!(shared.store.borrow().recording_count(), 0);
    }

    #[test]
    fn noop_spies_are_memoized() {
        let shared = ContextShared::new(RenderConfig::shallow());
        let def = item();
        let tree: Node = h("ul")
            .child(VNode::component(&def).prop("value", 1))
            .child(VNode::component(&def).prop("value", 2))
            .into();

        let walked = spy_walk(&shared, &tree, 1);
        let spied: Vec<VNode> = walked
            .as_vnode()
            .expect("element")
            .children()
            .iter()
            .filter_map(Node::as_vnode)
            .cloned()
            .collect();
        assert_eq!(spied.len(), 2);
        assert_eq!(spied[0].component_def(), spied[1].component_def());

        let state = State::new();
        let placeholders: Vec<Option<ComponentDef>> = spied
            .iter()
            .map(|vnode| {
                let Some(ComponentKind::Function(render)) = vnode.component_def().map(ComponentDef::kind) else {
                    panic!("noop spies are function components");
                };
                let out = render(&RenderCx::detached(vnode, &state));
                out.as_vnode().and_then(VNode::component_def).cloned()
            })
            .collect();
        assert_eq!(placeholders[0], placeholders[1]);
        assert_eq!(placeholders[0].as_ref().map(ComponentDef::name), Some(NOOP_SPY_NAME));

        let store = shared.store.borrow();
        assert_eq!(store.pairing_count(), 0);
        assert_eq!(store.spy_count(SpyKind::Noop), 1);
        assert_eq!(store.spy_count(SpyKind::Recursive), 0);
    }

    #[test]
    fn rendered_invocations_release_pairings() {
        let shared = ContextShared::new(RenderConfig::new());
        let def = item();
        let list = ComponentDef::function("List", move |_| {
            h("ul")
                .append_children((1..=3).map(|v| VNode::component(&def).prop("value", v)))
                .into()
        });

        let walked = spy_walk(&shared, &VNode::component(&list).into(), 0);
        assert_eq!(shared.store.borrow().pairing_count(), 1);

        let root = Root::new();
        root.render(walked);
        assert_eq!(shared.store.borrow().pairing_count(), 0);
        assert_eq!(shared.store.borrow().recording_count(), 4);
    }
}
