//! Fixture components
//!
//! Definitions compare by identity, so tests that select by definition must
//! use the same [`Fixtures`] value they rendered with.

use render_spy_vdom::{h, Component, ComponentDef, Node, PropValue, Props, RenderCx, State, VNode};

/// `<li class="item">{value}</li>`
#[must_use]
pub fn item() -> ComponentDef {
    ComponentDef::function("Item", |cx| {
        h("li")
            .prop("class", "item")
            .child(cx.prop("value").map(ToString::to_string))
            .into()
    })
}

/// `<ul>` with one keyed `item` per entry of the `items` prop
#[must_use]
pub fn list(item: &ComponentDef) -> ComponentDef {
    let item = item.clone();
    ComponentDef::function("List", move |cx| {
        let items = cx
            .prop("items")
            .and_then(PropValue::as_list)
            .unwrap_or_default()
            .iter()
            .map(|value| {
                VNode::component(&item)
                    .prop("value", value.clone())
                    .with_key(value.to_string())
            });
        h("ul").append_children(items).into()
    })
}

/// `<p>Hello, {name}!</p>`
#[must_use]
pub fn greeting() -> ComponentDef {
    ComponentDef::function("Greeting", |cx| {
        let name = cx
            .prop("name")
            .filter(|v| !v.is_null())
            .map_or_else(|| "stranger".to_string(), ToString::to_string);
        h("p").child(format!("Hello, {name}!")).into()
    })
}

/// `<section class="card">` around whatever children it is given
#[must_use]
pub fn card() -> ComponentDef {
    ComponentDef::function("Card", |cx| {
        h("section")
            .prop("class", "card")
            .append_children(cx.children().iter().cloned())
            .into()
    })
}

fn count_of(state: &State) -> i64 {
    state.get("count").and_then(PropValue::as_int).unwrap_or(0)
}

struct Counter;

impl Component for Counter {
    fn initial_state(&self, props: &Props) -> State {
        let start = props.get("start").and_then(PropValue::as_int).unwrap_or(0);
        State::new().with("count", start)
    }

    fn render(&self, cx: &RenderCx<'_>) -> Node {
        let updater = cx.updater();
        h("div")
            .prop("class", "counter")
            .child(h("span").child(count_of(cx.state())))
            .child(
                h("button")
                    .on("click", move |_| {
                        if let Some(updater) = &updater {
                            updater.update(|s| Props::new().with("count", count_of(s) + 1));
                        }
                    })
                    .child("+"),
            )
            .into()
    }
}

/// Stateful counter: `<div class="counter"><span>{count}</span><button>+</button></div>`
///
/// Starts at the `start` prop; each click adds one.
#[must_use]
pub fn counter() -> ComponentDef {
    ComponentDef::stateful("Counter", |_| Counter)
}

struct Toggle {
    label: String,
}

impl Toggle {
    fn label_of(cx: &RenderCx<'_>) -> String {
        cx.prop("label").map_or_else(|| "toggle".to_string(), ToString::to_string)
    }
}

impl Component for Toggle {
    fn initial_state(&self, _props: &Props) -> State {
        State::new().with("on", false)
    }

    fn will_receive_props(&mut self, cx: &RenderCx<'_>) {
        self.label = Self::label_of(cx);
    }

    fn render(&self, cx: &RenderCx<'_>) -> Node {
        let on = cx.state().get("on").and_then(PropValue::as_bool).unwrap_or(false);
        let updater = cx.updater();
        h("button")
            .prop("aria-pressed", on)
            .on("click", move |_| {
                if let Some(updater) = &updater {
                    updater.set_state(Props::new().with("on", !on));
                }
            })
            .child(format!("{}: {}", self.label, if on { "on" } else { "off" }))
            .into()
    }
}

/// Stateful toggle button keeping its `label` prop in the instance
#[must_use]
pub fn toggle() -> ComponentDef {
    ComponentDef::stateful("Toggle", |cx| Toggle {
        label: Toggle::label_of(cx),
    })
}

/// One set of fixture definitions
#[derive(Debug, Clone)]
pub struct Fixtures {
    /// `Item`
    pub item: ComponentDef,
    /// `List`, rendering `item`
    pub list: ComponentDef,
    /// `Greeting`
    pub greeting: ComponentDef,
    /// `Card`
    pub card: ComponentDef,
    /// `Counter`
    pub counter: ComponentDef,
    /// `Toggle`
    pub toggle: ComponentDef,
    /// `App`: a greeting and two counters
    pub app: ComponentDef,
}

impl Fixtures {
    /// Fresh definitions
    #[must_use]
    pub fn new() -> Self {
        let item = item();
        let list = list(&item);
        let greeting = greeting();
        let counter = counter();
        let app = {
            let (greeting, counter) = (greeting.clone(), counter.clone());
            ComponentDef::function("App", move |cx| {
                h("div")
                    .prop("id", "app")
                    .child(VNode::component(&greeting).prop("name", cx.prop("name").cloned()))
                    .child(VNode::component(&counter).with_key("first"))
                    .child(VNode::component(&counter).with_key("second").prop("start", 10))
                    .into()
            })
        };
        Self {
            item,
            list,
            greeting,
            card: card(),
            counter,
            toggle: toggle(),
            app,
        }
    }

    /// `<List items={values}>`
    #[must_use]
    pub fn list_of(&self, values: &[i64]) -> VNode {
        VNode::component(&self.list).prop("items", values.to_vec())
    }
}

impl Default for Fixtures {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use render_spy_vdom::{flush, to_jsx_string, Root, SerializeOptions};

    #[test]
    fn list_renders_items() {
        let fx = Fixtures::new();
        let root = Root::new();
        root.render(fx.list_of(&[1, 2]));
        assert_eq!(
            to_jsx_string(&root.snapshot(), &SerializeOptions::default().with_pretty(false)),
            r#"<ul><li class="item">1</li><li class="item">2</li></ul>"#
        );
    }

    #[test]
    fn counter_click_increments() {
        let root = Root::new();
        root.render(VNode::component(&counter()));
        let button = find_tag(&root.snapshot(), "button").expect("button");
        button
            .attr("onClick")
            .and_then(PropValue::as_handler)
            .expect("handler")
            .call(&[]);
        flush();

        let span = find_tag(&root.snapshot(), "span").expect("span");
        assert_eq!(span.children(), &[Node::Number(1.0)]);
    }

    fn find_tag(node: &Node, tag: &str) -> Option<VNode> {
        let vnode = node.as_vnode()?;
        if vnode.tag() == Some(tag) {
            return Some(vnode.clone());
        }
        vnode.children().iter().find_map(|c| find_tag(c, tag))
    }
}
