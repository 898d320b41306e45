//! JSX-style serialization
//!
//! Turns a [`Node`] tree into readable markup. Component invocations are
//! either printed as tags (`shallow`) or rendered on the spot: function
//! components are called directly, stateful components are constructed
//! detached and rendered once with their initial state.

use crate::component::{ComponentDef, ComponentKind, RenderCx};
use crate::node::{normalize_children, Node, VNode};
use crate::props::{PropValue, State};
use serde::{Deserialize, Serialize};

/// Serialization options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Print component invocations as tags instead of rendering them
    pub shallow: bool,

    /// Omit attributes whose value is `false`
    pub skip_false_attributes: bool,

    /// One element per line, indented
    pub pretty: bool,

    /// Spaces per indentation level
    pub indent: usize,
}

impl SerializeOptions {
    /// Shallow, pretty, keeping false attributes
    #[inline]
    #[must_use]
    pub fn snapshot() -> Self {
        Self {
            shallow: true,
            skip_false_attributes: false,
            ..Self::default()
        }
    }

    /// Toggle shallow mode
    #[inline]
    #[must_use]
    pub fn with_shallow(mut self, shallow: bool) -> Self {
        self.shallow = shallow;
        self
    }

    /// Toggle pretty output
    #[inline]
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            shallow: false,
            skip_false_attributes: true,
            pretty: true,
            indent: 2,
        }
    }
}

/// Serialize a node
#[must_use]
pub fn to_jsx_string(node: &Node, options: &SerializeOptions) -> String {
    Writer { options }.node(node, 0)
}

struct Writer<'a> {
    options: &'a SerializeOptions,
}

impl Writer<'_> {
    fn pad(&self, level: usize) -> String {
        if self.options.pretty {
            " ".repeat(level * self.options.indent)
        } else {
            String::new()
        }
    }

    fn separator(&self) -> &'static str {
        if self.options.pretty {
            "\n"
        } else {
            ""
        }
    }

    fn node(&self, node: &Node, level: usize) -> String {
        match node {
            Node::Empty | Node::Bool(_) => String::new(),
            Node::Text(s) => format!("{}{}", self.pad(level), escape_text(s)),
            Node::Number(n) => format!("{}{n}", self.pad(level)),
            Node::List(items) => self.join(items, level),
            Node::Element(vnode) => self.element(vnode, level),
        }
    }

    fn join(&self, items: &[Node], level: usize) -> String {
        items
            .iter()
            .map(|n| self.node(n, level))
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(self.separator())
    }

    fn element(&self, vnode: &VNode, level: usize) -> String {
        if let Some(def) = vnode.component_def() {
            if !self.options.shallow {
                return self.node(&render_detached(def, vnode), level);
            }
        }

        let pad = self.pad(level);
        let name = vnode.name();
        let open = format!("<{name}{}", self.attributes(vnode));
        let children = normalize_children(vnode.children());

        if children.iter().all(|c| matches!(c, Node::Text(_) | Node::Number(_))) && !children.is_empty() {
            let text: String = children
                .iter()
                .filter_map(Node::primitive_text)
                .map(|t| escape_text(&t))
                .collect();
            return format!("{pad}{open}>{text}</{name}>");
        }

        let body = self.join(&children, level + 1);
        if body.is_empty() {
            return format!("{pad}{open} />");
        }
        let sep = self.separator();
        format!("{pad}{open}>{sep}{body}{sep}{pad}</{name}>")
    }

    fn attributes(&self, vnode: &VNode) -> String {
        let mut out = String::new();
        for (name, value) in vnode.props().iter() {
            if name == "children" {
                continue;
            }
            match value {
                PropValue::Null => {}
                PropValue::Bool(false) if self.options.skip_false_attributes => {}
                PropValue::Str(s) => {
                    out.push_str(&format!(" {name}=\"{}\"", escape_attr(s)));
                }
                other => out.push_str(&format!(" {name}={{{}}}", self.literal(other))),
            }
        }
        out
    }

    fn literal(&self, value: &PropValue) -> String {
        match value {
            PropValue::Str(s) => format!("\"{}\"", escape_attr(s)),
            PropValue::List(items) => {
                let items: Vec<_> = items.iter().map(|v| self.literal(v)).collect();
                format!("[{}]", items.join(", "))
            }
            PropValue::Node(node) => {
                let inline = SerializeOptions {
                    pretty: false,
                    ..self.options.clone()
                };
                to_jsx_string(node, &inline)
            }
            PropValue::Component(def) => def.name().to_string(),
            other => other.to_string(),
        }
    }
}

/// Render a component invocation outside any tree
#[must_use]
pub fn render_detached(def: &ComponentDef, vnode: &VNode) -> Node {
    let empty = State::new();
    match def.kind() {
        ComponentKind::Function(render) => render(&RenderCx::detached(vnode, &empty)),
        ComponentKind::Stateful(construct) => {
            let component = construct(&RenderCx::detached(vnode, &empty));
            let state = component.initial_state(vnode.props());
            component.render(&RenderCx::detached(vnode, &state))
        }
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::node::h;
    use pretty_assertions::assert_eq;

    fn greeting() -> ComponentDef {
        ComponentDef::function("Greeting", |cx| {
            let name = cx.prop("name").map(ToString::to_string).unwrap_or_default();
            h("p").child("Hello, ").child(name).child("!").into()
        })
    }

    #[test]
    fn inline_text_children() {
        let node: Node = h("span").prop("class", "n").child(1).into();
        assert_eq!(to_jsx_string(&node, &SerializeOptions::default()), r#"<span class="n">1</span>"#);
    }

    #[test]
    fn nested_elements_are_indented() {
        let node: Node = h("ul")
            .child(h("li").child("a"))
            .child(h("li").child("b"))
            .into();
        assert_eq!(
            to_jsx_string(&node, &SerializeOptions::default()),
            "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>"
        );
    }

    #[test]
    fn shallow_prints_component_tags() {
        let node: Node = h("div")
            .child(VNode::component(&greeting()).prop("name", "Ada"))
            .into();
        let options = SerializeOptions::snapshot();
        assert_eq!(
            to_jsx_string(&node, &options),
            "<div>\n  <Greeting name=\"Ada\" />\n</div>"
        );
    }

    #[test]
    fn deep_renders_components() {
        let node: Node = VNode::component(&greeting()).prop("name", "Ada").into();
        assert_eq!(
            to_jsx_string(&node, &SerializeOptions::default()),
            "<p>Hello, Ada!</p>"
        );
    }

    #[test]
    fn stateful_components_render_initial_state() {
        struct Clock;
        impl Component for Clock {
            fn initial_state(&self, _props: &crate::props::Props) -> State {
                State::new().with("time", "noon")
            }
            fn render(&self, cx: &RenderCx<'_>) -> Node {
                h("time").child(cx.state().get("time").map(ToString::to_string)).into()
            }
        }
        let node: Node = VNode::component(&ComponentDef::stateful("Clock", |_| Clock)).into();
        assert_eq!(to_jsx_string(&node, &SerializeOptions::default()), "<time>noon</time>");
    }

    #[test]
    fn attribute_forms() {
        let node: Node = h("input")
            .prop("type", "checkbox")
            .prop("checked", true)
            .prop("disabled", false)
            .prop("tabIndex", 2)
            .prop("title", "say \"hi\"")
            .on("change", |_| {})
            .into();
        assert_eq!(
            to_jsx_string(&node, &SerializeOptions::default()),
            r#"<input type="checkbox" checked={true} tabIndex={2} title="say &quot;hi&quot;" onChange={[Function]} />"#
        );
        assert!(to_jsx_string(&node, &SerializeOptions::snapshot()).contains("disabled={false}"));
    }

    #[test]
    fn compact_output_has_no_whitespace() {
        let node: Node = h("ul").child(h("li").child("<a>")).into();
        let options = SerializeOptions::default().with_pretty(false);
        assert_eq!(to_jsx_string(&node, &options), "<ul><li>&lt;a&gt;</li></ul>");
    }
}
