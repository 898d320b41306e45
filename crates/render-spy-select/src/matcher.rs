//! Structural predicates compiled from selectors

use crate::error::SelectorError;
use crate::selector::{Compound, Selector};
use render_spy_vdom::{ComponentDef, ComponentId, Node, PropValue, VNode};

/// Structural predicate over a single node
///
/// Only element and component nodes can match; text, numbers and holes
/// never do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Where {
    /// Any of the inner predicates
    Any(Vec<Where>),

    /// All of the inner predicates
    All(Vec<Where>),

    /// Tag or component display name
    Name(String),

    /// Invocation of a specific definition (or a spy standing in for it)
    ComponentIs(ComponentId),

    /// Class token on `class` or `className`
    HasClass(String),

    /// `id` prop equals
    HasId(String),

    /// Prop present and not null
    AttrPresent(String),

    /// Prop display text equals
    AttrEquals {
        /// Property name
        name: String,
        /// Expected display text
        value: String,
    },
}

impl Where {
    /// Evaluate against a node
    #[must_use]
    pub fn matches(&self, node: &Node) -> bool {
        node.as_vnode().is_some_and(|v| self.matches_vnode(v))
    }

    fn matches_vnode(&self, vnode: &VNode) -> bool {
        match self {
            Self::Any(alternatives) => alternatives.iter().any(|w| w.matches_vnode(vnode)),
            Self::All(parts) => parts.iter().all(|w| w.matches_vnode(vnode)),
            Self::Name(name) => vnode.name() == name,
            Self::ComponentIs(id) => vnode.component_def().is_some_and(|def| stands_for(def, *id)),
            Self::HasClass(class) => ["class", "className"].iter().any(|prop| {
                vnode
                    .attr(prop)
                    .and_then(PropValue::as_str)
                    .is_some_and(|tokens| tokens.split_whitespace().any(|t| t == class))
            }),
            Self::HasId(id) => vnode.attr("id").is_some_and(|v| v.to_string() == *id),
            Self::AttrPresent(name) => vnode.attr(name).is_some_and(|v| !v.is_null()),
            Self::AttrEquals { name, value } => vnode
                .attr(name)
                .is_some_and(|v| !v.is_null() && v.to_string() == *value),
        }
    }
}

fn stands_for(def: &ComponentDef, id: ComponentId) -> bool {
    def.id() == id || def.origin().is_some_and(|origin| origin.id() == id)
}

fn compile_compound(compound: &Compound) -> Where {
    let mut parts = Vec::new();
    if let Some(name) = &compound.name {
        parts.push(Where::Name(name.clone()));
    }
    if let Some(id) = &compound.id {
        parts.push(Where::HasId(id.clone()));
    }
    parts.extend(compound.classes.iter().cloned().map(Where::HasClass));
    parts.extend(compound.attributes.iter().map(|attr| match &attr.value {
        Some(value) => Where::AttrEquals {
            name: attr.name.clone(),
            value: value.clone(),
        },
        None => Where::AttrPresent(attr.name.clone()),
    }));

    match parts.len() {
        1 => parts.remove(0),
        _ => Where::All(parts),
    }
}

/// Compile a parsed selector into a predicate
#[must_use]
pub fn compile(selector: &Selector) -> Where {
    match selector {
        Selector::Component(def) => Where::ComponentIs(def.origin().unwrap_or(def).id()),
        Selector::Css(compounds) => {
            let mut alternatives: Vec<Where> = compounds.iter().map(compile_compound).collect();
            match alternatives.len() {
                1 => alternatives.remove(0),
                _ => Where::Any(alternatives),
            }
        }
    }
}

/// Anything usable as a selector argument
pub trait IntoSelector {
    /// Convert, parsing text when needed
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] for malformed selector text.
    fn into_selector(self) -> Result<Selector, SelectorError>;
}

impl IntoSelector for &str {
    fn into_selector(self) -> Result<Selector, SelectorError> {
        Selector::parse(self)
    }
}

impl IntoSelector for String {
    fn into_selector(self) -> Result<Selector, SelectorError> {
        Selector::parse(&self)
    }
}

impl IntoSelector for &String {
    fn into_selector(self) -> Result<Selector, SelectorError> {
        Selector::parse(self)
    }
}

impl IntoSelector for Selector {
    fn into_selector(self) -> Result<Selector, SelectorError> {
        Ok(self)
    }
}

impl IntoSelector for &Selector {
    fn into_selector(self) -> Result<Selector, SelectorError> {
        Ok(self.clone())
    }
}

impl IntoSelector for &ComponentDef {
    fn into_selector(self) -> Result<Selector, SelectorError> {
        Ok(Selector::component(self))
    }
}

/// Parse and compile in one step
///
/// # Errors
///
/// Returns a [`SelectorError`] for malformed selector text.
pub fn to_where(selector: impl IntoSelector) -> Result<Where, SelectorError> {
    Ok(compile(&selector.into_selector()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use render_spy_vdom::{h, ComponentKind};

    fn matches(selector: &str, node: impl Into<Node>) -> bool {
        to_where(selector).expect("valid selector").matches(&node.into())
    }

    #[test]
    fn name_matches_tags_and_components() {
        let item = ComponentDef::function("Item", |_| Node::Empty);
        assert!(matches("li", h("li")));
        assert!(!matches("li", h("ul")));
        assert!(matches("Item", render_spy_vdom::VNode::component(&item)));
    }

    #[test]
    fn class_tokens() {
        let node = h("div").prop("class", "card  primary");
        assert!(matches(".primary", node.clone()));
        assert!(matches(".card.primary", node.clone()));
        assert!(!matches(".prim", node));
        assert!(matches(".x", h("div").prop("className", "x y")));
    }

    #[test]
    fn id_and_attributes() {
        let node = h("input").prop("id", "name").prop("maxLength", 10).prop("placeholder", PropValue::Null);
        assert!(matches("#name", node.clone()));
        assert!(matches("input[maxLength=10]", node.clone()));
        assert!(matches("[maxLength]", node.clone()));
        assert!(!matches("[placeholder]", node.clone()));
        assert!(!matches("[maxLength=11]", node));
    }

    #[test]
    fn alternatives() {
        assert!(matches("ul, li", h("li")));
        assert!(!matches("ul, ol", h("li")));
    }

    #[test]
    fn primitives_never_match() {
        assert!(!matches("span", Node::text("span")));
        assert!(!matches("[x]", Node::Number(1.0)));
        assert!(!matches("a", Node::Empty));
    }

    #[test]
    fn component_selector_matches_identity_and_spies() {
        let a = ComponentDef::function("Same", |_| Node::Empty);
        let b = ComponentDef::function("Same", |_| Node::Empty);
        let spy = ComponentDef::spy_of(&a, a.kind().clone());
        let w = to_where(&a).expect("component selector");

        assert!(w.matches(&render_spy_vdom::VNode::component(&a).into()));
        assert!(w.matches(&render_spy_vdom::VNode::component(&spy).into()));
        assert!(!w.matches(&render_spy_vdom::VNode::component(&b).into()));
        assert!(matches!(spy.kind(), ComponentKind::Function(_)));
    }

    #[test]
    fn compile_flattens_single_parts() {
        let sel = Selector::parse("li").expect("valid selector");
        assert_eq!(compile(&sel), Where::Name("li".into()));
        let sel = Selector::parse("li.a").expect("valid selector");
        assert_eq!(
            compile(&sel),
            Where::All(vec![Where::Name("li".into()), Where::HasClass("a".into())])
        );
    }
}
