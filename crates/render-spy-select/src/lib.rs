//! render-spy selectors
//!
//! CSS-like selector text (`li.item[value=2]`, `Item, span`) or a component
//! definition, compiled into a [`Where`] predicate evaluated one node at a
//! time. Tag names and component display names share the `name` position.
//!
//! # Example
//!
//! ```rust
//! use render_spy_select::to_where;
//! use render_spy_vdom::{h, Node};
//!
//! let w = to_where("li.item[value=2]").unwrap();
//! let node: Node = h("li").prop("class", "item").prop("value", 2).into();
//! assert!(w.matches(&node));
//! ```

#![warn(unreachable_pub)]

pub mod error;
pub mod matcher;
pub mod selector;

pub use error::SelectorError;
pub use matcher::{compile, to_where, IntoSelector, Where};
pub use selector::{AttrTest, Compound, Selector};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use render_spy_vdom::{h, Node};

    proptest! {
        #[test]
        fn parsed_names_match_their_tag(tag in "[a-z][a-z0-9-]{0,8}") {
            let w = to_where(tag.as_str()).unwrap();
            let node: Node = h(&tag).into();
            prop_assert!(w.matches(&node));
        }

        #[test]
        fn class_selector_matches_any_listed_token(
            tokens in proptest::collection::vec("[a-z]{1,6}", 1..5),
            pick in any::<prop::sample::Index>(),
        ) {
            let class = pick.get(&tokens).clone();
            let w = to_where(format!(".{class}")).unwrap();
            let node: Node = h("div").prop("class", tokens.join(" ")).into();
            prop_assert!(w.matches(&node));
        }

        #[test]
        fn display_reparses_to_same_selector(
            name in "[a-z]{1,5}",
            class in "[a-z]{1,5}",
            value in "[a-z0-9]{1,5}",
        ) {
            let text = format!("{name}.{class}[data-v='{value}']");
            let sel = Selector::parse(&text).unwrap();
            let again = Selector::parse(&sel.to_string()).unwrap();
            prop_assert_eq!(sel, again);
        }
    }
}
