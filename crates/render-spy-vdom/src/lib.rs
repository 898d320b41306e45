//! render-spy host framework
//!
//! A small synchronous component framework:
//! - Immutable virtual nodes with stable identity ([`VNode`], [`Node`])
//! - Function and stateful components ([`ComponentDef`], [`Component`])
//! - A reconciler that keeps instances at unchanged positions ([`Root`])
//! - Deferred state updates drained by [`flush`]
//! - JSX-style serialization ([`to_jsx_string`])
//!
//! # Example
//!
//! ```rust
//! use render_spy_vdom::prelude::*;
//!
//! let greeting = ComponentDef::function("Greeting", |cx| {
//!     let name = cx.prop("name").map(ToString::to_string).unwrap_or_default();
//!     h("p").child(format!("Hello, {name}")).into()
//! });
//!
//! let root = Root::new();
//! root.render(VNode::component(&greeting).prop("name", "Ada"));
//! assert_eq!(
//!     to_jsx_string(&root.snapshot(), &SerializeOptions::default()),
//!     "<p>Hello, Ada</p>"
//! );
//! ```

#![warn(unreachable_pub)]

pub mod component;
pub mod instance;
pub mod node;
pub mod props;
pub mod reconcile;
pub mod serialize;

pub use component::{Component, ComponentDef, ComponentId, ComponentKind, ConstructFn, RenderCx, RenderFn};
pub use instance::{flush, pending_updates, InstanceHandle, InstanceId, Updater};
pub use node::{h, normalize_children, Key, Node, NodeId, NodeType, VNode};
pub use props::{EventHandler, PropValue, Props, State, StatePatch};
pub use reconcile::Root;
pub use serialize::{render_detached, to_jsx_string, SerializeOptions};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building component trees
    pub use crate::{
        flush, h, Component, ComponentDef, EventHandler, Node, PropValue, Props, RenderCx, Root,
        SerializeOptions, State, VNode, to_jsx_string,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
