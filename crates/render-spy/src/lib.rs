//! render-spy - render component trees under test and query every level
//!
//! Wraps each component in a tree with a spy that records what it rendered,
//! then reconstructs the logical tree (declared structure plus recorded
//! renders) on demand for selector queries, navigation, event simulation and
//! state changes.
//!
//! # Example
//!
//! ```rust
//! use render_spy::prelude::*;
//!
//! # fn main() -> render_spy::SpyResult<()> {
//! let item = ComponentDef::function("Item", |cx| {
//!     h("li").child(cx.prop("value").map(ToString::to_string)).into()
//! });
//! let list = {
//!     let item = item.clone();
//!     ComponentDef::function("List", move |_| {
//!         h("ul")
//!             .append_children((1..=3).map(|v| VNode::component(&item).prop("value", v).with_key(v)))
//!             .into()
//!     })
//! };
//!
//! let context = render(VNode::component(&list))?;
//! let items = context.find("Item")?;
//! assert_eq!(items.len(), 3);
//! assert_eq!(items.at(1)?.attr("value")?, Some(PropValue::Int(2)));
//! assert_eq!(context.text()?, "123");
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod context;
pub mod error;
pub mod spy;
pub mod store;
pub mod walk;
pub mod wrapper;

pub use config::{RenderConfig, StalePolicy};
pub use context::RenderContext;
pub use error::{SpyError, SpyResult};
pub use render_spy_select::{IntoSelector, Selector, SelectorError, Where};
pub use spy::NOOP_SPY_NAME;
pub use store::{SpyKey, SpyKind, SpyStore};
pub use walk::Walk;
pub use wrapper::{FindWrapper, Snapshot};

use render_spy_vdom::Node;

/// Render with unbounded depth
///
/// # Errors
///
/// [`SpyError::RootDetached`] if the hidden root could not be mounted.
pub fn render(vdom: impl Into<Node>) -> SpyResult<RenderContext> {
    render_with(vdom, RenderConfig::default())
}

/// Render with an explicit configuration
///
/// # Errors
///
/// [`SpyError::RootDetached`] if the hidden root could not be mounted.
pub fn render_with(vdom: impl Into<Node>, config: RenderConfig) -> SpyResult<RenderContext> {
    let mut context = RenderContext::new(config)?;
    context.render(vdom)?;
    Ok(context)
}

/// Render only the top-level components; nested ones become placeholders
///
/// # Errors
///
/// [`SpyError::RootDetached`] if the hidden root could not be mounted.
pub fn shallow(vdom: impl Into<Node>) -> SpyResult<RenderContext> {
    render_with(vdom, RenderConfig::shallow())
}

/// Flush pending state changes on this thread
pub fn rerender() {
    render_spy_vdom::flush();
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for writing render-spy tests
    pub use crate::{render, render_with, rerender, shallow, FindWrapper, RenderConfig, RenderContext, SpyError, SpyResult, StalePolicy};
    pub use render_spy_vdom::{
        h, Component, ComponentDef, Node, PropValue, Props, RenderCx, State, StatePatch, VNode,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
