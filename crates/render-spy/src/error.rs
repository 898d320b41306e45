//! Error types for render-spy
//!
//! Usage errors are returned as values. Panics from component render
//! methods or event handlers are not caught and propagate to the test.

use render_spy_select::SelectorError;

/// Result alias for query operations
pub type SpyResult<T> = Result<T, SpyError>;

/// Query and render errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpyError {
    /// Index past the end of the result
    #[error("render-spy: must have enough results for .{method}({index}), found {len}")]
    IndexOutOfRange {
        /// Operation name
        method: &'static str,
        /// Requested index
        index: usize,
        /// Result length
        len: usize,
    },

    /// Operation needs at least one node
    #[error("render-spy: must have at least one result for .{method}()")]
    Empty {
        /// Operation name
        method: &'static str,
    },

    /// Operation needs exactly one node
    #[error("render-spy: .{method}() can only be used on a single node, found {len}")]
    NotSingle {
        /// Operation name
        method: &'static str,
        /// Result length
        len: usize,
    },

    /// Operation needs a component invocation
    #[error("render-spy: .{method}() needs a function or stateful component node")]
    NotAComponent {
        /// Operation name
        method: &'static str,
    },

    /// No live stateful instance was recorded for the node
    #[error("render-spy: {name} is not a stateful component node, no instance to return")]
    NoInstance {
        /// Node display name
        name: String,
    },

    /// Matched event property does not hold a handler
    #[error("render-spy: property {prop} is not an event handler")]
    NotAHandler {
        /// Property name
        prop: String,
    },

    /// Malformed selector
    #[error("render-spy: {0}")]
    Selector(#[from] SelectorError),

    /// Operation on an out-of-date result under the strict policy
    #[error("render-spy: .{method}() on a stale find() result (captured at revision {captured}, now {current})")]
    Stale {
        /// Operation name
        method: &'static str,
        /// Revision the result was captured at
        captured: u64,
        /// Current context revision
        current: u64,
    },

    /// The hidden root container is gone or never mounted
    #[error("render-spy: render root is detached")]
    RootDetached,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_operation() {
        let err = SpyError::NotSingle { method: "attr", len: 3 };
        assert_eq!(err.to_string(), "render-spy: .attr() can only be used on a single node, found 3");

        let err = SpyError::IndexOutOfRange { method: "at", index: 4, len: 2 };
        assert_eq!(err.to_string(), "render-spy: must have enough results for .at(4), found 2");
    }

    #[test]
    fn selector_errors_convert() {
        let err: SpyError = SelectorError::Empty.into();
        assert_eq!(err, SpyError::Selector(SelectorError::Empty));
        assert_eq!(err.to_string(), "render-spy: empty selector");
    }
}
