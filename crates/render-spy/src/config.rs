//! Render context configuration

use render_spy_vdom::SerializeOptions;
use serde::{Deserialize, Serialize};

/// What to do when an operation runs on an out-of-date query result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Emit a `tracing` warning and continue on the captured nodes
    #[default]
    Warn,

    /// Fail with [`SpyError::Stale`](crate::SpyError::Stale)
    Error,

    /// Continue silently
    Ignore,
}

/// Render context configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Component nesting levels that render; deeper invocations become
    /// placeholders. `None` (or `Some(0)`) is unbounded.
    pub depth: Option<usize>,

    /// Staleness handling
    pub stale_policy: StalePolicy,

    /// Options used by `FindWrapper`'s `Display`
    pub to_string: SerializeOptions,
}

impl RenderConfig {
    /// Unbounded depth, default policies
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only top-level components render
    #[inline]
    #[must_use]
    pub fn shallow() -> Self {
        Self::default().with_depth(1)
    }

    /// With a depth bound
    #[inline]
    #[must_use]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// With a staleness policy
    #[inline]
    #[must_use]
    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }

    /// With `Display` serialization options
    #[inline]
    #[must_use]
    pub fn with_to_string(mut self, options: SerializeOptions) -> Self {
        self.to_string = options;
        self
    }

    /// Check whether a component at `depth` is replaced by a placeholder
    #[inline]
    #[must_use]
    pub fn is_beyond_depth(&self, depth: usize) -> bool {
        matches!(self.depth, Some(bound) if bound > 0 && depth >= bound)
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            depth: None,
            stale_policy: StalePolicy::Warn,
            to_string: SerializeOptions::snapshot(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_by_default() {
        let config = RenderConfig::new();
        assert!(!config.is_beyond_depth(0));
        assert!(!config.is_beyond_depth(1_000));
        assert_eq!(config.stale_policy, StalePolicy::Warn);
        assert!(config.to_string.shallow);
        assert!(!config.to_string.skip_false_attributes);
    }

    #[test]
    fn shallow_bounds_at_one() {
        let config = RenderConfig::shallow();
        assert!(!config.is_beyond_depth(0));
        assert!(config.is_beyond_depth(1));
        assert!(config.is_beyond_depth(2));
    }

    #[test]
    fn zero_depth_is_unbounded() {
        assert!(!RenderConfig::new().with_depth(0).is_beyond_depth(5));
    }

    #[test]
    fn deserializes_partial_json() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"depth": 2, "stale_policy": "error"}"#).expect("valid config");
        assert_eq!(config.depth, Some(2));
        assert_eq!(config.stale_policy, StalePolicy::Error);
        assert_eq!(config.to_string, SerializeOptions::snapshot());
    }
}
