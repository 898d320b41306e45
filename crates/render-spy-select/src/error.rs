//! Selector parse errors

/// Errors produced while parsing a selector
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// Nothing to match on
    #[error("empty selector")]
    Empty,

    /// Character that cannot start or continue a compound selector
    #[error("unexpected character '{ch}' at offset {offset} in selector {input:?}")]
    UnexpectedChar {
        /// Offending character
        ch: char,
        /// Byte offset in the input
        offset: usize,
        /// Full selector text
        input: String,
    },

    /// Attribute bracket or quoted value left open
    #[error("unterminated {what} in selector {input:?}")]
    Unterminated {
        /// What was left open
        what: &'static str,
        /// Full selector text
        input: String,
    },

    /// `.`, `#` or `[` not followed by a name
    #[error("expected a name after '{prefix}' at offset {offset} in selector {input:?}")]
    EmptyName {
        /// Introducing character
        prefix: char,
        /// Byte offset of the prefix
        offset: usize,
        /// Full selector text
        input: String,
    },

    /// Descendant, child or sibling combinators
    #[error("combinator {combinator:?} is not supported in selector {input:?}")]
    UnsupportedCombinator {
        /// Combinator text (`" "` for descendant)
        combinator: String,
        /// Full selector text
        input: String,
    },
}
