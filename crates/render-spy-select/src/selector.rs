//! Selector values and the selector text parser
//!
//! Grammar:
//!
//! ```text
//! list      := compound ( "," compound )*
//! compound  := name? ( "." name | "#" name | attribute )*
//! attribute := "[" name ( "=" ( value | '"' .. '"' | "'" .. "'" ) )? "]"
//! ```
//!
//! Whitespace is allowed around commas and inside brackets. Combinators are
//! rejected.

use crate::error::SelectorError;
use render_spy_vdom::ComponentDef;
use std::fmt::{self, Display, Formatter};
use std::iter::Peekable;
use std::str::{CharIndices, FromStr};

/// Attribute test inside a compound selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrTest {
    /// Property name
    pub name: String,

    /// Required display text; presence only when `None`
    pub value: Option<String>,
}

/// One compound selector: all parts must hold for the same node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    /// Tag or component display name
    pub name: Option<String>,

    /// Required `id` prop
    pub id: Option<String>,

    /// Required class tokens
    pub classes: Vec<String>,

    /// Required attributes
    pub attributes: Vec<AttrTest>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
    }
}

impl Display for Compound {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            f.write_str(name)?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for attr in &self.attributes {
            match &attr.value {
                Some(value) => write!(f, "[{}={value:?}]", attr.name)?,
                None => write!(f, "[{}]", attr.name)?,
            }
        }
        Ok(())
    }
}

/// A parsed selector
#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// Comma-separated compounds; any may match
    Css(Vec<Compound>),

    /// Component invocations of exactly this definition
    Component(ComponentDef),
}

impl Selector {
    /// Parse selector text
    ///
    /// # Errors
    ///
    /// Returns a [`SelectorError`] describing the first problem found.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let compounds = Parser::new(input).list()?;
        tracing::trace!(selector = input, alternatives = compounds.len(), "parsed selector");
        Ok(Self::Css(compounds))
    }

    /// Match invocations of `def`
    #[inline]
    #[must_use]
    pub fn component(def: &ComponentDef) -> Self {
        Self::Component(def.clone())
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(compounds) => {
                for (i, c) in compounds.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{c}")?;
                }
                Ok(())
            }
            Self::Component(def) => write!(f, "<{}>", def.name()),
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.input.len(), |&(i, _)| i)
    }

    fn skip_ws(&mut self) -> bool {
        let mut skipped = false;
        while self.peek().is_some_and(char::is_whitespace) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn unexpected(&self, ch: char, offset: usize) -> SelectorError {
        SelectorError::UnexpectedChar {
            ch,
            offset,
            input: self.input.to_string(),
        }
    }

    fn unterminated(&self, what: &'static str) -> SelectorError {
        SelectorError::Unterminated {
            what,
            input: self.input.to_string(),
        }
    }

    fn combinator(&self, combinator: &str) -> SelectorError {
        SelectorError::UnsupportedCombinator {
            combinator: combinator.to_string(),
            input: self.input.to_string(),
        }
    }

    fn name(&mut self) -> Option<String> {
        let mut name = String::new();
        while let Some(c) = self.peek().filter(|&c| is_name_char(c)) {
            name.push(c);
            self.chars.next();
        }
        (!name.is_empty()).then_some(name)
    }

    fn required_name(&mut self, prefix: char, offset: usize) -> Result<String, SelectorError> {
        self.name().ok_or_else(|| SelectorError::EmptyName {
            prefix,
            offset,
            input: self.input.to_string(),
        })
    }

    fn list(&mut self) -> Result<Vec<Compound>, SelectorError> {
        if self.input.trim().is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut list = Vec::new();
        loop {
            self.skip_ws();
            list.push(self.compound()?);
            let spaced = self.skip_ws();
            let offset = self.offset();
            match self.chars.next() {
                None => return Ok(list),
                Some((_, ',')) => {}
                Some((_, c @ ('>' | '+' | '~'))) => return Err(self.combinator(&c.to_string())),
                Some(_) if spaced => return Err(self.combinator(" ")),
                Some((_, c)) => return Err(self.unexpected(c, offset)),
            }
        }
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound {
            name: self.name(),
            ..Compound::default()
        };
        loop {
            let offset = self.offset();
            match self.peek() {
                Some('.') => {
                    self.chars.next();
                    compound.classes.push(self.required_name('.', offset)?);
                }
                Some('#') => {
                    self.chars.next();
                    compound.id = Some(self.required_name('#', offset)?);
                }
                Some('[') => {
                    self.chars.next();
                    compound.attributes.push(self.attribute(offset)?);
                }
                _ => break,
            }
        }
        if compound.is_empty() {
            let offset = self.offset();
            return match self.peek() {
                None => Err(SelectorError::Empty),
                Some(c) => Err(self.unexpected(c, offset)),
            };
        }
        Ok(compound)
    }

    fn attribute(&mut self, open: usize) -> Result<AttrTest, SelectorError> {
        self.skip_ws();
        if self.peek().is_none() {
            return Err(self.unterminated("attribute"));
        }
        let name = self.required_name('[', open)?;
        self.skip_ws();
        let value = match self.peek() {
            Some('=') => {
                self.chars.next();
                self.skip_ws();
                Some(self.value()?)
            }
            _ => None,
        };
        self.skip_ws();
        let offset = self.offset();
        match self.chars.next() {
            Some((_, ']')) => Ok(AttrTest { name, value }),
            Some((_, c)) => Err(self.unexpected(c, offset)),
            None => Err(self.unterminated("attribute")),
        }
    }

    fn value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.chars.next();
                let mut value = String::new();
                for (_, c) in self.chars.by_ref() {
                    if c == quote {
                        return Ok(value);
                    }
                    value.push(c);
                }
                Err(self.unterminated("quoted value"))
            }
            Some(_) => {
                let mut value = String::new();
                while let Some(c) = self.peek().filter(|&c| c != ']' && !c.is_whitespace()) {
                    value.push(c);
                    self.chars.next();
                }
                if value.is_empty() {
                    let offset = self.offset();
                    return Err(self.unexpected(']', offset));
                }
                Ok(value)
            }
            None => Err(self.unterminated("attribute")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn compounds(input: &str) -> Vec<Compound> {
        match Selector::parse(input) {
            Ok(Selector::Css(c)) => c,
            other => panic!("unexpected parse result: {other:?}"),
        }
    }

    #[test]
    fn parses_name_only() {
        assert_eq!(
            compounds("Item"),
            vec![Compound {
                name: Some("Item".into()),
                ..Compound::default()
            }]
        );
    }

    #[test]
    fn parses_full_compound() {
        let c = compounds(r#"button.primary.big#go[type="submit"][disabled]"#);
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].name.as_deref(), Some("button"));
        assert_eq!(c[0].id.as_deref(), Some("go"));
        assert_eq!(c[0].classes, vec!["primary", "big"]);
        assert_eq!(
            c[0].attributes,
            vec![
                AttrTest {
                    name: "type".into(),
                    value: Some("submit".into())
                },
                AttrTest {
                    name: "disabled".into(),
                    value: None
                },
            ]
        );
    }

    #[test]
    fn attribute_value_forms() {
        for input in ["[value=2]", "[value=\"2\"]", "[value='2']", "[ value = 2 ]"] {
            let c = compounds(input);
            assert_eq!(c[0].attributes[0].value.as_deref(), Some("2"), "{input}");
        }
        let c = compounds("[title='a]b']");
        assert_eq!(c[0].attributes[0].value.as_deref(), Some("a]b"));
    }

    #[test]
    fn comma_list() {
        let c = compounds("span , .label,#x");
        assert_eq!(c.len(), 3);
        assert_eq!(c[1].classes, vec!["label"]);
        assert_eq!(c[2].id.as_deref(), Some("x"));
    }

    #[test]
    fn rejects_empty() {
        assert_eq!(Selector::parse(""), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("a,"), Err(SelectorError::Empty));
    }

    #[test]
    fn rejects_malformed() {
        assert!(matches!(Selector::parse("a!"), Err(SelectorError::UnexpectedChar { ch: '!', offset: 1, .. })));
        assert!(matches!(Selector::parse("."), Err(SelectorError::EmptyName { prefix: '.', .. })));
        assert!(matches!(Selector::parse("#"), Err(SelectorError::EmptyName { prefix: '#', .. })));
        assert!(matches!(Selector::parse("[x"), Err(SelectorError::Unterminated { what: "attribute", .. })));
        assert!(matches!(Selector::parse("[x='y"), Err(SelectorError::Unterminated { what: "quoted value", .. })));
        assert!(matches!(Selector::parse("[=y]"), Err(SelectorError::EmptyName { prefix: '[', .. })));
    }

    #[test]
    fn rejects_combinators() {
        assert!(matches!(
            Selector::parse("ul li"),
            Err(SelectorError::UnsupportedCombinator { ref combinator, .. }) if combinator == " "
        ));
        assert!(matches!(
            Selector::parse("ul>li"),
            Err(SelectorError::UnsupportedCombinator { ref combinator, .. }) if combinator == ">"
        ));
    }

    #[test]
    fn from_str_and_display() {
        let sel: Selector = "li.item[value=2]".parse().expect("valid selector");
        assert_eq!(sel.to_string(), "li.item[value=\"2\"]");
    }

    #[test]
    fn error_messages_name_the_input() {
        let err = Selector::parse("a!").expect_err("invalid selector");
        assert_eq!(err.to_string(), "unexpected character '!' at offset 1 in selector \"a!\"");
    }
}
