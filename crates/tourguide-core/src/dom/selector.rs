//! CSS selector parsing and matching.
//!
//! Tour steps reference page elements with CSS selectors. The supported
//! grammar is the subset the catalog needs: type, `#id`, `.class`,
//! `[attr]` and `[attr=value]` simple selectors combined into compounds, and
//! compounds joined by the descendant combinator (whitespace).

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::element::Element;
use crate::error::{Result, TourError};

/// Attribute condition inside a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMatch {
    pub name: String,
    /// `None` tests presence only.
    pub value: Option<String>,
}

/// A sequence of simple selectors that must all match one element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeMatch>,
}

impl Compound {
    /// Whether this compound matches the element on its own.
    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if !tag.eq_ignore_ascii_case(element.tag()) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.id() != Some(id.as_str()) {
                return false;
            }
        }
        if !self
            .classes
            .iter()
            .all(|class| element.classes().any(|c| c == class))
        {
            return false;
        }
        self.attributes.iter().all(|attr| match &attr.value {
            Some(expected) => element.attribute(&attr.name) == Some(expected.as_str()),
            None => element.attribute(&attr.name).is_some(),
        })
    }
}

/// A parsed selector: compounds in document order, outermost first.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
}

impl Selector {
    /// Parses a selector string.
    ///
    /// # Errors
    ///
    /// Returns `TourError::InvalidSelector` for empty input, selector lists,
    /// pseudo-classes, and combinators other than descendant.
    pub fn parse(source: &str) -> Result<Self> {
        let compounds = Parser::new(source).parse()?;
        Ok(Self {
            source: source.trim().to_string(),
            compounds,
        })
    }

    /// The selector text as written.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Compounds from outermost ancestor to the subject element.
    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }

    /// Tests `element` against the selector. `ancestors` must yield the
    /// element's ancestors nearest first.
    pub fn matches<'a, I>(&self, element: &Element, ancestors: I) -> bool
    where
        I: IntoIterator<Item = &'a Element>,
    {
        let Some((subject, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !subject.matches(element) {
            return false;
        }

        // Descendant-only chains match greedily against the nearest ancestor.
        let mut ancestors = ancestors.into_iter();
        rest.iter()
            .rev()
            .all(|compound| ancestors.by_ref().any(|ancestor| compound.matches(ancestor)))
    }
}

impl PartialEq for Selector {
    fn eq(&self, other: &Self) -> bool {
        self.compounds == other.compounds
    }
}

impl Eq for Selector {}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Selector {
    type Err = TourError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Selector {
    type Error = TourError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().peekable(),
        }
    }

    fn error(&self, reason: impl Into<String>) -> TourError {
        TourError::invalid_selector(self.source).with_reason(reason)
    }

    fn parse(mut self) -> Result<Vec<Compound>> {
        let mut compounds = Vec::new();
        loop {
            self.skip_whitespace();
            if self.chars.peek().is_none() {
                break;
            }
            compounds.push(self.compound()?);
        }
        if compounds.is_empty() {
            return Err(self.error("empty selector"));
        }
        Ok(compounds)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let mut empty = true;

        if self.chars.next_if_eq(&'*').is_some() {
            empty = false;
        } else if self.chars.peek().is_some_and(|c| is_ident_char(*c)) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
            empty = false;
        }

        while let Some(&c) = self.chars.peek() {
            match c {
                '#' => {
                    self.chars.next();
                    compound.id = Some(self.ident()?);
                }
                '.' => {
                    self.chars.next();
                    compound.classes.push(self.ident()?);
                }
                '[' => {
                    self.chars.next();
                    compound.attributes.push(self.attribute()?);
                }
                c if c.is_whitespace() => break,
                ',' => return Err(self.error("selector lists are not supported")),
                ':' => return Err(self.error("pseudo-classes are not supported")),
                '>' | '+' | '~' => {
                    return Err(self.error(format!("unsupported combinator '{c}'")))
                }
                other => return Err(self.error(format!("unexpected character '{other}'"))),
            }
            empty = false;
        }

        if empty {
            return Err(self.error("expected a simple selector"));
        }
        Ok(compound)
    }

    fn ident(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(c) = self.chars.next_if(|c| is_ident_char(*c)) {
            ident.push(c);
        }
        if ident.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        Ok(ident)
    }

    fn attribute(&mut self) -> Result<AttributeMatch> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();

        let value = match self.chars.next() {
            Some(']') => return Ok(AttributeMatch { name, value: None }),
            Some('=') => {
                self.skip_whitespace();
                self.attribute_value()?
            }
            Some(other) => {
                return Err(self.error(format!("unsupported attribute operator '{other}'")))
            }
            None => return Err(self.error("unterminated attribute selector")),
        };

        self.skip_whitespace();
        match self.chars.next() {
            Some(']') => Ok(AttributeMatch {
                name,
                value: Some(value),
            }),
            _ => Err(self.error("unterminated attribute selector")),
        }
    }

    fn attribute_value(&mut self) -> Result<String> {
        let mut value = String::new();
        match self.chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                self.chars.next();
                loop {
                    match self.chars.next() {
                        Some(c) if c == quote => break,
                        Some(c) => value.push(c),
                        None => return Err(self.error("unterminated string")),
                    }
                }
            }
            _ => {
                while let Some(c) = self.chars.next_if(|c| *c != ']' && !c.is_whitespace()) {
                    value.push(c);
                }
            }
        }
        Ok(value)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}
