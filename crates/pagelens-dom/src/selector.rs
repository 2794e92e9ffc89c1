//! CSS selector subset.
//!
//! Supports type and universal selectors, `#id`, `.class`, attribute
//! selectors (`[a]`, `=`, `*=`, `^=`, `$=`, `~=`, optional ` i` flag),
//! descendant and child combinators, and comma-separated lists.

use pagelens_protocols::{NodeId, PageError};

use crate::dom_tree::PageDocument;
use crate::ElementData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(Vec<Complex>);

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    /// Compounds left to right; each carries the combinator joining it to the
    /// previous compound.
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: Option<(AttrOp, String)>,
    case_insensitive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Contains,
    Prefix,
    Suffix,
    Includes,
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self, PageError> {
        Parser::new(selector).parse_list()
    }

    /// Whether `node` matches any selector of the list.
    pub fn matches(&self, doc: &PageDocument, node: NodeId) -> bool {
        self.0.iter().any(|c| matches_parts(doc, node, &c.parts))
    }
}

fn matches_parts(doc: &PageDocument, node: NodeId, parts: &[(Combinator, Compound)]) -> bool {
    let Some(((combinator, compound), rest)) = parts.split_last() else {
        return false;
    };
    let Some(el) = doc.element_data(node) else {
        return false;
    };
    if !compound.matches(el) {
        return false;
    }
    if rest.is_empty() {
        return true;
    }
    match combinator {
        Combinator::Child => doc
            .parent_element(node)
            .is_some_and(|parent| matches_parts(doc, parent, rest)),
        Combinator::Descendant => {
            let mut current = doc.parent_element(node);
            while let Some(ancestor) = current {
                if matches_parts(doc, ancestor, rest) {
                    return true;
                }
                current = doc.parent_element(ancestor);
            }
            false
        }
    }
}

impl Compound {
    fn matches(&self, el: &ElementData) -> bool {
        if self.tag.as_ref().is_some_and(|tag| *tag != el.tag) {
            return false;
        }
        if self
            .id
            .as_ref()
            .is_some_and(|id| el.attribute("id") != Some(id.as_str()))
        {
            return false;
        }
        if !self.classes.is_empty() {
            let class = el.attribute("class").unwrap_or_default();
            let have: Vec<&str> = class.split_whitespace().collect();
            if !self.classes.iter().all(|c| have.contains(&c.as_str())) {
                return false;
            }
        }
        self.attrs.iter().all(|a| a.matches(el))
    }
}

impl AttrSelector {
    fn matches(&self, el: &ElementData) -> bool {
        let Some(actual) = el.attribute(&self.name) else {
            return false;
        };
        let Some((op, expected)) = &self.op else {
            return true;
        };
        let (actual, expected) = if self.case_insensitive {
            (actual.to_lowercase(), expected.to_lowercase())
        } else {
            (actual.to_string(), expected.clone())
        };
        match op {
            AttrOp::Equals => actual == expected,
            AttrOp::Contains => !expected.is_empty() && actual.contains(&expected),
            AttrOp::Prefix => !expected.is_empty() && actual.starts_with(&expected),
            AttrOp::Suffix => !expected.is_empty() && actual.ends_with(&expected),
            AttrOp::Includes => actual.split_whitespace().any(|w| w == expected),
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> PageError {
        PageError::InvalidSelector {
            selector: self.source.to_string(),
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> Result<SelectorList, PageError> {
        let mut list = Vec::new();
        loop {
            self.skip_ws();
            list.push(self.parse_complex()?);
            self.skip_ws();
            match self.bump() {
                None => break,
                Some(',') => continue,
                Some(c) => return Err(self.error(format!("unexpected '{c}'"))),
            }
        }
        Ok(SelectorList(list))
    }

    fn parse_complex(&mut self) -> Result<Complex, PageError> {
        let mut parts = vec![(Combinator::Descendant, self.parse_compound()?)];
        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    Combinator::Child
                }
                None | Some(',') => break,
                Some(_) if had_ws => Combinator::Descendant,
                Some(c) => return Err(self.error(format!("unexpected '{c}'"))),
            };
            parts.push((combinator, self.parse_compound()?));
        }
        Ok(Complex { parts })
    }

    fn parse_compound(&mut self) -> Result<Compound, PageError> {
        let mut compound = Compound::default();
        let mut any = false;

        match self.peek() {
            Some('*') => {
                self.pos += 1;
                any = true;
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
                any = true;
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.parse_ident()?);
                }
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attrs.push(self.parse_attr()?);
                }
                _ => break,
            }
            any = true;
        }

        if !any {
            return Err(match self.peek() {
                Some(c) => self.error(format!("expected a selector, found '{c}'")),
                None => self.error("expected a selector"),
            });
        }
        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String, PageError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attr(&mut self) -> Result<AttrSelector, PageError> {
        self.skip_ws();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_ws();

        let op = match self.bump() {
            Some(']') => {
                return Ok(AttrSelector {
                    name,
                    op: None,
                    case_insensitive: false,
                });
            }
            Some('=') => AttrOp::Equals,
            Some(c @ ('*' | '^' | '$' | '~')) => {
                if self.bump() != Some('=') {
                    return Err(self.error(format!("expected '=' after '{c}'")));
                }
                match c {
                    '*' => AttrOp::Contains,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Includes,
                }
            }
            _ => return Err(self.error("malformed attribute selector")),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != q) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return Err(self.error("unterminated string"));
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                value
            }
            _ => self.parse_ident()?,
        };

        self.skip_ws();
        let mut case_insensitive = false;
        if self.peek().is_some_and(|c| c.eq_ignore_ascii_case(&'i')) {
            self.pos += 1;
            case_insensitive = true;
            self.skip_ws();
        }
        if self.bump() != Some(']') {
            return Err(self.error("expected ']'"));
        }

        Ok(AttrSelector {
            name,
            op: Some((op, value)),
            case_insensitive,
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || (!c.is_ascii() && !c.is_whitespace())
}
