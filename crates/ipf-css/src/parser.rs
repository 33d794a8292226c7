//! Selector parser
//!
//! Hand-written recursive descent over the subset of Selectors Level 4
//! that page scripts typically hand to `querySelectorAll`: type,
//! universal, id, class and attribute selectors, the four combinators,
//! and a handful of structural and logical pseudo-classes.

use crate::selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    PseudoClass, SelectorComponent, SelectorList,
};
use crate::SelectorError;

/// Deepest allowed `:not()` / `:is()` / `:where()` nesting
pub const MAX_NESTING: usize = 32;

/// Longest accepted selector text, in bytes
pub const MAX_SELECTOR_LEN: usize = 4096;

/// Parse a comma-separated selector list
///
/// Selector text may come from page-writable storage, so input length and
/// nesting are bounded before anything recurses.
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorError> {
    if input.len() > MAX_SELECTOR_LEN {
        return Err(SelectorError::TooLong {
            len: input.len(),
            limit: MAX_SELECTOR_LEN,
        });
    }
    let mut parser = Parser::new(input);
    let list = parser.parse_list()?;
    parser.skip_whitespace();
    match parser.peek() {
        None => Ok(list),
        Some(ch) => Err(SelectorError::UnexpectedChar { ch, pos: parser.pos }),
    }
}

struct Parser<'a> {
    input: &'a str,
    /// Byte offset into `input`
    pos: usize,
    /// Functional pseudo-classes currently open
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0, depth: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Skip whitespace, returning whether any was consumed
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_whitespace(c)) {
            self.bump();
        }
        self.pos != start
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        match self.peek() {
            Some(ch) if ch == expected => {
                self.bump();
                Ok(())
            }
            Some(ch) => Err(SelectorError::UnexpectedChar { ch, pos: self.pos }),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(ch) => SelectorError::UnexpectedChar { ch, pos: self.pos },
            None => SelectorError::UnexpectedEnd,
        }
    }

    /// Stops before a character that cannot continue the list (`)` or EOF)
    fn parse_list(&mut self) -> Result<SelectorList, SelectorError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            if self.peek().is_none() {
                return Err(if selectors.is_empty() {
                    SelectorError::Empty
                } else {
                    SelectorError::UnexpectedEnd
                });
            }
            selectors.push(self.parse_complex()?);
            self.skip_whitespace();
            if self.peek() == Some(',') {
                self.bump();
            } else {
                break;
            }
        }
        Ok(SelectorList(selectors))
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_whitespace = self.skip_whitespace();
            let combinator = match self.peek() {
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                None | Some(',') | Some(')') => break,
                Some(_) if had_whitespace => {
                    combinators.push(Combinator::Descendant);
                    compounds.push(self.parse_compound()?);
                    continue;
                }
                Some(_) => return Err(self.unexpected()),
            };

            let pos = self.pos;
            self.bump();
            self.skip_whitespace();
            if matches!(self.peek(), None | Some(',') | Some(')')) {
                return Err(SelectorError::DanglingCombinator { pos });
            }
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector { compounds, combinators })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut components = Vec::new();

        match self.peek() {
            Some('*') => {
                self.bump();
                components.push(SelectorComponent::Universal);
            }
            Some(c) if is_ident_start(c) || c == '-' || c == '\\' => {
                let name = self.parse_ident()?;
                components.push(SelectorComponent::Type(name.to_ascii_lowercase()));
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    components.push(SelectorComponent::Id(self.parse_name()?));
                }
                Some('.') => {
                    self.bump();
                    components.push(SelectorComponent::Class(self.parse_ident()?));
                }
                Some('[') => components.push(self.parse_attribute()?),
                Some(':') => components.push(self.parse_pseudo()?),
                _ => break,
            }
        }

        if components.is_empty() {
            return Err(self.unexpected());
        }
        Ok(CompoundSelector { components })
    }

    fn parse_attribute(&mut self) -> Result<SelectorComponent, SelectorError> {
        self.expect('[')?;
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(SelectorComponent::Attribute(AttributeSelector {
                    name,
                    matcher: None,
                    case_insensitive: false,
                }));
            }
            Some('=') => {
                self.bump();
                '='
            }
            Some(c @ ('~' | '|' | '^' | '$' | '*')) if self.peek_second() == Some('=') => {
                self.bump();
                self.bump();
                c
            }
            _ => return Err(self.unexpected()),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => self.parse_string(quote)?,
            _ => self.parse_ident()?,
        };
        self.skip_whitespace();

        let mut case_insensitive = false;
        match self.peek() {
            Some('i' | 'I') => {
                self.bump();
                case_insensitive = true;
            }
            Some('s' | 'S') => {
                self.bump();
            }
            _ => {}
        }
        self.skip_whitespace();
        self.expect(']')?;

        let matcher = match op {
            '=' => AttributeMatcher::Exact(value),
            '~' => AttributeMatcher::Contains(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };

        Ok(SelectorComponent::Attribute(AttributeSelector {
            name,
            matcher: Some(matcher),
            case_insensitive,
        }))
    }

    fn parse_pseudo(&mut self) -> Result<SelectorComponent, SelectorError> {
        self.expect(':')?;
        if self.peek() == Some(':') {
            self.bump();
            return Err(SelectorError::PseudoElement(self.parse_ident()?));
        }

        let name = self.parse_ident()?.to_ascii_lowercase();

        if self.peek() == Some('(') {
            self.bump();
            let wrap: fn(SelectorList) -> PseudoClass = match name.as_str() {
                "not" => PseudoClass::Not,
                "is" | "where" => PseudoClass::Is,
                _ => return Err(SelectorError::UnknownPseudoClass(name)),
            };
            if self.depth >= MAX_NESTING {
                return Err(SelectorError::TooDeep { limit: MAX_NESTING });
            }
            self.depth += 1;
            self.skip_whitespace();
            let list = self.parse_list()?;
            self.skip_whitespace();
            self.expect(')')?;
            self.depth -= 1;
            return Ok(SelectorComponent::PseudoClass(wrap(list)));
        }

        let pseudo = match name.as_str() {
            "root" => PseudoClass::Root,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            // CSS2 single-colon spellings of pseudo-elements
            "before" | "after" | "first-line" | "first-letter" => {
                return Err(SelectorError::PseudoElement(name));
            }
            _ => return Err(SelectorError::UnknownPseudoClass(name)),
        };
        Ok(SelectorComponent::PseudoClass(pseudo))
    }

    /// CSS identifier (may not start with a digit)
    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();

        if self.peek() == Some('-') {
            self.bump();
            out.push('-');
        }

        match self.peek() {
            Some('\\') => out.push(self.parse_escape()?),
            Some('-') if out == "-" => {
                self.bump();
                out.push('-');
            }
            Some(c) if is_ident_start(c) => {
                self.bump();
                out.push(c);
            }
            _ => return Err(self.unexpected()),
        }

        self.parse_name_chars(&mut out)?;
        Ok(out)
    }

    /// Run of name characters (used after `#`, digits allowed up front)
    fn parse_name(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        self.parse_name_chars(&mut out)?;
        if out.is_empty() {
            return Err(self.unexpected());
        }
        Ok(out)
    }

    fn parse_name_chars(&mut self, out: &mut String) -> Result<(), SelectorError> {
        loop {
            match self.peek() {
                Some('\\') => out.push(self.parse_escape()?),
                Some(c) if is_name_char(c) => {
                    self.bump();
                    out.push(c);
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_escape(&mut self) -> Result<char, SelectorError> {
        self.expect('\\')?;

        let mut hex = String::new();
        while hex.len() < 6 {
            match self.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    self.bump();
                    hex.push(c);
                }
                _ => break,
            }
        }

        if hex.is_empty() {
            return self.bump().ok_or(SelectorError::UnexpectedEnd);
        }
        // A single whitespace terminates a hex escape
        if matches!(self.peek(), Some(c) if is_whitespace(c)) {
            self.bump();
        }
        let code = u32::from_str_radix(&hex, 16).unwrap_or(0xFFFD);
        Ok(char::from_u32(code).filter(|&c| c != '\0').unwrap_or('\u{FFFD}'))
    }

    fn parse_string(&mut self, quote: char) -> Result<String, SelectorError> {
        self.expect(quote)?;
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(SelectorError::UnexpectedEnd),
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some(c) => out.push(c),
                    None => return Err(SelectorError::UnexpectedEnd),
                },
                Some(c) => out.push(c),
            }
        }
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_name_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}
