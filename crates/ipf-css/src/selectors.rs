//! Selector AST and matching
//!
//! Selectors are matched right to left: the rightmost compound must match
//! the candidate, then each combinator walks ancestors or preceding
//! siblings looking for the next compound.

/// Element view used by the matcher
///
/// Implemented by the DOM crate for a borrowed element handle. Type and
/// attribute names are compared ASCII case-insensitively (HTML document
/// semantics); ids and classes are case-sensitive.
pub trait Element: Sized {
    fn parent_element(&self) -> Option<Self>;
    fn prev_sibling_element(&self) -> Option<Self>;
    fn next_sibling_element(&self) -> Option<Self>;
    fn local_name(&self) -> &str;
    fn id(&self) -> Option<&str>;
    fn has_class(&self, name: &str) -> bool;
    fn attr(&self, name: &str) -> Option<&str>;
    /// True for the document element (`:root`)
    fn is_root(&self) -> bool;
}

/// Comma-separated list of complex selectors (`a, b > c`)
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(pub Vec<ComplexSelector>);

impl SelectorList {
    /// Check whether any selector in the list matches
    pub fn matches<E: Element>(&self, element: &E) -> bool {
        self.0.iter().any(|s| s.matches(element))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Combinator between two compounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// Compounds joined by combinators, stored left to right
///
/// `combinators[i]` sits between `compounds[i]` and `compounds[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub compounds: Vec<CompoundSelector>,
    pub combinators: Vec<Combinator>,
}

impl ComplexSelector {
    pub fn matches<E: Element>(&self, element: &E) -> bool {
        let Some(last) = self.compounds.last() else {
            return false;
        };
        last.matches(element) && self.match_leftwards(self.compounds.len() - 1, element)
    }

    /// `element` already matched `compounds[idx]`; try to satisfy the rest
    fn match_leftwards<E: Element>(&self, idx: usize, element: &E) -> bool {
        if idx == 0 {
            return true;
        }
        let next = &self.compounds[idx - 1];

        match self.combinators[idx - 1] {
            Combinator::Child => match element.parent_element() {
                Some(parent) => next.matches(&parent) && self.match_leftwards(idx - 1, &parent),
                None => false,
            },
            Combinator::Descendant => {
                let mut current = element.parent_element();
                while let Some(ancestor) = current {
                    if next.matches(&ancestor) && self.match_leftwards(idx - 1, &ancestor) {
                        return true;
                    }
                    current = ancestor.parent_element();
                }
                false
            }
            Combinator::NextSibling => match element.prev_sibling_element() {
                Some(prev) => next.matches(&prev) && self.match_leftwards(idx - 1, &prev),
                None => false,
            },
            Combinator::SubsequentSibling => {
                let mut current = element.prev_sibling_element();
                while let Some(sibling) = current {
                    if next.matches(&sibling) && self.match_leftwards(idx - 1, &sibling) {
                        return true;
                    }
                    current = sibling.prev_sibling_element();
                }
                false
            }
        }
    }
}

/// Sequence of simple selectors with no combinator (`div.a[b]`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector {
    pub components: Vec<SelectorComponent>,
}

impl CompoundSelector {
    pub fn matches<E: Element>(&self, element: &E) -> bool {
        self.components.iter().all(|c| c.matches(element))
    }
}

/// A component of a selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name, stored lowercase)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    /// Pseudo-class :root, :not(), etc.
    PseudoClass(PseudoClass),
}

impl SelectorComponent {
    pub fn matches<E: Element>(&self, element: &E) -> bool {
        match self {
            Self::Universal => true,
            Self::Type(tag) => element.local_name().eq_ignore_ascii_case(tag),
            Self::Id(id) => element.id() == Some(id.as_str()),
            Self::Class(class) => element.has_class(class),
            Self::Attribute(attr) => attr.matches(element.attr(&attr.name)),
            Self::PseudoClass(pseudo) => pseudo.matches(element),
        }
    }
}

/// Supported pseudo-classes
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    Root,
    FirstChild,
    LastChild,
    OnlyChild,
    /// `:not(list)`
    Not(SelectorList),
    /// `:is(list)` and `:where(list)`
    Is(SelectorList),
}

impl PseudoClass {
    pub fn matches<E: Element>(&self, element: &E) -> bool {
        match self {
            Self::Root => element.is_root(),
            Self::FirstChild => element.prev_sibling_element().is_none(),
            Self::LastChild => element.next_sibling_element().is_none(),
            Self::OnlyChild => {
                element.prev_sibling_element().is_none() && element.next_sibling_element().is_none()
            }
            Self::Not(list) => !list.matches(element),
            Self::Is(list) => list.matches(element),
        }
    }
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    /// Attribute name, stored lowercase
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value] - exact match
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix with hyphen
    DashMatch(String),
    /// [attr^=value] - starts with
    Prefix(String),
    /// [attr$=value] - ends with
    Suffix(String),
    /// [attr*=value] - contains substring
    Substring(String),
}

impl AttributeSelector {
    /// Check if an attribute value matches
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (matcher, value) = match (&self.matcher, value) {
            (None, found) => return found.is_some(),
            (Some(_), None) => return false,
            (Some(matcher), Some(value)) => (matcher, value),
        };

        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_ascii_lowercase()
            } else {
                s.to_string()
            }
        };
        let val = fold(value);

        match matcher {
            AttributeMatcher::Exact(expected) => val == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                !expected.is_empty()
                    && !expected.contains(char::is_whitespace)
                    && val.split_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                val == expected || val.starts_with(&format!("{}-", expected))
            }
            // Empty operands never match for the substring family
            AttributeMatcher::Prefix(expected) => {
                !expected.is_empty() && val.starts_with(&fold(expected))
            }
            AttributeMatcher::Suffix(expected) => {
                !expected.is_empty() && val.ends_with(&fold(expected))
            }
            AttributeMatcher::Substring(expected) => {
                !expected.is_empty() && val.contains(&fold(expected))
            }
        }
    }
}
