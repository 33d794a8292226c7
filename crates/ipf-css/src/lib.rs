//! IPF CSS - Selector engine
//!
//! Parses `querySelector`-style selector lists and matches them against
//! any element tree that implements [`Element`].

mod parser;
mod selectors;

pub use parser::{parse_selector_list, MAX_NESTING, MAX_SELECTOR_LEN};
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector, Element,
    PseudoClass, SelectorComponent, SelectorList,
};

/// Selector parsing error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected character '{ch}' at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Unexpected end of selector")]
    UnexpectedEnd,

    #[error("Combinator without a following selector at offset {pos}")]
    DanglingCombinator { pos: usize },

    #[error("Unknown pseudo-class ':{0}'")]
    UnknownPseudoClass(String),

    #[error("Pseudo-elements are not selectable: '::{0}'")]
    PseudoElement(String),

    #[error("Selector nests more than {limit} functional pseudo-classes")]
    TooDeep { limit: usize },

    #[error("Selector of {len} bytes exceeds the {limit} byte limit")]
    TooLong { len: usize, limit: usize },
}

impl std::str::FromStr for SelectorList {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector_list(s)
    }
}
