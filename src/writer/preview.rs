//! Bounded previews of staged content for debug logging

use std::borrow::Cow;

/// Default number of characters kept in a preview
pub const DEFAULT_PREVIEW_CHARS: usize = 1000;

const ELLIPSIS: &str = "...";

/// Abbreviates content so debug logs never carry an unbounded payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preview {
    max_chars: usize,
}

impl Default for Preview {
    fn default() -> Self {
        Self::new(DEFAULT_PREVIEW_CHARS)
    }
}

impl Preview {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Return `text` unchanged if it fits, otherwise its first `max_chars`
    /// characters followed by `...`
    pub fn abbreviate<'a>(&self, text: &'a str) -> Cow<'a, str> {
        match text.char_indices().nth(self.max_chars) {
            None => Cow::Borrowed(text),
            Some((cut, _)) => Cow::Owned(format!("{}{ELLIPSIS}", &text[..cut])),
        }
    }
}
