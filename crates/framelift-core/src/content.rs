//! Extracted placeholder content.
//!
//! [`ExtractedContent`] is the ephemeral summary the extractor reads out of
//! a placeholder subtree: the primary text, left/right icon presence and
//! identity, and — for repeating mappings — the ordered item list. It is
//! produced once per replacement and consumed once by the applicator.

/// Content summary of one placeholder subtree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedContent {
    /// Literal characters of the primary text, when one exists.
    pub text: Option<String>,
    pub has_left_icon: bool,
    pub has_right_icon: bool,
    /// Component key of the left icon, when it is an instance.
    pub left_icon_key: Option<String>,
    /// Component key of the right icon, when it is an instance.
    pub right_icon_key: Option<String>,
    /// Ordered repeated-item summaries, present only for repeating mappings.
    pub items: Option<Vec<TabItem>>,
}

/// Summary of one repeated item (e.g. a single tab).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabItem {
    pub label: String,
    pub has_icon: bool,
    pub icon_key: Option<String>,
}
