//! Usage Matching
//!
//! Decides whether a declared component is actually used in markup text and
//! where. Two interchangeable strategies share one contract:
//!
//! - **Regex**: a delimiter-guarded scan over the raw text. The guard
//!   requires `<name` to be followed by whitespace, `>` or `/`, so a tag
//!   name never matches as a prefix of a longer tag name.
//! - **Structured**: a tree walk over the parsed markup (see
//!   [`crate::markup`]). When the parse fails the matcher transparently
//!   falls back to the regex result; callers never see the failure.
//!
//! All reported coordinates are 1-based and identical between strategies on
//! well-formed input. Match events flow through an injected
//! [`MatchObserver`] instead of hard-wired logging so the matcher stays
//! silent under test.

use std::sync::Arc;

use regex::Regex;
use tracing::{debug, warn};

use crate::graph::ComponentReference;
use crate::markup::MarkupParser;

// ============================================================================
// Offset Conversion
// ============================================================================

/// Convert a byte offset into 1-based line/column coordinates.
///
/// Line is one more than the number of newlines preceding the offset;
/// column is the distance from the preceding newline (offset + 1 when the
/// offset sits on the first line).
pub(crate) fn offset_to_reference(text: &str, offset: usize) -> ComponentReference {
    let before = &text[..offset.min(text.len())];
    let line = before.bytes().filter(|b| *b == b'\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(newline) => offset - newline,
        None => offset + 1,
    };
    ComponentReference::new(line, column)
}

// ============================================================================
// Match Observer
// ============================================================================

/// Receives match events from the matcher.
///
/// The production observer logs through `tracing`; tests inject a recording
/// observer to assert on events without console side effects.
pub trait MatchObserver {
    /// A start-tag occurrence of `tag` was found.
    fn on_occurrence(&self, _tag: &str, _reference: &ComponentReference) {}

    /// The structured strategy failed and the regex result was used instead.
    fn on_fallback(&self, _tag: &str, _reason: &str) {}
}

/// Shared observers work too: callers that need to inspect events after the
/// matcher takes ownership can hand over an `Arc` clone.
impl<T: MatchObserver + ?Sized> MatchObserver for Arc<T> {
    fn on_occurrence(&self, tag: &str, reference: &ComponentReference) {
        (**self).on_occurrence(tag, reference);
    }

    fn on_fallback(&self, tag: &str, reason: &str) {
        (**self).on_fallback(tag, reason);
    }
}

/// Default observer: forwards events to `tracing` at debug level.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl MatchObserver for TracingObserver {
    fn on_occurrence(&self, tag: &str, reference: &ComponentReference) {
        debug!(
            "Found <{tag}> at line {}, column {}",
            reference.line, reference.column
        );
    }

    fn on_fallback(&self, tag: &str, reason: &str) {
        debug!("Structured match for <{tag}> fell back to regex: {reason}");
    }
}

// ============================================================================
// Usage Matcher
// ============================================================================

/// Matching strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Markup-tree walk with transparent regex fallback
    #[default]
    Structured,
    /// Raw-text regex scan only
    Regex,
}

/// Finds start-tag occurrences of component names in markup text.
pub struct UsageMatcher {
    strategy: MatchStrategy,
    observer: Box<dyn MatchObserver>,
    /// Lazily shared tree-sitter parser; None when the grammar could not be
    /// loaded, in which case the structured strategy permanently falls back.
    parser: Option<MarkupParser>,
}

impl Default for UsageMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl UsageMatcher {
    /// Create a matcher with the default (structured) strategy.
    pub fn new() -> Self {
        Self::with_strategy(MatchStrategy::default())
    }

    /// Create a matcher with an explicit strategy.
    pub fn with_strategy(strategy: MatchStrategy) -> Self {
        let parser = match MarkupParser::new() {
            Ok(parser) => Some(parser),
            Err(e) => {
                warn!("Markup grammar unavailable, structured matching disabled: {e}");
                None
            }
        };
        Self {
            strategy,
            observer: Box::new(TracingObserver),
            parser,
        }
    }

    /// Replace the match observer.
    pub fn with_observer(mut self, observer: Box<dyn MatchObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The strategy this matcher was configured with.
    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// Whether `tag` appears as a start tag anywhere in `markup`.
    ///
    /// Lighter-weight than position extraction; used before investing in a
    /// full scan. Always regex-based.
    pub fn is_used(&self, markup: &str, tag: &str) -> bool {
        match start_tag_regex(tag) {
            Some(re) => re.is_match(markup),
            None => false,
        }
    }

    /// Every start-tag occurrence of `tag` in `markup`, in document order.
    pub fn find_positions(&mut self, markup: &str, tag: &str) -> Vec<ComponentReference> {
        let positions = match self.strategy {
            MatchStrategy::Regex => regex_positions(markup, tag),
            MatchStrategy::Structured => self.structured_positions(markup, tag),
        };
        for reference in &positions {
            self.observer.on_occurrence(tag, reference);
        }
        positions
    }

    fn structured_positions(&mut self, markup: &str, tag: &str) -> Vec<ComponentReference> {
        let Some(parser) = self.parser.as_mut() else {
            self.observer.on_fallback(tag, "markup grammar unavailable");
            return regex_positions(markup, tag);
        };

        match parser.find_tag(markup, tag) {
            Ok(positions) => positions,
            Err(e) => {
                self.observer.on_fallback(tag, &e.to_string());
                regex_positions(markup, tag)
            }
        }
    }
}

/// Regex matching `<tag` followed by whitespace, `>` or `/`.
///
/// The delimiter is part of the match but positions are taken at the `<`,
/// which makes this equivalent to a lookahead for start-tag occurrences.
/// Metacharacters in the tag name are escaped to match literally.
fn start_tag_regex(tag: &str) -> Option<Regex> {
    if tag.is_empty() {
        return None;
    }
    let pattern = format!("<{}[\\s>/]", regex::escape(tag));
    match Regex::new(&pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Unusable tag name {tag:?}: {e}");
            None
        }
    }
}

/// Global non-overlapping scan of the whole text, not anchored to lines.
fn regex_positions(markup: &str, tag: &str) -> Vec<ComponentReference> {
    let Some(re) = start_tag_regex(tag) else {
        return Vec::new();
    };
    re.find_iter(markup)
        .map(|m| offset_to_reference(markup, m.start()))
        .collect()
}
