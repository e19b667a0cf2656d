//! Structured Markup Walking
//!
//! The structured matching strategy parses markup text into a syntax tree
//! with tree-sitter's XML grammar and walks it depth-first, collecting the
//! position of every start tag whose name equals the wanted tag. Mini
//! Program markup is tag-based and close enough to XML for this to hold on
//! well-formed documents; anything the grammar cannot digest surfaces as a
//! [`MarkupError`] and the caller falls back to the regex strategy.

use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

use crate::graph::ComponentReference;
use crate::matcher::offset_to_reference;

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur while parsing markup into a tree.
#[derive(Debug, Error)]
pub enum MarkupError {
    /// Failed to configure the XML grammar
    #[error("Failed to set markup language: {0}")]
    LanguageSet(String),

    /// Parser produced no tree
    #[error("Markup parse produced no tree")]
    ParseFailed,

    /// Tree contains syntax errors; positions would be unreliable
    #[error("Markup contains syntax errors")]
    Syntax,
}

// ============================================================================
// Markup Parser
// ============================================================================

/// A tree-sitter based markup parser for the structured matching strategy.
pub struct MarkupParser {
    parser: Parser,
}

impl MarkupParser {
    /// Create a parser configured with the XML grammar.
    pub fn new() -> Result<Self, MarkupError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_xml::LANGUAGE_XML.into())
            .map_err(|e| MarkupError::LanguageSet(e.to_string()))?;
        Ok(Self { parser })
    }

    /// Parse markup text into a syntax tree.
    ///
    /// A tree with syntax errors is rejected wholesale: partial walks would
    /// silently drop occurrences, and the regex strategy handles the file
    /// just as well.
    pub fn parse(&mut self, source: &str) -> Result<Tree, MarkupError> {
        let tree = self.parser.parse(source, None).ok_or(MarkupError::ParseFailed)?;
        if tree.root_node().has_error() {
            return Err(MarkupError::Syntax);
        }
        Ok(tree)
    }

    /// Find every start-tag occurrence of `tag` in `source`, in document
    /// order.
    pub fn find_tag(
        &mut self,
        source: &str,
        tag: &str,
    ) -> Result<Vec<ComponentReference>, MarkupError> {
        let tree = self.parse(source)?;
        let mut positions = Vec::new();
        collect_elements(tree.root_node(), source, tag, &mut positions);
        Ok(positions)
    }
}

/// Depth-first pre-order walk over element nodes.
fn collect_elements(node: Node, source: &str, tag: &str, positions: &mut Vec<ComponentReference>) {
    if node.kind() == "element" && element_name(node, source) == Some(tag) {
        positions.push(element_position(node, source));
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_elements(child, source, tag, positions);
    }
}

/// Tag name of an element, read from its start tag (`STag`) or
/// self-closing tag (`EmptyElemTag`).
fn element_name<'a>(element: Node, source: &'a str) -> Option<&'a str> {
    let start_tag = start_tag_node(element)?;
    let mut cursor = start_tag.walk();
    let name = start_tag
        .children(&mut cursor)
        .find(|child| child.kind() == "Name")?;
    name.utf8_text(source.as_bytes()).ok()
}

fn start_tag_node(element: Node) -> Option<Node> {
    let mut cursor = element.walk();
    let mut children = element.children(&mut cursor);
    children.find(|child| matches!(child.kind(), "STag" | "EmptyElemTag"))
}

/// Derive a 1-based position for a matched element.
///
/// Ordered fallback chain: the start-tag node's location, then the element
/// node's own location, then the element's raw byte offset converted the
/// same way the regex strategy converts offsets. The last tier is total, so
/// every matched element gets a position.
fn element_position(element: Node, source: &str) -> ComponentReference {
    if let Some(start_tag) = start_tag_node(element) {
        let point = start_tag.start_position();
        return ComponentReference::new(point.row + 1, point.column + 1);
    }

    // Zero-width nodes (error-recovery artifacts) carry a degenerate
    // location; their byte offset still converts cleanly.
    if element.start_byte() != element.end_byte() {
        let point = element.start_position();
        return ComponentReference::new(point.row + 1, point.column + 1);
    }

    offset_to_reference(source, element.start_byte())
}
