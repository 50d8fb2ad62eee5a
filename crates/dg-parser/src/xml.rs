use dg_core::{DialogicError, SourceLocation, SourceSpan};
use roxmltree::{Document, Node, NodeType};

use crate::tree::SyntaxNode;

/// Imports a syntax tree serialized as XML by external grammar tooling.
/// Element names become node kinds; non-blank text becomes the node text.
pub fn parse_tree_xml(source: &str) -> Result<SyntaxNode, DialogicError> {
    let document = Document::parse(source)
        .map_err(|error| DialogicError::new("XML_PARSE_ERROR", error.to_string()))?;

    let Some(root) = document.root().children().find(|node| node.is_element()) else {
        return Err(DialogicError::new(
            "XML_PARSE_ERROR",
            "XML document must contain a root element.",
        ));
    };

    Ok(convert_element(&document, root))
}

fn convert_element(document: &Document<'_>, node: Node<'_, '_>) -> SyntaxNode {
    let mut text = String::new();
    let mut children = Vec::new();
    for child in node.children() {
        match child.node_type() {
            NodeType::Element => children.push(convert_element(document, child)),
            NodeType::Text => text.push_str(child.text().unwrap_or_default()),
            _ => {}
        }
    }

    let trimmed = text.trim();
    SyntaxNode {
        kind: node.tag_name().name().to_string(),
        text: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        children,
        location: node_span(document, node.range().start, node.range().end),
    }
}

fn node_span(document: &Document<'_>, start: usize, end: usize) -> SourceSpan {
    let start_pos = document.text_pos_at(start);
    let end_pos = document.text_pos_at(end);
    SourceSpan {
        start: SourceLocation {
            line: start_pos.row as usize,
            column: start_pos.col as usize,
        },
        end: SourceLocation {
            line: end_pos.row as usize,
            column: end_pos.col as usize,
        },
    }
}
