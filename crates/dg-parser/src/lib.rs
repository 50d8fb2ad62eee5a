mod script;
mod tree;
mod xml;

pub use script::parse_script;
pub use tree::{rules, SyntaxNode};
pub use xml::parse_tree_xml;
