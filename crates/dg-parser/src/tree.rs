use dg_core::SourceSpan;

/// Production names shared by the front-ends and the lowering pass.
pub mod rules {
    pub const DIALOG: &str = "dialog";
    pub const LINE: &str = "line";
    pub const COMMAND: &str = "command";
    pub const ARGS: &str = "args";

    pub const SAY: &str = "say";
    pub const WAIT: &str = "wait";
    pub const DO: &str = "do";
    pub const CHAT: &str = "chat";
    pub const ASK: &str = "ask";
    pub const OPT: &str = "opt";
    pub const GOTO: &str = "goto";
    pub const SET: &str = "set";
}

/// One node of a generic syntax tree. `kind` is the grammar production name;
/// `text` is only set on leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    pub kind: String,
    pub text: Option<String>,
    pub children: Vec<SyntaxNode>,
    pub location: SourceSpan,
}

impl SyntaxNode {
    pub fn branch(kind: impl Into<String>, children: Vec<SyntaxNode>, location: SourceSpan) -> Self {
        Self {
            kind: kind.into(),
            text: None,
            children,
            location,
        }
    }

    pub fn leaf(kind: impl Into<String>, text: impl Into<String>, location: SourceSpan) -> Self {
        Self {
            kind: kind.into(),
            text: Some(text.into()),
            children: Vec::new(),
            location,
        }
    }

    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Concatenated text of this node and its descendants, in tree order.
    pub fn full_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    pub fn children_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a SyntaxNode> + 'a {
        self.children.iter().filter(move |child| child.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_text_concatenates_leaves_in_order() {
        let span = SourceSpan::synthetic();
        let node = SyntaxNode::branch(
            rules::ARGS,
            vec![
                SyntaxNode::leaf("word", "Hello", span.clone()),
                SyntaxNode::leaf("word", " there", span.clone()),
            ],
            span,
        );
        assert_eq!(node.full_text(), "Hello there");
    }

    #[test]
    fn children_of_kind_only_looks_at_direct_children() {
        let span = SourceSpan::synthetic();
        let nested = SyntaxNode::branch(
            rules::COMMAND,
            vec![SyntaxNode::leaf(rules::ARGS, "deep", span.clone())],
            span.clone(),
        );
        let line = SyntaxNode::branch(
            rules::LINE,
            vec![nested, SyntaxNode::leaf(rules::ARGS, "top", span.clone())],
            span,
        );
        let args = line.children_of_kind(rules::ARGS).collect::<Vec<_>>();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].full_text(), "top");
    }
}
