use std::sync::OnceLock;

use dg_core::{DialogicError, SourceSpan};
use regex::Regex;

use crate::tree::{rules, SyntaxNode};

const ARG_SEPARATOR: char = '|';

fn statement_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^(\s*)([A-Za-z_][A-Za-z0-9_]*)(.*)$").expect("statement regex must compile")
    })
}

/// Reference front-end for the line-oriented script format.
///
/// Each statement becomes `line → command → <kind>` plus one `args` sibling
/// of `command` per `|`-separated argument.
pub fn parse_script(source: &str) -> Result<SyntaxNode, DialogicError> {
    let statement_regex = statement_regex();

    let mut lines = Vec::new();
    let mut last_line = 1usize;
    for (index, raw_line) in source.lines().enumerate() {
        let line_no = index + 1;
        last_line = line_no;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('#') {
            continue;
        }

        let Some(caps) = statement_regex.captures(raw_line) else {
            return Err(DialogicError::with_span(
                "PARSE_ERROR",
                format!("Line {} does not start with a command keyword: \"{}\".", line_no, trimmed),
                SourceSpan::line(line_no, 1, raw_line.len() + 1),
            ));
        };

        let keyword = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        let keyword_start = caps.get(1).map(|m| m.end()).unwrap_or(0) + 1;
        let keyword_span = SourceSpan::line(line_no, keyword_start, keyword_start + keyword.len());
        let rest = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        let rest_offset = keyword_start + keyword.len();

        let mut children = vec![SyntaxNode::branch(
            rules::COMMAND,
            vec![SyntaxNode::leaf(
                statement_kind(keyword),
                keyword,
                keyword_span.clone(),
            )],
            keyword_span,
        )];
        children.extend(split_args(rest, line_no, rest_offset));

        lines.push(SyntaxNode::branch(
            rules::LINE,
            children,
            SourceSpan::line(line_no, 1, raw_line.len() + 1),
        ));
    }

    Ok(SyntaxNode::branch(
        rules::DIALOG,
        lines,
        SourceSpan {
            start: dg_core::SourceLocation { line: 1, column: 1 },
            end: dg_core::SourceLocation {
                line: last_line,
                column: 1,
            },
        },
    ))
}

fn statement_kind(keyword: &str) -> String {
    let lowered = keyword.to_ascii_lowercase();
    match lowered.as_str() {
        "option" => rules::OPT.to_string(),
        _ => lowered,
    }
}

fn split_args(rest: &str, line_no: usize, offset: usize) -> Vec<SyntaxNode> {
    let mut args = Vec::new();
    let mut cursor = 0usize;
    for part in rest.split(ARG_SEPARATOR) {
        let leading = part.len() - part.trim_start().len();
        let value = part.trim();
        if !value.is_empty() {
            let column = offset + cursor + leading;
            args.push(SyntaxNode::leaf(
                rules::ARGS,
                value,
                SourceSpan::line(line_no, column, column + value.len()),
            ));
        }
        cursor += part.len() + ARG_SEPARATOR.len_utf8();
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg_texts(line: &SyntaxNode) -> Vec<String> {
        line.children_of_kind(rules::ARGS)
            .map(|node| node.full_text())
            .collect()
    }

    #[test]
    fn statement_regex_is_compiled_once() {
        assert!(std::ptr::eq(statement_regex(), statement_regex()));
        let first = parse_script("Say one").expect("script should parse");
        let second = parse_script("Say two").expect("script should parse");
        assert_eq!(first.children.len(), second.children.len());
    }

    #[test]
    fn parse_script_builds_line_command_args_shape() {
        let tree = parse_script("Chat intro\nSay Hello there\n").expect("script should parse");
        assert_eq!(tree.kind, rules::DIALOG);
        assert_eq!(tree.children.len(), 2);

        let say_line = &tree.children[1];
        assert_eq!(say_line.kind, rules::LINE);
        assert_eq!(say_line.children[0].kind, rules::COMMAND);
        assert_eq!(say_line.children[0].children[0].kind, rules::SAY);
        assert_eq!(arg_texts(say_line), vec!["Hello there".to_string()]);
        assert_eq!(say_line.location.start.line, 2);
    }

    #[test]
    fn parse_script_splits_arguments_on_pipe() {
        let tree = parse_script("Opt Sure | accept\nSay a|b|  \n").expect("script should parse");
        assert_eq!(
            arg_texts(&tree.children[0]),
            vec!["Sure".to_string(), "accept".to_string()]
        );
        assert_eq!(
            arg_texts(&tree.children[1]),
            vec!["a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn parse_script_records_argument_columns() {
        let tree = parse_script("Say  Hi").expect("script should parse");
        let arg = tree.children[0]
            .children_of_kind(rules::ARGS)
            .next()
            .expect("arg");
        assert_eq!(arg.location.start.column, 6);
    }

    #[test]
    fn parse_script_skips_blank_and_comment_lines() {
        let tree = parse_script("\n// note\n# heading\n   \nWait 10\n").expect("script should parse");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].children[0].children[0].kind, rules::WAIT);
    }

    #[test]
    fn parse_script_normalizes_keywords() {
        let tree = parse_script("SAY x\ngoto intro\nOption y\nDance now").expect("script should parse");
        let kinds = tree
            .children
            .iter()
            .map(|line| line.children[0].children[0].kind.clone())
            .collect::<Vec<_>>();
        assert_eq!(kinds, vec!["say", "goto", "opt", "dance"]);
    }

    #[test]
    fn parse_script_rejects_lines_without_keyword() {
        let error = parse_script("Say ok\n42 apples").expect_err("numeric keyword should fail");
        assert_eq!(error.code, "PARSE_ERROR");
        assert_eq!(error.span.expect("span").start.line, 2);
    }
}
