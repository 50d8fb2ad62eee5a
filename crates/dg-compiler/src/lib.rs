use dg_core::{AskOption, Command, CommandKind, Dialog, DialogicError, SourceSpan, Value};
use dg_parser::{rules, SyntaxNode};

mod statement;

pub use statement::StatementKind;

/// What to do with a fixed-arity statement whose argument count is wrong.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArityPolicy {
    /// Fail the whole script with `LOWER_ARITY_MISMATCH`.
    #[default]
    Abort,
    /// Drop the statement and record a [`Diagnostic`].
    Skip,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LowerOptions {
    pub arity_policy: ArityPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: String,
    pub message: String,
    pub location: SourceSpan,
}

#[derive(Debug, Clone)]
pub struct LowerOutput {
    pub dialog: Dialog,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn lower_dialog(root: &SyntaxNode) -> Result<Dialog, DialogicError> {
    lower_dialog_with_options(root, LowerOptions::default()).map(|output| output.dialog)
}

pub fn lower_dialog_with_options(
    root: &SyntaxNode,
    options: LowerOptions,
) -> Result<LowerOutput, DialogicError> {
    if !root.is(rules::DIALOG) {
        return Err(malformed(
            format!("Expected <{}> at the root, found <{}>.", rules::DIALOG, root.kind),
            root,
        ));
    }

    let mut lowerer = Lowerer {
        options,
        dialog: Dialog::new(),
        diagnostics: Vec::new(),
    };
    lowerer.visit(root, None, None)?;

    Ok(LowerOutput {
        dialog: lowerer.dialog,
        diagnostics: lowerer.diagnostics,
    })
}

struct Lowerer {
    options: LowerOptions,
    dialog: Dialog,
    diagnostics: Vec<Diagnostic>,
}

impl Lowerer {
    fn visit(
        &mut self,
        node: &SyntaxNode,
        parent: Option<&SyntaxNode>,
        grandparent: Option<&SyntaxNode>,
    ) -> Result<(), DialogicError> {
        match node.kind.as_str() {
            rules::DIALOG => {
                if parent.is_some() {
                    return Err(malformed("Nested <dialog> is not allowed.", node));
                }
            }
            rules::LINE => {
                if !parent.is_some_and(|p| p.is(rules::DIALOG)) {
                    return Err(malformed("<line> must be a direct child of <dialog>.", node));
                }
                let commands = node.children_of_kind(rules::COMMAND).count();
                if commands != 1 {
                    return Err(malformed(
                        format!("<line> must hold exactly one <command>, found {}.", commands),
                        node,
                    ));
                }
            }
            rules::COMMAND => {
                if !parent.is_some_and(|p| p.is(rules::LINE)) {
                    return Err(malformed("<command> must be a direct child of <line>.", node));
                }
                if node.children.len() != 1 {
                    return Err(malformed(
                        format!(
                            "<command> must wrap exactly one statement, found {}.",
                            node.children.len()
                        ),
                        node,
                    ));
                }
            }
            rules::ARGS => {
                if !parent.is_some_and(|p| p.is(rules::LINE)) {
                    return Err(malformed("<args> must be a direct child of <line>.", node));
                }
                return Ok(());
            }
            kind => {
                let Some(statement) = StatementKind::from_rule(kind) else {
                    return Err(DialogicError::with_span(
                        "LOWER_UNKNOWN_CONSTRUCT",
                        format!("No command is mapped to <{}>.", kind),
                        node.location.clone(),
                    ));
                };
                let line = match (parent, grandparent) {
                    (Some(p), Some(g)) if p.is(rules::COMMAND) && g.is(rules::LINE) => g,
                    _ => {
                        return Err(malformed(
                            format!("'{}' must sit inside <line><command>.", statement),
                            node,
                        ))
                    }
                };
                return self.lower_statement(statement, node, line);
            }
        }

        for child in &node.children {
            self.visit(child, Some(node), parent)?;
        }
        Ok(())
    }

    fn lower_statement(
        &mut self,
        kind: StatementKind,
        node: &SyntaxNode,
        line: &SyntaxNode,
    ) -> Result<(), DialogicError> {
        let args = collect_args(line);
        let expected = kind.expected_args();
        if expected > 0 && args.len() != expected {
            let message = format!(
                "'{}' expects {} args, but got {}: '{}'",
                kind,
                expected,
                args.len(),
                args.join(", ")
            );
            return match self.options.arity_policy {
                ArityPolicy::Abort => Err(DialogicError::with_span(
                    "LOWER_ARITY_MISMATCH",
                    message,
                    line.location.clone(),
                )),
                ArityPolicy::Skip => {
                    tracing::warn!(
                        line = line.location.start.line,
                        "skipping statement: {}",
                        message
                    );
                    self.diagnostics.push(Diagnostic {
                        code: "LOWER_ARITY_MISMATCH".to_string(),
                        message,
                        location: line.location.clone(),
                    });
                    Ok(())
                }
            };
        }

        let command = match kind {
            StatementKind::Say => Command::Say {
                text: args[0].clone(),
            },
            StatementKind::Wait => Command::Wait {
                millis: parse_duration(&args[0], line)?,
            },
            StatementKind::Do => Command::Do {
                action: args[0].clone(),
            },
            StatementKind::Chat => {
                let name = args[0].clone();
                if self.dialog.chat_index(&name).is_some() {
                    return Err(DialogicError::with_span(
                        "LOWER_DUPLICATE_CHAT",
                        format!("Chat \"{}\" is declared more than once.", name),
                        line.location.clone(),
                    ));
                }
                Command::Chat { name }
            }
            StatementKind::Ask => {
                let Some((prompt, extra)) = args.split_first() else {
                    return Err(DialogicError::with_span(
                        "LOWER_ASK_PROMPT_MISSING",
                        "'Ask' requires a prompt argument.",
                        line.location.clone(),
                    ));
                };
                Command::Ask {
                    prompt: prompt.clone(),
                    options: extra
                        .iter()
                        .map(|label| AskOption::new(label.clone(), None))
                        .collect(),
                }
            }
            StatementKind::Opt => return self.attach_option(args, line),
            StatementKind::Goto => Command::Gotu {
                target: args[0].clone(),
            },
            StatementKind::Set => {
                let (name, value) = parse_assignment(&args[0], line)?;
                Command::Set { name, value }
            }
        };

        tracing::trace!(line = node.location.start.line, "lowered {}", command);
        self.dialog.add_event(command);
        Ok(())
    }

    fn attach_option(&mut self, args: Vec<String>, line: &SyntaxNode) -> Result<(), DialogicError> {
        let Some(index) = self.dialog.last_index_of(CommandKind::Ask) else {
            return Err(DialogicError::with_span(
                "LOWER_OPT_WITHOUT_ASK",
                "Opt must be preceded by Ask",
                line.location.clone(),
            ));
        };

        let option = match args.as_slice() {
            [label] => AskOption::new(label.clone(), None),
            [label, target] => AskOption::new(label.clone(), Some(target.clone())),
            _ => {
                return Err(DialogicError::with_span(
                    "LOWER_OPT_ARITY",
                    format!(
                        "'Opt' expects 1 or 2 args, but got {}: '{}'",
                        args.len(),
                        args.join(", ")
                    ),
                    line.location.clone(),
                ))
            }
        };

        if let Some(Command::Ask { options, .. }) = self.dialog.event_mut(index) {
            options.push(option);
        }
        Ok(())
    }
}

/// Arguments are the `args` siblings of the statement's `command` node.
fn collect_args(line: &SyntaxNode) -> Vec<String> {
    line.children_of_kind(rules::ARGS)
        .map(|node| node.full_text().trim().to_string())
        .collect()
}

fn parse_duration(raw: &str, line: &SyntaxNode) -> Result<u64, DialogicError> {
    raw.trim().parse::<u64>().map_err(|_| {
        DialogicError::with_span(
            "LOWER_WAIT_DURATION_INVALID",
            format!(
                "'Wait' expects a non-negative integer duration, got \"{}\".",
                raw
            ),
            line.location.clone(),
        )
    })
}

fn parse_assignment(raw: &str, line: &SyntaxNode) -> Result<(String, Value), DialogicError> {
    let invalid = || {
        DialogicError::with_span(
            "LOWER_SET_ASSIGNMENT_INVALID",
            format!("'Set' expects name=value, got \"{}\".", raw),
            line.location.clone(),
        )
    };

    let (name, value) = raw.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();
    let name = name.strip_prefix('$').unwrap_or(name);
    if name.is_empty() || name.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok((name.to_string(), Value::parse_literal(value)))
}

fn malformed(message: impl Into<String>, node: &SyntaxNode) -> DialogicError {
    DialogicError::with_span("LOWER_MALFORMED_TREE", message, node.location.clone())
}
