use std::collections::BTreeMap;
use std::path::PathBuf;

use dg_compiler::{lower_dialog_with_options, LowerOptions, LowerOutput};
use dg_core::{Dialog, DialogicError, Value};
use dg_parser::{parse_script, parse_tree_xml};
use dg_runtime::{DialogEngine, EngineOptions, Sleeper};

#[derive(Default)]
pub struct CreateEngineOptions {
    pub source: String,
    pub lower: LowerOptions,
    pub globals: BTreeMap<String, Value>,
    pub log_path: Option<PathBuf>,
    pub sleeper: Option<Box<dyn Sleeper>>,
    pub max_steps: Option<usize>,
}

pub fn compile_dialog_from_source(source: &str) -> Result<Dialog, DialogicError> {
    compile_with_options(source, LowerOptions::default()).map(|output| output.dialog)
}

pub fn compile_with_options(
    source: &str,
    options: LowerOptions,
) -> Result<LowerOutput, DialogicError> {
    let tree = parse_script(source)?;
    lower_dialog_with_options(&tree, options)
}

pub fn compile_dialog_from_xml_tree(source: &str) -> Result<Dialog, DialogicError> {
    let tree = parse_tree_xml(source)?;
    lower_dialog_with_options(&tree, LowerOptions::default()).map(|output| output.dialog)
}

/// Compiles `options.source` and returns an idle engine plus any lowering
/// diagnostics.
pub fn create_engine_from_source(
    options: CreateEngineOptions,
) -> Result<(DialogEngine, LowerOutput), DialogicError> {
    let output = compile_with_options(&options.source, options.lower)?;
    let engine = DialogEngine::new(
        output.dialog.clone(),
        EngineOptions {
            globals: options.globals,
            log_path: options.log_path,
            sleeper: options.sleeper,
            max_steps: options.max_steps,
        },
    );
    Ok((engine, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_compiler::ArityPolicy;
    use dg_core::Command;
    use dg_runtime::{EngineState, RunOutcome};

    struct NoSleep;

    impl Sleeper for NoSleep {
        fn sleep(&mut self, _duration: std::time::Duration) {}
    }

    #[test]
    fn compile_dialog_from_source_runs_parser_and_lowering() {
        let dialog = compile_dialog_from_source("Chat intro\nSay Hello\n").expect("compile");
        assert_eq!(dialog.events.len(), 2);
        assert_eq!(dialog.chat_names(), vec!["intro"]);
    }

    #[test]
    fn compile_errors_keep_their_codes() {
        let parse = compile_dialog_from_source("123").expect_err("parse error");
        assert_eq!(parse.code, "PARSE_ERROR");
        let lower = compile_dialog_from_source("Opt x").expect_err("lower error");
        assert_eq!(lower.code, "LOWER_OPT_WITHOUT_ASK");
        let xml = compile_dialog_from_xml_tree("<dialog>").expect_err("xml error");
        assert_eq!(xml.code, "XML_PARSE_ERROR");
    }

    #[test]
    fn compile_dialog_from_xml_tree_lowers_imported_tree() {
        let dialog = compile_dialog_from_xml_tree(
            "<dialog><line><command><do/></command><args>wave</args></line></dialog>",
        )
        .expect("compile");
        assert_eq!(
            dialog.events,
            vec![Command::Do {
                action: "wave".to_string()
            }]
        );
    }

    #[test]
    fn create_engine_from_source_applies_options() {
        let (mut engine, output) = create_engine_from_source(CreateEngineOptions {
            source: "Chat c\nSay hi $name | extra\nWait 500\nAsk Go?\nOpt yes\n".to_string(),
            lower: LowerOptions {
                arity_policy: ArityPolicy::Skip,
            },
            globals: [("name".to_string(), Value::from("Ada"))].into_iter().collect(),
            sleeper: Some(Box::new(NoSleep)),
            ..CreateEngineOptions::default()
        })
        .expect("engine should build");

        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.globals().get("name"), Some(&Value::from("Ada")));

        let outcome = engine.run().expect("run");
        assert!(matches!(outcome, RunOutcome::AwaitingChoice(ref pending) if pending.prompt == "Go?"));
        assert_eq!(engine.choose(0).expect("choose"), RunOutcome::Completed);
    }
}
