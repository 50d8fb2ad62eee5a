use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::ffi::OsString;
use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use dg_api::{compile_with_options, create_engine_from_source, CreateEngineOptions};
use dg_compiler::{ArityPolicy, Diagnostic, LowerOptions};
use dg_core::{DialogicError, Value};
use dg_runtime::RunOutcome;

mod cli_args;
mod console;
mod error_map;

pub(crate) use cli_args::{CheckArgs, Cli, Mode, RunArgs};
pub(crate) use console::{ConsolePrinter, SharedOut};
pub(crate) use error_map::{
    emit_error, map_cli_input, map_cli_json, map_cli_output, map_cli_script_read,
};

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    let out: SharedOut = Rc::new(RefCell::new(Box::new(io::stdout())));
    let stdin = io::stdin();
    let mut input = stdin.lock();
    match run(cli, &mut input, &out) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli, input: &mut dyn BufRead, out: &SharedOut) -> Result<i32, DialogicError> {
    match cli.command {
        Mode::Check(args) => run_check(args, out),
        Mode::Run(args) => run_play(args, input, out),
    }
}

pub(crate) fn run_check(args: CheckArgs, out: &SharedOut) -> Result<i32, DialogicError> {
    let source = read_script(&args.script)?;
    let output = compile_with_options(&source, lower_options(args.skip_arity))?;
    emit_diagnostics(&output.diagnostics, out)?;

    emit(out, "RESULT:OK")?;
    if args.json {
        let json = serde_json::to_string(&output.dialog).map_err(map_cli_json)?;
        emit(out, format!("DIALOG_JSON:{}", json))?;
        return Ok(0);
    }

    emit(out, format!("CHATS:{}", output.dialog.chat_names().join(",")))?;
    for (index, command) in output.dialog.events.iter().enumerate() {
        emit(out, format!("EVENT:{}:{}", index, command))?;
    }
    Ok(0)
}

pub(crate) fn run_play(
    args: RunArgs,
    input: &mut dyn BufRead,
    out: &SharedOut,
) -> Result<i32, DialogicError> {
    let source = read_script(&args.script)?;
    let (mut engine, output) = create_engine_from_source(CreateEngineOptions {
        source,
        lower: lower_options(args.skip_arity),
        globals: parse_vars(&args.vars)?,
        log_path: (!args.no_log).then(|| PathBuf::from(&args.log)),
        ..CreateEngineOptions::default()
    })?;
    emit_diagnostics(&output.diagnostics, out)?;

    engine.subscribe(ConsolePrinter {
        out: out.clone(),
        json: args.json,
    });

    let mut scripted = args.choices.into_iter().collect::<VecDeque<_>>();
    let mut outcome = match &args.chat {
        Some(chat) => engine.run_chat(chat)?,
        None => engine.run()?,
    };

    loop {
        match outcome {
            RunOutcome::Completed => {
                emit(out, "RESULT:OK")?;
                return Ok(0);
            }
            RunOutcome::Halted => {
                emit(out, "RESULT:HALTED")?;
                return Ok(0);
            }
            RunOutcome::AwaitingChoice(pending) => {
                let choice = match scripted.pop_front() {
                    Some(index) => Some(index),
                    None => read_choice(input, out, pending.options.len())?,
                };
                let Some(index) = choice else {
                    emit(out, "RESULT:STOPPED")?;
                    return Ok(0);
                };
                outcome = engine.choose(index)?;
            }
        }
    }
}

/// Prompts until a valid index arrives. `None` on end of input or when the
/// Ask has no options to pick from.
fn read_choice(
    input: &mut dyn BufRead,
    out: &SharedOut,
    option_count: usize,
) -> Result<Option<usize>, DialogicError> {
    if option_count == 0 {
        return Ok(None);
    }
    loop {
        {
            let mut writer = out.borrow_mut();
            write!(writer, "CHOICE> ").map_err(map_cli_output)?;
            writer.flush().map_err(map_cli_output)?;
        }

        let mut line = String::new();
        if input.read_line(&mut line).map_err(map_cli_input)? == 0 {
            emit(out, "")?;
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(index) if index < option_count => return Ok(Some(index)),
            _ => emit(
                out,
                format!("Enter a number between 0 and {}.", option_count - 1),
            )?,
        }
    }
}

fn read_script(path: &str) -> Result<String, DialogicError> {
    std::fs::read_to_string(path).map_err(map_cli_script_read)
}

fn lower_options(skip_arity: bool) -> LowerOptions {
    LowerOptions {
        arity_policy: if skip_arity {
            ArityPolicy::Skip
        } else {
            ArityPolicy::Abort
        },
    }
}

pub(crate) fn parse_vars(raw: &[String]) -> Result<BTreeMap<String, Value>, DialogicError> {
    let mut globals = BTreeMap::new();
    for entry in raw {
        let Some((name, value)) = entry.split_once('=') else {
            return Err(DialogicError::new(
                "CLI_VAR_INVALID",
                format!("Expected NAME=VALUE, got \"{}\".", entry),
            ));
        };
        let name = name.trim();
        if name.is_empty() {
            return Err(DialogicError::new(
                "CLI_VAR_INVALID",
                format!("Variable name is empty in \"{}\".", entry),
            ));
        }
        globals.insert(name.to_string(), Value::parse_literal(value));
    }
    Ok(globals)
}

fn emit_diagnostics(diagnostics: &[Diagnostic], out: &SharedOut) -> Result<(), DialogicError> {
    for diagnostic in diagnostics {
        emit(
            out,
            format!(
                "DIAGNOSTIC:{}:{}:{}",
                diagnostic.code, diagnostic.location.start.line, diagnostic.message
            ),
        )?;
    }
    Ok(())
}

fn emit(out: &SharedOut, line: impl Display) -> Result<(), DialogicError> {
    writeln!(out.borrow_mut(), "{}", line).map_err(map_cli_output)
}
