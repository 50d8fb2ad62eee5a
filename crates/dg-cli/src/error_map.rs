use dg_core::DialogicError;
use std::fmt::Display;

fn map_error(code: &'static str, error: impl Display) -> DialogicError {
    DialogicError::new(code, error.to_string())
}

pub(crate) fn emit_error(error: DialogicError) -> i32 {
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", error.code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&error.message).unwrap_or_default()
    );
    if let Some(span) = error.span {
        println!("ERROR_LINE:{}", span.start.line);
    }
    1
}

pub(crate) fn map_cli_script_read(error: std::io::Error) -> DialogicError {
    map_error("CLI_SCRIPT_READ", error)
}

pub(crate) fn map_cli_output(error: std::io::Error) -> DialogicError {
    map_error("CLI_OUTPUT", error)
}

pub(crate) fn map_cli_input(error: std::io::Error) -> DialogicError {
    map_error("CLI_INPUT", error)
}

pub(crate) fn map_cli_json(error: serde_json::Error) -> DialogicError {
    map_error("CLI_JSON", error)
}
