use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "dialogic")]
#[command(about = "Compile and play branching dialogue scripts")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Parse and lower a script, then print its events.
    Check(CheckArgs),
    /// Play a script on the console.
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub(crate) struct CheckArgs {
    #[arg(long = "script")]
    pub(crate) script: String,
    #[arg(long = "json")]
    pub(crate) json: bool,
    #[arg(long = "skip-arity")]
    pub(crate) skip_arity: bool,
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    #[arg(long = "script")]
    pub(crate) script: String,
    #[arg(long = "chat")]
    pub(crate) chat: Option<String>,
    #[arg(long = "log", default_value = "dia.log", conflicts_with = "no_log")]
    pub(crate) log: String,
    #[arg(long = "no-log")]
    pub(crate) no_log: bool,
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub(crate) vars: Vec<String>,
    /// Option indexes consumed before falling back to stdin.
    #[arg(long = "choice")]
    pub(crate) choices: Vec<usize>,
    #[arg(long = "json")]
    pub(crate) json: bool,
    #[arg(long = "skip-arity")]
    pub(crate) skip_arity: bool,
}
