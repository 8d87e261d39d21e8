use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use scorepipe::state::{
    DEFAULT_PLAYERS_FILE, DEFAULT_STARTGG_FILE, DEFAULT_WEB_DIR, DEFAULT_WEB_PORT,
};
use scorepipe_peer::MarkerMode;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the GUI and serve its requests until it exits.
    Run(RunArgs),
    /// Encode values as one message on stdout.
    Encode(EncodeArgs),
    /// Decode messages from stdin and print them.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Encode(args) => encode::run(args),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
pub enum MarkerModeArg {
    /// `["async-start", marker]` messages.
    #[default]
    Framed,
    /// Bare `marker` lines, for older GUI scripts.
    Line,
}

impl From<MarkerModeArg> for MarkerMode {
    fn from(arg: MarkerModeArg) -> Self {
        match arg {
            MarkerModeArg::Framed => MarkerMode::Framed,
            MarkerModeArg::Line => MarkerMode::Line,
        }
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Tcl interpreter to launch.
    #[arg(long, env = "SCOREPIPE_INTERPRETER", default_value = "tclsh")]
    pub interpreter: PathBuf,
    /// Argument passed to the interpreter (repeatable).
    #[arg(
        long = "interpreter-arg",
        value_name = "ARG",
        env = "SCOREPIPE_INTERPRETER_ARGS",
        value_delimiter = ' ',
        allow_hyphen_values = true,
        default_values_t = [String::from("-encoding"), String::from("utf-8")]
    )]
    pub interpreter_args: Vec<String>,
    /// GUI script the interpreter sources.
    #[arg(long, env = "SCOREPIPE_SCRIPT", default_value = "tcl/main.tcl")]
    pub script: PathBuf,
    /// Directory served to the overlay and holding state.json.
    #[arg(long, env = "SCOREPIPE_WEB_DIR", default_value = DEFAULT_WEB_DIR)]
    pub web_dir: PathBuf,
    /// Loopback port for the overlay server.
    #[arg(long, env = "SCOREPIPE_WEB_PORT", default_value_t = DEFAULT_WEB_PORT)]
    pub web_port: u16,
    /// Do not start the overlay server.
    #[arg(long, env = "SCOREPIPE_NO_WEB")]
    pub no_web: bool,
    /// Player roster file.
    #[arg(long, env = "SCOREPIPE_PLAYERS_FILE", default_value = DEFAULT_PLAYERS_FILE)]
    pub players_file: PathBuf,
    /// start.gg credentials file.
    #[arg(long, env = "SCOREPIPE_STARTGG_FILE", default_value = DEFAULT_STARTGG_FILE)]
    pub startgg_file: PathBuf,
    /// How async-start markers are sent to the GUI.
    #[arg(long, env = "SCOREPIPE_MARKER_MODE", value_enum, default_value_t = MarkerModeArg::Framed)]
    pub marker_mode: MarkerModeArg,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Values to encode, in order. None encodes the empty message.
    #[arg(allow_hyphen_values = true)]
    pub values: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Maximum outer frame size in bytes.
    #[arg(long, default_value_t = scorepipe_frame::DEFAULT_MAX_PAYLOAD)]
    pub max_payload: usize,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
