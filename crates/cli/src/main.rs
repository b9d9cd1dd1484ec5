// introcheck - verify intro detection results of a media server plugin

mod compare;
mod exit_codes;
mod generate;
mod html;
mod settings;
mod validate;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use introcheck_client::ClientError;
use introcheck_report::ReportError;

use exit_codes::{
    EXIT_ERROR, EXIT_REPORT_INPUT, EXIT_SERVER, EXIT_SUCCESS, EXIT_UNAUTHORIZED, EXIT_USAGE,
};
use settings::Settings;

#[derive(Parser)]
#[command(name = "introcheck")]
#[command(about = "Generate, compare and validate intro detection reports")]
#[command(version)]
#[command(after_help = "\
Settings file:
  <config dir>/introcheck/config.toml, keys: address, api_key,
  poll_interval_secs, output_dir. Flags and environment variables win.")]
struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ServerArgs {
    /// Server address including scheme
    #[arg(long, env = "INTROCHECK_ADDRESS")]
    address: Option<String>,

    /// Administrator API key
    #[arg(long, env = "INTROCHECK_API_KEY", hide_env_values = true)]
    key: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture every intro from a server into a report file
    #[command(after_help = "\
Examples:
  introcheck generate --address http://127.0.0.1:8096 --key api_key
  introcheck generate --address https://example.com --key api_key --poll 20 -o example.json")]
    Generate {
        #[command(flatten)]
        server: ServerArgs,

        /// Keep the current timestamps instead of erasing and reanalyzing
        #[arg(long)]
        keep: bool,

        /// Seconds between analysis task status requests [default: 10]
        #[arg(long, value_name = "SECS")]
        poll: Option<u64>,

        /// Report destination [default: intros-ADDRESS-TIMESTAMP.json]
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Compare two previously generated reports
    #[command(after_help = "\
Examples:
  introcheck compare v0.1.5.json v0.1.6.json
  introcheck compare v0.1.5.json v0.1.6.json --json -o diff.json --fail-on-regression")]
    Compare {
        /// Previous report
        old: PathBuf,

        /// Current report
        new: PathBuf,

        /// Page destination [default: report-TIMESTAMP.html]
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write the comparison as JSON instead of HTML
        #[arg(long)]
        json: bool,

        /// Exit 3 if any episode lost its intro or moved beyond tolerance
        #[arg(long)]
        fail_on_regression: bool,
    },

    /// Validate the intro API schema for some episode ids
    #[command(after_help = "\
Examples:
  introcheck validate --address http://127.0.0.1:8096 --key api_key id1,id2,id3")]
    Validate {
        #[command(flatten)]
        server: ServerArgs,

        /// Comma separated episode ids
        #[arg(value_delimiter = ',', required = true)]
        ids: Vec<String>,
    },
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            if record.level() <= log::Level::Warn {
                let level = record.level().as_str().to_lowercase();
                writeln!(buf, "{}: {}", level, record.args())
            } else {
                writeln!(buf, "{}", record.args())
            }
        })
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate { server, keep, poll, output } => {
            let args = generate::GenerateArgs {
                address: settings.address(server.address)?,
                api_key: settings.api_key(server.key)?,
                keep,
                poll: settings.poll_interval(poll),
                output,
            };
            let path = generate::run(args, &settings)?;
            println!("Report path:       {}", path.display());
        }
        Commands::Compare { old, new, output, json, fail_on_regression } => {
            let args = compare::CompareArgs { old, new, output, json, fail_on_regression };
            let path = compare::run(args, &settings)?;
            println!("Report path:   {}", path.display());
        }
        Commands::Validate { server, ids } => {
            let args = validate::ValidateArgs {
                address: settings.address(server.address)?,
                api_key: settings.api_key(server.key)?,
                ids,
            };
            validate::run(args)?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    init_logging();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn report_input(msg: impl Into<String>) -> Self {
        Self { code: EXIT_REPORT_INPUT, message: msg.into(), hint: None }
    }

    /// Report loading failure. Schema violations are mapped by `validate`.
    pub fn report(err: ReportError) -> Self {
        let hint = match &err {
            ReportError::MissingInput(_) => {
                Some("is this a file written by `introcheck generate`?".to_string())
            }
            _ => None,
        };
        Self { code: EXIT_REPORT_INPUT, message: err.to_string(), hint }
    }

    /// Create error from a server client error with the matching exit code.
    pub fn client(err: ClientError) -> Self {
        let (code, hint) = match &err {
            ClientError::Unauthorized => {
                (EXIT_UNAUTHORIZED, Some("check API key validity and try again".to_string()))
            }
            ClientError::Network(_) => {
                (EXIT_SERVER, Some("is the server running and the address correct?".to_string()))
            }
            ClientError::TaskNotFound => (
                EXIT_SERVER,
                Some("is the intro skipper plugin installed and enabled?".to_string()),
            ),
            ClientError::Http(_, _) | ClientError::Parse(_) => (EXIT_SERVER, None),
            ClientError::Io(_) => (EXIT_ERROR, None),
        };
        Self { code, message: err.to_string(), hint }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
