mod commands;
mod output;

use clap::{Parser, Subcommand};
use commands::{OptionArgs, ScorerArgs};
use kte_core::error::ErrorKind;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kte",
    version,
    about = "Header-weighted keyword and phrase extraction"
)]
struct Cli {
    /// Log pipeline stages and backend calls to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract ranked keywords from files or inline text
    Extract {
        /// Input files (.md, .markdown, .txt, .text, .html, .htm, .pdf)
        #[arg(required_unless_present = "text", conflicts_with = "text")]
        files: Vec<PathBuf>,

        /// Extract from this text instead of files
        #[arg(short, long)]
        text: Option<String>,

        /// Structure of --text: auto (default), markdown, html or plain
        #[arg(long, default_value = "auto")]
        input_format: String,

        #[command(flatten)]
        options: OptionArgs,

        #[command(flatten)]
        scorer: ScorerArgs,

        /// Give up on scoring after this many seconds
        #[arg(long, value_name = "SECS")]
        deadline: Option<f64>,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        output: String,

        /// Write JSON results to a file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,

        /// Overwrite the --out file if it already exists
        #[arg(long, requires = "out")]
        force: bool,
    },
    /// Show the headers detected in a document
    Headers {
        /// Input file
        input_file: PathBuf,

        /// Output format: text (default) or json
        #[arg(short, long, default_value = "text")]
        output: String,
    },
    /// Print the effective extraction options as JSON
    Options {
        #[command(flatten)]
        options: OptionArgs,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Options => 2,
        ErrorKind::Input => 3,
        ErrorKind::Scoring => 4,
        ErrorKind::Other => 1,
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Extract {
            files,
            text,
            input_format,
            options,
            scorer,
            deadline,
            output,
            out,
            force,
        } => commands::extract::run(commands::extract::ExtractArgs {
            files,
            text,
            input_format,
            options,
            scorer,
            deadline,
            output,
            out,
            force,
        }),
        Commands::Headers { input_file, output } => commands::headers::run(&input_file, &output),
        Commands::Options { options } => commands::options::run(&options),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(exit_code(e.kind()));
    }
}
