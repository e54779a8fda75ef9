#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use jabkit::ops;

#[derive(Debug, Parser)]
#[command(name = "jabkit", version, about = "JAB archive and hotfix descriptor reader")]
struct Cli {
    /// Log every extracted entry.
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Inspect or extract a .jab file, or every .jab below a directory.
    Jab {
        /// Archive file or directory.
        input: PathBuf,
        /// Extract entries into this directory instead of only writing metadata.
        #[arg(long)]
        extract: Option<PathBuf>,
        /// Metadata JSON path (single file only). Defaults to <input>.jabmeta.json.
        #[arg(long)]
        json: Option<PathBuf>,
        /// Extraction worker threads (0 = one per core).
        #[arg(long, default_value_t = 0)]
        jobs: usize,
    },

    /// Decode a hotfix descriptor container into JSON.
    Hotfix {
        /// Compressed hotfix container.
        input: PathBuf,
        /// Output file; the extension is replaced with .json.
        output: PathBuf,
    },
}

fn init_logging(verbose: bool, quiet: bool) {
    let default = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let res = match cli.cmd {
        Command::Jab {
            input,
            extract,
            json,
            jobs,
        } => ops::run_jab(&input, extract.as_deref(), json.as_deref(), jobs).map(|summary| {
            if !summary.failed.is_empty() {
                tracing::warn!("{} archive(s) failed", summary.failed.len());
            }
        }),
        Command::Hotfix { input, output } => ops::run_hotfix(&input, &output).map(|_| ()),
    };

    if let Err(e) = res {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
