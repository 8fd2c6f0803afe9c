use std::process::ExitCode;
use std::time::Duration;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use enzyme_link::app::App;
use enzyme_link::config::{ConfigLoader, ResolvedConfig};
use enzyme_link::error::LinkError;
use enzyme_link::output::JsonOutput;
use enzyme_link::uniprot::UniprotHttpClient;

#[derive(Parser)]
#[command(name = "enzlink")]
#[command(about = "Link ENZYME EC numbers to UniProt sequences and metadata")]
#[command(version, author)]
struct Cli {
    /// Path to enzlink.json (defaults to ./enzlink.json when present)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Parse the ENZYME flat file into a tidy TSV")]
    Parse(ParseArgs),
    #[command(about = "Explode accession lists into one row per EC/UniProt pair")]
    Explode(ExplodeArgs),
    #[command(about = "Download UniProt sequences and metadata in batches")]
    Download(DownloadArgs),
    #[command(about = "List requested accessions absent from the sequence table")]
    Missing(MissingArgs),
    #[command(about = "Merge ENZYME and UniProt tables into the master table")]
    Merge(MergeArgs),
}

#[derive(Args)]
struct ParseArgs {
    /// Path to enzyme.dat (or enzyme.dat.gz)
    #[arg(long)]
    input: Option<Utf8PathBuf>,

    /// Path to the output raw enzyme TSV
    #[arg(long)]
    output: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct ExplodeArgs {
    /// Path to the raw enzyme TSV
    #[arg(long)]
    input: Option<Utf8PathBuf>,

    /// Path to the output pair TSV
    #[arg(long)]
    output: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct DownloadArgs {
    /// Path to the pair TSV (or a missing-ids TSV for a second pass)
    #[arg(long)]
    input: Option<Utf8PathBuf>,

    /// Path to the output sequence TSV
    #[arg(long)]
    output: Option<Utf8PathBuf>,

    /// Accessions per UniProt request
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Seconds to sleep between requests
    #[arg(long)]
    sleep: Option<f64>,
}

#[derive(Args)]
struct MissingArgs {
    /// Path to the pair TSV
    #[arg(long)]
    pairs: Option<Utf8PathBuf>,

    /// Path to the sequence TSV downloaded so far
    #[arg(long)]
    sequences: Option<Utf8PathBuf>,

    /// Path to the output missing-ids TSV
    #[arg(long)]
    output: Option<Utf8PathBuf>,
}

#[derive(Args)]
struct MergeArgs {
    /// Path to the raw enzyme TSV
    #[arg(long)]
    raw: Option<Utf8PathBuf>,

    /// Path to the pair TSV
    #[arg(long)]
    pairs: Option<Utf8PathBuf>,

    /// Path to the sequence TSV
    #[arg(long)]
    sequences: Option<Utf8PathBuf>,

    /// Path to the output master TSV
    #[arg(long)]
    output: Option<Utf8PathBuf>,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(link) = report.downcast_ref::<LinkError>() {
            return ExitCode::from(map_exit_code(link));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &LinkError) -> u8 {
    match error {
        LinkError::MissingColumn { .. }
        | LinkError::TableRead { .. }
        | LinkError::ConfigRead(_)
        | LinkError::ConfigParse(_) => 2,
        LinkError::UniprotHttp(_) | LinkError::UniprotStatus { .. } => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let resolved = ConfigLoader::resolve(cli.config.as_deref())?;

    let uniprot = UniprotHttpClient::new()?;
    let app = App::new(uniprot);

    match cli.command {
        Commands::Parse(args) => {
            let input = args.input.unwrap_or_else(|| resolved.enzyme_dat());
            let output = args.output.unwrap_or_else(|| resolved.enzyme_raw());
            let result = app.parse(&input, &output)?;
            JsonOutput::print(&result).into_diagnostic()?;
        }
        Commands::Explode(args) => {
            let input = args.input.unwrap_or_else(|| resolved.enzyme_raw());
            let output = args.output.unwrap_or_else(|| resolved.pairs());
            let result = app.explode(&input, &output)?;
            JsonOutput::print(&result).into_diagnostic()?;
        }
        Commands::Download(args) => {
            let input = args.input.unwrap_or_else(|| resolved.pairs());
            let output = args.output.unwrap_or_else(|| resolved.sequences());
            let chunk_size = args.chunk_size.unwrap_or(resolved.chunk_size);
            let sleep = args
                .sleep
                .map(Duration::from_secs_f64)
                .unwrap_or(resolved.sleep);
            let result = app.download(&input, &output, chunk_size, sleep)?;
            JsonOutput::print(&result).into_diagnostic()?;
        }
        Commands::Missing(args) => {
            let pairs = args.pairs.unwrap_or_else(|| resolved.pairs());
            let sequences = args.sequences.unwrap_or_else(|| resolved.sequences());
            let output = args.output.unwrap_or_else(|| resolved.missing());
            let result = app.missing(&pairs, &sequences, &output)?;
            JsonOutput::print(&result).into_diagnostic()?;
        }
        Commands::Merge(args) => {
            let raw = args.raw.unwrap_or_else(|| resolved.enzyme_raw());
            let pairs = args.pairs.unwrap_or_else(|| resolved.pairs());
            let sequences = args.sequences.unwrap_or_else(|| resolved.sequences());
            let output = args.output.unwrap_or_else(|| resolved.master());
            let result = app.merge(&raw, &pairs, &sequences, &output)?;
            JsonOutput::print(&result).into_diagnostic()?;
        }
    }

    Ok(())
}
