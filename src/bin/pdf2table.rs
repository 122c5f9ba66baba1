use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use pdf_table_matrix::{
    DEFAULT_GAP_FLOOR, DEFAULT_GAP_MULTIPLIER, DEFAULT_NOISE_FLOOR, DEFAULT_ROW_PROXIMITY,
    ExtractError, ExtractOptions, ExtractionReport, OutputFormat, PageSelection,
    ReconstructionParams, extract_pdf_bytes_to_string, extract_pdf_to_file,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pdf2table",
    version,
    about = "Rebuild tables from the text layer of PDFs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Reconstruct rows and cells and write them out.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input PDF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output path. Writes to stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: csv, tsv or json. Defaults to the output extension, then csv.
    #[arg(long)]
    format: Option<String>,

    /// Page selection like 1-3,5.
    #[arg(long)]
    pages: Option<String>,

    /// CSV delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Emit a col_1..col_n header row.
    #[arg(long)]
    header: bool,

    /// Prefix every row with its page number.
    #[arg(long)]
    page_column: bool,

    /// Keep rows ragged instead of padding them to the widest row.
    #[arg(long)]
    no_pad: bool,

    /// Max vertical distance for fragments to share a row.
    #[arg(long, default_value_t = DEFAULT_ROW_PROXIMITY)]
    row_proximity: f64,

    /// Gaps up to this width are treated as kerning.
    #[arg(long, default_value_t = DEFAULT_NOISE_FLOOR)]
    noise_floor: f64,

    /// Multiplier applied to the median gap of a page.
    #[arg(long, default_value_t = DEFAULT_GAP_MULTIPLIER)]
    gap_multiplier: f64,

    /// Minimum gap that separates two cells.
    #[arg(long, default_value_t = DEFAULT_GAP_FLOOR)]
    gap_floor: f64,

    /// Print every collected warning.
    #[arg(short, long)]
    verbose: bool,
}

fn resolve_format(args: &ExtractArgs) -> Result<OutputFormat> {
    if let Some(name) = args.format.as_deref() {
        return OutputFormat::from_str(name)
            .map_err(|error| anyhow!(error))
            .context("failed to parse --format");
    }

    Ok(args
        .output
        .as_deref()
        .and_then(OutputFormat::from_path)
        .unwrap_or(OutputFormat::Csv))
}

fn parse_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    let pages = args
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid page selection: {error}"))
        .context("failed to parse --pages")?;

    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    Ok(ExtractOptions {
        pages,
        format: resolve_format(args)?,
        delimiter: args.delimiter as u8,
        header: args.header,
        include_page: args.page_column,
        pad_rows: !args.no_pad,
        params: ReconstructionParams {
            row_proximity: args.row_proximity,
            noise_floor: args.noise_floor,
            gap_multiplier: args.gap_multiplier,
            gap_floor: args.gap_floor,
            ..ReconstructionParams::default()
        },
    })
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} page={:?}: {}",
                warning.code, warning.page, warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<ExtractionReport> {
    let options = parse_options(args)?;

    if let Some(output) = &args.output {
        return extract_pdf_to_file(&args.input, output, &options)
            .with_context(|| format!("failed to extract tables from '{}'", args.input.display()));
    }

    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;
    let (rendered, report) = extract_pdf_bytes_to_string(&bytes, &options)
        .with_context(|| format!("failed to extract tables from '{}'", args.input.display()))?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(rendered.as_bytes())
        .and_then(|()| stdout.flush())
        .context("failed to write to stdout")?;
    Ok(report)
}

/// Pages that make the PDF backend panic are already recovered and reported
/// as warnings, so their panic message goes to the debug log, not stderr.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let from_pdf_backend = info.location().is_some_and(|location| {
            let file = location.file();
            file.contains("pdf-extract") || file.contains("lopdf")
        });
        if from_pdf_backend {
            tracing::debug!(%info, "recovered panic inside PDF text extraction");
        } else {
            default_hook(info);
        }
    }));
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("pdf_table_matrix=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
    install_panic_hook();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => match run_extract(&args) {
            Ok(report) => {
                log_report(&report, args.verbose);
                ExitCode::SUCCESS
            }
            Err(error)
                if matches!(
                    error.downcast_ref::<ExtractError>(),
                    Some(ExtractError::NoTabularText)
                ) =>
            {
                eprintln!(
                    "error: no tabular text found in '{}'; \
                     it may be a scanned image without a text layer, try OCR first",
                    args.input.display()
                );
                ExitCode::from(2)
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
