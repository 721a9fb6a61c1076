use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use converter::errors::ErrorCode;
use converter::loader::read_xml_input;
use converter::telemetry::{init_telemetry, TelemetryConfig};
use converter::{convert, output_file_name, ConversionError, ConversionParams, Metadata};

/// Epic used when no source provides one.
const DEFAULT_EPIC: &str = "JAICP";

#[derive(Parser)]
#[command(name = "converter")]
#[command(about = "Converts test-case XML into CSV for test-management import", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Converts an XML file into CSV
    Convert {
        /// Path to the XML file, or `-` for stdin
        #[arg(short, long)]
        file: PathBuf,

        /// Output CSV path, or `-` for stdout. Defaults to `<input name>.csv`
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON file with metadata fields
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// File name used for Suite/Story fallbacks (defaults to the input's name)
        #[arg(long)]
        file_name: Option<String>,

        #[command(flatten)]
        fields: MetadataArgs,
    },
    /// Checks the XML structure without producing CSV
    Validate {
        /// Path to the XML file, or `-` for stdin
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Args, Default)]
struct MetadataArgs {
    #[arg(long)]
    tag: Option<String>,
    #[arg(long)]
    link: Option<String>,
    #[arg(long)]
    parameter: Option<String>,
    #[arg(long)]
    lead: Option<String>,
    #[arg(long)]
    owner: Option<String>,
    #[arg(long)]
    suite: Option<String>,
    #[arg(long)]
    component: Option<String>,
    #[arg(long)]
    story: Option<String>,
    #[arg(long)]
    feature: Option<String>,
    /// Defaults to JAICP when no other source sets it
    #[arg(long)]
    epic: Option<String>,
}

impl MetadataArgs {
    fn into_metadata(self) -> Metadata {
        Metadata {
            tag: self.tag.unwrap_or_default(),
            link: self.link.unwrap_or_default(),
            parameter: self.parameter.unwrap_or_default(),
            lead: self.lead.unwrap_or_default(),
            owner: self.owner.unwrap_or_default(),
            suite: self.suite.unwrap_or_default(),
            component: self.component.unwrap_or_default(),
            story: self.story.unwrap_or_default(),
            feature: self.feature.unwrap_or_default(),
            epic: self.epic.unwrap_or_default(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = TelemetryConfig::from_env().with_verbosity(cli.verbose);
    if let Err(e) = init_telemetry(telemetry) {
        eprintln!("Failed to initialise logging: {e:#}");
    }

    let result = match cli.command {
        Commands::Convert {
            file,
            output,
            metadata,
            file_name,
            fields,
        } => run_convert(&file, output.as_deref(), metadata.as_deref(), file_name, fields),
        Commands::Validate { file } => run_validate(&file),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_failure(&e),
    }
}

fn run_convert(
    file: &Path,
    output: Option<&Path>,
    metadata_file: Option<&Path>,
    file_name: Option<String>,
    fields: MetadataArgs,
) -> Result<()> {
    let params = build_params(file, metadata_file, file_name, fields)?;
    let xml = read_xml_input(file).with_context(|| ErrorCode::INPUT_NOT_READABLE.to_string())?;

    let csv = convert(&xml, &params)?;

    let target = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_path(file, params.file_name.as_deref()));

    if target == Path::new("-") {
        std::io::stdout()
            .write_all(&csv)
            .context("Failed to write CSV to stdout")?;
    } else {
        fs::write(&target, &csv).with_context(|| format!("Failed to write CSV {:?}", target))?;
        info!(path = ?target, "CSV saved");
    }
    Ok(())
}

fn run_validate(file: &Path) -> Result<()> {
    let xml = read_xml_input(file).with_context(|| ErrorCode::INPUT_NOT_READABLE.to_string())?;
    let doc = converter::load_and_validate(&xml)?;
    let count = doc.root.descendants(converter::validation::TEST_CASE_ELEMENT).len();
    println!("OK: {count} test case(s)");
    Ok(())
}

/// defaults < metadata file < environment < flags
fn build_params(
    file: &Path,
    metadata_file: Option<&Path>,
    file_name: Option<String>,
    fields: MetadataArgs,
) -> Result<ConversionParams> {
    let mut params = match metadata_file {
        Some(path) => ConversionParams::from_json_file(path)
            .with_context(|| ErrorCode::INVALID_METADATA.to_string())?,
        None => ConversionParams::default(),
    };

    params.metadata.overlay(&ConversionParams::from_env().metadata);
    params.metadata.overlay(&fields.into_metadata());

    if params.metadata.epic.is_empty() {
        params.metadata.epic = DEFAULT_EPIC.to_string();
    }

    if let Some(name) = file_name {
        params.file_name = Some(name);
    } else if params.file_name.is_none() && file != Path::new("-") {
        params.file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
    }

    Ok(params)
}

/// `<input dir>/<input stem>.csv`, or `conversion-result.csv` for stdin.
fn default_output_path(file: &Path, file_name: Option<&str>) -> PathBuf {
    let name = output_file_name(file_name);
    match file.parent() {
        Some(dir) if file != Path::new("-") => dir.join(name),
        _ => PathBuf::from(name),
    }
}

fn report_failure(e: &anyhow::Error) -> ExitCode {
    match e.downcast_ref::<ConversionError>() {
        Some(conversion) => {
            error!(code = %conversion.code(), "Conversion failed");
            eprintln!("{}", conversion.user_message());
            match conversion {
                ConversionError::StructuralValidation(_) => ExitCode::from(2),
                _ => ExitCode::from(1),
            }
        }
        None => {
            eprintln!("{e:#}");
            ExitCode::from(1)
        }
    }
}
