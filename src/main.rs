//! memoria - Export content trees to Word documents

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use env_logger::{Builder, Env};
use log::info;

use memoria::{ContentTree, DocxExporter, ExportConfig, TitlePage};

#[derive(Parser)]
#[command(name = "memoria")]
#[command(version, about = "Export content trees to Word documents", long_about = None)]
#[command(after_help = "EXAMPLES:
    memoria tree.json --title \"Vivienda unifamiliar\"
    memoria tree.json out.docx --title \"Nave\" --template plantilla.dotx
    memoria tree.json --title \"Local\" --loe --address \"C/ Mayor 3\"")]
struct Cli {
    /// Content tree (JSON)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file; defaults to a name derived from the title
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Project title for the title page
    #[arg(short, long)]
    title: String,

    /// Word template (.dotx) to export into
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Export configuration (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Intervention type printed on the title page
    #[arg(long, default_value = "")]
    intervention: String,

    /// Mark the project as subject to the LOE
    #[arg(long)]
    loe: bool,

    /// Site address printed on the title page
    #[arg(long)]
    address: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "warn" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = match &cli.config {
        Some(path) => ExportConfig::from_path(path)
            .map_err(|e| format!("{}: {e}", path.display()))?,
        None => ExportConfig::default(),
    };

    let json = std::fs::read(&cli.input).map_err(|e| format!("{}: {e}", cli.input.display()))?;
    let tree = ContentTree::from_json(&json).map_err(|e| e.to_string())?;

    let mut title = TitlePage::new(cli.title.as_str())
        .with_intervention_type(cli.intervention.as_str())
        .with_loe_applicable(cli.loe);
    if let Some(address) = &cli.address {
        title = title.with_address(address.as_str());
    }

    let exporter = DocxExporter::new().with_config(config);
    let output = match &cli.template {
        Some(path) => {
            let template =
                std::fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
            exporter.export_with_template(&tree, &title, &template)
        }
        None => exporter.export(&tree, &title),
    }
    .map_err(|e| e.to_string())?;

    let destination = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&output.file_name));
    std::fs::write(&destination, &output.bytes)
        .map_err(|e| format!("{}: {e}", destination.display()))?;

    info!(
        "Wrote {} ({} bytes{})",
        destination.display(),
        output.bytes.len(),
        if output.used_template { ", from template" } else { "" }
    );
    Ok(())
}
