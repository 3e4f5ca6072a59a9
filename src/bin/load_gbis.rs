use anyhow::Result;
use clap::Parser;
use gbisgrid::{gbis_to_rasters, ExportParams};
use std::path::PathBuf;

/// Load GBIS inversion result to GeoTIFF format.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Load GBIS inversion result to GeoTIFF format",
    after_help = "example:\n  load_gbis invert_1_2_C.json"
)]
struct Args {
    /// GBIS inversion file (JSON export)
    file: PathBuf,

    /// Output file name (informational, files are named after each interferogram)
    #[arg(short, long = "output")]
    outfile: Option<String>,

    /// Do not render the diagnostic figures
    #[arg(long = "nodisplay")]
    no_display: bool,

    /// Output directory, defaults to the directory of the input file
    #[arg(long)]
    outdir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn export_params(&self) -> ExportParams {
        ExportParams {
            display: !self.no_display,
            output_dir: self.outdir.clone(),
            output_name: self.outfile.clone(),
            ..Default::default()
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let params = args.export_params();
    let file = std::fs::canonicalize(&args.file).unwrap_or(args.file);

    let out_files = gbis_to_rasters(&file, &params)?;
    for path in &out_files {
        println!("{}", path.display());
    }
    Ok(())
}
