use clap::Parser;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "MDCentro - clusters MD replicate ensembles in PCA space, extracts the centroid structure of every system, and judges whether one centroid represents the ensemble.",
    help_template = HELP_TEMPLATE,
)]
pub struct Cli {
    // --- Core Arguments ---
    /// Directory containing one sub-directory per system (e.g. MD_wt, MD_mut).
    #[arg(short = 'b', long, required = true, value_name = "DIR")]
    pub base_folder: PathBuf,

    /// Reference structure (PDB) whose backbone defines the superposition frame.
    #[arg(short = 'r', long, required = true, value_name = "PATH")]
    pub ref_pdb: PathBuf,

    /// Directory for plots, centroid structures and the summary table.
    #[arg(short = 'o', long, required = true, value_name = "DIR")]
    pub out_folder: PathBuf,

    /// Largest backbone RMSD (Angstrom) to the k=1 centroid still judged acceptable.
    #[arg(short = 'm', long, value_name = "FLOAT")]
    pub max_rmsd: Option<f64>,

    // --- Configuration ---
    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S clustering.seed=7
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,

    // --- Logging & Resources ---
    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, value_name = "NUM")]
    pub threads: Option<usize>,
}
