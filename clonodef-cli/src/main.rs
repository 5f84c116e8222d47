use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use clonodef_core::NumberingScheme;
use std::path::PathBuf;

mod commands;
mod config;
mod error;

use config::Config;
use error::{print_error_and_exit, CliError};

#[derive(Parser)]
#[command(name = "clonodef")]
#[command(about = "clonodef - Redefine clonotypes by a chosen set of columns")]
#[command(version)]
#[command(long_about = "
clonodef drives the clonotype redefinition block outside of the platform UI.
It resolves dataset and clonotype-definition options from a metadata snapshot,
reports numbering availability and run statistics, and runs the helper steps
that prepare FASTA and numbering-region tables.

Examples:
  clonodef options --snapshot pool.json --anchor mixcr:abundance
  clonodef outputs --snapshot pool.json --args args.json --stats stats.tsv
  clonodef label 'CDR3 aa' 'Best V gene'
  clonodef fasta --input assembling.tsv --output assembling.fasta
  clonodef numbering --input vdj.tsv --h-csv anarci_H.csv --output regions.tsv --scheme kabat
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a clonotype count report (two-line TSV)
    Stats {
        /// Report file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Compute the default block label from column labels
    Label {
        /// Labels of the selected clonotype-definition columns, in order
        labels: Vec<String>,
    },

    /// List dataset options and, with --anchor, clonotype-definition options
    Options {
        /// Metadata snapshot (JSON, optionally gzipped)
        #[arg(long)]
        snapshot: PathBuf,

        /// Selected dataset as blockId:name
        #[arg(long)]
        anchor: Option<String>,
    },

    /// Check whether antibody numbering can be offered for a dataset
    NumberingAvailable {
        /// Metadata snapshot (JSON, optionally gzipped)
        #[arg(long)]
        snapshot: PathBuf,

        /// Selected dataset as blockId:name
        #[arg(long)]
        anchor: String,
    },

    /// Compute every block output for the given arguments
    Outputs {
        /// Metadata snapshot (JSON, optionally gzipped)
        #[arg(long)]
        snapshot: PathBuf,

        /// Block arguments (JSON)
        #[arg(long)]
        args: Option<PathBuf>,

        /// Selected dataset as blockId:name, overrides the arguments file
        #[arg(long)]
        anchor: Option<String>,

        /// Clonotype count report produced by the engine
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Treat the engine as still running
        #[arg(long)]
        running: bool,
    },

    /// Export assembling-feature sequences to FASTA
    Fasta {
        /// Assembling-feature table (TSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Output FASTA file
        #[arg(short, long)]
        output: PathBuf,

        /// Key column (defaults to the configured key column)
        #[arg(long)]
        key_column: Option<String>,

        /// Final clonotypes CSV restricting the exported keys
        #[arg(long)]
        final_clonotypes: Option<PathBuf>,
    },

    /// Build the numbering-region table from ANARCI outputs
    Numbering {
        /// VDJRegion table (TSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Output table (TSV)
        #[arg(short, long)]
        output: PathBuf,

        /// Numbering scheme (defaults to the configured scheme)
        #[arg(long)]
        scheme: Option<SchemeArg>,

        /// ANARCI CSV of the heavy chain
        #[arg(long)]
        h_csv: Option<PathBuf>,

        /// ANARCI CSV of the light chains
        #[arg(long)]
        kl_csv: Option<PathBuf>,

        /// CDR annotation codes of the heavy chain (JSON object)
        #[arg(long)]
        cdr_mapping_h: Option<String>,

        /// CDR annotation codes of the light chains (JSON object)
        #[arg(long)]
        cdr_mapping_kl: Option<String>,
    },

    /// Print or write an example configuration file
    Config {
        /// Write the example to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SchemeArg {
    Imgt,
    Kabat,
    Chothia,
}

impl From<SchemeArg> for NumberingScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Imgt => NumberingScheme::Imgt,
            SchemeArg::Kabat => NumberingScheme::Kabat,
            SchemeArg::Chothia => NumberingScheme::Chothia,
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Stats { input } => commands::stats::execute(input)?,

        Commands::Label { labels } => commands::label::execute(labels)?,

        Commands::Options { snapshot, anchor } => commands::options::execute(snapshot, anchor)?,

        Commands::NumberingAvailable { snapshot, anchor } => {
            commands::numbering_available::execute(snapshot, anchor)?
        }

        Commands::Outputs {
            snapshot,
            args,
            anchor,
            stats,
            running,
        } => commands::outputs::execute(&config, snapshot, args, anchor, stats, running)?,

        Commands::Fasta {
            input,
            output,
            key_column,
            final_clonotypes,
        } => commands::fasta::execute(&config, input, output, key_column, final_clonotypes)?,

        Commands::Numbering {
            input,
            output,
            scheme,
            h_csv,
            kl_csv,
            cdr_mapping_h,
            cdr_mapping_kl,
        } => commands::numbering::execute(
            &config,
            input,
            output,
            scheme.map(NumberingScheme::from),
            h_csv,
            kl_csv,
            cdr_mapping_h,
            cdr_mapping_kl,
        )?,

        Commands::Config { output } => commands::example_config::execute(output)?,
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet)?;

    if let Err(err) = run(cli) {
        if let Some(cli_err) = err.downcast_ref::<CliError>() {
            print_error_and_exit(cli_err);
        }
        return Err(err);
    }

    Ok(())
}
