use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use semsim::config::{
    CountsSource, OntologyConfig, PhenodigmConfig, SimConfig, SubsetConfig, DEFAULT_CUTOFF,
    DEFAULT_PREDICATE,
};
use semsim::enums::{OntologySource, DEFAULT_KGOBO_VERSION};
use semsim::error::SemsimError;
use semsim::phenodigm::make_phenodigm;
use semsim::process_ontology::{get_similarities, get_subset_similarities};
use semsim::utils::split_comma_list;

#[derive(Parser)]
#[command(name = "semsim")]
#[command(about = "Semantic similarity over ontology graphs", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute Resnik and Jaccard scores for all pairs of terms in an ontology
    Sim {
        /// Ontology name, e.g. HP or MP
        ontology: String,

        /// Minimum Resnik score to keep a pair
        #[arg(short, long, default_value_t = DEFAULT_CUTOFF)]
        cutoff: f64,

        /// Directory for the score tables
        #[arg(short, long, env = "SEMSIM_OUTPUT_DIR", default_value = "data")]
        output_dir: PathBuf,

        /// Annotation table used for term frequencies
        #[arg(short, long)]
        annot_file: Option<PathBuf>,

        /// Column of the annotation table holding term ids
        #[arg(long)]
        annot_col: Option<String>,

        /// Use the published HPO annotation file for term frequencies
        #[arg(long)]
        remote_annotations: bool,

        /// Comma-delimited prefixes of the terms to compare
        #[arg(short, long)]
        prefixes: Option<String>,

        /// Use this node as the only root for Jaccard scores
        #[arg(short = 'n', long)]
        root_node: Option<String>,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Compute scores for every pair of the given terms
    Somesim {
        ontology: String,

        /// Comma-delimited term ids, e.g. HP:0500167,MP:0004731
        #[arg(short, long, required = true)]
        participants: String,

        #[arg(short, long)]
        annot_file: Option<PathBuf>,

        #[arg(long)]
        annot_col: Option<String>,

        #[arg(long)]
        remote_annotations: bool,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Join same-ontology score tables into a cross-ontology phenodigm file
    Phenodigm {
        #[arg(short, long)]
        resnik_file: PathBuf,

        #[arg(short, long)]
        jaccard_file: PathBuf,

        /// Equivalence mapping with p1 and p2 columns
        #[arg(short, long, default_value = "data/upheno_mapping_all.csv")]
        mapping: PathBuf,

        #[arg(short, long, default_value_t = DEFAULT_CUTOFF)]
        cutoff: f64,

        /// The two prefixes to join, e.g. HP,MP
        #[arg(short, long)]
        prefixes: String,

        #[arg(short, long, env = "SEMSIM_OUTPUT_DIR", default_value = "data")]
        output_dir: PathBuf,
    },
}

/// Where the ontology graph is read from. Defaults to the KG-OBO download.
#[derive(Args)]
struct SourceArgs {
    /// Edge predicate to keep
    #[arg(short = 'r', long, default_value = DEFAULT_PREDICATE)]
    predicate: String,

    /// KG-OBO release to download
    #[arg(long, default_value = DEFAULT_KGOBO_VERSION)]
    kgobo_version: String,

    /// Local KGX tar.gz archive
    #[arg(long, conflicts_with_all = ["nodes", "semsql"])]
    archive: Option<PathBuf>,

    /// Local KGX nodes table
    #[arg(long, requires = "edges", conflicts_with = "semsql")]
    nodes: Option<PathBuf>,

    /// Local KGX edges table
    #[arg(long, requires = "nodes")]
    edges: Option<PathBuf>,

    /// Local semsql sqlite database
    #[arg(long)]
    semsql: Option<PathBuf>,

    /// Download cache, defaults to the system temp directory
    #[arg(long, env = "SEMSIM_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
}

impl SourceArgs {
    fn into_config(self, ontology: &str) -> OntologyConfig {
        let source = match (self.archive, self.nodes, self.edges, self.semsql) {
            (Some(archive), ..) => OntologySource::Archive(archive),
            (_, Some(nodes), Some(edges), _) => OntologySource::Tables { nodes, edges },
            (.., Some(semsql)) => OntologySource::SemSql(semsql),
            _ => OntologySource::Registry {
                version: self.kgobo_version,
            },
        };
        let cache_dir = self
            .cache_dir
            .unwrap_or_else(|| std::env::temp_dir().join("semsim"));
        OntologyConfig::new(ontology, &self.predicate, source, cache_dir)
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "semsim=debug" } else { "semsim=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Sim {
            ontology,
            cutoff,
            output_dir,
            annot_file,
            annot_col,
            remote_annotations,
            prefixes,
            root_node,
            source,
        } => {
            let counts = CountsSource::from_options(annot_file, annot_col, remote_annotations)?;
            let config = SimConfig::new(
                source.into_config(&ontology),
                cutoff,
                output_dir,
                counts,
                prefixes.as_deref().map(split_comma_list).unwrap_or_default(),
                root_node,
            )?;
            get_similarities(&config)
                .with_context(|| format!("Could not compute similarities for {ontology}"))
        }
        Commands::Somesim {
            ontology,
            participants,
            annot_file,
            annot_col,
            remote_annotations,
            source,
        } => {
            let counts = CountsSource::from_options(annot_file, annot_col, remote_annotations)?;
            let config = SubsetConfig::new(
                source.into_config(&ontology),
                split_comma_list(&participants),
                counts,
            )?;
            let similarities = get_subset_similarities(&config)
                .with_context(|| format!("Could not compute similarities for {ontology}"))?;
            for ((term1, term2), (resnik, jaccard)) in similarities.iter() {
                println!("{term1}\t{term2}\t{resnik}\t{jaccard}");
            }
            Ok(true)
        }
        Commands::Phenodigm {
            resnik_file,
            jaccard_file,
            mapping,
            cutoff,
            prefixes,
            output_dir,
        } => {
            let config = PhenodigmConfig::new(
                cutoff,
                jaccard_file,
                resnik_file,
                mapping,
                output_dir,
                &split_comma_list(&prefixes),
            )?;
            let report = make_phenodigm(&config).context("Could not build phenodigm file")?;
            println!("{}", report.outpath.display());
            Ok(true)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            // self-loops are an input problem, not a crash
            let self_loops = e
                .downcast_ref::<SemsimError>()
                .filter(|err| matches!(err, SemsimError::SelfLoops { .. }));
            if let Some(err) = self_loops {
                eprintln!("{err}");
            } else {
                eprintln!("Error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}
