use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use ferrotex_analysis::{
    default_index_programs, AliasRegistry, AnalysisSettings, MissingImportAnalyzer,
    ReferenceResolver,
};
use ferrotex_package::scanner::PackageScanner;
use ferrotex_package::{PackageGraph, PackageIndex, SchemaRegistry};

mod project;
mod report;

use report::{JsonIndexProgram, JsonUsage, Locator};

#[derive(Parser)]
#[command(name = "ferrotex")]
#[command(about = "FerroTeX CLI tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report commands and environments whose package is not imported
    Check {
        /// Path to the .tex file
        #[arg(value_name = "FILE")]
        path: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
        /// JSON file with analysis settings
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Skip the missing-import analysis
        #[arg(long)]
        no_dependency_check: bool,
        #[command(flatten)]
        knowledge: KnowledgeArgs,
    },
    /// List the labels, files, URLs and definitions each command refers to
    References {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[command(flatten)]
        knowledge: KnowledgeArgs,
    },
    /// Detect the index and glossary programs the project needs
    IndexPrograms {
        #[arg(value_name = "FILE")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Index the packages of the TeX distribution
    ScanPackages {
        /// Distribution root, found automatically when omitted
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
        /// Where to write the index, the user cache by default
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct KnowledgeArgs {
    /// JSON overlay with extra command schemas, environments, loads and conflicts
    #[arg(long, value_name = "FILE")]
    registry: Vec<PathBuf>,
    /// Package index written by `scan-packages`
    #[arg(long, value_name = "FILE")]
    package_cache: Option<PathBuf>,
}

impl KnowledgeArgs {
    fn load(&self) -> anyhow::Result<(SchemaRegistry, PackageGraph)> {
        let mut registry = SchemaRegistry::builtin();
        let mut graph = PackageGraph::builtin();
        for path in &self.registry {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            registry
                .merge_json(&json)
                .with_context(|| format!("Invalid registry overlay {}", path.display()))?;
            graph
                .merge_json(&json)
                .with_context(|| format!("Invalid package graph in {}", path.display()))?;
        }
        if let Some(path) = &self.package_cache {
            let index = PackageIndex::load_from_path(path)
                .with_context(|| format!("No package index at {}", path.display()))?;
            registry.extend_from_index(&index);
            graph.extend_from_index(&index);
        }
        Ok((registry, graph))
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Check {
            path,
            json,
            config,
            no_dependency_check,
            knowledge,
        } => {
            let mut settings = match config {
                Some(config) => load_settings(config)?,
                None => AnalysisSettings::default(),
            };
            if *no_dependency_check {
                settings.automatic_dependency_check = false;
            }
            let (registry, graph) = knowledge.load()?;
            let file_set = project::load_project(path, &registry)?;
            let reports = MissingImportAnalyzer::new(&registry, &graph)
                .with_settings(&settings)
                .analyze(&file_set)?;

            let mut locator = Locator::new(&file_set);
            if *json {
                let problems: Vec<_> = reports
                    .iter()
                    .filter_map(|report| report::problem_json(&mut locator, report))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&problems)?);
            } else {
                for report in &reports {
                    if let Some(text) = report::problem_text(&mut locator, report) {
                        println!("{}", text);
                    }
                }
            }
        }
        Commands::References { path, knowledge } => {
            let (registry, _) = knowledge.load()?;
            let file_set = project::load_project(path, &registry)?;
            let aliases = AliasRegistry::new();
            let resolver = ReferenceResolver::new(&registry, &aliases, &file_set);

            let mut locator = Locator::new(&file_set);
            let mut usages = Vec::new();
            for (id, usage) in file_set.commands() {
                let references = resolver.resolve(usage)?;
                if references.is_empty() {
                    continue;
                }
                let Some(document) = file_set.document(id) else {
                    continue;
                };
                let Some(location) = locator.locate(id, usage.name_range()) else {
                    continue;
                };
                usages.push(JsonUsage {
                    location,
                    command: usage.name.clone(),
                    references: references
                        .iter()
                        .map(|reference| report::reference_json(usage, &document.text, reference))
                        .collect(),
                });
            }
            println!("{}", serde_json::to_string_pretty(&usages)?);
        }
        Commands::IndexPrograms { path, json } => {
            let file_set = project::load_project(path, &SchemaRegistry::builtin())?;
            let perl_available = which::which("perl").is_ok();
            log::debug!("Perl available: {}", perl_available);
            let programs = default_index_programs(&file_set, perl_available)?;
            if *json {
                let programs: Vec<_> = programs
                    .into_iter()
                    .map(|program| JsonIndexProgram {
                        program,
                        executable: program.executable(),
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&programs)?);
            } else {
                for program in programs {
                    println!("{} ({})", program, program.executable());
                }
            }
        }
        Commands::ScanPackages { root, output } => {
            let scanner = match root {
                Some(root) => PackageScanner::with_root(root),
                None => PackageScanner::new(),
            };
            let index = scanner.scan()?;
            match output {
                Some(output) => index.save_to_path(output)?,
                None => index.save_to_cache()?,
            }
            println!("Indexed {} packages", index.packages.len());
        }
    }
    Ok(())
}

fn load_settings(path: &Path) -> anyhow::Result<AnalysisSettings> {
    let json =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid settings in {}", path.display()))
}
