//! Commands and environments used without importing the package providing
//! them.

use ferrotex_package::{Package, PackageGraph, SchemaRegistry};
use ferrotex_syntax::{TextRange, TextSize};
use indexmap::IndexSet;

use crate::error::AnalysisError;
use crate::file_set::{Document, FileSet};
use crate::fix::ImportFix;
use crate::settings::AnalysisSettings;
use crate::usage::{CommandUsage, EnvironmentUsage};

/// Length of `\begin{`, which precedes an environment name.
const BEGIN_PREFIX: TextSize = TextSize::new(7);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProblemKind {
    MissingCommandImport,
    MissingEnvironmentImport,
}

/// A usage whose package is missing, with the imports that would fix it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemReport {
    pub kind: ProblemKind,
    pub document: usize,
    /// Absolute range in the document.
    pub range: TextRange,
    pub message: String,
    /// One fix per package that provides the usage.
    pub fixes: Vec<ImportFix>,
}

pub struct MissingImportAnalyzer<'a> {
    registry: &'a SchemaRegistry,
    graph: &'a PackageGraph,
    enabled: bool,
}

impl<'a> MissingImportAnalyzer<'a> {
    pub fn new(registry: &'a SchemaRegistry, graph: &'a PackageGraph) -> Self {
        Self {
            registry,
            graph,
            enabled: true,
        }
    }

    pub fn with_settings(mut self, settings: &AnalysisSettings) -> Self {
        self.enabled = settings.automatic_dependency_check;
        self
    }

    /// Reports for every document of the set: command reports first, then
    /// environment reports, each in source order.
    pub fn analyze(&self, file_set: &FileSet) -> Result<Vec<ProblemReport>, AnalysisError> {
        self.run(file_set, None)
    }

    /// Reports for one document. Imports anywhere in the set count.
    pub fn analyze_document(
        &self,
        file_set: &FileSet,
        document: usize,
    ) -> Result<Vec<ProblemReport>, AnalysisError> {
        self.run(file_set, Some(document))
    }

    fn run(&self, file_set: &FileSet, scope: Option<usize>) -> Result<Vec<ProblemReport>, AnalysisError> {
        if !self.enabled {
            return Ok(Vec::new());
        }
        file_set.ensure_ready()?;

        let included = file_set.included_packages();
        let (mut reports, environment_reports) = rayon::join(
            || self.command_pass(file_set, scope, &included),
            || self.environment_pass(file_set, scope, &included),
        );
        log::debug!(
            "{} command and {} environment import problems",
            reports.len(),
            environment_reports.len()
        );
        reports.extend(environment_reports);
        Ok(reports)
    }

    fn command_pass(
        &self,
        file_set: &FileSet,
        scope: Option<usize>,
        included: &IndexSet<String>,
    ) -> Vec<ProblemReport> {
        documents_in(file_set, scope)
            .flat_map(|(id, document)| {
                document
                    .commands
                    .iter()
                    .filter_map(move |usage| self.check_command(id, document, usage, included))
            })
            .collect()
    }

    fn check_command(
        &self,
        id: usize,
        document: &Document,
        usage: &CommandUsage,
        included: &IndexSet<String>,
    ) -> Option<ProblemReport> {
        if is_being_defined(id, document, usage) {
            log::trace!("{} is being defined", usage.name);
            return None;
        }

        let schemas = self.registry.lookup_command(usage.base_name());
        let dependencies: IndexSet<&Package> = schemas
            .iter()
            .filter_map(|schema| schema.dependency.as_ref())
            .collect();
        if dependencies.is_empty() || dependencies.iter().any(|package| package.is_default()) {
            return None;
        }
        if dependencies
            .iter()
            .any(|package| self.graph.is_loaded_by_any(&package.name, included))
        {
            log::trace!("{} is provided through another package", usage.name);
            return None;
        }
        if dependencies
            .iter()
            .any(|package| included.contains(&package.name))
        {
            return None;
        }

        let shortest = schemas
            .iter()
            .map(|schema| schema.command.len())
            .min()
            .unwrap_or_default();
        let names: Vec<&str> = dependencies.iter().map(|package| package.name.as_str()).collect();
        Some(ProblemReport {
            kind: ProblemKind::MissingCommandImport,
            document: id,
            range: TextRange::at(usage.offset(), TextSize::from(shortest as u32 + 1)),
            message: format!("Command requires {} package", alternatives(&names)),
            fixes: dependencies
                .into_iter()
                .map(|package| ImportFix::new(package.clone()))
                .collect(),
        })
    }

    fn environment_pass(
        &self,
        file_set: &FileSet,
        scope: Option<usize>,
        included: &IndexSet<String>,
    ) -> Vec<ProblemReport> {
        let defined = file_set.defined_environments();
        documents_in(file_set, scope)
            .flat_map(|(id, document)| {
                let defined = &defined;
                document
                    .environments
                    .iter()
                    .filter(move |env| !defined.contains(&env.name))
                    .filter_map(move |env| self.check_environment(id, env, included))
            })
            .collect()
    }

    fn check_environment(
        &self,
        id: usize,
        env: &EnvironmentUsage,
        included: &IndexSet<String>,
    ) -> Option<ProblemReport> {
        let package = self.registry.environment(&env.name)?.dependency.as_ref()?;
        if package.is_default()
            || included.contains(&package.name)
            || self.graph.is_loaded_by_any(&package.name, included)
        {
            return None;
        }

        Some(ProblemReport {
            kind: ProblemKind::MissingEnvironmentImport,
            document: id,
            range: TextRange::at(env.range.start() + BEGIN_PREFIX, TextSize::of(env.name.as_str())),
            message: format!("Environment requires {} package", package.name),
            fixes: vec![ImportFix::new(package.clone())],
        })
    }
}

/// Runs the missing-import analysis over the whole set, or nothing at all
/// when `enabled` is false.
pub fn analyze_missing_imports(
    file_set: &FileSet,
    registry: &SchemaRegistry,
    graph: &PackageGraph,
    enabled: bool,
) -> Result<Vec<ProblemReport>, AnalysisError> {
    let settings = AnalysisSettings {
        automatic_dependency_check: enabled,
    };
    MissingImportAnalyzer::new(registry, graph)
        .with_settings(&settings)
        .analyze(file_set)
}

fn documents_in(file_set: &FileSet, scope: Option<usize>) -> impl Iterator<Item = (usize, &Document)> {
    file_set
        .documents()
        .iter()
        .enumerate()
        .filter(move |(id, _)| scope.is_none_or(|wanted| wanted == *id))
}

/// Only the usage right before is considered, so `\foo` in
/// `\newcommand{\foo}` is exempt, but not a `\foo` deeper in some definition.
fn is_being_defined(id: usize, document: &Document, usage: &CommandUsage) -> bool {
    document
        .previous_command(usage)
        .and_then(|previous| document.command_definition(id, previous))
        .is_some_and(|definition| definition.defines(usage))
}

/// `a`, `a or b`, `a, b or c`.
fn alternatives(names: &[&str]) -> String {
    match names.split_last() {
        None => String::new(),
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}
