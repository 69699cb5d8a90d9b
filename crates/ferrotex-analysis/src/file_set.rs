//! Parsed documents and the queries the analyses run over them.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::PathBuf;

use ferrotex_package::commands::{
    is_command_definition, is_environment_definition, PACKAGE_COMMANDS,
};
use ferrotex_syntax::{parse, SyntaxError, TextRange};
use indexmap::{IndexMap, IndexSet};
use once_cell::sync::OnceCell;

use crate::error::AnalysisError;
use crate::options::optional_parameter_map;
use crate::text::{split_to_ranges, PARAMETER_SPLIT};
use crate::usage::{collect_commands, collect_environments, CommandUsage, EnvironmentUsage};

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
    pub commands: Vec<CommandUsage>,
    pub environments: Vec<EnvironmentUsage>,
    pub errors: Vec<SyntaxError>,
}

impl Document {
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        let path = path.into();
        let text = text.into();
        let result = parse(&text);
        let root = result.syntax();
        let commands = collect_commands(&root);
        let environments = collect_environments(&root);
        log::trace!(
            "Parsed {:?}: {} commands, {} environments, {} syntax errors",
            path,
            commands.len(),
            environments.len(),
            result.errors.len()
        );
        Self {
            path,
            text,
            commands,
            environments,
            errors: result.errors,
        }
    }

    pub fn previous_command(&self, usage: &CommandUsage) -> Option<&CommandUsage> {
        usage.previous.and_then(|index| self.commands.get(index))
    }

    /// The command defined by `usage`, if `usage` is a definition such as
    /// `\newcommand{\foo}{...}` or `\def\foo{...}`.
    pub fn command_definition<'a>(
        &'a self,
        document: usize,
        usage: &'a CommandUsage,
    ) -> Option<CommandDefinition<'a>> {
        if !is_command_definition(&usage.name) {
            return None;
        }

        // The body is whatever the container holds after the defined name.
        let (name, name_range, container, excluded) = match usage.first_required_parameter() {
            Some(param) => {
                let name = param.interior().trim();
                if !name.starts_with('\\') {
                    return None;
                }
                (name.to_string(), param.range(), usage, Some(param.range()))
            }
            // \def\foo{...}: the defined command is the next token
            None => {
                let target = self
                    .commands
                    .get(usage.index + 1)
                    .filter(|next| next.range.start() == usage.range.end())?;
                (target.name.clone(), target.range, target, None)
            }
        };

        let body = self
            .commands
            .get(container.index + 1..)
            .unwrap_or_default()
            .iter()
            .take_while(|c| container.range.contains_range(c.range))
            .filter(|c| excluded.is_none_or(|range| !range.contains_range(c.range)))
            .collect();

        Some(CommandDefinition {
            document,
            definition: usage,
            name,
            name_range,
            body,
        })
    }
}

/// A user definition of a command.
#[derive(Debug, Clone)]
pub struct CommandDefinition<'a> {
    pub document: usize,
    /// The defining usage, e.g. `\newcommand`.
    pub definition: &'a CommandUsage,
    /// Defined command, with backslash.
    pub name: String,
    /// Where the defined name is written.
    pub name_range: TextRange,
    /// Commands invoked by the definition body.
    pub body: Vec<&'a CommandUsage>,
}

impl CommandDefinition<'_> {
    /// True if `usage` is the command this definition is defining, as opposed
    /// to an ordinary use of it.
    pub fn defines(&self, usage: &CommandUsage) -> bool {
        self.name == usage.name && self.name_range.contains_range(usage.range)
    }
}

/// One package named by `\usepackage` or `\RequirePackage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageImport {
    pub name: String,
    pub options: IndexMap<String, String>,
    pub document: usize,
    pub usage: usize,
}

/// The documents of one project. The first document is the root file.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    documents: Vec<Document>,
    indexing: bool,
    fingerprint: OnceCell<u64>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        Self {
            documents: documents.into_iter().collect(),
            ..Self::default()
        }
    }

    /// A file set with a single root document.
    pub fn single(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self::from_documents([Document::parse(path, text)])
    }

    /// Adds a document and returns its id.
    pub fn push(&mut self, document: Document) -> usize {
        self.documents.push(document);
        self.fingerprint = OnceCell::new();
        self.documents.len() - 1
    }

    /// Replaces a document after its source changed.
    pub fn replace(&mut self, id: usize, document: Document) {
        if let Some(slot) = self.documents.get_mut(id) {
            *slot = document;
            self.fingerprint = OnceCell::new();
        }
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn document(&self, id: usize) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn root(&self) -> Result<&Document, AnalysisError> {
        self.documents.first().ok_or(AnalysisError::MainFileMissing)
    }

    /// Marks the set as still being indexed by the host.
    pub fn set_indexing(&mut self, indexing: bool) {
        self.indexing = indexing;
    }

    pub fn ensure_ready(&self) -> Result<(), AnalysisError> {
        if self.indexing {
            Err(AnalysisError::IndexNotReady)
        } else {
            Ok(())
        }
    }

    /// All command usages with the id of their document.
    pub fn commands(&self) -> impl Iterator<Item = (usize, &CommandUsage)> {
        self.documents
            .iter()
            .enumerate()
            .flat_map(|(id, doc)| doc.commands.iter().map(move |usage| (id, usage)))
    }

    pub fn environments(&self) -> impl Iterator<Item = (usize, &EnvironmentUsage)> {
        self.documents
            .iter()
            .enumerate()
            .flat_map(|(id, doc)| doc.environments.iter().map(move |env| (id, env)))
    }

    pub fn package_imports(&self) -> Vec<PackageImport> {
        let mut imports = Vec::new();
        for (document, usage) in self.commands() {
            if !PACKAGE_COMMANDS.contains(&usage.name.as_str()) {
                continue;
            }
            let Some(param) = usage.first_required_parameter() else {
                continue;
            };
            let options = optional_parameter_map(usage.optional_parameters());
            let interior = param.interior();
            for range in split_to_ranges(interior, &PARAMETER_SPLIT) {
                let name = interior[range].trim();
                if !name.is_empty() {
                    imports.push(PackageImport {
                        name: name.to_string(),
                        options: options.clone(),
                        document,
                        usage: usage.index,
                    });
                }
            }
        }
        imports
    }

    /// Names of the packages imported anywhere in the set.
    pub fn included_packages(&self) -> IndexSet<String> {
        self.package_imports()
            .into_iter()
            .map(|import| import.name)
            .collect()
    }

    pub fn definitions(&self) -> Vec<CommandDefinition<'_>> {
        self.documents
            .iter()
            .enumerate()
            .flat_map(|(id, doc)| {
                doc.commands
                    .iter()
                    .filter_map(move |usage| doc.command_definition(id, usage))
            })
            .collect()
    }

    /// Definitions and redefinitions of the user command `name`.
    pub fn command_definitions(&self, name: &str) -> Vec<CommandDefinition<'_>> {
        self.definitions()
            .into_iter()
            .filter(|definition| definition.name == name)
            .collect()
    }

    /// Environments defined or redefined in the set.
    pub fn defined_environments(&self) -> IndexSet<String> {
        self.commands()
            .filter(|(_, usage)| is_environment_definition(&usage.name))
            .filter_map(|(_, usage)| usage.first_required_parameter())
            .map(|param| param.interior().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }

    /// Changes whenever a command definition is added, removed or changes
    /// the commands its body invokes.
    pub fn definition_fingerprint(&self) -> u64 {
        *self.fingerprint.get_or_init(|| {
            let mut hasher = DefaultHasher::new();
            for definition in self.definitions() {
                definition.name.hash(&mut hasher);
                for command in &definition.body {
                    command.name.hash(&mut hasher);
                }
            }
            hasher.finish()
        })
    }
}
