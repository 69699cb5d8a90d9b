//! Argument schemas: what a command expects and which package provides it.

use crate::{Package, PackageIndex};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid registry document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("file argument `{argument}` of \\{command} declares no extensions")]
    EmptyExtensions { command: String, argument: String },
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Accepted extensions of a file-valued argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileArgument {
    pub extensions: Vec<String>,
    /// Appended when the written path has no extension.
    pub default_extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredArgument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileArgument>,
    /// Whether the argument holds a comma separated list, as in
    /// `\usepackage{amsmath,amssymb}`.
    #[serde(default = "comma_separated_default")]
    pub comma_separated: bool,
}

fn comma_separated_default() -> bool {
    true
}

impl RequiredArgument {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file: None,
            comma_separated: true,
        }
    }

    /// A file argument. The first extension doubles as the default one.
    pub fn file(name: impl Into<String>, extensions: &[&str]) -> Self {
        let extensions: Vec<String> = extensions.iter().map(|e| e.to_string()).collect();
        Self {
            name: name.into(),
            file: Some(FileArgument {
                default_extension: extensions.first().cloned().unwrap_or_default(),
                extensions,
            }),
            comma_separated: true,
        }
    }

    pub fn single(mut self) -> Self {
        self.comma_separated = false;
        self
    }

    pub fn is_file(&self) -> bool {
        self.file.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Argument {
    Required(RequiredArgument),
    Optional { name: String },
}

impl Argument {
    pub fn optional(name: impl Into<String>) -> Self {
        Argument::Optional { name: name.into() }
    }

    pub fn as_required(&self) -> Option<&RequiredArgument> {
        match self {
            Argument::Required(required) => Some(required),
            Argument::Optional { .. } => None,
        }
    }
}

impl From<RequiredArgument> for Argument {
    fn from(required: RequiredArgument) -> Self {
        Argument::Required(required)
    }
}

/// One known signature of a command.
///
/// A command may have several schemas, e.g. `\url` is provided by both `url`
/// and `hyperref`. `dependency` is `None` when the providing package is not
/// known; such a schema never asks for an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentSchema {
    /// Name without the leading backslash.
    pub command: String,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    #[serde(default)]
    pub dependency: Option<Package>,
}

impl ArgumentSchema {
    pub fn new(
        command: impl Into<String>,
        dependency: Option<Package>,
        arguments: Vec<Argument>,
    ) -> Self {
        Self {
            command: command.into(),
            arguments,
            dependency,
        }
    }

    /// The i-th required argument, skipping optional ones.
    pub fn required_argument(&self, index: usize) -> Option<&RequiredArgument> {
        self.arguments
            .iter()
            .filter_map(Argument::as_required)
            .nth(index)
    }

    pub fn required_arguments(&self) -> impl Iterator<Item = &RequiredArgument> {
        self.arguments.iter().filter_map(Argument::as_required)
    }

    fn validate(&self) -> Result<(), RegistryError> {
        for required in self.required_arguments() {
            if let Some(file) = &required.file {
                if file.extensions.is_empty() {
                    return Err(RegistryError::EmptyExtensions {
                        command: self.command.clone(),
                        argument: required.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSchema {
    pub name: String,
    #[serde(default)]
    pub dependency: Option<Package>,
}

impl EnvironmentSchema {
    pub fn new(name: impl Into<String>, dependency: Option<Package>) -> Self {
        Self {
            name: name.into(),
            dependency,
        }
    }
}

/// Serialized form of a [`SchemaRegistry`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryData {
    #[serde(default)]
    pub commands: Vec<ArgumentSchema>,
    #[serde(default)]
    pub environments: Vec<EnvironmentSchema>,
}

/// Lookup from command and environment names to their schemas.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    commands: IndexMap<String, Vec<ArgumentSchema>>,
    environments: IndexMap<String, EnvironmentSchema>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry populated with the well-known LaTeX commands and environments.
    pub fn builtin() -> Self {
        crate::builtin::BUILTIN_REGISTRY.clone()
    }

    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.merge_json(json)?;
        Ok(registry)
    }

    pub fn from_path(path: &Path) -> Result<Self, RegistryError> {
        let json = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Overlays the schemas of a JSON document. Command schemas are added as
    /// further overloads, environment schemas replace earlier ones.
    pub fn merge_json(&mut self, json: &str) -> Result<(), RegistryError> {
        let data: RegistryData = serde_json::from_str(json)?;
        for schema in data.commands {
            self.register_command(schema)?;
        }
        for environment in data.environments {
            self.register_environment(environment);
        }
        Ok(())
    }

    pub fn register_command(&mut self, mut schema: ArgumentSchema) -> Result<(), RegistryError> {
        schema.validate()?;
        if let Some(stripped) = schema.command.strip_prefix('\\') {
            schema.command = stripped.to_string();
        }
        let overloads = self.commands.entry(schema.command.clone()).or_default();
        if !overloads.contains(&schema) {
            overloads.push(schema);
        }
        Ok(())
    }

    pub fn register_environment(&mut self, environment: EnvironmentSchema) {
        self.environments
            .insert(environment.name.clone(), environment);
    }

    /// Adds what a package scan found. Names that are already known keep
    /// their curated schemas.
    pub fn extend_from_index(&mut self, index: &PackageIndex) {
        let mut added = 0;
        for (package, metadata) in &index.packages {
            for command in &metadata.commands {
                if !self.commands.contains_key(command.as_str()) {
                    let schema = ArgumentSchema::new(
                        command.clone(),
                        Some(Package::new(package.clone())),
                        Vec::new(),
                    );
                    self.commands.insert(command.clone(), vec![schema]);
                    added += 1;
                }
            }
            for environment in &metadata.environments {
                if !self.environments.contains_key(environment.as_str()) {
                    self.register_environment(EnvironmentSchema::new(
                        environment.clone(),
                        Some(Package::new(package.clone())),
                    ));
                    added += 1;
                }
            }
        }
        log::debug!("Added {} schemas from the package index", added);
    }

    /// All schemas of a command. Accepts the name with or without backslash.
    pub fn lookup_command(&self, name: &str) -> &[ArgumentSchema] {
        let name = name.strip_prefix('\\').unwrap_or(name);
        self.commands.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn environment(&self, name: &str) -> Option<&EnvironmentSchema> {
        self.environments.get(name)
    }

    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn environment_names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }

    pub fn to_data(&self) -> RegistryData {
        RegistryData {
            commands: self.commands.values().flatten().cloned().collect(),
            environments: self.environments.values().cloned().collect(),
        }
    }
}
