//! Package knowledge for LaTeX analysis.
//!
//! * [`SchemaRegistry`] maps command and environment names to their argument
//!   schemas and the package providing them.
//! * [`PackageGraph`] records which packages load other packages and which
//!   cannot be used together.
//! * [`scanner::PackageScanner`] indexes a TeX distribution so both can be
//!   extended beyond the built-in tables.

use anyhow::Context;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod builtin;
pub mod commands;
mod graph;
mod package;
pub mod scanner;
mod schema;

pub use builtin::{BUILTIN_GRAPH, BUILTIN_REGISTRY};
pub use graph::{PackageGraph, PackageGraphData};
pub use package::Package;
pub use schema::{
    Argument, ArgumentSchema, EnvironmentSchema, FileArgument, RegistryData, RegistryError,
    RequiredArgument, SchemaRegistry,
};

/// What a scan of the TeX distribution found, keyed by package name.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackageIndex {
    pub packages: IndexMap<String, PackageMetadata>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackageMetadata {
    /// Defined command names, without backslash.
    pub commands: Vec<String>,
    pub environments: Vec<String>,
    /// Packages loaded with `\RequirePackage`.
    #[serde(default)]
    pub requires: Vec<String>,
}

impl PackageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: String, metadata: PackageMetadata) {
        self.packages.insert(name, metadata);
    }

    pub fn get(&self, name: &str) -> Option<&PackageMetadata> {
        self.packages.get(name)
    }

    /// Returns the default cache file path: ~/.cache/ferrotex/packages.json
    pub fn cache_path() -> Option<PathBuf> {
        dirs::cache_dir().map(|p| p.join("ferrotex").join("packages.json"))
    }

    /// Saves the index to the cache file.
    pub fn save_to_cache(&self) -> anyhow::Result<()> {
        if let Some(path) = Self::cache_path() {
            self.save_to_path(&path)?;
            log::info!("Saved package index to {:?}", path);
        }
        Ok(())
    }

    pub fn save_to_path(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Loads the index from the cache file, if it exists.
    pub fn load_from_cache() -> Option<Self> {
        let path = Self::cache_path()?;
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Option<Self> {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str::<PackageIndex>(&content) {
                    Ok(index) => {
                        log::info!("Cache hit. Loaded {} packages from cache.", index.packages.len());
                        return Some(index);
                    }
                    Err(e) => log::warn!("Failed to parse index: {}", e),
                },
                Err(e) => log::warn!("Failed to read index: {}", e),
            }
        }
        None
    }
}
