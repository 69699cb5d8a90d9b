//! Reads a LaTeX project from disk into a [`FileSet`].

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use ferrotex_analysis::{AliasRegistry, Document, FileSet, ReferenceResolver, SymbolicReference};
use ferrotex_package::commands::INCLUDE_COMMANDS;
use ferrotex_package::SchemaRegistry;
use indexmap::IndexSet;

/// Loads `path`, or the file named by its `%!TEX root` comment, as the root
/// document, followed by every file it includes, breadth first.
pub fn load_project(path: &Path, registry: &SchemaRegistry) -> anyhow::Result<FileSet> {
    let root = find_root(path)?;
    let base = root.parent().map(Path::to_path_buf).unwrap_or_default();
    let aliases = AliasRegistry::new();

    let mut file_set = FileSet::new();
    let mut seen = IndexSet::from([root.clone()]);
    let mut queue = VecDeque::from([root.clone()]);
    while let Some(path) = queue.pop_front() {
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if path == root => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        let id = file_set.push(Document::parse(&path, text));
        for included in included_files(&file_set, id, &base, registry, &aliases)? {
            if seen.insert(included.clone()) {
                queue.push_back(included);
            }
        }
    }

    log::info!("Loaded {} files from {}", file_set.documents().len(), root.display());
    Ok(file_set)
}

fn find_root(path: &Path) -> anyhow::Result<PathBuf> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let Some(magic) = detect_magic_root(&text) else {
        return Ok(path.to_path_buf());
    };
    let root = path.parent().unwrap_or(Path::new("")).join(magic);
    if root.is_file() {
        log::info!("Magic root detected: using {}", root.display());
        Ok(root)
    } else {
        log::warn!("Magic root {} does not exist, ignoring it", root.display());
        Ok(path.to_path_buf())
    }
}

/// Files named by the include commands of one document. Paths are relative
/// to the directory of the root file, as LaTeX resolves them.
fn included_files(
    file_set: &FileSet,
    id: usize,
    base: &Path,
    registry: &SchemaRegistry,
    aliases: &AliasRegistry,
) -> anyhow::Result<Vec<PathBuf>> {
    let Some(document) = file_set.document(id) else {
        return Ok(Vec::new());
    };
    let resolver = ReferenceResolver::new(registry, aliases, file_set);

    let mut files = Vec::new();
    for usage in document
        .commands
        .iter()
        .filter(|usage| INCLUDE_COMMANDS.contains(&usage.name.as_str()))
    {
        for reference in resolver.resolve(usage)? {
            let SymbolicReference::File {
                default_extension, ..
            } = &reference
            else {
                continue;
            };
            let Some(target) = reference.target(usage, &document.text) else {
                continue;
            };
            let mut path = base.join(target.trim());
            if path.extension().is_none() {
                path.set_extension(default_extension);
            }
            if path.is_file() {
                files.push(path);
            } else {
                log::debug!("{} includes missing file {}", document.path.display(), path.display());
            }
        }
    }
    Ok(files)
}

/// Scans the first 5 lines for a magic comment like `%!TEX root = main.tex`.
/// The path is relative to the file containing the comment.
pub fn detect_magic_root(text: &str) -> Option<PathBuf> {
    text.lines().take(5).find_map(|line| {
        let content = line.trim_start().strip_prefix('%')?.trim_start();
        let content = content.strip_prefix('!')?.trim_start();
        if !content.to_ascii_lowercase().starts_with("tex root") {
            return None;
        }
        let (_, value) = content.split_once('=')?;
        let value = value.trim();
        (!value.is_empty()).then(|| PathBuf::from(value))
    })
}
