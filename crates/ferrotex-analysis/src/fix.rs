//! Import fixes and the channel through which they reach the host.
//!
//! Applying a fix never touches a document directly. The fix computes a
//! [`TextEdit`] and hands it to the host, or tells the host why it refused.

use ferrotex_package::commands::{DOCUMENT_CLASS_COMMAND, PACKAGE_COMMANDS};
use ferrotex_package::{Package, PackageGraph};
use ferrotex_syntax::TextSize;

use crate::error::AnalysisError;
use crate::file_set::{Document, FileSet};

/// Receives the effects of applied fixes.
pub trait FixHost {
    fn insert_package_import(&mut self, edit: TextEdit);
    fn show_advisory(&mut self, advisory: Advisory);
}

/// A non-fatal message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub title: String,
    pub message: String,
}

impl Advisory {
    fn conflict(package: &str) -> Self {
        Self {
            title: "Conflicting package detected".to_string(),
            message: format!(
                "The package {} was not inserted because a conflicting package was detected.",
                package
            ),
        }
    }
}

/// An insertion into one document of a file set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub document: usize,
    pub offset: TextSize,
    pub text: String,
}

impl TextEdit {
    /// Returns `source` with the edit applied. An offset past the end, or
    /// inside a character, is moved back to the nearest boundary.
    pub fn apply(&self, source: &str) -> String {
        let mut offset = usize::from(self.offset).min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let mut result = String::with_capacity(source.len() + self.text.len());
        result.push_str(&source[..offset]);
        result.push_str(&self.text);
        result.push_str(&source[offset..]);
        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixOutcome {
    Inserted(TextEdit),
    /// Nothing to do, the package is imported already.
    AlreadyIncluded,
    /// Refused because `conflicting` is imported and cannot coexist with
    /// `package`.
    Conflict { package: String, conflicting: String },
}

/// Adds a `\usepackage` line for a missing package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFix {
    pub package: Package,
}

impl ImportFix {
    pub fn new(package: Package) -> Self {
        Self { package }
    }

    pub fn title(&self) -> String {
        format!("Add import for package '{}'", self.package.name)
    }

    /// Inserts the import into the root document unless the package is
    /// present already or conflicts with an imported one.
    pub fn apply(
        &self,
        file_set: &FileSet,
        graph: &PackageGraph,
        host: &mut dyn FixHost,
    ) -> Result<FixOutcome, AnalysisError> {
        let root = file_set.root()?;
        let included = file_set.included_packages();
        if self.package.is_default() || included.contains(&self.package.name) {
            return Ok(FixOutcome::AlreadyIncluded);
        }

        if let Some(conflicting) = graph.conflicting_package(&self.package.name, &included) {
            log::info!(
                "Not importing {} because {} is imported",
                self.package.name,
                conflicting
            );
            host.show_advisory(Advisory::conflict(&self.package.name));
            return Ok(FixOutcome::Conflict {
                package: self.package.name.clone(),
                conflicting: conflicting.to_string(),
            });
        }

        let edit = import_edit(root, &self.package);
        log::debug!("Importing {} at offset {:?}", self.package.name, edit.offset);
        host.insert_package_import(edit.clone());
        Ok(FixOutcome::Inserted(edit))
    }
}

/// The new import goes on its own line after the last package import, after
/// `\documentclass` when there is none, or at the very top.
fn import_edit(root: &Document, package: &Package) -> TextEdit {
    let anchor = root
        .commands
        .iter()
        .rev()
        .find(|usage| PACKAGE_COMMANDS.contains(&usage.name.as_str()))
        .or_else(|| {
            root.commands
                .iter()
                .find(|usage| usage.name == DOCUMENT_CLASS_COMMAND)
        });

    let line = package.usepackage();
    let Some(anchor) = anchor else {
        return TextEdit {
            document: 0,
            offset: TextSize::from(0),
            text: format!("{}\n", line),
        };
    };

    let end = usize::from(anchor.range.end());
    match root.text[end..].find('\n') {
        Some(newline) => TextEdit {
            document: 0,
            offset: TextSize::from((end + newline + 1) as u32),
            text: format!("{}\n", line),
        },
        None => TextEdit {
            document: 0,
            offset: TextSize::of(root.text.as_str()),
            text: format!("\n{}", line),
        },
    }
}

/// A host that only records what it was asked to do.
#[derive(Debug, Default)]
pub struct CollectingHost {
    pub edits: Vec<TextEdit>,
    pub advisories: Vec<Advisory>,
}

impl FixHost for CollectingHost {
    fn insert_package_import(&mut self, edit: TextEdit) {
        self.edits.push(edit);
    }

    fn show_advisory(&mut self, advisory: Advisory) {
        self.advisories.push(advisory);
    }
}
