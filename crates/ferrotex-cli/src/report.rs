//! Text and JSON rendering of analysis results.

use std::path::Path;

use ferrotex_analysis::usage::CommandUsage;
use ferrotex_analysis::{FileSet, IndexProgram, ProblemReport, SymbolicReference};
use ferrotex_syntax::TextRange;
use line_index::LineIndex;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Location {
    pub file: String,
    /// 1-based.
    pub line: u32,
    /// 1-based, in bytes.
    pub column: u32,
    pub start: u32,
    pub end: u32,
}

impl Location {
    fn new(path: &Path, line_index: &LineIndex, range: TextRange) -> Self {
        let position = line_index.line_col(range.start());
        Self {
            file: path.display().to_string(),
            line: position.line + 1,
            column: position.col + 1,
            start: range.start().into(),
            end: range.end().into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct JsonProblem {
    #[serde(flatten)]
    pub location: Location,
    pub message: String,
    pub fixes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonReference {
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct JsonUsage {
    #[serde(flatten)]
    pub location: Location,
    pub command: String,
    pub references: Vec<JsonReference>,
}

#[derive(Debug, Serialize)]
pub struct JsonIndexProgram {
    pub program: IndexProgram,
    pub executable: &'static str,
}

/// Line indices of the documents, built on first use.
pub struct Locator<'a> {
    file_set: &'a FileSet,
    indices: Vec<Option<LineIndex>>,
}

impl<'a> Locator<'a> {
    pub fn new(file_set: &'a FileSet) -> Self {
        Self {
            file_set,
            indices: file_set.documents().iter().map(|_| None).collect(),
        }
    }

    pub fn locate(&mut self, document: usize, range: TextRange) -> Option<Location> {
        let doc = self.file_set.document(document)?;
        let index = self
            .indices
            .get_mut(document)?
            .get_or_insert_with(|| LineIndex::new(&doc.text));
        Some(Location::new(&doc.path, index, range))
    }
}

pub fn problem_json(locator: &mut Locator<'_>, report: &ProblemReport) -> Option<JsonProblem> {
    Some(JsonProblem {
        location: locator.locate(report.document, report.range)?,
        message: report.message.clone(),
        fixes: report.fixes.iter().map(|fix| fix.title()).collect(),
    })
}

/// `path:line:col: message`, followed by one line per fix.
pub fn problem_text(locator: &mut Locator<'_>, report: &ProblemReport) -> Option<String> {
    let location = locator.locate(report.document, report.range)?;
    let mut text = format!(
        "{}:{}:{}: {}",
        location.file, location.line, location.column, report.message
    );
    for fix in &report.fixes {
        text.push_str(&format!("\n    fix: {}", fix.title()));
    }
    Some(text)
}

pub fn reference_json(
    usage: &CommandUsage,
    document_text: &str,
    reference: &SymbolicReference,
) -> JsonReference {
    let target = match reference {
        SymbolicReference::DefinitionLookup { command } => Some(command.clone()),
        _ => reference.target(usage, document_text).map(str::to_string),
    };
    let extensions = match reference {
        SymbolicReference::File { extensions, .. } => extensions.clone(),
        _ => Vec::new(),
    };
    JsonReference {
        kind: reference.kind(),
        target,
        extensions,
    }
}
