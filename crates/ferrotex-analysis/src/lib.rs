//! # FerroTeX Analysis
//!
//! Semantic queries over parsed LaTeX documents:
//!
//! * [`ReferenceResolver`] tells what a command usage points at: labels,
//!   files, URLs or the user definition of the command.
//! * [`MissingImportAnalyzer`] finds commands and environments whose package
//!   is not imported, and offers [`ImportFix`]es for them.
//! * [`optional_parameter_map`] reads `key=value` options.
//! * [`default_index_programs`] detects the index programs a project needs.
//!
//! Everything works on a [`FileSet`] snapshot and never does I/O.
//!
//! ```
//! use ferrotex_analysis::{analyze_missing_imports, FileSet};
//! use ferrotex_package::{PackageGraph, SchemaRegistry};
//!
//! let set = FileSet::single("main.tex", "\\documentclass{article}\n\\includegraphics{plot.png}");
//! let reports = analyze_missing_imports(
//!     &set,
//!     &SchemaRegistry::builtin(),
//!     &PackageGraph::builtin(),
//!     true,
//! )
//! .unwrap();
//!
//! assert_eq!(reports.len(), 1);
//! assert_eq!(reports[0].message, "Command requires graphicx package");
//! ```

mod aliases;
mod error;
mod file_set;
mod fix;
mod imports;
mod makeindex;
mod options;
mod references;
mod settings;
pub mod text;
pub mod usage;

pub use aliases::AliasRegistry;
pub use error::AnalysisError;
pub use file_set::{CommandDefinition, Document, FileSet, PackageImport};
pub use fix::{Advisory, CollectingHost, FixHost, FixOutcome, ImportFix, TextEdit};
pub use imports::{analyze_missing_imports, MissingImportAnalyzer, ProblemKind, ProblemReport};
pub use makeindex::{default_index_programs, IndexProgram};
pub use options::optional_parameter_map;
pub use references::{resolve_references, ReferenceResolver, SymbolicReference};
pub use settings::AnalysisSettings;
