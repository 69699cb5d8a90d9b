//! Well-known command names, spelled with their leading backslash.

/// Commands whose first required argument lists label keys.
pub const LABEL_REFERENCE_COMMANDS: &[&str] = &[
    "\\ref",
    "\\eqref",
    "\\nameref",
    "\\autoref",
    "\\fullref",
    "\\pageref",
    "\\vref",
    "\\Autoref",
    "\\cref",
    "\\Cref",
    "\\labelcref",
    "\\cpageref",
];

pub const LABEL_DEFINITION_COMMANDS: &[&str] = &["\\label"];

pub const URL_COMMANDS: &[&str] = &["\\url", "\\href"];

/// Commands importing packages. Their first required argument is a comma
/// separated list of package names.
pub const PACKAGE_COMMANDS: &[&str] = &["\\usepackage", "\\RequirePackage"];

pub const DOCUMENT_CLASS_COMMAND: &str = "\\documentclass";

/// Commands pulling another source file into the document.
pub const INCLUDE_COMMANDS: &[&str] = &["\\input", "\\include", "\\subfile", "\\subfileinclude"];

pub const COMMAND_DEFINITIONS: &[&str] = &[
    "\\newcommand",
    "\\newcommand*",
    "\\newif",
    "\\NewDocumentCommand",
    "\\DeclareMathOperator",
    "\\DeclarePairedDelimiter",
    "\\DeclarePairedDelimiterX",
    "\\DeclarePairedDelimiterXPP",
];

pub const COMMAND_REDEFINITIONS: &[&str] = &[
    "\\renewcommand",
    "\\renewcommand*",
    "\\providecommand",
    "\\providecommand*",
    "\\ProvideDocumentCommand",
    "\\DeclareDocumentCommand",
    "\\RenewDocumentCommand",
    "\\def",
    "\\let",
];

pub const ENVIRONMENT_DEFINITIONS: &[&str] = &[
    "\\newenvironment",
    "\\newtheorem",
    "\\NewDocumentEnvironment",
    "\\ProvideDocumentEnvironment",
    "\\DeclareDocumentEnvironment",
];

pub const ENVIRONMENT_REDEFINITIONS: &[&str] = &["\\renewenvironment", "\\RenewDocumentEnvironment"];

/// Packages providing an index.
pub const INDEX_PACKAGES: &[&str] = &[
    "makeidx",
    "multind",
    "index",
    "splitidx",
    "splitindex",
    "imakeidx",
    "hvindex",
    "idxlayout",
    "repeatindex",
    "indextools",
];

pub const GLOSSARY_PACKAGES: &[&str] = &["glossaries", "glossaries-extra"];

/// True for commands that define or redefine another command.
pub fn is_command_definition(name: &str) -> bool {
    COMMAND_DEFINITIONS.contains(&name) || COMMAND_REDEFINITIONS.contains(&name)
}

/// True for commands that define or redefine an environment.
pub fn is_environment_definition(name: &str) -> bool {
    ENVIRONMENT_DEFINITIONS.contains(&name) || ENVIRONMENT_REDEFINITIONS.contains(&name)
}
