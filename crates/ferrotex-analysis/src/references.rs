//! What a command usage refers to: labels, files, URLs or the definition of
//! the command itself.

use ferrotex_package::commands::{LABEL_REFERENCE_COMMANDS, URL_COMMANDS};
use ferrotex_package::{RequiredArgument, SchemaRegistry};
use ferrotex_syntax::{TextRange, TextSize};

use crate::aliases::AliasRegistry;
use crate::error::AnalysisError;
use crate::file_set::FileSet;
use crate::text::extract_sub_parameter_ranges;
use crate::usage::{CommandUsage, Parameter};

/// A navigable target of a command usage. Ranges are relative to the start
/// of the usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolicReference {
    Label {
        range: TextRange,
    },
    File {
        range: TextRange,
        extensions: Vec<String>,
        default_extension: String,
    },
    Url {
        range: TextRange,
    },
    /// Jump to the user definitions of the command.
    DefinitionLookup {
        command: String,
    },
}

impl SymbolicReference {
    pub fn range(&self) -> Option<TextRange> {
        match self {
            SymbolicReference::Label { range }
            | SymbolicReference::File { range, .. }
            | SymbolicReference::Url { range } => Some(*range),
            SymbolicReference::DefinitionLookup { .. } => None,
        }
    }

    /// The referenced text, e.g. the label key.
    pub fn target<'a>(&self, usage: &CommandUsage, document_text: &'a str) -> Option<&'a str> {
        let range = self.range()? + usage.offset();
        document_text.get(std::ops::Range::<usize>::from(range))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SymbolicReference::Label { .. } => "label",
            SymbolicReference::File { .. } => "file",
            SymbolicReference::Url { .. } => "url",
            SymbolicReference::DefinitionLookup { .. } => "definition",
        }
    }
}

pub struct ReferenceResolver<'a> {
    registry: &'a SchemaRegistry,
    aliases: &'a AliasRegistry,
    file_set: &'a FileSet,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(registry: &'a SchemaRegistry, aliases: &'a AliasRegistry, file_set: &'a FileSet) -> Self {
        Self {
            registry,
            aliases,
            file_set,
        }
    }

    /// The references exposed by `usage`. The first rule that applies wins:
    /// label references, file arguments, URLs, and finally the definition
    /// of the command, if the file set defines it.
    pub fn resolve(&self, usage: &CommandUsage) -> Result<Vec<SymbolicReference>, AnalysisError> {
        self.file_set.ensure_ready()?;
        self.aliases
            .update_aliases(LABEL_REFERENCE_COMMANDS, self.file_set);

        let first = usage.first_required_parameter();

        if let Some(param) = first {
            if self.aliases.is_alias(LABEL_REFERENCE_COMMANDS, usage.base_name()) {
                log::trace!("{} resolves to labels", usage.name);
                return Ok(sub_ranges(usage, param)
                    .map(|range| SymbolicReference::Label { range })
                    .collect());
            }
        }

        let files = self.file_references(usage);
        if first.is_some() && !files.is_empty() {
            log::trace!("{} resolves to {} files", usage.name, files.len());
            return Ok(files);
        }

        if let Some(param) = first {
            if URL_COMMANDS.contains(&usage.base_name()) {
                return Ok(sub_ranges(usage, param)
                    .map(|range| SymbolicReference::Url { range })
                    .collect());
            }
        }

        // Only offer a definition lookup when there is something to find.
        if self.file_set.command_definitions(&usage.name).is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![SymbolicReference::DefinitionLookup {
                command: usage.name.clone(),
            }])
        }
    }

    /// File references for the file arguments of the first registered schema.
    /// Parameters past the schema's required arguments are matched against its
    /// last file argument.
    fn file_references(&self, usage: &CommandUsage) -> Vec<SymbolicReference> {
        let Some(schema) = self.registry.lookup_command(usage.base_name()).first() else {
            return Vec::new();
        };
        let arguments: Vec<&RequiredArgument> = schema.required_arguments().collect();
        let last_file = arguments.iter().rev().find(|argument| argument.is_file());

        let mut references = Vec::new();
        for (i, param) in usage.required_parameters().enumerate() {
            let Some(argument) = arguments.get(i).or(last_file) else {
                continue;
            };
            let Some(file) = &argument.file else {
                continue;
            };
            let file_reference = |range: TextRange| SymbolicReference::File {
                range,
                extensions: file.extensions.clone(),
                default_extension: file.default_extension.clone(),
            };
            if argument.comma_separated {
                references.extend(sub_ranges(usage, param).map(file_reference));
            } else if let Some(range) = whole_interior(usage, param) {
                references.push(file_reference(range));
            }
        }
        references
    }
}

/// Ranges of the non-empty comma separated values of `param`, relative to
/// `usage`. `\ref{a,}` refers to `a` only.
fn sub_ranges(usage: &CommandUsage, param: &Parameter) -> impl Iterator<Item = TextRange> {
    let shift = usage.relative_offset(param);
    extract_sub_parameter_ranges(&param.text)
        .into_iter()
        .filter(|range| !range.is_empty())
        .map(move |range| range + shift)
}

/// The brace-stripped parameter as one range, relative to `usage`.
fn whole_interior(usage: &CommandUsage, param: &Parameter) -> Option<TextRange> {
    if param.text.len() < 2 {
        return None;
    }
    let start = usage.relative_offset(param) + TextSize::from(1);
    Some(TextRange::at(start, TextSize::of(param.interior())))
}

/// Resolves `usage` with a throwaway resolver.
pub fn resolve_references(
    usage: &CommandUsage,
    file_set: &FileSet,
    registry: &SchemaRegistry,
    aliases: &AliasRegistry,
) -> Result<Vec<SymbolicReference>, AnalysisError> {
    ReferenceResolver::new(registry, aliases, file_set).resolve(usage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrotex_package::{ArgumentSchema, Package};

    struct Fixture {
        set: FileSet,
        registry: SchemaRegistry,
        aliases: AliasRegistry,
    }

    impl Fixture {
        fn new(text: &str) -> Self {
            Self {
                set: FileSet::single("main.tex", text),
                registry: SchemaRegistry::builtin(),
                aliases: AliasRegistry::new(),
            }
        }

        fn resolve(&self, index: usize) -> Vec<SymbolicReference> {
            let usage = &self.set.root().unwrap().commands[index];
            resolve_references(usage, &self.set, &self.registry, &self.aliases).unwrap()
        }

        /// (kind, referenced text) for each reference of a usage.
        fn targets(&self, index: usize) -> Vec<(&'static str, String)> {
            let doc = self.set.root().unwrap();
            let usage = &doc.commands[index];
            self.resolve(index)
                .iter()
                .map(|r| {
                    let text = r.target(usage, &doc.text).map(str::to_string);
                    (r.kind(), text.unwrap_or_default())
                })
                .collect()
        }
    }

    #[test]
    fn test_label_references() {
        let fixture = Fixture::new(r"See \cref{sec:intro, fig:plot}.");
        assert_eq!(
            fixture.targets(0),
            vec![("label", "sec:intro".into()), ("label", "fig:plot".into())]
        );
    }

    #[test]
    fn test_label_reference_aliases() {
        let fixture = Fixture::new(r"\newcommand{\myref}[1]{\ref{#1}} \myref{a,b}");
        assert_eq!(
            fixture.targets(3),
            vec![("label", "a".into()), ("label", "b".into())]
        );
    }

    #[test]
    fn test_starred_label_references() {
        let fixture = Fixture::new(r"\cref*{a,b} \newcommand{\nolink}[1]{\ref*{#1}} \nolink{c}");
        assert_eq!(
            fixture.targets(0),
            vec![("label", "a".into()), ("label", "b".into())]
        );
        assert_eq!(fixture.targets(4), vec![("label", "c".into())]);
    }

    #[test]
    fn test_empty_label_values_are_skipped() {
        let fixture = Fixture::new(r"\ref{a,} \cref{, b ,,c}");
        assert_eq!(fixture.targets(0), vec![("label", "a".into())]);
        assert_eq!(
            fixture.targets(1),
            vec![("label", "b".into()), ("label", "c".into())]
        );
    }

    #[test]
    fn test_unclosed_file_argument_keeps_its_tail() {
        let fixture = Fixture::new(r"\input{chapter");
        assert_eq!(fixture.targets(0), vec![("file", "chapter".into())]);
    }

    #[test]
    fn test_label_command_without_parameter_falls_through() {
        let fixture = Fixture::new(r"\ref");
        assert!(fixture.resolve(0).is_empty());
    }

    #[test]
    fn test_comma_separated_file_references() {
        let fixture = Fixture::new(r"\bibliography{refs,extra}");
        let references = fixture.resolve(0);
        assert_eq!(references.len(), 2);
        match &references[0] {
            SymbolicReference::File {
                range,
                extensions,
                default_extension,
            } => {
                assert_eq!(*range, TextRange::new(14.into(), 18.into()));
                assert_eq!(extensions, &vec!["bib".to_string()]);
                assert_eq!(default_extension, "bib");
            }
            other => panic!("unexpected reference {:?}", other),
        }
    }

    #[test]
    fn test_single_file_argument_keeps_commas() {
        let fixture = Fixture::new(r"\includegraphics[width=3cm]{plots/a,b.png}");
        assert_eq!(fixture.targets(0), vec![("file", "plots/a,b.png".into())]);
    }

    #[test]
    fn test_file_argument_after_text_argument() {
        let fixture = Fixture::new(r"\inputminted{python}{code.py}");
        assert_eq!(fixture.targets(0), vec![("file", "code.py".into())]);
    }

    #[test]
    fn test_extra_parameters_use_last_file_argument() {
        let mut fixture = Fixture::new(r"\loadall{a}{b,c}{d}");
        fixture
            .registry
            .register_command(ArgumentSchema::new(
                "loadall",
                Some(Package::new("loader")),
                vec![RequiredArgument::file("file", &["tex"]).into()],
            ))
            .unwrap();
        let targets: Vec<_> = fixture.targets(0).into_iter().map(|(_, t)| t).collect();
        assert_eq!(targets, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_url_references() {
        let fixture = Fixture::new(r"\href{https://example.org}{Example}");
        assert_eq!(
            fixture.targets(0),
            vec![("url", "https://example.org".into())]
        );
    }

    #[test]
    fn test_definition_lookup_only_when_defined() {
        let fixture = Fixture::new(r"\newcommand{\foo}{x} \foo \bar");
        assert_eq!(
            fixture.resolve(2),
            vec![SymbolicReference::DefinitionLookup {
                command: "\\foo".into()
            }]
        );
        assert!(fixture.resolve(3).is_empty());
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let fixture = Fixture::new(r"\ref{a} \input{chapter} \url{x}");
        for index in 0..3 {
            assert_eq!(fixture.resolve(index), fixture.resolve(index));
        }
    }

    #[test]
    fn test_index_not_ready() {
        let mut fixture = Fixture::new(r"\ref{a}");
        fixture.set.set_indexing(true);
        let usage = fixture.set.root().unwrap().commands[0].clone();
        let result = resolve_references(&usage, &fixture.set, &fixture.registry, &fixture.aliases);
        assert_eq!(result, Err(AnalysisError::IndexNotReady));
    }
}
