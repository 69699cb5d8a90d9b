//! Immutable snapshots of the command and environment usages in a syntax tree.

use ferrotex_syntax::ast::{self, ParameterContent};
use ferrotex_syntax::{SyntaxNode, TextRange, TextSize};
use rowan::ast::AstNode;

use crate::text::strip_group;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Required,
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub kind: ParameterKind,
    /// Raw text, delimiters included.
    pub text: String,
    /// Offset of the opening delimiter in the document.
    pub offset: TextSize,
    pub contents: Vec<ParameterContent>,
}

impl Parameter {
    fn from_ast(param: &ast::Parameter) -> Self {
        Self {
            kind: if param.is_required() {
                ParameterKind::Required
            } else {
                ParameterKind::Optional
            },
            text: param.text(),
            offset: param.range().start(),
            contents: param.contents(),
        }
    }

    pub fn is_required(&self) -> bool {
        self.kind == ParameterKind::Required
    }

    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, TextSize::of(self.text.as_str()))
    }

    /// The text between the delimiters.
    pub fn interior(&self) -> &str {
        strip_group(&self.text)
    }
}

/// One occurrence of a command, e.g. `\includegraphics[width=3cm]{a.png}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandUsage {
    /// Name including the backslash.
    pub name: String,
    /// The command token together with its parameters.
    pub range: TextRange,
    pub parameters: Vec<Parameter>,
    /// Position in the document's command list.
    pub index: usize,
    /// The command usage right before this one in the same document.
    pub previous: Option<usize>,
}

impl CommandUsage {
    pub fn offset(&self) -> TextSize {
        self.range.start()
    }

    /// Range of the command token alone.
    pub fn name_range(&self) -> TextRange {
        TextRange::at(self.range.start(), TextSize::of(self.name.as_str()))
    }

    /// The name without the star of a starred form: `\cref*` gives `\cref`.
    /// Schemas and reference command sets are keyed by this name.
    pub fn base_name(&self) -> &str {
        unstarred(&self.name)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| p.is_required())
    }

    pub fn optional_parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().filter(|p| !p.is_required())
    }

    pub fn first_required_parameter(&self) -> Option<&Parameter> {
        self.required_parameters().next()
    }

    /// Offset of one of this usage's parameters, relative to the usage.
    pub fn relative_offset(&self, parameter: &Parameter) -> TextSize {
        parameter.offset - self.range.start()
    }
}

/// Drops one trailing `*` from a control word. The control symbol `\*` is
/// returned as is.
pub fn unstarred(name: &str) -> &str {
    match name.strip_suffix('*') {
        Some(base) if base.len() > 1 => base,
        _ => name,
    }
}

/// One `\begin{name}` of an environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentUsage {
    pub name: String,
    /// The `\begin` command and its arguments.
    pub range: TextRange,
    pub name_range: TextRange,
}

/// Command usages in source order. Nested commands follow the command whose
/// parameter contains them.
pub fn collect_commands(root: &SyntaxNode) -> Vec<CommandUsage> {
    root.descendants()
        .filter_map(ast::Command::cast)
        .filter_map(|command| {
            let name = command.name()?;
            let parameters = command
                .parameters()
                .map(|param| Parameter::from_ast(&param))
                .collect();
            Some((name, command.syntax().text_range(), parameters))
        })
        .enumerate()
        .map(|(index, (name, range, parameters))| CommandUsage {
            name,
            range,
            parameters,
            index,
            previous: index.checked_sub(1),
        })
        .collect()
}

pub fn collect_environments(root: &SyntaxNode) -> Vec<EnvironmentUsage> {
    root.descendants()
        .filter_map(ast::Environment::cast)
        .filter_map(|env| {
            let begin = env.begin()?;
            let (name, name_range) = env.name()?;
            Some(EnvironmentUsage {
                name,
                range: begin.text_range(),
                name_range,
            })
        })
        .collect()
}

/// Brace-stripped, trimmed texts of the required parameters.
pub fn required_parameter_texts<'a>(
    parameters: impl IntoIterator<Item = &'a Parameter>,
) -> Vec<String> {
    parameters
        .into_iter()
        .filter(|p| p.is_required())
        .map(|p| {
            p.text
                .trim_start_matches('{')
                .trim_end_matches('}')
                .trim()
                .to_string()
        })
        .collect()
}
