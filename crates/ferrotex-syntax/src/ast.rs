//! Typed views over the untyped [`SyntaxNode`] tree.
//!
//! The wrappers are zero-cost: each one holds the underlying node and only
//! interprets its children on demand.

use crate::{FerroTexLanguage, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};
use rowan::ast::AstNode;
use rowan::TextRange;

/// A command invocation such as `\includegraphics[width=3cm]{a.png}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Command(SyntaxNode);

impl AstNode for Command {
    type Language = FerroTexLanguage;

    fn can_cast(kind: SyntaxKind) -> bool {
        kind == SyntaxKind::GenericCommand
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        Self::can_cast(node.kind()).then(|| Self(node))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

impl Command {
    /// The command token, including the leading backslash.
    pub fn name_token(&self) -> Option<SyntaxToken> {
        self.0
            .first_token()
            .filter(|token| token.kind() == SyntaxKind::Command)
    }

    pub fn name(&self) -> Option<String> {
        self.name_token().map(|token| token.text().to_string())
    }

    /// All parameters in source order.
    pub fn parameters(&self) -> impl Iterator<Item = Parameter> {
        self.0.children().filter_map(Parameter::cast)
    }

    pub fn required_parameters(&self) -> impl Iterator<Item = Parameter> {
        self.parameters().filter(Parameter::is_required)
    }

    pub fn optional_parameters(&self) -> impl Iterator<Item = Parameter> {
        self.parameters().filter(|p| !p.is_required())
    }
}

/// One piece of a parameter's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterContent {
    /// Plain text, whitespace or a nested command, verbatim.
    Text(String),
    /// A nested `{...}` group, without its braces.
    Group(String),
}

/// A `{...}` or `[...]` group glued to a command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter(SyntaxNode);

impl AstNode for Parameter {
    type Language = FerroTexLanguage;

    fn can_cast(kind: SyntaxKind) -> bool {
        matches!(kind, SyntaxKind::RequiredParam | SyntaxKind::OptionalParam)
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        Self::can_cast(node.kind()).then(|| Self(node))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

impl Parameter {
    pub fn is_required(&self) -> bool {
        self.0.kind() == SyntaxKind::RequiredParam
    }

    /// Raw text including the delimiters.
    pub fn text(&self) -> String {
        self.0.text().to_string()
    }

    pub fn range(&self) -> TextRange {
        self.0.text_range()
    }

    /// Content items between the delimiters. Adjacent items are kept apart so
    /// that `[name={a,b}]` can be told apart from `[name=a,b]`.
    pub fn contents(&self) -> Vec<ParameterContent> {
        let mut contents = Vec::new();
        for element in self.0.children_with_tokens() {
            match element {
                SyntaxElement::Token(token) => match token.kind() {
                    SyntaxKind::LBrace | SyntaxKind::RBrace
                        if self.is_delimiter(&token) => {}
                    SyntaxKind::LBracket | SyntaxKind::RBracket
                        if self.is_delimiter(&token) => {}
                    _ => contents.push(ParameterContent::Text(token.text().to_string())),
                },
                SyntaxElement::Node(node) if node.kind() == SyntaxKind::Group => {
                    contents.push(ParameterContent::Group(group_interior(&node)));
                }
                SyntaxElement::Node(node) => {
                    contents.push(ParameterContent::Text(node.text().to_string()))
                }
            }
        }
        contents
    }

    fn is_delimiter(&self, token: &SyntaxToken) -> bool {
        let first = self.0.first_token();
        let last = self.0.last_token();
        let is_open = first.as_ref() == Some(token);
        let is_close = last.as_ref() == Some(token)
            && matches!(token.kind(), SyntaxKind::RBrace | SyntaxKind::RBracket);
        is_open || is_close
    }
}

/// Text of a `{...}` group without its braces. A group cut off by the end of
/// the input has no closing brace to drop.
fn group_interior(group: &SyntaxNode) -> String {
    let text = group.text().to_string();
    let closed = matches!(
        group.last_child_or_token(),
        Some(SyntaxElement::Token(token)) if token.kind() == SyntaxKind::RBrace
    ) && text.len() > 1;
    let end = if closed { text.len() - 1 } else { text.len() };
    text.get(1..end).unwrap_or_default().to_string()
}

/// A `\begin{name} ... \end{name}` block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Environment(SyntaxNode);

impl AstNode for Environment {
    type Language = FerroTexLanguage;

    fn can_cast(kind: SyntaxKind) -> bool {
        kind == SyntaxKind::Environment
    }

    fn cast(node: SyntaxNode) -> Option<Self> {
        Self::can_cast(node.kind()).then(|| Self(node))
    }

    fn syntax(&self) -> &SyntaxNode {
        &self.0
    }
}

impl Environment {
    pub fn begin(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind() == SyntaxKind::Begin)
    }

    pub fn end(&self) -> Option<SyntaxNode> {
        self.0.children().find(|n| n.kind() == SyntaxKind::End)
    }

    /// The environment name and the range of the name text inside the braces.
    pub fn name(&self) -> Option<(String, TextRange)> {
        let param = self
            .begin()?
            .children()
            .find(|n| n.kind() == SyntaxKind::RequiredParam)?;
        let text = param.text().to_string();
        if !text.starts_with('{') {
            return None;
        }
        let interior = if text.ends_with('}') && text.len() >= 2 {
            &text[1..text.len() - 1]
        } else {
            &text[1..]
        };
        let start = param.text_range().start() + rowan::TextSize::from(1);
        let range = TextRange::at(start, rowan::TextSize::of(interior));
        Some((interior.to_string(), range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn first<N: AstNode<Language = FerroTexLanguage>>(input: &str) -> N {
        parse(input)
            .syntax()
            .descendants()
            .find_map(N::cast)
            .expect("node not found")
    }

    #[test]
    fn test_command_name_and_parameters() {
        let command: Command = first(r"\includegraphics[width=3cm]{a.png}");
        assert_eq!(command.name().as_deref(), Some(r"\includegraphics"));
        let required: Vec<_> = command.required_parameters().map(|p| p.text()).collect();
        assert_eq!(required, vec!["{a.png}"]);
        let optional: Vec<_> = command.optional_parameters().map(|p| p.text()).collect();
        assert_eq!(optional, vec!["[width=3cm]"]);
    }

    #[test]
    fn test_parameter_contents_split_groups() {
        let command: Command = first(r"\foo[name={a,b}, x]");
        let param = command.optional_parameters().next().unwrap();
        assert_eq!(
            param.contents(),
            vec![
                ParameterContent::Text("name=".into()),
                ParameterContent::Group("a,b".into()),
                ParameterContent::Text(",".into()),
                ParameterContent::Text(" ".into()),
                ParameterContent::Text("x".into()),
            ]
        );
    }

    #[test]
    fn test_unclosed_parameter_keeps_content() {
        let command: Command = first(r"\foo{abc");
        let param = command.required_parameters().next().unwrap();
        assert_eq!(param.contents(), vec![ParameterContent::Text("abc".into())]);
    }

    #[test]
    fn test_environment_name() {
        let env: Environment = first(r"\begin{align*} x \end{align*}");
        let (name, range) = env.name().unwrap();
        assert_eq!(name, "align*");
        assert_eq!(range, TextRange::new(7.into(), 13.into()));
    }

    #[test]
    fn test_group_contents() {
        let command: Command = first(r"\foo{{}{ab}x{bc");
        let param = command.required_parameters().next().unwrap();
        assert_eq!(
            param.contents(),
            vec![
                ParameterContent::Group("".into()),
                ParameterContent::Group("ab".into()),
                ParameterContent::Text("x".into()),
                ParameterContent::Group("bc".into()),
            ]
        );
    }
}
